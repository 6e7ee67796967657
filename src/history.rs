/// Every mini-batch cost recorded during training, in order, with running
/// bounds for plotting.
#[derive(Clone, Debug, PartialEq)]
pub struct CostHistory {
    costs: Vec<f64>,
    min: f64,
    max: f64,
}

impl CostHistory {
    pub fn new() -> Self {
        CostHistory {
            costs: Vec::new(),
            min: std::f64::INFINITY,
            max: std::f64::NEG_INFINITY,
        }
    }

    pub fn push(&mut self, cost: f64) {
        self.costs.push(cost);
        self.min = self.min.min(cost);
        self.max = self.max.max(cost);
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.costs.last().copied()
    }

    pub fn min(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.min)
        }
    }

    pub fn max(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.max)
        }
    }

    pub fn reset(&mut self) {
        *self = CostHistory::new();
    }
}

impl Default for CostHistory {
    fn default() -> Self {
        CostHistory::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_bounds() {
        let mut history = CostHistory::new();
        assert_eq!(history.min(), None);
        assert_eq!(history.last(), None);
        for &cost in &[0.5, 0.2, 0.9, 0.4] {
            history.push(cost);
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.costs(), &[0.5, 0.2, 0.9, 0.4]);
        assert_eq!(history.min(), Some(0.2));
        assert_eq!(history.max(), Some(0.9));
        assert_eq!(history.last(), Some(0.4));

        history.reset();
        assert!(history.is_empty());
        assert_eq!(history.max(), None);
    }
}
