/// Resets every element of a container to zero, keeping its shape.
pub trait ZeroOut {
    fn zero_out(&mut self);
}

impl ZeroOut for f64 {
    fn zero_out(&mut self) {
        *self = 0.0;
    }
}

impl<T: ZeroOut> ZeroOut for [T] {
    fn zero_out(&mut self) {
        self.iter_mut().for_each(T::zero_out);
    }
}

impl<T: ZeroOut> ZeroOut for Vec<T> {
    fn zero_out(&mut self) {
        self.as_mut_slice().zero_out();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_out_nested() {
        let mut values = vec![vec![1.0, 2.0], vec![3.0]];
        values.zero_out();
        assert_eq!(values, vec![vec![0.0, 0.0], vec![0.0]]);
    }
}
