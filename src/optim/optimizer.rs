//! Optimizer trait

use ndarray::Array1;

/// Trait for optimization algorithms
///
/// `params` and `grads` are parallel slices: `grads[i]` is the gradient of
/// the loss with respect to `params[i]`.
pub trait Optimizer: Send {
    /// Perform a single optimization step
    fn step(&mut self, params: &mut [Array1<f64>], grads: &[Array1<f64>]);

    /// Get learning rate
    fn lr(&self) -> f64;
}
