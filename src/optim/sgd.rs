//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use ndarray::Array1;

/// SGD optimizer with optional momentum
pub struct SGD {
    lr: f64,
    momentum: f64,
    velocities: Vec<Option<Array1<f64>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f64, momentum: f64) -> Self {
        Self {
            lr,
            momentum,
            velocities: Vec::new(),
        }
    }

    /// Initialize velocities if needed
    fn ensure_velocities(&mut self, params: &[Array1<f64>]) {
        if self.velocities.len() != params.len() {
            self.velocities = params.iter().map(|_| None).collect();
        }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [Array1<f64>], grads: &[Array1<f64>]) {
        self.ensure_velocities(params);

        for (i, (param, grad)) in params.iter_mut().zip(grads).enumerate() {
            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = match &self.velocities[i] {
                    Some(v) => v * self.momentum - grad * self.lr,
                    None => grad * (-self.lr),
                };

                *param += &velocity;
                self.velocities[i] = Some(velocity);
            } else {
                // Simple SGD: param -= lr * grad
                *param -= &(grad * self.lr);
            }
        }
    }

    fn lr(&self) -> f64 {
        self.lr
    }
}
