//! Scalar activation math shared by every lane type.

/// Sigmoid activation function: σ(x) = 1 / (1 + e^(-x))
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Single-precision sigmoid.
pub fn sigmoid_f32(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Hyperbolic tangent activation: tanh(x) = (e^x - e^(-x)) / (e^x + e^(-x))
pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

pub fn tanh_f32(x: f32) -> f32 {
    x.tanh()
}

/// Rectified linear unit. NaN maps to zero.
pub fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

pub fn relu_f32(x: f32) -> f32 {
    if x > 0.0 { x } else { 0.0 }
}
