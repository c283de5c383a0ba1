//! # LSTM Cell Kernel
//!
//! The elementwise core of a peephole LSTM: one timestep of the cell update
//! and its exact gradient, for a single lane or for a wide register of lanes.
//!
//! ## Core Components
//!
//! - **Activations**: closed catalogue (identity, sigmoid, tanh, relu) selected per call
//! - **Cell step**: generic forward and backward steps over any [`Lane`]
//! - **Wide lane**: `F32x8`, eight `f32` lanes in one AVX register (AVX builds only)
//! - **Frames**: one timestep applied across many feature lanes held in `ndarray` buffers
//! - **Config**: activation/peephole settings with JSON and binary persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use lstm_cell_kernel::{CellActivations, GatePreActivation, LstmCellKernel, Peephole};
//!
//! let kernel = LstmCellKernel::new(Peephole::new(0.1f64, 0.2, 0.3), CellActivations::default());
//! let gates = GatePreActivation::new(0.5, -0.2, 0.8, 0.1);
//!
//! let fwd = kernel.forward(gates, 0.0);
//!
//! let mut state_grad = 0.0;
//! let grads = kernel.backward(&fwd, 0.0, 1.0, &mut state_grad);
//! assert!(grads.output_gate.is_finite());
//! ```

pub mod activation;
pub mod cell;
pub mod config;
pub mod error;
pub mod frame;
pub mod lane;
#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
pub mod simd;
pub mod utils;

// Re-export commonly used items
pub use activation::{Activation, CellActivations};
pub use cell::{backward, forward, BackwardResult, ForwardResult, GatePreActivation, LstmCellKernel, Peephole};
pub use config::{ConfigPersistence, KernelConfig, PersistentConfig};
pub use error::KernelError;
pub use frame::{backward_frame, forward_frame, BackwardFrame, ForwardFrame, GateFrame, PeepholeFrame};
pub use lane::{Element, Lane, Packed};
#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
pub use simd::F32x8;
