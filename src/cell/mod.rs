//! Single-timestep LSTM cell step with peephole connections.
//!
//! The forward step computes, for one lane:
//! - a_t = node(x_in)
//! - i_t = gate(x_ig + c_{t-1} ⊙ w_ci)
//! - f_t = gate(x_fg + c_{t-1} ⊙ w_cf)
//! - c_t = a_t ⊙ i_t + c_{t-1} ⊙ f_t
//! - o_t = gate(x_og + c_t ⊙ w_co)
//! - h_t = o_t ⊙ state(c_t)
//!
//! Both steps are generic over [`Lane`](crate::lane::Lane), so the scalar and
//! wide-lane paths share one body.

pub mod backward;
pub mod forward;
pub mod kernel;

pub use backward::backward;
pub use forward::forward;
pub use kernel::LstmCellKernel;

use crate::lane::Lane;

/// Raw gate values before any nonlinearity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePreActivation<L> {
    pub input: L,
    pub input_gate: L,
    pub forget_gate: L,
    pub output_gate: L,
}

impl<L: Lane> GatePreActivation<L> {
    pub fn new(input: L, input_gate: L, forget_gate: L, output_gate: L) -> Self {
        GatePreActivation { input, input_gate, forget_gate, output_gate }
    }
}

/// Peephole weights coupling the cell state back into the gates.
///
/// Zero weights disable the connections without changing the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peephole<L> {
    pub input_gate: L,
    pub forget_gate: L,
    pub output_gate: L,
}

impl<L: Lane> Peephole<L> {
    pub fn new(input_gate: L, forget_gate: L, output_gate: L) -> Self {
        Peephole { input_gate, forget_gate, output_gate }
    }

    pub fn zero() -> Self {
        Peephole::new(L::zero(), L::zero(), L::zero())
    }
}

/// Everything the forward step produces. Gate fields hold activated values;
/// the backward step of the same timestep consumes this bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardResult<L> {
    pub input: L,
    pub input_gate: L,
    pub forget_gate: L,
    pub output_gate: L,
    pub state: L,
    pub state_activated: L,
    pub output: L,
}

/// Gradients of the loss with respect to every forward input.
///
/// Gate gradients are taken with respect to the raw pre-activation values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackwardResult<L> {
    pub input: L,
    pub input_gate: L,
    pub forget_gate: L,
    pub output_gate: L,
    pub prev_state: L,
    pub peephole_input_gate: L,
    pub peephole_forget_gate: L,
    pub peephole_output_gate: L,
}

impl<L: Lane> BackwardResult<L> {
    pub fn peephole(&self) -> Peephole<L> {
        Peephole::new(self.peephole_input_gate, self.peephole_forget_gate, self.peephole_output_gate)
    }
}
