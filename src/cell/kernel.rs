use crate::activation::CellActivations;
use crate::cell::{backward, forward, BackwardResult, ForwardResult, GatePreActivation, Peephole};
use crate::config::KernelConfig;
use crate::lane::Lane;

/// Peephole LSTM cell kernel: peephole weights plus activation selectors.
///
/// Holding both in one value guarantees the forward and backward steps of a
/// timestep see the same weights and the same nonlinearities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LstmCellKernel<L> {
    pub peephole: Peephole<L>,
    pub activations: CellActivations,
}

impl<L: Lane> LstmCellKernel<L> {
    pub fn new(peephole: Peephole<L>, activations: CellActivations) -> Self {
        LstmCellKernel { peephole, activations }
    }

    /// Kernel with all peephole weights at zero.
    pub fn without_peephole(activations: CellActivations) -> Self {
        LstmCellKernel::new(Peephole::zero(), activations)
    }

    /// Build from a config. `peephole` is ignored when the config disables peepholes.
    pub fn from_config(config: &KernelConfig, peephole: Peephole<L>) -> Self {
        if config.use_peephole {
            LstmCellKernel::new(peephole, config.activations)
        } else {
            LstmCellKernel::without_peephole(config.activations)
        }
    }

    pub fn with_activations(mut self, activations: CellActivations) -> Self {
        self.activations = activations;
        self
    }

    pub fn forward(&self, gates: GatePreActivation<L>, prev_state: L) -> ForwardResult<L> {
        forward(gates, prev_state, &self.peephole, self.activations)
    }

    /// See [`backward`] for the meaning of `state_grad`.
    pub fn backward(
        &self,
        fwd: &ForwardResult<L>,
        prev_state: L,
        output_grad: L,
        state_grad: &mut L,
    ) -> BackwardResult<L> {
        backward(fwd, prev_state, &self.peephole, output_grad, state_grad, self.activations)
    }
}

impl<L: Lane> Default for LstmCellKernel<L> {
    fn default() -> Self {
        LstmCellKernel::without_peephole(CellActivations::default())
    }
}
