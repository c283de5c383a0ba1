use crate::activation::CellActivations;
use crate::cell::{BackwardResult, ForwardResult, Peephole};
use crate::lane::Lane;

/// Backward cell step for one lane.
///
/// `fwd` must be the result of the forward step for the same timestep, run
/// with the same `prev_state`, `peephole` and `acts`.
///
/// `state_grad` is an accumulator: on entry it holds any gradient already
/// reaching the cell state from other consumers (zero if none), on return it
/// additionally holds the contribution flowing back from `output`.
#[inline]
pub fn backward<L: Lane>(
    fwd: &ForwardResult<L>,
    prev_state: L,
    peephole: &Peephole<L>,
    output_grad: L,
    state_grad: &mut L,
    acts: CellActivations,
) -> BackwardResult<L> {
    let output_gate = (output_grad * fwd.state_activated).activate_grad(fwd.output_gate, acts.gate);
    *state_grad = *state_grad
        + ((output_grad * fwd.output_gate).activate_grad(fwd.state_activated, acts.state)
            + output_gate * peephole.output_gate);

    let ds = *state_grad;
    let input = (ds * fwd.input_gate).activate_grad(fwd.input, acts.node);
    let input_gate = (ds * fwd.input).activate_grad(fwd.input_gate, acts.gate);
    let forget_gate = (ds * prev_state).activate_grad(fwd.forget_gate, acts.gate);

    let prev_state_grad = input_gate * peephole.input_gate
        + forget_gate * peephole.forget_gate
        + ds * fwd.forget_gate;

    BackwardResult {
        input,
        input_gate,
        forget_gate,
        output_gate,
        prev_state: prev_state_grad,
        peephole_input_gate: input_gate * prev_state,
        peephole_forget_gate: forget_gate * prev_state,
        peephole_output_gate: output_gate * fwd.state,
    }
}
