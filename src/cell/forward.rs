use crate::activation::CellActivations;
use crate::cell::{ForwardResult, GatePreActivation, Peephole};
use crate::lane::Lane;

/// Forward cell step for one lane.
///
/// Operations run in a fixed order so scalar and wide lanes round identically.
/// Non-finite inputs propagate; nothing is clamped.
#[inline]
pub fn forward<L: Lane>(
    gates: GatePreActivation<L>,
    prev_state: L,
    peephole: &Peephole<L>,
    acts: CellActivations,
) -> ForwardResult<L> {
    let input = gates.input.activate(acts.node);
    let input_gate = (gates.input_gate + prev_state * peephole.input_gate).activate(acts.gate);
    let forget_gate = (gates.forget_gate + prev_state * peephole.forget_gate).activate(acts.gate);

    let state = input * input_gate + prev_state * forget_gate;

    let output_gate = (gates.output_gate + state * peephole.output_gate).activate(acts.gate);
    let state_activated = state.activate(acts.state);
    let output = output_gate * state_activated;

    ForwardResult {
        input,
        input_gate,
        forget_gate,
        output_gate,
        state,
        state_activated,
        output,
    }
}
