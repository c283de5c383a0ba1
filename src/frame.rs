//! One timestep of the cell applied across many independent feature lanes.
//!
//! Each lane is an independent cell step; the frame functions only validate
//! buffer lengths and walk the lanes, using the widest lane the element type
//! has in this build and finishing the remainder with the scalar step.

use ndarray::Array1;

use crate::activation::CellActivations;
use crate::cell::{backward, forward, BackwardResult, ForwardResult, GatePreActivation, Peephole};
use crate::error::KernelError;
use crate::lane::{Element, Lane, Packed};

/// Gate pre-activations for every lane of one timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct GateFrame<T> {
    pub input: Array1<T>,
    pub input_gate: Array1<T>,
    pub forget_gate: Array1<T>,
    pub output_gate: Array1<T>,
}

impl<T: Element> GateFrame<T> {
    pub fn new(input: Array1<T>, input_gate: Array1<T>, forget_gate: Array1<T>, output_gate: Array1<T>) -> Self {
        GateFrame { input, input_gate, forget_gate, output_gate }
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn lane(&self, i: usize) -> GatePreActivation<T> {
        GatePreActivation::new(self.input[i], self.input_gate[i], self.forget_gate[i], self.output_gate[i])
    }
}

/// Per-lane peephole weights.
#[derive(Debug, Clone, PartialEq)]
pub struct PeepholeFrame<T> {
    pub input_gate: Array1<T>,
    pub forget_gate: Array1<T>,
    pub output_gate: Array1<T>,
}

impl<T: Element> PeepholeFrame<T> {
    pub fn new(input_gate: Array1<T>, forget_gate: Array1<T>, output_gate: Array1<T>) -> Self {
        PeepholeFrame { input_gate, forget_gate, output_gate }
    }

    /// Peepholes disabled on `n` lanes.
    pub fn zeros(n: usize) -> Self {
        PeepholeFrame::broadcast(Peephole::zero(), n)
    }

    /// The same weights on every lane.
    pub fn broadcast(peephole: Peephole<T>, n: usize) -> Self {
        PeepholeFrame::new(
            Array1::from_elem(n, peephole.input_gate),
            Array1::from_elem(n, peephole.forget_gate),
            Array1::from_elem(n, peephole.output_gate),
        )
    }

    pub fn lane(&self, i: usize) -> Peephole<T> {
        Peephole::new(self.input_gate[i], self.forget_gate[i], self.output_gate[i])
    }
}

/// Forward results for every lane; see [`ForwardResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardFrame<T> {
    pub input: Array1<T>,
    pub input_gate: Array1<T>,
    pub forget_gate: Array1<T>,
    pub output_gate: Array1<T>,
    pub state: Array1<T>,
    pub state_activated: Array1<T>,
    pub output: Array1<T>,
}

impl<T: Element> ForwardFrame<T> {
    fn zeros(n: usize) -> Self {
        let z = || Array1::from_elem(n, T::zero());
        ForwardFrame {
            input: z(),
            input_gate: z(),
            forget_gate: z(),
            output_gate: z(),
            state: z(),
            state_activated: z(),
            output: z(),
        }
    }

    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn lane(&self, i: usize) -> ForwardResult<T> {
        ForwardResult {
            input: self.input[i],
            input_gate: self.input_gate[i],
            forget_gate: self.forget_gate[i],
            output_gate: self.output_gate[i],
            state: self.state[i],
            state_activated: self.state_activated[i],
            output: self.output[i],
        }
    }
}

/// Backward results for every lane; see [`BackwardResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackwardFrame<T> {
    pub input: Array1<T>,
    pub input_gate: Array1<T>,
    pub forget_gate: Array1<T>,
    pub output_gate: Array1<T>,
    pub prev_state: Array1<T>,
    pub peephole_input_gate: Array1<T>,
    pub peephole_forget_gate: Array1<T>,
    pub peephole_output_gate: Array1<T>,
}

impl<T: Element> BackwardFrame<T> {
    fn zeros(n: usize) -> Self {
        let z = || Array1::from_elem(n, T::zero());
        BackwardFrame {
            input: z(),
            input_gate: z(),
            forget_gate: z(),
            output_gate: z(),
            prev_state: z(),
            peephole_input_gate: z(),
            peephole_forget_gate: z(),
            peephole_output_gate: z(),
        }
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn lane(&self, i: usize) -> BackwardResult<T> {
        BackwardResult {
            input: self.input[i],
            input_gate: self.input_gate[i],
            forget_gate: self.forget_gate[i],
            output_gate: self.output_gate[i],
            prev_state: self.prev_state[i],
            peephole_input_gate: self.peephole_input_gate[i],
            peephole_forget_gate: self.peephole_forget_gate[i],
            peephole_output_gate: self.peephole_output_gate[i],
        }
    }
}

fn lanes<'a, T>(field: &'static str, arr: &'a Array1<T>, expected: usize) -> Result<&'a [T], KernelError> {
    if arr.len() != expected {
        log::warn!("frame field {} has {} lanes, expected {}", field, arr.len(), expected);
        return Err(KernelError::LaneMismatch { field, expected, got: arr.len() });
    }
    arr.as_slice().ok_or(KernelError::NonContiguous(field))
}

fn lanes_mut<'a, T>(field: &'static str, arr: &'a mut Array1<T>, expected: usize) -> Result<&'a mut [T], KernelError> {
    if arr.len() != expected {
        log::warn!("frame field {} has {} lanes, expected {}", field, arr.len(), expected);
        return Err(KernelError::LaneMismatch { field, expected, got: arr.len() });
    }
    arr.as_slice_mut().ok_or(KernelError::NonContiguous(field))
}

struct ForwardSources<'a, T> {
    input: &'a [T],
    input_gate: &'a [T],
    forget_gate: &'a [T],
    output_gate: &'a [T],
    prev_state: &'a [T],
    w_ci: &'a [T],
    w_cf: &'a [T],
    w_co: &'a [T],
}

struct ForwardSinks<'a, T> {
    input: &'a mut [T],
    input_gate: &'a mut [T],
    forget_gate: &'a mut [T],
    output_gate: &'a mut [T],
    state: &'a mut [T],
    state_activated: &'a mut [T],
    output: &'a mut [T],
}

/// Run lanes `from..` in chunks of `L::WIDTH`; returns where the first
/// incomplete chunk starts.
fn forward_span<T, L: Packed<T>>(
    src: &ForwardSources<'_, T>,
    dst: &mut ForwardSinks<'_, T>,
    from: usize,
    acts: CellActivations,
) -> usize {
    let n = src.input.len();
    let mut at = from;
    while at + L::WIDTH <= n {
        let gates = GatePreActivation::new(
            L::load(src.input, at),
            L::load(src.input_gate, at),
            L::load(src.forget_gate, at),
            L::load(src.output_gate, at),
        );
        let peephole = Peephole::new(L::load(src.w_ci, at), L::load(src.w_cf, at), L::load(src.w_co, at));

        let fwd = forward(gates, L::load(src.prev_state, at), &peephole, acts);

        fwd.input.store(dst.input, at);
        fwd.input_gate.store(dst.input_gate, at);
        fwd.forget_gate.store(dst.forget_gate, at);
        fwd.output_gate.store(dst.output_gate, at);
        fwd.state.store(dst.state, at);
        fwd.state_activated.store(dst.state_activated, at);
        fwd.output.store(dst.output, at);
        at += L::WIDTH;
    }
    at
}

/// Forward step on every lane of `gates`.
///
/// All arrays must have the same length and be contiguous.
pub fn forward_frame<T: Element>(
    gates: &GateFrame<T>,
    prev_state: &Array1<T>,
    peephole: &PeepholeFrame<T>,
    acts: CellActivations,
) -> Result<ForwardFrame<T>, KernelError> {
    let n = gates.len();
    let src = ForwardSources {
        input: lanes("input", &gates.input, n)?,
        input_gate: lanes("input_gate", &gates.input_gate, n)?,
        forget_gate: lanes("forget_gate", &gates.forget_gate, n)?,
        output_gate: lanes("output_gate", &gates.output_gate, n)?,
        prev_state: lanes("prev_state", prev_state, n)?,
        w_ci: lanes("peephole.input_gate", &peephole.input_gate, n)?,
        w_cf: lanes("peephole.forget_gate", &peephole.forget_gate, n)?,
        w_co: lanes("peephole.output_gate", &peephole.output_gate, n)?,
    };

    let mut out = ForwardFrame::zeros(n);
    let mut dst = ForwardSinks {
        input: lanes_mut("input", &mut out.input, n)?,
        input_gate: lanes_mut("input_gate", &mut out.input_gate, n)?,
        forget_gate: lanes_mut("forget_gate", &mut out.forget_gate, n)?,
        output_gate: lanes_mut("output_gate", &mut out.output_gate, n)?,
        state: lanes_mut("state", &mut out.state, n)?,
        state_activated: lanes_mut("state_activated", &mut out.state_activated, n)?,
        output: lanes_mut("output", &mut out.output, n)?,
    };

    log::trace!("forward frame: {} lanes, wide={}", n, T::HAS_WIDE_LANE);
    let tail = forward_span::<T, T::Wide>(&src, &mut dst, 0, acts);
    forward_span::<T, T>(&src, &mut dst, tail, acts);

    Ok(out)
}

struct BackwardSources<'a, T> {
    input: &'a [T],
    input_gate: &'a [T],
    forget_gate: &'a [T],
    output_gate: &'a [T],
    state: &'a [T],
    state_activated: &'a [T],
    output: &'a [T],
    prev_state: &'a [T],
    w_ci: &'a [T],
    w_cf: &'a [T],
    w_co: &'a [T],
    output_grad: &'a [T],
}

struct BackwardSinks<'a, T> {
    state_grad: &'a mut [T],
    input: &'a mut [T],
    input_gate: &'a mut [T],
    forget_gate: &'a mut [T],
    output_gate: &'a mut [T],
    prev_state: &'a mut [T],
    peephole_input_gate: &'a mut [T],
    peephole_forget_gate: &'a mut [T],
    peephole_output_gate: &'a mut [T],
}

fn backward_span<T, L: Packed<T>>(
    src: &BackwardSources<'_, T>,
    dst: &mut BackwardSinks<'_, T>,
    from: usize,
    acts: CellActivations,
) -> usize {
    let n = src.input.len();
    let mut at = from;
    while at + L::WIDTH <= n {
        let fwd = ForwardResult {
            input: L::load(src.input, at),
            input_gate: L::load(src.input_gate, at),
            forget_gate: L::load(src.forget_gate, at),
            output_gate: L::load(src.output_gate, at),
            state: L::load(src.state, at),
            state_activated: L::load(src.state_activated, at),
            output: L::load(src.output, at),
        };
        let peephole = Peephole::new(L::load(src.w_ci, at), L::load(src.w_cf, at), L::load(src.w_co, at));
        let mut state_grad = L::load(dst.state_grad, at);

        let grad = backward(
            &fwd,
            L::load(src.prev_state, at),
            &peephole,
            L::load(src.output_grad, at),
            &mut state_grad,
            acts,
        );

        state_grad.store(dst.state_grad, at);
        grad.input.store(dst.input, at);
        grad.input_gate.store(dst.input_gate, at);
        grad.forget_gate.store(dst.forget_gate, at);
        grad.output_gate.store(dst.output_gate, at);
        grad.prev_state.store(dst.prev_state, at);
        grad.peephole_input_gate.store(dst.peephole_input_gate, at);
        grad.peephole_forget_gate.store(dst.peephole_forget_gate, at);
        grad.peephole_output_gate.store(dst.peephole_output_gate, at);
        at += L::WIDTH;
    }
    at
}

/// Backward step on every lane of `fwd`.
///
/// `state_grad` is the per-lane accumulator described on
/// [`backward`](crate::cell::backward()): read on entry, incremented on return.
pub fn backward_frame<T: Element>(
    fwd: &ForwardFrame<T>,
    prev_state: &Array1<T>,
    peephole: &PeepholeFrame<T>,
    output_grad: &Array1<T>,
    state_grad: &mut Array1<T>,
    acts: CellActivations,
) -> Result<BackwardFrame<T>, KernelError> {
    let n = fwd.len();
    let src = BackwardSources {
        input: lanes("input", &fwd.input, n)?,
        input_gate: lanes("input_gate", &fwd.input_gate, n)?,
        forget_gate: lanes("forget_gate", &fwd.forget_gate, n)?,
        output_gate: lanes("output_gate", &fwd.output_gate, n)?,
        state: lanes("state", &fwd.state, n)?,
        state_activated: lanes("state_activated", &fwd.state_activated, n)?,
        output: lanes("output", &fwd.output, n)?,
        prev_state: lanes("prev_state", prev_state, n)?,
        w_ci: lanes("peephole.input_gate", &peephole.input_gate, n)?,
        w_cf: lanes("peephole.forget_gate", &peephole.forget_gate, n)?,
        w_co: lanes("peephole.output_gate", &peephole.output_gate, n)?,
        output_grad: lanes("output_grad", output_grad, n)?,
    };

    let mut out = BackwardFrame::zeros(n);
    let mut dst = BackwardSinks {
        state_grad: lanes_mut("state_grad", state_grad, n)?,
        input: lanes_mut("input", &mut out.input, n)?,
        input_gate: lanes_mut("input_gate", &mut out.input_gate, n)?,
        forget_gate: lanes_mut("forget_gate", &mut out.forget_gate, n)?,
        output_gate: lanes_mut("output_gate", &mut out.output_gate, n)?,
        prev_state: lanes_mut("prev_state", &mut out.prev_state, n)?,
        peephole_input_gate: lanes_mut("peephole_input_gate", &mut out.peephole_input_gate, n)?,
        peephole_forget_gate: lanes_mut("peephole_forget_gate", &mut out.peephole_forget_gate, n)?,
        peephole_output_gate: lanes_mut("peephole_output_gate", &mut out.peephole_output_gate, n)?,
    };

    log::trace!("backward frame: {} lanes, wide={}", n, T::HAS_WIDE_LANE);
    let tail = backward_span::<T, T::Wide>(&src, &mut dst, 0, acts);
    backward_span::<T, T>(&src, &mut dst, tail, acts);

    Ok(out)
}
