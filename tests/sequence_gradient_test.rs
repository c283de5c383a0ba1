use lstm_cell_kernel::{
    Activation, BackwardResult, CellActivations, ForwardResult, GatePreActivation, LstmCellKernel, Peephole,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const EPS: f64 = 1e-6;
const TOL: f64 = 1e-6;
const STEPS: usize = 5;

#[derive(Clone)]
struct Unrolled {
    gates: Vec<GatePreActivation<f64>>,
    loss_weights: Vec<f64>,
    initial_state: f64,
}

impl Unrolled {
    fn random(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(0.0, 0.5).unwrap();
        let mut draw = || dist.sample(&mut rng);

        let gates = (0..STEPS)
            .map(|_| GatePreActivation::new(draw(), draw(), draw(), draw()))
            .collect();
        let loss_weights = (0..STEPS).map(|_| draw()).collect();
        let initial_state = draw();
        Unrolled { gates, loss_weights, initial_state }
    }

    /// Run every step forward, returning the per-step results and their previous states.
    fn forward(&self, kernel: &LstmCellKernel<f64>) -> (Vec<ForwardResult<f64>>, Vec<f64>) {
        let mut prev = self.initial_state;
        let mut results = Vec::with_capacity(STEPS);
        let mut prevs = Vec::with_capacity(STEPS);
        for gates in &self.gates {
            let fwd = kernel.forward(*gates, prev);
            prevs.push(prev);
            prev = fwd.state;
            results.push(fwd);
        }
        (results, prevs)
    }

    fn loss(&self, kernel: &LstmCellKernel<f64>) -> f64 {
        let (results, _) = self.forward(kernel);
        results.iter().zip(&self.loss_weights).map(|(r, w)| w * r.output).sum()
    }

    /// Walk the steps in reverse, carrying the previous-state gradient into
    /// the accumulator of the earlier step.
    fn backward(&self, kernel: &LstmCellKernel<f64>) -> (Vec<BackwardResult<f64>>, f64, Peephole<f64>) {
        let (results, prevs) = self.forward(kernel);
        let mut carry = 0.0;
        let mut peephole_grad = Peephole::zero();
        let mut grads = vec![None; STEPS];

        for t in (0..STEPS).rev() {
            let mut state_grad = carry;
            let g = kernel.backward(&results[t], prevs[t], self.loss_weights[t], &mut state_grad);
            carry = g.prev_state;
            peephole_grad = Peephole::new(
                peephole_grad.input_gate + g.peephole_input_gate,
                peephole_grad.forget_gate + g.peephole_forget_gate,
                peephole_grad.output_gate + g.peephole_output_gate,
            );
            grads[t] = Some(g);
        }

        (grads.into_iter().flatten().collect(), carry, peephole_grad)
    }
}

fn assert_close(analytic: f64, numeric: f64, what: &str) {
    assert!(
        (analytic - numeric).abs() < TOL,
        "{}: analytic={}, numeric={}",
        what, analytic, numeric
    );
}

fn central_difference(f: impl Fn(f64) -> f64, x: f64) -> f64 {
    (f(x + EPS) - f(x - EPS)) / (2.0 * EPS)
}

fn check_sequence(acts: CellActivations, seed: u64) {
    let kernel = LstmCellKernel::new(Peephole::new(0.3f64, -0.2, 0.4), acts);
    let seq = Unrolled::random(seed);
    let (grads, initial_state_grad, peephole_grad) = seq.backward(&kernel);
    assert_eq!(grads.len(), STEPS);

    for t in 0..STEPS {
        for gate in 0..4 {
            let numeric = central_difference(
                |x| {
                    let mut probe = seq.clone();
                    let g = &mut probe.gates[t];
                    match gate {
                        0 => g.input = x,
                        1 => g.input_gate = x,
                        2 => g.forget_gate = x,
                        _ => g.output_gate = x,
                    }
                    probe.loss(&kernel)
                },
                match gate {
                    0 => seq.gates[t].input,
                    1 => seq.gates[t].input_gate,
                    2 => seq.gates[t].forget_gate,
                    _ => seq.gates[t].output_gate,
                },
            );
            let analytic = match gate {
                0 => grads[t].input,
                1 => grads[t].input_gate,
                2 => grads[t].forget_gate,
                _ => grads[t].output_gate,
            };
            assert_close(analytic, numeric, &format!("{:?} step {} gate {}", acts, t, gate));
        }
    }

    let numeric = central_difference(
        |x| Unrolled { initial_state: x, ..seq.clone() }.loss(&kernel),
        seq.initial_state,
    );
    assert_close(initial_state_grad, numeric, "initial state");

    let peephole_loss = |p: Peephole<f64>| seq.loss(&LstmCellKernel::new(p, acts));
    let w = kernel.peephole;
    assert_close(
        peephole_grad.input_gate,
        central_difference(|x| peephole_loss(Peephole::new(x, w.forget_gate, w.output_gate)), w.input_gate),
        "peephole input gate",
    );
    assert_close(
        peephole_grad.forget_gate,
        central_difference(|x| peephole_loss(Peephole::new(w.input_gate, x, w.output_gate)), w.forget_gate),
        "peephole forget gate",
    );
    assert_close(
        peephole_grad.output_gate,
        central_difference(|x| peephole_loss(Peephole::new(w.input_gate, w.forget_gate, x)), w.output_gate),
        "peephole output gate",
    );
}

#[test]
fn test_unrolled_gradients_standard_lstm() {
    for seed in 0..4 {
        check_sequence(CellActivations::default(), seed);
    }
}

#[test]
fn test_unrolled_gradients_identity() {
    check_sequence(CellActivations::identity(), 11);
}

#[test]
fn test_unrolled_gradients_mixed_smooth_selectors() {
    let acts = CellActivations::new(Activation::Sigmoid, Activation::Tanh, Activation::Identity);
    check_sequence(acts, 23);
}

#[test]
fn test_zero_peephole_still_reports_peephole_gradients() {
    let acts = CellActivations::default();
    let seq = Unrolled::random(5);
    let without = LstmCellKernel::without_peephole(acts);
    let (grads, _, peephole_grad) = seq.backward(&without);

    assert!(peephole_grad.input_gate != 0.0);
    for g in &grads {
        assert!(g.input.is_finite() && g.prev_state.is_finite());
    }
    let (grads_again, _, _) = seq.backward(&without);
    assert_eq!(grads, grads_again);
}
