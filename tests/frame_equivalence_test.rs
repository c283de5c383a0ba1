use lstm_cell_kernel::{
    backward, backward_frame, forward, forward_frame, Activation, CellActivations, Element, GateFrame, PeepholeFrame,
};
use ndarray::Array1;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

const REL_TOL: f32 = 1e-6;

fn assert_rel_eq(a: f32, b: f32, what: &str) {
    let denom = a.abs().max(b.abs()).max(1.0);
    assert!((a - b).abs() / denom <= REL_TOL, "{}: {} vs {}", what, a, b);
}

fn random_frame(n: usize, rng: &mut StdRng) -> (GateFrame<f32>, Array1<f32>, PeepholeFrame<f32>) {
    let dist = Uniform::new(-2.0f32, 2.0);
    let small = Uniform::new(-0.5f32, 0.5);
    let gates = GateFrame::new(
        Array1::random_using(n, dist, rng),
        Array1::random_using(n, dist, rng),
        Array1::random_using(n, dist, rng),
        Array1::random_using(n, dist, rng),
    );
    let prev = Array1::random_using(n, dist, rng);
    let peephole = PeepholeFrame::new(
        Array1::random_using(n, small, rng),
        Array1::random_using(n, small, rng),
        Array1::random_using(n, small, rng),
    );
    (gates, prev, peephole)
}

fn check_frame(n: usize, acts: CellActivations, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (gates, prev, peephole) = random_frame(n, &mut rng);
    let output_grad = Array1::random_using(n, Uniform::new(-1.0f32, 1.0), &mut rng);
    let seed_grad = Array1::random_using(n, Uniform::new(-0.1f32, 0.1), &mut rng);

    let fwd = forward_frame(&gates, &prev, &peephole, acts).unwrap();
    let mut state_grad = seed_grad.clone();
    let grads = backward_frame(&fwd, &prev, &peephole, &output_grad, &mut state_grad, acts).unwrap();

    for i in 0..n {
        let scalar = forward(gates.lane(i), prev[i], &peephole.lane(i), acts);
        let wide = fwd.lane(i);
        assert_rel_eq(wide.state, scalar.state, "state");
        assert_rel_eq(wide.state_activated, scalar.state_activated, "state_activated");
        assert_rel_eq(wide.output, scalar.output, "output");
        assert_rel_eq(wide.output_gate, scalar.output_gate, "output_gate");

        let mut ds = seed_grad[i];
        let g = backward(&scalar, prev[i], &peephole.lane(i), output_grad[i], &mut ds, acts);
        let gw = grads.lane(i);
        assert_rel_eq(state_grad[i], ds, "state_grad");
        assert_rel_eq(gw.input, g.input, "grad input");
        assert_rel_eq(gw.input_gate, g.input_gate, "grad input_gate");
        assert_rel_eq(gw.forget_gate, g.forget_gate, "grad forget_gate");
        assert_rel_eq(gw.output_gate, g.output_gate, "grad output_gate");
        assert_rel_eq(gw.prev_state, g.prev_state, "grad prev_state");
        assert_rel_eq(gw.peephole_input_gate, g.peephole_input_gate, "grad w_ci");
        assert_rel_eq(gw.peephole_forget_gate, g.peephole_forget_gate, "grad w_cf");
        assert_rel_eq(gw.peephole_output_gate, g.peephole_output_gate, "grad w_co");
    }
}

#[test]
fn test_frame_matches_scalar_for_every_selector() {
    let mut seed = 0;
    for node in Activation::ALL {
        for gate in Activation::ALL {
            for state in Activation::ALL {
                check_frame(37, CellActivations::new(node, gate, state), seed);
                seed += 1;
            }
        }
    }
}

#[test]
fn test_frame_sizes_around_lane_width() {
    for n in [0, 1, 7, 8, 9, 15, 16, 17, 64] {
        check_frame(n, CellActivations::default(), 100 + n as u64);
    }
}

#[test]
fn test_wide_lane_flag() {
    assert!(!f64::HAS_WIDE_LANE);
    assert_eq!(f32::HAS_WIDE_LANE, cfg!(all(target_arch = "x86_64", target_feature = "avx")));
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
mod wide {
    use super::*;
    use lstm_cell_kernel::{F32x8, GatePreActivation, Peephole};

    fn load(v: &Array1<f32>, at: usize) -> F32x8 {
        F32x8::from_slice(&v.as_slice().unwrap()[at..])
    }

    #[test]
    fn test_f32x8_step_matches_eight_scalar_steps() {
        let mut rng = StdRng::seed_from_u64(42);
        let (gates, prev, peephole) = random_frame(8, &mut rng);
        let acts = CellActivations::default();

        let wide_gates = GatePreActivation::new(
            load(&gates.input, 0),
            load(&gates.input_gate, 0),
            load(&gates.forget_gate, 0),
            load(&gates.output_gate, 0),
        );
        let wide_peephole = Peephole::new(
            load(&peephole.input_gate, 0),
            load(&peephole.forget_gate, 0),
            load(&peephole.output_gate, 0),
        );
        let fwd = forward(wide_gates, load(&prev, 0), &wide_peephole, acts);

        let mut ds = F32x8::splat(0.0);
        let g = backward(&fwd, load(&prev, 0), &wide_peephole, F32x8::splat(1.0), &mut ds, acts);

        let output = fwd.output.to_array();
        let prev_grad = g.prev_state.to_array();
        let ds = ds.to_array();
        for i in 0..8 {
            let scalar = forward(gates.lane(i), prev[i], &peephole.lane(i), acts);
            assert_rel_eq(output[i], scalar.output, "output");

            let mut scalar_ds = 0.0f32;
            let sg = backward(&scalar, prev[i], &peephole.lane(i), 1.0, &mut scalar_ds, acts);
            assert_rel_eq(prev_grad[i], sg.prev_state, "prev_state grad");
            assert_rel_eq(ds[i], scalar_ds, "state grad");
        }
    }
}
