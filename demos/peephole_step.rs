use lstm_cell_kernel::{
    backward_frame, forward_frame, CellActivations, Element, GateFrame, GatePreActivation, LstmCellKernel, Peephole,
    PeepholeFrame,
};
use ndarray::arr1;

fn main() {
    // Single lane, standard activations with peepholes
    let kernel = LstmCellKernel::new(Peephole::new(0.1f64, 0.2, 0.3), CellActivations::default());
    let gates = GatePreActivation::new(0.5, -0.2, 0.8, 0.1);
    let prev_state = 0.25;

    let fwd = kernel.forward(gates, prev_state);
    println!("state = {:.6}, output = {:.6}", fwd.state, fwd.output);

    let mut state_grad = 0.0;
    let grads = kernel.backward(&fwd, prev_state, 1.0, &mut state_grad);
    println!("d output / d prev_state = {:.6}", grads.prev_state);
    println!("peephole grads = {:?}", grads.peephole());

    // Ten feature lanes in one timestep
    let gates = GateFrame::new(
        arr1(&[0.5f32, -0.3, 0.8, 0.0, 1.2, -1.1, 0.4, 0.9, -0.6, 0.2]),
        arr1(&[0.1f32, 0.2, -0.4, 0.7, -0.2, 0.3, 0.0, -0.8, 0.5, 0.6]),
        arr1(&[1.0f32, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1]),
        arr1(&[-0.5f32, 0.5, -0.5, 0.5, -0.5, 0.5, -0.5, 0.5, -0.5, 0.5]),
    );
    let prev = arr1(&[0.0f32; 10]);
    let peephole = PeepholeFrame::zeros(10);
    let acts = CellActivations::default();

    let frame = match forward_frame(&gates, &prev, &peephole, acts) {
        Ok(frame) => frame,
        Err(e) => {
            eprintln!("forward frame failed: {}", e);
            return;
        }
    };
    println!("wide lane available: {}", f32::HAS_WIDE_LANE);
    println!("frame output = {}", frame.output);

    let output_grad = arr1(&[1.0f32; 10]);
    let mut state_grad = arr1(&[0.0f32; 10]);
    match backward_frame(&frame, &prev, &peephole, &output_grad, &mut state_grad, acts) {
        Ok(grads) => println!("frame input grads = {}", grads.input),
        Err(e) => eprintln!("backward frame failed: {}", e),
    }
}
