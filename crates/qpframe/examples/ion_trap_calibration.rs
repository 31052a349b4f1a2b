// Copyright 2024 The qpframe Developers
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License.You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

//! Runs a small repetition-code round through [`GeneralDepolarizingModel::ion_trap_calibration`],
//! a representative calibration table for a trapped-ion device, and reports
//! the logical error rate estimated over a batch of shots.
//!
//! Not part of the simulator's public contract: build a model from your own
//! device's numbers via `GeneralDepolarizingModel::new` for anything beyond
//! this illustration.

use qpframe::prelude::*;

const DISTANCE: usize = 5;
const SHOTS: usize = 10_000;

fn repetition_round() -> NodeHandle {
    let root = CircuitNode::new("ion-trap-round");
    let mut circuit = Circuit::new();
    for q in 0..DISTANCE - 1 {
        circuit.append(Instruction::new(Opcode::Cx, vec![q, DISTANCE + q]));
    }
    for q in 0..DISTANCE - 1 {
        circuit.append(Instruction::measurement(Opcode::Mz, DISTANCE + q, MeasurementTag::new(0, "syndrome")));
        circuit.append(Instruction::new(Opcode::Rz, vec![DISTANCE + q]));
    }
    circuit.append_opcode(Opcode::Tick);
    root.borrow_mut().circuit = circuit;
    root
}

fn main() {
    env_logger::init();

    // alpha = 1.0: today's hardware profile. alpha = 0.0 interpolates
    // toward the optimistic "projected future" numbers baked into the table.
    let model = GeneralDepolarizingModel::ion_trap_calibration(1.0, 50e-3);

    let root = repetition_round();
    apply_noise_to_nodes(&root, &model).expect("calibration table produces a well-formed circuit");

    let mut sim = SparseFrame::new(SHOTS, false).expect("valid shot count");
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    scheduler::run_sparse(&mut sim, &root, &mut rng).expect("no programming errors in the noisy circuit");

    let tag = MeasurementTag::new(0, "syndrome");
    let flips: usize = (0..DISTANCE - 1).map(|q| sim.count_flipped_measurements(DISTANCE + q, &tag)).sum();
    let total = sim.num_shots() * (DISTANCE - 1);
    println!(
        "ion-trap calibration, distance {DISTANCE}, {SHOTS} shots: {flips}/{total} syndrome measurements flipped ({:.3}%)",
        100.0 * flips as f64 / total as f64
    );
}
