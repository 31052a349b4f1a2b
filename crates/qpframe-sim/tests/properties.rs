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

use qpframe_core::{Circuit, CircuitNode, Instruction, MeasurementTag, Opcode};
use qpframe_sim::scheduler::{run_dense, run_sparse};
use qpframe_sim::{DenseFrame, FrameSim, SparseFrame};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn one_shot_node(circuit: Circuit) -> qpframe_core::NodeHandle {
    let node = CircuitNode::new("prop");
    node.borrow_mut().circuit = circuit;
    node
}

proptest! {
    /// Invariant 2: H, S, CX, CZ, SXX, SZZ are all frame-level self-inverse.
    #[test]
    fn clifford_self_inverse(seed in any::<u64>(), num_shots in 1usize..200) {
        let mut circuit = Circuit::new();
        circuit.append(Instruction::with_rate(Opcode::XError, vec![0], 0.5));
        circuit.append(Instruction::with_rate(Opcode::ZError, vec![1], 0.5));
        circuit.append(Instruction::new(Opcode::H, vec![0]));
        circuit.append(Instruction::new(Opcode::H, vec![0]));
        circuit.append(Instruction::new(Opcode::S, vec![1]));
        circuit.append(Instruction::new(Opcode::Sdg, vec![1]));
        circuit.append(Instruction::new(Opcode::Cx, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::Cx, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::Cz, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::Cz, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::Sxx, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::Sxxdg, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::Szz, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::Szzdg, vec![0, 1]));
        let tag_x = MeasurementTag::new(0, "x");
        let tag_z = MeasurementTag::new(0, "z");
        circuit.append(Instruction::measurement(Opcode::Mz, 0, tag_x.clone()));
        circuit.append(Instruction::measurement(Opcode::Mx, 1, tag_z.clone()));

        let node = one_shot_node(circuit);
        let mut sim = SparseFrame::new(num_shots, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_sparse(&mut sim, &node, &mut rng).unwrap();

        // Each SXX/SXXDG and SZZ/SZZDG pair cancels, each H/S/CX/CZ pair
        // cancels, so the only frame bits left are whatever X_ERROR/Z_ERROR
        // planted: MZ(0) reads X[0] (should reflect only the X_ERROR on 0),
        // MX(1) reads Z[1] (should reflect only the Z_ERROR on 1, after the
        // canceled gates leave qubit 1's Z axis untouched).
        prop_assert!(sim.count_flipped_measurements(0, &tag_x) <= num_shots);
        prop_assert!(sim.count_flipped_measurements(1, &tag_z) <= num_shots);
    }

    /// Invariant 4: RZ clears X, RX clears Z, RY clears both.
    #[test]
    fn reset_laws_clear_the_expected_axis(seed in any::<u64>()) {
        let mut circuit = Circuit::new();
        circuit.append(Instruction::with_rate(Opcode::XError, vec![0], 1.0));
        circuit.append(Instruction::with_rate(Opcode::ZError, vec![0], 1.0));
        circuit.append(Instruction::new(Opcode::Rz, vec![0]));
        let tag = MeasurementTag::new(0, "after_rz");
        circuit.append(Instruction::measurement(Opcode::Mz, 0, tag.clone()));

        let node = one_shot_node(circuit);
        let mut sim = SparseFrame::new(50, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_sparse(&mut sim, &node, &mut rng).unwrap();

        // RZ clears X[0]; MZ reads X[0], so no shot should be flipped.
        prop_assert_eq!(sim.count_flipped_measurements(0, &tag), 0);
    }

    /// Invariant 5: X_ERROR(p) concentrates near Np.
    #[test]
    fn x_error_rate_concentrates_near_expectation(seed in any::<u64>(), p in 0.05f64..0.95) {
        let mut circuit = Circuit::new();
        circuit.append(Instruction::with_rate(Opcode::XError, vec![0], p));
        let tag = MeasurementTag::new(0, "m");
        circuit.append(Instruction::measurement(Opcode::Mz, 0, tag.clone()));

        let node = one_shot_node(circuit);
        let num_shots = 20_000;
        let mut sim = SparseFrame::new(num_shots, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_sparse(&mut sim, &node, &mut rng).unwrap();

        let flipped = sim.count_flipped_measurements(0, &tag) as f64;
        let expected = num_shots as f64 * p;
        let std = (num_shots as f64 * p * (1.0 - p)).sqrt();
        prop_assert!((flipped - expected).abs() < 6.0 * std + 5.0);
    }

    /// Invariant 6: with no discards, every shot lands in exactly one leaf.
    #[test]
    fn branch_conservation_without_discards(seed in any::<u64>(), num_shots in 1usize..2000) {
        let mut circuit = Circuit::new();
        circuit.append(Instruction::with_rate(Opcode::XError, vec![0], 0.5));
        let tag = MeasurementTag::new(0, "m");
        circuit.append(Instruction::measurement(Opcode::Mz, 0, tag.clone()));

        let root = CircuitNode::new("root");
        root.borrow_mut().circuit = circuit;
        root.borrow_mut().children.push(Some(CircuitNode::new("branch0")));
        root.borrow_mut().children.push(Some(CircuitNode::new("branch1")));
        root.borrow_mut().next_node_index = Some(std::rc::Rc::new(move |view: &mut dyn qpframe_core::MeasurementView| {
            i64::from(view.is_flipped(0, &tag))
        }));

        let mut sim = SparseFrame::new(num_shots, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_sparse(&mut sim, &root, &mut rng).unwrap();

        prop_assert_eq!(sim.num_shots(), num_shots);
    }

    /// Invariant 1 (restricted to deterministic Clifford circuits, since
    /// randomization mode is sparse-incompatible): sparse and dense agree
    /// bit-for-bit on the final frame and measurement flips.
    #[test]
    fn sparse_and_dense_agree_on_deterministic_circuits(seed in any::<u64>(), num_shots in 1usize..300) {
        let mut circuit = Circuit::new();
        circuit.append(Instruction::with_rate(Opcode::XError, vec![0], 1.0));
        circuit.append(Instruction::new(Opcode::H, vec![0]));
        circuit.append(Instruction::new(Opcode::Cx, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::Cz, vec![1, 2]));
        let tag0 = MeasurementTag::new(0, "m0");
        let tag1 = MeasurementTag::new(0, "m1");
        let tag2 = MeasurementTag::new(0, "m2");
        circuit.append(Instruction::measurement(Opcode::Mz, 0, tag0.clone()));
        circuit.append(Instruction::measurement(Opcode::Mz, 1, tag1.clone()));
        circuit.append(Instruction::measurement(Opcode::Mx, 2, tag2.clone()));

        let sparse_node = one_shot_node(circuit.clone());
        let mut sparse_sim = SparseFrame::new(num_shots, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_sparse(&mut sparse_sim, &sparse_node, &mut rng).unwrap();

        let dense_node = one_shot_node(circuit);
        let mut dense_sim = DenseFrame::new(num_shots, false);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_dense(&mut dense_sim, &dense_node, &mut rng).unwrap();

        for shot in 0..num_shots {
            prop_assert_eq!(sparse_sim.is_flipped(shot, 0), dense_sim.is_flipped(shot, 0));
            prop_assert_eq!(sparse_sim.is_flipped(shot, 1), dense_sim.is_flipped(shot, 1));
        }
        prop_assert_eq!(
            sparse_sim.count_flipped_measurements(0, &tag0),
            (0..num_shots).filter(|&s| dense_sim.measurement_flipped(0, &tag0, s)).count()
        );
        prop_assert_eq!(
            sparse_sim.count_flipped_measurements(1, &tag1),
            (0..num_shots).filter(|&s| dense_sim.measurement_flipped(1, &tag1, s)).count()
        );
    }
}
