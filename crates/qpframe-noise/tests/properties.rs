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

use proptest::prelude::*;
use qpframe_core::{Circuit, Instruction, MeasurementTag, Opcode};
use qpframe_noise::{NoiseModel, UniformDepolarizingModel};

/// A small repetition-code-style round with disjoint gate targets per tick,
/// so no combination of rates ever double-gates a qubit.
fn sample_circuit() -> Circuit {
    let mut circuit = Circuit::new();
    for round in 0..3 {
        circuit.append(Instruction::new(Opcode::Cx, vec![0, 2]));
        circuit.append(Instruction::new(Opcode::Cx, vec![1, 3]));
        circuit.append(Instruction::measurement(Opcode::Mz, 2, MeasurementTag::new(round, "s0")));
        circuit.append(Instruction::measurement(Opcode::Mz, 3, MeasurementTag::new(round, "s1")));
        circuit.append(Instruction::new(Opcode::Rz, vec![2]));
        circuit.append(Instruction::new(Opcode::Rz, vec![3]));
        circuit.append_opcode(Opcode::Tick);
    }
    circuit
}

/// Strips every stochastic error-channel instruction from a noisy circuit,
/// to compare what remains against the pre-noise original.
fn strip_error_channels(circuit: &Circuit) -> Vec<Instruction> {
    circuit.instructions.iter().filter(|i| !i.opcode.is_error_channel()).cloned().collect()
}

proptest! {
    /// The noise pass only ever inserts instructions around the originals;
    /// it never reorders, drops, or mutates them.
    #[test]
    fn noisy_circuit_preserves_the_original_instruction_sequence(
        pidle in 0.0f64..0.2,
        pgate in 0.0f64..0.2,
        pcnot in 0.0f64..0.2,
        pm in 0.0f64..0.2,
    ) {
        let circuit = sample_circuit();
        let model = UniformDepolarizingModel::new(pidle, 0.0, pgate, pcnot, pm);
        let noisy = model.noisy_circuit(&circuit).unwrap();

        prop_assert_eq!(strip_error_channels(&noisy), circuit.instructions);
    }

    /// Every rate the model inserts is a valid probability.
    #[test]
    fn inserted_error_rates_are_valid_probabilities(
        pidle in 0.0f64..1.0,
        pgate in 0.0f64..1.0,
        pcnot in 0.0f64..1.0,
        pm in 0.0f64..1.0,
    ) {
        let circuit = sample_circuit();
        let model = UniformDepolarizingModel::new(pidle, 0.0, pgate, pcnot, pm);
        let noisy = model.noisy_circuit(&circuit).unwrap();

        for instr in &noisy.instructions {
            if instr.opcode.is_error_channel() {
                for &rate in &instr.p {
                    prop_assert!((0.0..=1.0).contains(&rate));
                }
            }
        }
    }

    /// All rates at zero is the identity transform: no error instructions
    /// are inserted at all.
    #[test]
    fn all_zero_rates_is_the_identity(seed_unused in 0u8..1) {
        let _ = seed_unused;
        let circuit = sample_circuit();
        let model = UniformDepolarizingModel::new(0.0, 0.0, 0.0, 0.0, 0.0);
        let noisy = model.noisy_circuit(&circuit).unwrap();
        prop_assert_eq!(noisy, circuit);
    }
}
