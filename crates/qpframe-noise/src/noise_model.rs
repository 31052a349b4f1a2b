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

use std::collections::BTreeSet;

use qpframe_core::{Circuit, FrameError, Instruction, Opcode};

/// Transforms a noiseless circuit into one that interleaves stochastic
/// error channels at the points a real device would introduce them.
///
/// `noisy_circuit` is the only hook most models override; everything else
/// has a sensible default. Implementors that model crosstalk also override
/// [`NoiseModel::crosstalk_rate`] to enable [`NoiseModel::cx_with_crosstalk`].
pub trait NoiseModel {
    /// Returns the noisy version of `circuit`. The default is the identity
    /// (no noise), matching the base model a crosstalk-only model falls
    /// back to.
    ///
    /// # Errors
    /// Returns [`FrameError::Programming`] if `circuit` reuses a qubit that
    /// was already entangled or measured earlier in the same tick without
    /// an intervening `TICK` — the reference implementation treats this as
    /// a fatal circuit-construction bug, not a recoverable condition.
    fn noisy_circuit(&self, circuit: &Circuit) -> Result<Circuit, FrameError> {
        Ok(circuit.clone())
    }

    /// The two-qubit depolarizing rate applied between a `CX`'s qubits and
    /// each spectator in `neighbours`, or `0.0` (no crosstalk) by default.
    fn crosstalk_rate(&self) -> f64 {
        0.0
    }

    /// A `CX(control, target)` plus, when [`NoiseModel::crosstalk_rate`] is
    /// non-zero, a `DEPOLARIZE2` between each of `control`/`target` and every
    /// other qubit in `neighbours`.
    fn cx_with_crosstalk(&self, control: usize, target: usize, neighbours: &BTreeSet<usize>) -> Circuit {
        let mut circuit = Circuit::new();
        circuit.append(Instruction::new(Opcode::Cx, vec![control, target]));
        let rate = self.crosstalk_rate();
        if rate == 0.0 {
            return circuit;
        }
        for &q in neighbours {
            if q == control || q == target {
                continue;
            }
            circuit.append(Instruction::with_rate(Opcode::Depolarize2, vec![control, q], rate));
            circuit.append(Instruction::with_rate(Opcode::Depolarize2, vec![target, q], rate));
        }
        circuit
    }
}
