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

//! Standard circuit-level depolarizing noise: one rate per operation
//! family, plus idle errors at tick boundaries.

use qpframe_core::{Circuit, FrameError, Instruction, Opcode};

use crate::noise_model::NoiseModel;
use crate::tick_tracker::TickTracker;

/// A uniform depolarizing model: every gate of a given arity shares one
/// rate, every measurement/reset shares one rate, and idle qubits pick up
/// an idle rate at each `TICK`.
#[derive(Clone, Copy, Debug)]
pub struct UniformDepolarizingModel {
    pidle: f64,
    deltapidle: f64,
    pgate: f64,
    pcnot: f64,
    pm: f64,
    bias: bool,
}

impl UniformDepolarizingModel {
    /// One rate `p` for gates, cnots, measurements and idles; no extra
    /// mid-circuit-measurement idle penalty.
    #[must_use]
    pub fn uniform(p: f64) -> Self {
        Self { pidle: p, deltapidle: 0.0, pgate: p, pcnot: p, pm: p, bias: false }
    }

    /// Separate one- and two-qubit gate rates, sharing `p` for idle and
    /// measurement.
    #[must_use]
    pub fn with_cnot_rate(p: f64, pcnot: f64) -> Self {
        Self { pidle: p, deltapidle: 0.0, pgate: p, pcnot, pm: p, bias: false }
    }

    /// Every rate set independently.
    #[must_use]
    pub fn new(pidle: f64, deltapidle: f64, pgate: f64, pcnot: f64, pm: f64) -> Self {
        Self { pidle, deltapidle, pgate, pcnot, pm, bias: false }
    }

    /// Idle error becomes a `Z_ERROR` instead of `DEPOLARIZE1`, modeling a
    /// device whose dominant idle channel is dephasing.
    #[must_use]
    pub fn biased(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }
}

impl NoiseModel for UniformDepolarizingModel {
    fn noisy_circuit(&self, circuit: &Circuit) -> Result<Circuit, FrameError> {
        let mut out = Circuit::new();
        let mut tracker = TickTracker::default();

        for instr in &circuit.instructions {
            let mut pre = Circuit::new();
            let mid = instr.clone();
            let mut post = Circuit::new();

            match instr.opcode {
                Opcode::Tick => {
                    let idle_entangled = tracker.idle_entangled(circuit.num_qubits);
                    let idle_measured = tracker.idle_measured(circuit.num_qubits);
                    if self.pidle > 0.0 && !idle_entangled.is_empty() {
                        let opcode = if self.bias { Opcode::ZError } else { Opcode::Depolarize1 };
                        pre.append(Instruction::with_rate(opcode, idle_entangled, self.pidle));
                    }
                    if self.deltapidle > 0.0 && !idle_measured.is_empty() {
                        pre.append(Instruction::with_rate(Opcode::Depolarize1, idle_measured, self.deltapidle));
                    }
                    tracker.clear();
                }
                Opcode::Mx | Opcode::My | Opcode::Mz => {
                    if self.pm > 0.0 {
                        let opcode = if instr.opcode == Opcode::Mx { Opcode::ZError } else { Opcode::XError };
                        pre.append(Instruction::with_rate(opcode, instr.targets.clone(), self.pm));
                    }
                }
                Opcode::Rx | Opcode::Ry | Opcode::Rz => {
                    if self.pm > 0.0 {
                        let opcode = if instr.opcode == Opcode::Rx { Opcode::ZError } else { Opcode::XError };
                        post.append(Instruction::with_rate(opcode, instr.targets.clone(), self.pm));
                    }
                }
                Opcode::Cx | Opcode::Cy | Opcode::Cz => {
                    if self.pcnot > 0.0 {
                        post.append(Instruction::with_rate(Opcode::Depolarize2, instr.targets.clone(), self.pcnot));
                    }
                }
                Opcode::Sxx | Opcode::Sxxdg | Opcode::Szz | Opcode::Szzdg => {
                    if self.pcnot > 0.0 {
                        post.append(Instruction::with_rate(Opcode::Depolarize, instr.targets.clone(), self.pcnot));
                    }
                }
                op if op.is_single_qubit_clifford() => {
                    if self.pgate > 0.0 {
                        post.append(Instruction::with_rate(Opcode::Depolarize1, instr.targets.clone(), self.pgate));
                    }
                }
                _ => {}
            }

            if !instr.opcode.is_error_channel() && instr.opcode != Opcode::Tick {
                for &q in &instr.targets {
                    tracker.touch(instr.opcode, q)?;
                }
            }

            out += &pre;
            out.append(mid);
            out += &post;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use qpframe_core::MeasurementTag;

    use super::*;

    #[test]
    fn gate_error_follows_single_qubit_clifford() {
        let model = UniformDepolarizingModel::uniform(0.1);
        let mut circuit = Circuit::new();
        circuit.append(Instruction::new(Opcode::H, vec![0]));
        let noisy = model.noisy_circuit(&circuit).unwrap();
        assert_eq!(noisy.instructions[1].opcode, Opcode::Depolarize1);
        assert!((noisy.instructions[1].p[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn cnot_error_is_two_qubit_depolarize() {
        let model = UniformDepolarizingModel::with_cnot_rate(0.01, 0.02);
        let mut circuit = Circuit::new();
        circuit.append(Instruction::new(Opcode::Cx, vec![0, 1]));
        let noisy = model.noisy_circuit(&circuit).unwrap();
        assert_eq!(noisy.instructions[1].opcode, Opcode::Depolarize2);
        assert!((noisy.instructions[1].p[0] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn measurement_error_precedes_the_measurement_on_the_orthogonal_basis() {
        let model = UniformDepolarizingModel::uniform(0.05);
        let mut circuit = Circuit::new();
        circuit.append(Instruction::measurement(Opcode::Mx, 0, MeasurementTag::new(0, "m")));
        let noisy = model.noisy_circuit(&circuit).unwrap();
        assert_eq!(noisy.instructions[0].opcode, Opcode::ZError);
        assert_eq!(noisy.instructions[1].opcode, Opcode::Mx);
    }

    #[test]
    fn idle_error_only_hits_qubits_outside_the_entangled_set() {
        let model = UniformDepolarizingModel::uniform(0.01);
        let mut circuit = Circuit::new();
        circuit.append(Instruction::new(Opcode::Cx, vec![0, 1]));
        circuit.append_opcode(Opcode::Tick);
        let noisy = model.noisy_circuit(&circuit).unwrap();
        let idle = noisy.instructions.iter().find(|i| i.opcode == Opcode::Depolarize1).unwrap();
        assert!(!idle.targets.contains(&0));
        assert!(!idle.targets.contains(&1));
    }

    #[test]
    fn double_gating_within_a_tick_is_rejected() {
        let model = UniformDepolarizingModel::uniform(0.0);
        let mut circuit = Circuit::new();
        circuit.append(Instruction::new(Opcode::Cx, vec![0, 1]));
        circuit.append(Instruction::new(Opcode::H, vec![0]));
        assert!(matches!(model.noisy_circuit(&circuit), Err(FrameError::Programming(_))));
    }
}
