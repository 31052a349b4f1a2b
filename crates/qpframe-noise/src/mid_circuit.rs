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

//! A biased depolarizing model with special handling of idle errors during
//! mid-circuit measurement: a qubit idling alongside two or more
//! measurements in the same tick takes a dedicated correlated error instead
//! of the usual dephasing-only idle channel.

use qpframe_core::{Circuit, FrameError, Opcode};

use crate::error::Error;
use crate::noise_model::NoiseModel;
use crate::tick_tracker::TickTracker;

/// Biased depolarizing noise with one- and two-qubit gate rates, a flat
/// measurement/reset error rate, and a `T2`-derived idle channel that
/// switches to a dedicated correlated-error instruction when three or more
/// qubits are mid-circuit-measured together.
#[derive(Clone, Debug)]
pub struct MidCircuitMeasurementAwareModel {
    t2: f64,
    err_midcirc: Vec<f64>,
    err_m: f64,
    err_2q: f64,
    err_1q: f64,
    t_2q: f64,
    t_1q: f64,
}

impl MidCircuitMeasurementAwareModel {
    /// `err_midcirc` is the `PAULI1` rate vector (`[px, py, pz]`) applied to
    /// qubits idling through a tick that measured two or more other qubits.
    #[must_use]
    pub fn new(t2: f64, err_1q: f64, t_1q: f64, err_2q: f64, t_2q: f64, err_m: f64, err_midcirc: Vec<f64>) -> Self {
        Self { t2, err_midcirc, err_m, err_2q, err_1q, t_2q, t_1q }
    }
}

impl NoiseModel for MidCircuitMeasurementAwareModel {
    fn noisy_circuit(&self, circuit: &Circuit) -> Result<Circuit, FrameError> {
        let mut out = Circuit::new();
        let mut tracker = TickTracker::default();

        for instr in &circuit.instructions {
            let mut pre = Circuit::new();
            let mid = instr.clone();
            let mut post = Circuit::new();

            match instr.opcode {
                Opcode::Tick => {
                    let idle_gated = tracker.idle_gated(circuit.num_qubits);
                    let idle_entangled = tracker.idle_entangled(circuit.num_qubits);
                    let idle_measured = tracker.idle_measured(circuit.num_qubits);

                    if !idle_measured.is_empty() {
                        if tracker.measured.len() > 1 {
                            let err = Error::new(Opcode::Pauli1, self.err_midcirc.clone());
                            pre.append(err.instruction(idle_measured));
                        }
                    } else {
                        if !idle_gated.is_empty() {
                            let err = Error::delay(self.t_1q, 0.0, self.t2)?;
                            pre.append(err.instruction(idle_gated));
                        }
                        if !idle_entangled.is_empty() {
                            let err = Error::delay(self.t_2q - self.t_1q, 0.0, self.t2)?;
                            pre.append(err.instruction(idle_entangled));
                        }
                    }
                    tracker.clear();
                }
                Opcode::Mx | Opcode::My | Opcode::Mz => {
                    if self.err_m > 0.0 {
                        let opcode = if instr.opcode == Opcode::Mx { Opcode::ZError } else { Opcode::XError };
                        pre.append(Error::with_rate(opcode, self.err_m).instruction(instr.targets.clone()));
                    }
                }
                Opcode::Rx | Opcode::Ry | Opcode::Rz => {
                    if self.err_m > 0.0 {
                        let opcode = if instr.opcode == Opcode::Rx { Opcode::ZError } else { Opcode::XError };
                        post.append(Error::with_rate(opcode, self.err_m).instruction(instr.targets.clone()));
                    }
                }
                Opcode::Cx | Opcode::Cy | Opcode::Cz => {
                    if self.err_2q > 0.0 {
                        post.append(Error::with_rate(Opcode::Depolarize2, self.err_2q).instruction(instr.targets.clone()));
                    }
                }
                Opcode::Sxx | Opcode::Sxxdg | Opcode::Szz | Opcode::Szzdg => {
                    if self.err_2q > 0.0 {
                        post.append(Error::with_rate(Opcode::Depolarize, self.err_2q).instruction(instr.targets.clone()));
                    }
                }
                op if op.is_single_qubit_clifford() => {
                    if self.err_1q > 0.0 {
                        post.append(Error::with_rate(Opcode::Depolarize1, self.err_1q).instruction(instr.targets.clone()));
                    }
                }
                _ => {}
            }

            if !instr.opcode.is_error_channel() && instr.opcode != Opcode::Tick {
                let is_reset = instr.opcode.is_reset();
                for &q in &instr.targets {
                    if instr.opcode.is_measurement() || is_reset {
                        tracker.touch_as(instr.opcode, q, true, false, !is_reset)?;
                    } else if instr.opcode.is_two_qubit_clifford() {
                        tracker.touch_as(instr.opcode, q, true, true, false)?;
                    } else if instr.opcode.is_single_qubit_clifford() {
                        tracker.touch_as(instr.opcode, q, true, false, false)?;
                    }
                }
            }

            out += &pre;
            out.append(mid);
            out += &post;
        }
        Ok(out)
    }
}
