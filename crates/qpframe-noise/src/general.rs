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

//! Per-opcode depolarizing rates plus `T1`/`T2`-derived idle errors computed
//! from actual busy time, rather than a single flat idle rate.

use std::collections::BTreeMap;

use qpframe_core::{Circuit, FrameError, Instruction, Opcode};

use crate::error::Error;
use crate::noise_model::NoiseModel;
use crate::tick_tracker::TickTracker;

/// A calibration table keyed by opcode/delay-label, plus decoherence times,
/// that reproduces a device's per-operation error and timing profile.
#[derive(Clone, Debug, Default)]
pub struct GeneralDepolarizingModel {
    t1: f64,
    t2: f64,
    errors: BTreeMap<Opcode, f64>,
    times: BTreeMap<Opcode, f64>,
    delay_times: BTreeMap<String, f64>,
    cooling_times: BTreeMap<Opcode, f64>,
    delay_cooling_times: BTreeMap<String, f64>,
}

const ONE_QUBIT_CLIFFORDS: [Opcode; 11] =
    [Opcode::H, Opcode::X, Opcode::Y, Opcode::Z, Opcode::I, Opcode::Sx, Opcode::Sxdg, Opcode::Sy, Opcode::Sydg, Opcode::S, Opcode::Sdg];
const TWO_QUBIT_CLIFFORDS: [Opcode; 6] = [Opcode::Cx, Opcode::Cz, Opcode::Sxx, Opcode::Sxxdg, Opcode::Szz, Opcode::Szzdg];
const MEASUREMENTS: [Opcode; 6] = [Opcode::Mx, Opcode::My, Opcode::Mz, Opcode::Rx, Opcode::Ry, Opcode::Rz];
const RESETS: [Opcode; 3] = [Opcode::Rx, Opcode::Ry, Opcode::Rz];

impl GeneralDepolarizingModel {
    /// Builds a model from explicit per-opcode rate/timing tables.
    ///
    /// # Errors
    /// Returns [`FrameError::Configuration`] if `t1 > 0.0 && t2 > 2.0 * t1`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t1: f64,
        t2: f64,
        errors: BTreeMap<Opcode, f64>,
        times: BTreeMap<Opcode, f64>,
        delay_times: BTreeMap<String, f64>,
        cooling_times: BTreeMap<Opcode, f64>,
        delay_cooling_times: BTreeMap<String, f64>,
    ) -> Result<Self, FrameError> {
        if t1 > 0.0 && t2 > 2.0 * t1 {
            return Err(FrameError::Configuration(format!("invalid T1/T2 pair: T1={t1}, T2={t2}")));
        }
        Ok(Self { t1, t2, errors, times, delay_times, cooling_times, delay_cooling_times })
    }

    /// A representative ion-trap calibration table, interpolating between a
    /// "current-generation" (`alpha = 1`) and "projected future" (`alpha =
    /// 0`) error-rate/timing profile. Not part of the frozen public
    /// contract; build a model from your own device's numbers via
    /// [`GeneralDepolarizingModel::new`] for anything beyond smoke-testing.
    #[must_use]
    pub fn ion_trap_calibration(alpha: f64, t2: f64) -> Self {
        let beta = 1.0 - alpha;
        let mut errors = BTreeMap::new();
        let mut times = BTreeMap::new();
        let mut cooling_times = BTreeMap::new();

        for &op in &ONE_QUBIT_CLIFFORDS {
            errors.insert(op, 0.0036 * alpha + 1e-5 * beta);
            times.insert(op, 25e-6 * alpha + 1e-6 * beta);
        }
        for &op in &TWO_QUBIT_CLIFFORDS {
            errors.insert(op, 0.027 * alpha + 2e-4 * beta);
            times.insert(op, 322e-6 * alpha + 15e-6 * beta);
        }
        for &op in &MEASUREMENTS {
            errors.insert(op, 3e-3 * alpha + 1e-4 * beta);
            times.insert(op, 400e-6 * alpha + 30e-6 * beta);
            if !RESETS.contains(&op) {
                cooling_times.insert(op, 150e-6 * alpha);
            }
        }
        for &op in &RESETS {
            errors.insert(op, 0.003);
            times.insert(op, 50e-6 * alpha + 10e-6 * beta);
        }

        let mut delay_times = BTreeMap::new();
        delay_times.insert("SPLIT".to_string(), 80e-6 * alpha + 30e-6 * beta);
        delay_times.insert("MERGE".to_string(), 80e-6 * alpha + 30e-6 * beta);
        delay_times.insert("JUNCTION_TRANSPORT".to_string(), 200e-6 * alpha + 100e-6 * beta);
        delay_times.insert("ROTATION".to_string(), 150e-6 * alpha + 20e-6 * beta);

        let mut delay_cooling_times = BTreeMap::new();
        delay_cooling_times.insert("JUNCTION_TRANSPORT".to_string(), 100e-6 * alpha + 25e-6 * beta);
        delay_cooling_times.insert("ROTATION".to_string(), 100e-6 * alpha + 25e-6 * beta);

        Self { t1: 0.0, t2, errors, times, delay_times, cooling_times, delay_cooling_times }
    }
}

impl NoiseModel for GeneralDepolarizingModel {
    fn noisy_circuit(&self, circuit: &Circuit) -> Result<Circuit, FrameError> {
        let mut out = Circuit::new();
        let mut tracker = TickTracker::default();
        // Key -1 is the delay sentinel; real qubits are keyed by index.
        let mut used_time: BTreeMap<i64, f64> = BTreeMap::new();
        let mut cooling_time = 0.0f64;

        for instr in &circuit.instructions {
            let mut pre = Circuit::new();
            let mid = instr.clone();
            let mut post = Circuit::new();

            if instr.opcode == Opcode::Tick {
                let max_time = used_time.values().copied().fold(0.0, f64::max) + cooling_time;
                for q in 0..circuit.num_qubits {
                    let time = max_time - used_time.get(&(q as i64)).copied().unwrap_or(0.0);
                    if time <= 0.0 || (self.t1 == 0.0 && self.t2 == 0.0) {
                        continue;
                    }
                    let err = Error::delay(time, self.t1, self.t2)?;
                    pre.append(err.instruction(vec![q]));
                }
                used_time.clear();
                tracker.clear();
                cooling_time = 0.0;
            } else {
                let p = self.errors.get(&instr.opcode).copied().unwrap_or(0.0);
                if p > 0.0 {
                    if ONE_QUBIT_CLIFFORDS.contains(&instr.opcode) {
                        post.append(Instruction::with_rate(Opcode::Depolarize1, instr.targets.clone(), p));
                    } else if matches!(instr.opcode, Opcode::Mx | Opcode::My | Opcode::Mz) {
                        let opcode = if instr.opcode == Opcode::Mx { Opcode::ZError } else { Opcode::XError };
                        pre.append(Instruction::with_rate(opcode, instr.targets.clone(), p));
                    } else if matches!(instr.opcode, Opcode::Rx | Opcode::Ry | Opcode::Rz) {
                        let opcode = if instr.opcode == Opcode::Rx { Opcode::ZError } else { Opcode::XError };
                        post.append(Instruction::with_rate(opcode, instr.targets.clone(), p));
                    } else if matches!(instr.opcode, Opcode::Cx | Opcode::Cy | Opcode::Cz) {
                        post.append(Instruction::with_rate(Opcode::Depolarize2, instr.targets.clone(), p));
                    } else if matches!(instr.opcode, Opcode::Sxx | Opcode::Sxxdg | Opcode::Szz | Opcode::Szzdg) {
                        post.append(Instruction::with_rate(Opcode::Depolarize, instr.targets.clone(), p));
                    }
                }

                if instr.opcode == Opcode::Delay {
                    if let Some(label) = &instr.label {
                        let delay = self.delay_times.get(label).copied().unwrap_or(0.0);
                        let slot = used_time.entry(-1).or_insert(0.0);
                        if *slot < delay {
                            *slot = delay;
                        }
                        if let Some(&cool) = self.delay_cooling_times.get(label) {
                            if cool > cooling_time {
                                cooling_time = cool;
                            }
                        }
                    }
                } else if let Some(&cool) = self.cooling_times.get(&instr.opcode) {
                    if cool > cooling_time {
                        cooling_time = cool;
                    }
                }

                if !instr.opcode.is_error_channel() {
                    for &q in &instr.targets {
                        *used_time.entry(q as i64).or_insert(0.0) += self.times.get(&instr.opcode).copied().unwrap_or(0.0);
                        tracker.touch(instr.opcode, q)?;
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
