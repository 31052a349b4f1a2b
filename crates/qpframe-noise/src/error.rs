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

//! A general error-channel descriptor, and the `T1`/`T2`-derived idle-error
//! formula shared by every noise model that accounts for decoherence during
//! a delay.

use qpframe_core::{FrameError, Instruction, Opcode};

/// An error channel opcode plus its rate parameters, not yet bound to any
/// qubits. Noise models build one of these per gate kind or idle period and
/// call [`Error::instruction`] once the affected qubits are known.
#[derive(Clone, Debug)]
pub struct Error {
    pub opcode: Opcode,
    pub rates: Vec<f64>,
}

impl Error {
    #[must_use]
    pub fn new(opcode: Opcode, rates: Vec<f64>) -> Self {
        Self { opcode, rates }
    }

    #[must_use]
    pub fn with_rate(opcode: Opcode, rate: f64) -> Self {
        Self { opcode, rates: vec![rate] }
    }

    #[must_use]
    pub fn instruction(&self, qubits: Vec<usize>) -> Instruction {
        Instruction::with_rates(self.opcode, qubits, self.rates.clone())
    }

    /// The error channel a qubit accrues from idling for `time` given its
    /// `t1` (amplitude damping) and `t2` (dephasing) times. `t1 == 0.0`
    /// means "no amplitude damping, pure dephasing"; `t1 == t2` collapses to
    /// an isotropic depolarizing channel; otherwise the idle error is an
    /// anisotropic `PAULI1` with `[px, px, pz]` weights.
    ///
    /// # Errors
    /// Returns [`FrameError::Configuration`] if `t2 > 2 * t1` (unphysical:
    /// dephasing cannot outlast twice the amplitude-damping time) or if
    /// `t1 == 0.0 && t2 == 0.0` (no decoherence channel to model).
    pub fn delay(time: f64, t1: f64, t2: f64) -> Result<Self, FrameError> {
        if (t1 > 0.0 && t2 > 2.0 * t1) || t2 == 0.0 {
            return Err(FrameError::Configuration(format!(
                "invalid delay-error parameters: T1={t1}, T2={t2}"
            )));
        }
        if t1 == 0.0 {
            Ok(Error::with_rate(Opcode::ZError, time / 2.0 / t2))
        } else if (t1 - t2).abs() < f64::EPSILON {
            Ok(Error::with_rate(Opcode::Depolarize1, time / 2.0 * (1.0 / (2.0 * t1) + 1.0 / t2)))
        } else {
            let px = time / 4.0 / t1;
            let pz = time / 2.0 * (1.0 / t2 - 0.5 / t1);
            Ok(Error::new(Opcode::Pauli1, vec![px, px, pz]))
        }
    }
}
