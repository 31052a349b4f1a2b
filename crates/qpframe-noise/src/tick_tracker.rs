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

//! Per-tick bookkeeping shared by the circuit-level noise models: which
//! qubits were gated, entangled, or measured since the last `TICK`, used to
//! compute which qubits were idle instead.

use std::collections::BTreeSet;

use qpframe_core::{FrameError, Opcode};

#[derive(Default)]
pub(crate) struct TickTracker {
    pub gated: BTreeSet<usize>,
    pub entangled: BTreeSet<usize>,
    pub measured: BTreeSet<usize>,
}

impl TickTracker {
    /// The qubits untouched by whatever built `tracked` this tick. Mirrors
    /// the reference implementation's "only if something happened" quirk:
    /// an empty `tracked` set (nothing of that kind happened yet this tick)
    /// yields an empty idle list too, not "every qubit."
    fn idle(tracked: &BTreeSet<usize>, num_qubits: usize) -> Vec<usize> {
        if tracked.is_empty() {
            return Vec::new();
        }
        (0..num_qubits).filter(|q| !tracked.contains(q)).collect()
    }

    pub fn idle_gated(&self, num_qubits: usize) -> Vec<usize> {
        Self::idle(&self.gated, num_qubits)
    }

    pub fn idle_entangled(&self, num_qubits: usize) -> Vec<usize> {
        Self::idle(&self.entangled, num_qubits)
    }

    pub fn idle_measured(&self, num_qubits: usize) -> Vec<usize> {
        Self::idle(&self.measured, num_qubits)
    }

    pub fn clear(&mut self) {
        self.gated.clear();
        self.entangled.clear();
        self.measured.clear();
    }

    /// Records that `opcode` touched `q` this tick, after checking that `q`
    /// was not already entangled or measured without an intervening `TICK`.
    /// Classifies the opcode the way the uniform and general depolarizing
    /// models do: measurements *and* resets mark all three sets, two-qubit
    /// Cliffords mark gated+entangled, one-qubit Cliffords mark gated only.
    ///
    /// # Errors
    /// Returns [`FrameError::Programming`] on reuse, mirroring the
    /// reference implementation's fatal abort on the same condition.
    pub fn touch(&mut self, opcode: Opcode, q: usize) -> Result<(), FrameError> {
        if opcode.is_measurement() || opcode.is_reset() {
            self.touch_as(opcode, q, true, true, true)
        } else if opcode.is_two_qubit_clifford() {
            self.touch_as(opcode, q, true, true, false)
        } else if opcode.is_single_qubit_clifford() {
            self.touch_as(opcode, q, true, false, false)
        } else {
            Ok(())
        }
    }

    /// Same double-gate check as [`TickTracker::touch`], but with the
    /// gated/entangled/measured classification supplied explicitly. Used by
    /// the mid-circuit-measurement-aware model, which tracks a narrower set
    /// of categories than the other two variants (a reset marks `gated`
    /// only, not `measured`; a two-qubit gate does not mark `entangled`).
    ///
    /// # Errors
    /// Returns [`FrameError::Programming`] if `q` was already entangled or
    /// measured earlier in the same tick.
    pub fn touch_as(&mut self, opcode: Opcode, q: usize, gated: bool, entangled: bool, measured: bool) -> Result<(), FrameError> {
        if self.entangled.contains(&q) || self.measured.contains(&q) {
            return Err(FrameError::Programming(format!(
                "qubit {q} reused by {opcode} after being entangled or measured within the same tick"
            )));
        }
        if measured {
            self.measured.insert(q);
        }
        if entangled {
            self.entangled.insert(q);
        }
        if gated {
            self.gated.insert(q);
        }
        Ok(())
    }
}
