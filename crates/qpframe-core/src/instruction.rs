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

use std::fmt;

use crate::opcode::Opcode;

/// Identifies a measurement by the round it belongs to and a caller-chosen
/// name, so that a specific measurement can be addressed from a later
/// node's `error_corrections` or `next_node_index` callback even after the
/// circuit tree has branched.
///
/// Ordered lexicographically by `(round, name)`, matching the ordering a
/// `MeasurementTag` needs when used as a map key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct MeasurementTag {
    pub round: i64,
    pub name: String,
}

impl MeasurementTag {
    #[must_use]
    pub fn new(round: i64, name: impl Into<String>) -> Self {
        Self { round, name: name.into() }
    }
}

impl fmt::Display for MeasurementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.round, self.name)
    }
}

/// One application of an [`Opcode`] to a set of qubit targets.
///
/// `targets` is interpreted according to the opcode: sequential for most
/// gates, consecutive pairs for `CX`/`CY`/`CZ`/`DEPOLARIZE2`/`PAULI2`, and
/// every unordered pair of the list for `SXX`/`SXXDG`/`SZZ`/`SZZDG`. `p`
/// holds the opcode's stochastic-channel rate parameters and is empty for
/// Clifford gates. `measurement_tag` is required for `MX`/`MY`/`MZ` and
/// ignored otherwise. `label` names a delay kind for `DELAY` and is unused
/// by every other opcode.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub targets: Vec<usize>,
    pub p: Vec<f64>,
    pub measurement_tag: Option<MeasurementTag>,
    pub label: Option<String>,
}

impl Instruction {
    #[must_use]
    pub fn new(opcode: Opcode, targets: Vec<usize>) -> Self {
        Self { opcode, targets, p: Vec::new(), measurement_tag: None, label: None }
    }

    #[must_use]
    pub fn with_rate(opcode: Opcode, targets: Vec<usize>, p: f64) -> Self {
        Self { opcode, targets, p: vec![p], measurement_tag: None, label: None }
    }

    #[must_use]
    pub fn with_rates(opcode: Opcode, targets: Vec<usize>, p: Vec<f64>) -> Self {
        Self { opcode, targets, p, measurement_tag: None, label: None }
    }

    #[must_use]
    pub fn measurement(opcode: Opcode, target: usize, tag: MeasurementTag) -> Self {
        Self { opcode, targets: vec![target], p: Vec::new(), measurement_tag: Some(tag), label: None }
    }

    /// A measurement instruction over several targets sharing one tag; the
    /// flipped-bit table is still keyed per-qubit, so this is equivalent to
    /// applying the same tag to each target independently.
    #[must_use]
    pub fn measurement_batch(opcode: Opcode, targets: Vec<usize>, tag: MeasurementTag) -> Self {
        Self { opcode, targets, p: Vec::new(), measurement_tag: Some(tag), label: None }
    }

    #[must_use]
    pub fn delay(label: impl Into<String>) -> Self {
        Self { opcode: Opcode::Delay, targets: Vec::new(), p: Vec::new(), measurement_tag: None, label: Some(label.into()) }
    }

    /// The minimum `num_qubits` this instruction requires, i.e. one more
    /// than its highest target index, or `0` if it has no targets.
    #[must_use]
    pub fn min_num_qubits(&self) -> usize {
        self.targets.iter().copied().max().map_or(0, |m| m + 1)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        if !self.p.is_empty() {
            write!(f, "(")?;
            for (i, p) in self.p.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{p}")?;
            }
            write!(f, ")")?;
        }
        if let Some(label) = &self.label {
            write!(f, " {label}")?;
        }
        for t in &self.targets {
            write!(f, " {t}")?;
        }
        Ok(())
    }
}
