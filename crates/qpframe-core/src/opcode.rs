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

/// The closed set of instruction kinds a [`crate::circuit::Circuit`] may contain.
///
/// Variants fall into six families: identity/Pauli no-ops, single- and
/// two-qubit Clifford gates, measurements, resets, stochastic Pauli error
/// channels, and the two timing markers `DELAY`/`TICK`. Frame-propagation
/// semantics for each variant are defined by the simulator backends in
/// `qpframe-sim`, not by this crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Opcode {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    Sx,
    Sxdg,
    Sy,
    Sydg,
    Cx,
    Cy,
    Cz,
    Sxx,
    Sxxdg,
    Szz,
    Szzdg,
    Mx,
    My,
    Mz,
    Rx,
    Ry,
    Rz,
    Depolarize,
    Depolarize1,
    Depolarize2,
    XError,
    YError,
    ZError,
    Pauli1,
    Pauli2,
    Delay,
    Tick,
}

impl Opcode {
    /// The number of qubit targets each application of this opcode consumes
    /// per "unit", and whether that unit repeats once per target (`1`) or
    /// once per unordered pair of the target list (`0`, meaning "see
    /// [`Opcode::pairwise`]").
    ///
    /// Returns `2` for two-qubit gates whose targets come in consecutive
    /// pairs (`CX`, `CY`, `CZ`, `DEPOLARIZE2`, `PAULI2`), `1` for everything
    /// else that is not pairwise-expanded.
    #[must_use]
    pub fn targets_per_application(self) -> usize {
        match self {
            Opcode::Cx | Opcode::Cy | Opcode::Cz | Opcode::Depolarize2 | Opcode::Pauli2 => 2,
            _ => 1,
        }
    }

    /// True for the opcodes whose target list is expanded into every
    /// unordered pair of qubits, rather than consumed sequentially.
    #[must_use]
    pub fn pairwise(self) -> bool {
        matches!(self, Opcode::Sxx | Opcode::Sxxdg | Opcode::Szz | Opcode::Szzdg)
    }

    /// True for `MX`/`MY`/`MZ`: opcodes that require a [`crate::instruction::MeasurementTag`].
    #[must_use]
    pub fn is_measurement(self) -> bool {
        matches!(self, Opcode::Mx | Opcode::My | Opcode::Mz)
    }

    /// True for `RX`/`RY`/`RZ`.
    #[must_use]
    pub fn is_reset(self) -> bool {
        matches!(self, Opcode::Rx | Opcode::Ry | Opcode::Rz)
    }

    /// True for the stochastic Pauli-error channel opcodes.
    #[must_use]
    pub fn is_error_channel(self) -> bool {
        matches!(
            self,
            Opcode::Depolarize
                | Opcode::Depolarize1
                | Opcode::Depolarize2
                | Opcode::XError
                | Opcode::YError
                | Opcode::ZError
                | Opcode::Pauli1
                | Opcode::Pauli2
        )
    }

    /// True for the Clifford-group gates: everything that is neither a
    /// measurement, reset, error channel, nor timing marker.
    #[must_use]
    pub fn is_clifford(self) -> bool {
        !self.is_measurement() && !self.is_reset() && !self.is_error_channel() && !matches!(self, Opcode::Delay | Opcode::Tick)
    }

    /// True for the two-qubit Clifford gates (`CX`, `CY`, `CZ`, `SXX`,
    /// `SXXDG`, `SZZ`, `SZZDG`).
    #[must_use]
    pub fn is_two_qubit_clifford(self) -> bool {
        matches!(self, Opcode::Cx | Opcode::Cy | Opcode::Cz | Opcode::Sxx | Opcode::Sxxdg | Opcode::Szz | Opcode::Szzdg)
    }

    /// True for the single-qubit Clifford gates.
    #[must_use]
    pub fn is_single_qubit_clifford(self) -> bool {
        self.is_clifford() && !self.is_two_qubit_clifford()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::I => "I",
            Opcode::X => "X",
            Opcode::Y => "Y",
            Opcode::Z => "Z",
            Opcode::H => "H",
            Opcode::S => "S",
            Opcode::Sdg => "SDG",
            Opcode::Sx => "SX",
            Opcode::Sxdg => "SXDG",
            Opcode::Sy => "SY",
            Opcode::Sydg => "SYDG",
            Opcode::Cx => "CX",
            Opcode::Cy => "CY",
            Opcode::Cz => "CZ",
            Opcode::Sxx => "SXX",
            Opcode::Sxxdg => "SXXDG",
            Opcode::Szz => "SZZ",
            Opcode::Szzdg => "SZZDG",
            Opcode::Mx => "MX",
            Opcode::My => "MY",
            Opcode::Mz => "MZ",
            Opcode::Rx => "RX",
            Opcode::Ry => "RY",
            Opcode::Rz => "RZ",
            Opcode::Depolarize => "DEPOLARIZE",
            Opcode::Depolarize1 => "DEPOLARIZE1",
            Opcode::Depolarize2 => "DEPOLARIZE2",
            Opcode::XError => "X_ERROR",
            Opcode::YError => "Y_ERROR",
            Opcode::ZError => "Z_ERROR",
            Opcode::Pauli1 => "PAULI1",
            Opcode::Pauli2 => "PAULI2",
            Opcode::Delay => "DELAY",
            Opcode::Tick => "TICK",
        };
        f.write_str(name)
    }
}
