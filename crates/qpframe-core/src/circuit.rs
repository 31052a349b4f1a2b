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
use std::ops::{Add, AddAssign};

use crate::instruction::Instruction;
use crate::opcode::Opcode;

/// An ordered sequence of [`Instruction`]s plus the qubit count they imply.
///
/// `num_qubits` tracks one more than the highest target index ever
/// appended, regardless of the instruction's opcode, and never shrinks.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Circuit {
    pub instructions: Vec<Instruction>,
    pub num_qubits: usize,
}

impl Circuit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `instr`, growing `num_qubits` if any of its targets demand it.
    pub fn append(&mut self, instr: Instruction) -> &mut Self {
        self.num_qubits = self.num_qubits.max(instr.min_num_qubits());
        self.instructions.push(instr);
        self
    }

    /// Appends a target-less instruction (`TICK`, `DELAY` with no targets).
    pub fn append_opcode(&mut self, opcode: Opcode) -> &mut Self {
        self.append(Instruction::new(opcode, Vec::new()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl AddAssign<&Circuit> for Circuit {
    fn add_assign(&mut self, other: &Circuit) {
        self.num_qubits = self.num_qubits.max(other.num_qubits);
        self.instructions.extend(other.instructions.iter().cloned());
    }
}

impl Add<&Circuit> for Circuit {
    type Output = Circuit;
    fn add(mut self, other: &Circuit) -> Circuit {
        self += other;
        self
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instructions {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

/// Interleaves two circuits tick-by-tick: one tick's worth of `c1` is
/// copied, then one tick's worth of `c2`, then a `TICK` is emitted, until
/// both circuits are drained. Used to compose two logical operations that
/// must stay lockstep at every scheduling boundary.
#[must_use]
pub fn merge_circuits(c1: &Circuit, c2: &Circuit) -> Circuit {
    let mut out = Circuit::new();
    let mut i1 = 0;
    let mut i2 = 0;
    while i1 < c1.instructions.len() || i2 < c2.instructions.len() {
        while i1 < c1.instructions.len() {
            let instr = &c1.instructions[i1];
            i1 += 1;
            if instr.opcode == Opcode::Tick {
                break;
            }
            out.append(instr.clone());
        }
        while i2 < c2.instructions.len() {
            let instr = &c2.instructions[i2];
            i2 += 1;
            if instr.opcode == Opcode::Tick {
                break;
            }
            out.append(instr.clone());
        }
        out.append_opcode(Opcode::Tick);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_grows_num_qubits_for_any_opcode() {
        let mut c = Circuit::new();
        c.append(Instruction::with_rate(Opcode::XError, vec![4], 0.1));
        assert_eq!(c.num_qubits, 5);
    }

    #[test]
    fn concatenation_preserves_order_and_max_qubits() {
        let mut a = Circuit::new();
        a.append(Instruction::new(Opcode::H, vec![0]));
        let mut b = Circuit::new();
        b.append(Instruction::new(Opcode::Cx, vec![0, 2]));
        let c = a + &b;
        assert_eq!(c.num_qubits, 3);
        assert_eq!(c.instructions.len(), 2);
    }

    #[test]
    fn merge_circuits_interleaves_per_tick() {
        let mut c1 = Circuit::new();
        c1.append(Instruction::new(Opcode::H, vec![0]));
        c1.append_opcode(Opcode::Tick);
        c1.append(Instruction::new(Opcode::Mz, vec![0]));

        let mut c2 = Circuit::new();
        c2.append(Instruction::new(Opcode::H, vec![1]));
        c2.append_opcode(Opcode::Tick);
        c2.append(Instruction::new(Opcode::Mz, vec![1]));

        let merged = merge_circuits(&c1, &c2);
        let ops: Vec<Opcode> = merged.instructions.iter().map(|i| i.opcode).collect();
        assert_eq!(
            ops,
            vec![Opcode::H, Opcode::H, Opcode::Tick, Opcode::Mz, Opcode::Mz, Opcode::Tick]
        );
    }

    #[test]
    fn merge_circuits_handles_unequal_tick_counts() {
        let mut c1 = Circuit::new();
        c1.append(Instruction::new(Opcode::H, vec![0]));

        let mut c2 = Circuit::new();
        c2.append(Instruction::new(Opcode::H, vec![1]));
        c2.append_opcode(Opcode::Tick);
        c2.append(Instruction::new(Opcode::Mz, vec![1]));

        let merged = merge_circuits(&c1, &c2);
        let ops: Vec<Opcode> = merged.instructions.iter().map(|i| i.opcode).collect();
        assert_eq!(ops, vec![Opcode::H, Opcode::H, Opcode::Tick, Opcode::Mz, Opcode::Tick]);
    }
}
