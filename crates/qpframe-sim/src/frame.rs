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

//! The frame-propagation kernel: Clifford update rules and stochastic
//! channel sampling shared by the sparse and dense backends.

use log::{error, trace};
use qpframe_core::{FrameError, Instruction, MeasurementTag, Opcode};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::rng::for_each_affected_shot;

/// Frame bit mask for an X error.
pub const MASK_X: u8 = 1;
/// Frame bit mask for a Z error.
pub const MASK_Z: u8 = 2;
/// Frame bit mask for a Y error (`X | Z`).
pub const MASK_Y: u8 = 3;

/// A Pauli-frame backend: the set of primitive operations a concrete
/// representation (sparse or dense) must supply, plus default
/// implementations of every gate, reset, measurement, and stochastic
/// channel derivable from them. Mirrors the split the corpus uses for its
/// own simulator traits: a small required surface, a large default one.
pub trait FrameSim {
    fn num_shots(&self) -> usize;

    /// Toggles the given frame bit(s) (`mask` is one of [`MASK_X`],
    /// [`MASK_Z`], [`MASK_Y`]) for `qubit` on `shot`.
    fn flip(&mut self, shot: usize, qubit: usize, mask: u8);

    fn h(&mut self, qubit: usize);
    fn s(&mut self, qubit: usize);
    fn sx(&mut self, qubit: usize);
    fn cx(&mut self, control: usize, target: usize);
    fn cz(&mut self, a: usize, b: usize);
    fn sxx(&mut self, a: usize, b: usize);
    fn szz(&mut self, a: usize, b: usize);

    /// Records a flip at `(qubit, tag)` for every shot whose relevant frame
    /// bit is set, per the measurement's basis. `rng` is only consulted by
    /// backends that support `randomize_flips`; the sparse backend ignores
    /// it (that mode is rejected at construction instead).
    fn mx(&mut self, qubit: usize, tag: &MeasurementTag, rng: &mut ChaCha8Rng);
    fn my(&mut self, qubit: usize, tag: &MeasurementTag, rng: &mut ChaCha8Rng);
    fn mz(&mut self, qubit: usize, tag: &MeasurementTag, rng: &mut ChaCha8Rng);

    fn rx(&mut self, qubit: usize, rng: &mut ChaCha8Rng);
    fn rz(&mut self, qubit: usize, rng: &mut ChaCha8Rng);

    /// `RY` clears both axes; `RX`-then-`RZ` does that unambiguously with
    /// no special-casing, unlike the single-axis reset helper in the
    /// reference implementation.
    fn ry(&mut self, qubit: usize, rng: &mut ChaCha8Rng) {
        self.rx(qubit, rng);
        self.rz(qubit, rng);
    }

    fn i(&mut self, _qubit: usize) {}
    fn x(&mut self, _qubit: usize) {}
    fn y(&mut self, _qubit: usize) {}
    fn z(&mut self, _qubit: usize) {}
    fn sdg(&mut self, qubit: usize) {
        self.s(qubit);
    }
    fn sxdg(&mut self, qubit: usize) {
        self.sx(qubit);
    }
    fn sy(&mut self, qubit: usize) {
        self.h(qubit);
    }
    fn sydg(&mut self, qubit: usize) {
        self.h(qubit);
    }

    /// `CY` modeled as `CX` conjugated by `S` on the target (frame-level,
    /// so `S` and `SDG` coincide).
    fn cy(&mut self, control: usize, target: usize) {
        self.s(target);
        self.cx(control, target);
        self.s(target);
    }

    fn x_error(&mut self, qubit: usize, p: f64, rng: &mut ChaCha8Rng) {
        for_each_affected_shot(rng, p, self.num_shots(), |_, shot| self.flip(shot, qubit, MASK_X));
    }

    fn y_error(&mut self, qubit: usize, p: f64, rng: &mut ChaCha8Rng) {
        for_each_affected_shot(rng, p, self.num_shots(), |_, shot| self.flip(shot, qubit, MASK_Y));
    }

    fn z_error(&mut self, qubit: usize, p: f64, rng: &mut ChaCha8Rng) {
        for_each_affected_shot(rng, p, self.num_shots(), |_, shot| self.flip(shot, qubit, MASK_Z));
    }

    fn depolarize1(&mut self, qubit: usize, p: f64, rng: &mut ChaCha8Rng) {
        for_each_affected_shot(rng, p, self.num_shots(), |rng, shot| {
            let mask = rng.random_range(1..=3u8);
            self.flip(shot, qubit, mask);
        });
    }

    fn depolarize2(&mut self, control: usize, target: usize, p: f64, rng: &mut ChaCha8Rng) {
        for_each_affected_shot(rng, p, self.num_shots(), |rng, shot| {
            let kind = rng.random_range(1..=15u8);
            self.flip(shot, control, kind & 3);
            self.flip(shot, target, kind >> 2);
        });
    }

    /// Joint correlated error over `qubits.len()` targets: one of
    /// `4^n - 1` non-identity n-qubit Paulis, 2 bits per qubit.
    fn depolarize(&mut self, qubits: &[usize], p: f64, rng: &mut ChaCha8Rng) {
        let n = qubits.len();
        if n == 0 {
            return;
        }
        let max_type = 4u64.saturating_pow(n as u32) - 1;
        for_each_affected_shot(rng, p, self.num_shots(), |rng, shot| {
            let kind = rng.random_range(1..=max_type);
            for (i, &q) in qubits.iter().enumerate() {
                let mask = ((kind >> (2 * i)) & 3) as u8;
                self.flip(shot, q, mask);
            }
        });
    }

    /// `weights = [w_X, w_Z, w_Y]`, in mask order (not canonical Pauli
    /// order): total rate is the sum, and given an affected shot the type
    /// is chosen proportional to the three weights.
    fn pauli1(&mut self, qubit: usize, weights: &[f64], rng: &mut ChaCha8Rng) {
        let ptot: f64 = weights.iter().sum();
        let Ok(dist) = WeightedIndex::new(weights.iter().copied()) else { return };
        for_each_affected_shot(rng, ptot, self.num_shots(), |rng, shot| {
            let mask = (dist.sample(rng) + 1) as u8;
            self.flip(shot, qubit, mask);
        });
    }

    /// Matches the reference implementation literally: a single type is
    /// drawn from the same three weights used by `pauli1` and applied only
    /// to `control` (`type & 3`); `type >> 2` is always zero since the draw
    /// never exceeds 3, so `target` is never touched by this channel.
    fn pauli2(&mut self, control: usize, target: usize, weights: &[f64], rng: &mut ChaCha8Rng) {
        let ptot: f64 = weights.iter().sum();
        let Ok(dist) = WeightedIndex::new(weights.iter().copied()) else { return };
        for_each_affected_shot(rng, ptot, self.num_shots(), |rng, shot| {
            let kind = (dist.sample(rng) + 1) as u8;
            self.flip(shot, control, kind & 3);
            self.flip(shot, target, kind >> 2);
        });
    }

    /// Dispatches one instruction, propagating it through the frame.
    fn run_instruction(&mut self, instr: &Instruction, rng: &mut ChaCha8Rng) -> Result<(), FrameError> {
        trace!("running {instr}");
        match instr.opcode {
            Opcode::I => for &q in &instr.targets {
                self.i(q);
            },
            Opcode::X => for &q in &instr.targets {
                self.x(q);
            },
            Opcode::Y => for &q in &instr.targets {
                self.y(q);
            },
            Opcode::Z => for &q in &instr.targets {
                self.z(q);
            },
            Opcode::H => for &q in &instr.targets {
                self.h(q);
            },
            Opcode::S => for &q in &instr.targets {
                self.s(q);
            },
            Opcode::Sdg => for &q in &instr.targets {
                self.sdg(q);
            },
            Opcode::Sx => for &q in &instr.targets {
                self.sx(q);
            },
            Opcode::Sxdg => for &q in &instr.targets {
                self.sxdg(q);
            },
            Opcode::Sy => for &q in &instr.targets {
                self.sy(q);
            },
            Opcode::Sydg => for &q in &instr.targets {
                self.sydg(q);
            },
            Opcode::Cx => for pair in instr.targets.chunks_exact(2) {
                self.cx(pair[0], pair[1]);
            },
            Opcode::Cy => for pair in instr.targets.chunks_exact(2) {
                self.cy(pair[0], pair[1]);
            },
            Opcode::Cz => for pair in instr.targets.chunks_exact(2) {
                self.cz(pair[0], pair[1]);
            },
            Opcode::Sxx => for (a, b) in unordered_pairs(&instr.targets) {
                self.sxx(a, b);
            },
            Opcode::Sxxdg => for (a, b) in unordered_pairs(&instr.targets) {
                self.sxx(a, b);
            },
            Opcode::Szz => for (a, b) in unordered_pairs(&instr.targets) {
                self.szz(a, b);
            },
            Opcode::Szzdg => for (a, b) in unordered_pairs(&instr.targets) {
                self.szz(a, b);
            },
            Opcode::Mx => {
                let tag = measurement_tag(instr)?;
                for &q in &instr.targets {
                    self.mx(q, tag, rng);
                }
            }
            Opcode::My => {
                let tag = measurement_tag(instr)?;
                for &q in &instr.targets {
                    self.my(q, tag, rng);
                }
            }
            Opcode::Mz => {
                let tag = measurement_tag(instr)?;
                for &q in &instr.targets {
                    self.mz(q, tag, rng);
                }
            }
            Opcode::Rx => for &q in &instr.targets {
                self.rx(q, rng);
            },
            Opcode::Ry => for &q in &instr.targets {
                self.ry(q, rng);
            },
            Opcode::Rz => for &q in &instr.targets {
                self.rz(q, rng);
            },
            Opcode::XError => for &q in &instr.targets {
                self.x_error(q, rate(instr), rng);
            },
            Opcode::YError => for &q in &instr.targets {
                self.y_error(q, rate(instr), rng);
            },
            Opcode::ZError => for &q in &instr.targets {
                self.z_error(q, rate(instr), rng);
            },
            Opcode::Depolarize => self.depolarize(&instr.targets, rate(instr), rng),
            Opcode::Depolarize1 => for &q in &instr.targets {
                self.depolarize1(q, rate(instr), rng);
            },
            Opcode::Depolarize2 => for pair in instr.targets.chunks_exact(2) {
                self.depolarize2(pair[0], pair[1], rate(instr), rng);
            },
            Opcode::Pauli1 => for &q in &instr.targets {
                self.pauli1(q, &instr.p, rng);
            },
            Opcode::Pauli2 => for pair in instr.targets.chunks_exact(2) {
                self.pauli2(pair[0], pair[1], &instr.p, rng);
            },
            Opcode::Delay | Opcode::Tick => {}
        }
        Ok(())
    }

    /// Runs every instruction in `circuit` in order. `TICK` has no frame
    /// effect here; tick bookkeeping that matters (double-gating checks,
    /// idle-error accounting) belongs to the noise-injection pass, which
    /// sees the pre-noise circuit before this kernel ever runs it.
    fn run_circuit(&mut self, circuit: &qpframe_core::Circuit, rng: &mut ChaCha8Rng) -> Result<(), FrameError> {
        for instr in &circuit.instructions {
            self.run_instruction(instr, rng)?;
        }
        Ok(())
    }
}

fn rate(instr: &Instruction) -> f64 {
    instr.p.first().copied().unwrap_or(0.0)
}

fn measurement_tag(instr: &Instruction) -> Result<&MeasurementTag, FrameError> {
    instr.measurement_tag.as_ref().ok_or_else(|| {
        let msg = format!("{} missing a measurement tag", instr.opcode);
        error!("{msg}");
        FrameError::Programming(msg)
    })
}

/// Every unordered pair `(targets[i], targets[j])` with `i < j`, matching
/// the reference implementation's nested-loop order for `SXX`/`SZZ`.
fn unordered_pairs(targets: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    (1..targets.len()).flat_map(move |j| (0..j).map(move |i| (targets[i], targets[j])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_pairs_enumerates_every_combination() {
        let pairs: Vec<_> = unordered_pairs(&[10, 20, 30]).collect();
        assert_eq!(pairs, vec![(10, 20), (10, 30), (20, 30)]);
    }
}
