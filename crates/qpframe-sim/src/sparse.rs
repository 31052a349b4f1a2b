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

//! The sparse frame backend: a shot is present in the error map only if it
//! carries at least one X or Z error. Efficient at low error rates and
//! small per-branch shot counts; does not support [`randomize_flips`
//! mode](super::frame) (see [`SparseFrame::new`]).

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use qpframe_core::{FrameError, MeasurementTag, MeasurementView, NodeHandle};
use rand_chacha::ChaCha8Rng;

use crate::frame::{FrameSim, MASK_X, MASK_Z};
use crate::rng::derive_branch_rng;

type ShotErrors = (BTreeSet<usize>, BTreeSet<usize>);
type ShotMeasurements = BTreeMap<usize, BTreeSet<MeasurementTag>>;

/// Sparse Pauli-frame backend: `shot -> (x_qubits, z_qubits)`, with shots
/// absent from the map carrying no error at all.
#[derive(Debug, Default)]
pub struct SparseFrame {
    num_shots: usize,
    errors: BTreeMap<usize, ShotErrors>,
    measurements: BTreeMap<usize, ShotMeasurements>,
}

impl SparseFrame {
    /// Builds an error-free frame for `num_shots` shots.
    ///
    /// # Errors
    /// Returns [`FrameError::Configuration`] if `randomize_flips` is
    /// requested: sparse representation efficiency depends entirely on
    /// untouched shots staying absent from the map, which randomization
    /// mode would defeat.
    pub fn new(num_shots: usize, randomize_flips: bool) -> Result<Self, FrameError> {
        if randomize_flips {
            return Err(FrameError::Configuration(
                "sparse backend cannot honor randomize_flips = true".to_string(),
            ));
        }
        Ok(Self { num_shots, errors: BTreeMap::new(), measurements: BTreeMap::new() })
    }

    #[must_use]
    pub fn is_flipped(&self, shot: usize, qubit: usize) -> bool {
        self.errors.get(&shot).is_some_and(|(xs, _)| xs.contains(&qubit))
    }

    #[must_use]
    pub fn num_shots(&self) -> usize {
        self.num_shots
    }

    /// Whether any shot recorded a flip at `(qubit, tag)`.
    #[must_use]
    pub fn is_flipped_measurement(&self, qubit: usize, tag: &MeasurementTag) -> bool {
        self.measurements.values().any(|m| m.get(&qubit).is_some_and(|tags| tags.contains(tag)))
    }

    /// How many shots recorded a flip at `(qubit, tag)`.
    #[must_use]
    pub fn count_flipped_measurements(&self, qubit: usize, tag: &MeasurementTag) -> usize {
        self.measurements.values().filter(|m| m.get(&qubit).is_some_and(|tags| tags.contains(tag))).count()
    }

    fn shots_with_qubit_in(&self, qubit: usize, axis: Axis) -> Vec<usize> {
        self.errors
            .iter()
            .filter(|(_, (xs, zs))| match axis {
                Axis::X => xs.contains(&qubit),
                Axis::Z => zs.contains(&qubit),
            })
            .map(|(&shot, _)| shot)
            .collect()
    }

    fn reset_axis(&mut self, qubit: usize, axis: Axis) {
        let shots: Vec<usize> = self.errors.keys().copied().collect();
        for shot in shots {
            let entry = self.errors.get_mut(&shot).expect("shot listed from errors keys");
            match axis {
                Axis::X => {
                    entry.0.remove(&qubit);
                }
                Axis::Z => {
                    entry.1.remove(&qubit);
                }
            }
            if entry.0.is_empty() && entry.1.is_empty() {
                self.errors.remove(&shot);
            }
        }
    }

    fn record_measurement(&mut self, qubit: usize, tag: &MeasurementTag, shots: Vec<usize>) {
        for shot in shots {
            self.measurements.entry(shot).or_default().entry(qubit).or_default().insert(tag.clone());
        }
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Z,
}

impl FrameSim for SparseFrame {
    fn num_shots(&self) -> usize {
        self.num_shots
    }

    fn flip(&mut self, shot: usize, qubit: usize, mask: u8) {
        let entry = self.errors.entry(shot).or_default();
        if mask & MASK_X != 0 && !entry.0.remove(&qubit) {
            entry.0.insert(qubit);
        }
        if mask & MASK_Z != 0 && !entry.1.remove(&qubit) {
            entry.1.insert(qubit);
        }
        if entry.0.is_empty() && entry.1.is_empty() {
            self.errors.remove(&shot);
        }
    }

    fn h(&mut self, qubit: usize) {
        for (_, (xs, zs)) in &mut self.errors {
            let in_x = xs.remove(&qubit);
            let in_z = zs.remove(&qubit);
            if in_x && !in_z {
                zs.insert(qubit);
            } else if in_z && !in_x {
                xs.insert(qubit);
            } else {
                if in_x {
                    xs.insert(qubit);
                }
                if in_z {
                    zs.insert(qubit);
                }
            }
        }
    }

    fn s(&mut self, qubit: usize) {
        for shot in self.shots_with_qubit_in(qubit, Axis::X) {
            self.flip(shot, qubit, MASK_Z);
        }
    }

    fn sx(&mut self, qubit: usize) {
        for shot in self.shots_with_qubit_in(qubit, Axis::Z) {
            self.flip(shot, qubit, MASK_X);
        }
    }

    fn cx(&mut self, control: usize, target: usize) {
        for shot in self.shots_with_qubit_in(control, Axis::X) {
            self.flip(shot, target, MASK_X);
        }
        for shot in self.shots_with_qubit_in(target, Axis::Z) {
            self.flip(shot, control, MASK_Z);
        }
    }

    fn cz(&mut self, a: usize, b: usize) {
        for shot in self.shots_with_qubit_in(a, Axis::X) {
            self.flip(shot, b, MASK_Z);
        }
        for shot in self.shots_with_qubit_in(b, Axis::X) {
            self.flip(shot, a, MASK_Z);
        }
    }

    fn sxx(&mut self, a: usize, b: usize) {
        let a_z: BTreeSet<usize> = self.shots_with_qubit_in(a, Axis::Z).into_iter().collect();
        let b_z: BTreeSet<usize> = self.shots_with_qubit_in(b, Axis::Z).into_iter().collect();
        for shot in a_z.symmetric_difference(&b_z) {
            self.flip(*shot, a, MASK_X);
            self.flip(*shot, b, MASK_X);
        }
    }

    fn szz(&mut self, a: usize, b: usize) {
        let a_x: BTreeSet<usize> = self.shots_with_qubit_in(a, Axis::X).into_iter().collect();
        let b_x: BTreeSet<usize> = self.shots_with_qubit_in(b, Axis::X).into_iter().collect();
        for shot in a_x.symmetric_difference(&b_x) {
            self.flip(*shot, a, MASK_Z);
            self.flip(*shot, b, MASK_Z);
        }
    }

    fn mx(&mut self, qubit: usize, tag: &MeasurementTag, _rng: &mut ChaCha8Rng) {
        let shots = self.shots_with_qubit_in(qubit, Axis::Z);
        self.record_measurement(qubit, tag, shots);
    }

    fn mz(&mut self, qubit: usize, tag: &MeasurementTag, _rng: &mut ChaCha8Rng) {
        let shots = self.shots_with_qubit_in(qubit, Axis::X);
        self.record_measurement(qubit, tag, shots);
    }

    fn my(&mut self, qubit: usize, tag: &MeasurementTag, _rng: &mut ChaCha8Rng) {
        let shots: Vec<usize> = self
            .errors
            .iter()
            .filter(|(_, (xs, zs))| xs.contains(&qubit) ^ zs.contains(&qubit))
            .map(|(&shot, _)| shot)
            .collect();
        self.record_measurement(qubit, tag, shots);
    }

    fn rx(&mut self, qubit: usize, _rng: &mut ChaCha8Rng) {
        self.reset_axis(qubit, Axis::Z);
    }

    fn rz(&mut self, qubit: usize, _rng: &mut ChaCha8Rng) {
        self.reset_axis(qubit, Axis::X);
    }
}

/// A per-shot view over one shot's flipped-measurement table, detached from
/// the owning [`SparseFrame`] for the duration of a callback invocation.
pub struct SparseMeasurementView<'a> {
    entry: &'a mut ShotMeasurements,
}

impl MeasurementView for SparseMeasurementView<'_> {
    fn is_flipped(&self, qubit: usize, tag: &MeasurementTag) -> bool {
        self.entry.get(&qubit).is_some_and(|tags| tags.contains(tag))
    }

    fn reset_flipped(&mut self, qubit: usize, tag: &MeasurementTag) -> bool {
        let Some(tags) = self.entry.get_mut(&qubit) else { return false };
        let existed = tags.remove(tag);
        if existed && tags.is_empty() {
            self.entry.remove(&qubit);
        }
        existed
    }

    fn flip(&mut self, qubit: usize, tag: &MeasurementTag) {
        let tags = self.entry.entry(qubit).or_default();
        if !tags.remove(tag) {
            tags.insert(tag.clone());
        } else if tags.is_empty() {
            self.entry.remove(&qubit);
        }
    }
}

/// Runs `node` and its descendants against `sim`, implementing the
/// circuit-tree scheduler (component E) for the sparse backend.
///
/// # Errors
/// Propagates any [`FrameError`] raised by the frame kernel while running
/// a node's circuit (e.g. a measurement missing its tag).
pub fn run(sim: &mut SparseFrame, node: &NodeHandle, rng: &mut ChaCha8Rng) -> Result<(), FrameError> {
    {
        let n = node.borrow();
        sim.run_circuit(&n.circuit, rng)?;
    }

    if let Some(corr) = node.borrow().error_corrections.clone() {
        let shots: Vec<usize> = sim.measurements.keys().copied().collect();
        for shot in shots {
            let mut entry = sim.measurements.remove(&shot).unwrap_or_default();
            let (xs, zs) = {
                let mut view = SparseMeasurementView { entry: &mut entry };
                corr(&mut view)
            };
            for q in xs {
                sim.flip(shot, q, MASK_X);
            }
            for q in zs {
                sim.flip(shot, q, MASK_Z);
            }
            if !entry.is_empty() {
                sim.measurements.insert(shot, entry);
            }
        }
    }

    let (has_branch_fn, num_children) = {
        let n = node.borrow();
        (n.next_node_index.is_some(), n.children.len())
    };

    if !has_branch_fn && num_children <= 1 {
        let only_child = node.borrow().children.first().cloned().flatten();
        return match only_child {
            Some(child) => run(sim, &child, rng),
            None => Ok(()),
        };
    }

    let mut branch_shots: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    let measurement_shots: Vec<usize> = sim.measurements.keys().copied().collect();
    let branch_fn = node.borrow().next_node_index.clone();
    for shot in measurement_shots {
        let branch = match &branch_fn {
            Some(f) => {
                let entry = sim.measurements.get_mut(&shot).expect("just listed from measurements keys");
                let mut view = SparseMeasurementView { entry };
                f(&mut view)
            }
            None => 0,
        };
        branch_shots.entry(branch).or_default().push(shot);
    }
    for shot in sim.errors.keys().copied().collect::<Vec<_>>() {
        if !sim.measurements.contains_key(&shot) {
            branch_shots.entry(0).or_default().push(shot);
        }
    }
    let processed: usize = branch_shots.values().map(Vec::len).sum();

    let mut old_errors = std::mem::take(&mut sim.errors);
    let mut old_measurements = std::mem::take(&mut sim.measurements);

    let num_children = num_children.max(1);
    let mut start = 0usize;
    for i in 0..num_children {
        let shots = branch_shots.remove(&(i as i64)).unwrap_or_default();
        let mut n = shots.len();
        if i == 0 {
            n += sim.num_shots.saturating_sub(processed);
        }
        if n == 0 {
            continue;
        }
        let child = node.borrow().children.get(i).cloned().flatten();
        if let Some(child) = child {
            debug!("sparse branch {i}: {n} shots");
            let mut sub = SparseFrame::new(n, false)?;
            for (j, &shot) in shots.iter().enumerate() {
                if let Some(e) = old_errors.remove(&shot) {
                    sub.errors.insert(j, e);
                }
                if let Some(m) = old_measurements.remove(&shot) {
                    sub.measurements.insert(j, m);
                }
            }
            let mut child_rng = derive_branch_rng(rng, i);
            run(&mut sub, &child, &mut child_rng)?;
            for (idx, e) in sub.errors {
                sim.errors.insert(idx + start, e);
            }
            for (idx, m) in sub.measurements {
                sim.measurements.insert(idx + start, m);
            }
            n = sub.num_shots;
        } else {
            for (j, &shot) in shots.iter().enumerate() {
                if let Some(e) = old_errors.remove(&shot) {
                    sim.errors.insert(j + start, e);
                }
                if let Some(m) = old_measurements.remove(&shot) {
                    sim.measurements.insert(j + start, m);
                }
            }
        }
        start += n;
    }
    sim.num_shots = start;
    Ok(())
}
