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

//! Pauli-frame propagation: the frame-propagation kernel, its sparse and
//! dense backends, and the circuit-tree scheduler for each.

mod dense;
mod frame;
mod rng;
mod sparse;

pub use dense::{DenseFrame, DenseMeasurementView};
pub use frame::{FrameSim, MASK_X, MASK_Y, MASK_Z};
pub use sparse::{SparseFrame, SparseMeasurementView};

/// The circuit-tree scheduler, one entry point per backend.
pub mod scheduler {
    pub use crate::dense::run as run_dense;
    pub use crate::sparse::run as run_sparse;
}
