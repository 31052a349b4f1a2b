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

//! Everything most callers need for one `use qpframe::prelude::*;`.

// re-exporting qpframe-core
pub use qpframe_core::{
    apply_node_to_end, cnot_count, merge_circuits, merge_nodes, node_count, node_depth, Circuit,
    CircuitNode, FrameError, Instruction, MeasurementTag, MeasurementView, NodeHandle, Opcode,
};

// re-exporting qpframe-sim
pub use qpframe_sim::scheduler::{run_dense, run_sparse};
pub use qpframe_sim::{DenseFrame, DenseMeasurementView, FrameSim, SparseFrame, SparseMeasurementView};

// re-exporting qpframe-noise
pub use qpframe_noise::{
    apply_noise_to_nodes, GeneralDepolarizingModel, MidCircuitMeasurementAwareModel, NoiseModel,
    UniformDepolarizingModel,
};

// the scheduler module namespace, for callers that prefer `scheduler::run_sparse(...)`
pub use qpframe_sim::scheduler;

// re-exporting the RNG types the scheduler entry points require
pub use rand::SeedableRng;
pub use rand_chacha::ChaCha8Rng;
