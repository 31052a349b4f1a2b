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

//! Circuit, instruction and circuit-tree data model shared by the frame
//! simulators and noise models.

pub mod circuit;
pub mod error;
pub mod instruction;
pub mod node;
pub mod opcode;

pub use circuit::{merge_circuits, Circuit};
pub use error::FrameError;
pub use instruction::{Instruction, MeasurementTag};
pub use node::{
    apply_node_to_end, cnot_count, merge_nodes, node_count, node_depth, BranchFn, CircuitNode,
    CorrectionFn, MeasurementView, NodeHandle,
};
pub use opcode::Opcode;
