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

//! Facade crate: re-exports `qpframe-core`, `qpframe-sim` and
//! `qpframe-noise` under a single dependency for applications that want
//! the whole pipeline (circuit construction, frame propagation, noise
//! injection) without naming each crate individually.
//!
//! ```
//! use qpframe::prelude::*;
//!
//! let root = CircuitNode::new("bell-pair");
//! root.borrow_mut().circuit.append(Instruction::new(Opcode::H, vec![0]));
//! root.borrow_mut().circuit.append(Instruction::new(Opcode::Cx, vec![0, 1]));
//!
//! let mut sim = SparseFrame::new(100, false).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! scheduler::run_sparse(&mut sim, &root, &mut rng).unwrap();
//! ```

pub mod prelude;

pub use qpframe_core as core;
pub use qpframe_noise as noise;
pub use qpframe_sim as sim;
