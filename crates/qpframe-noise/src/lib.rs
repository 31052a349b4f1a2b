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

//! Noise injection: rewriting a noiseless [`qpframe_core::Circuit`] into one
//! that carries the stochastic error channels a real device would
//! introduce, plus applying that rewrite across a whole circuit tree.

mod error;
mod general;
mod mid_circuit;
mod noise_model;
mod tick_tracker;
mod tree;
mod uniform;

pub use error::Error;
pub use general::GeneralDepolarizingModel;
pub use mid_circuit::MidCircuitMeasurementAwareModel;
pub use noise_model::NoiseModel;
pub use tree::apply_noise_to_nodes;
pub use uniform::UniformDepolarizingModel;
