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

use std::error::Error;
use std::fmt;

/// Crate-wide error type, split along the configuration/programming
/// taxonomy: configuration errors are raised at construction time,
/// programming errors are raised while a circuit runs and always indicate
/// a circuit that does not correspond to a valid physical experiment.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Rejected at construction time: a noise-model or simulator parameter
    /// is out of range (e.g. `T2 > 2*T1`, or `randomize_flips` requested on
    /// the sparse backend).
    Configuration(String),
    /// Detected while running a circuit: a qubit double-gated within one
    /// tick, a measurement missing its tag, or an unsupported reset mask.
    Programming(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            FrameError::Programming(msg) => write!(f, "programming error: {msg}"),
        }
    }
}

impl Error for FrameError {}
