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

//! Applying a [`NoiseModel`] to every node of a circuit tree in place.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::debug;
use qpframe_core::{CircuitNode, FrameError, NodeHandle};

use crate::noise_model::NoiseModel;

/// Rewrites `root.circuit` and every reachable descendant's circuit to its
/// noisy version, in place. Tolerates shared nodes and cycles via a visited
/// set, mirroring the rest of the tree-walking helpers in `qpframe-core`.
///
/// # Errors
/// Returns whatever error `noise.noisy_circuit` returns for the first node
/// that fails, leaving already-visited nodes rewritten.
pub fn apply_noise_to_nodes(root: &NodeHandle, noise: &dyn NoiseModel) -> Result<(), FrameError> {
    let mut visited = HashSet::new();
    apply_noise_to_nodes_rec(root, noise, &mut visited)
}

fn apply_noise_to_nodes_rec(
    node: &NodeHandle,
    noise: &dyn NoiseModel,
    visited: &mut HashSet<*const RefCell<CircuitNode>>,
) -> Result<(), FrameError> {
    let ptr = Rc::as_ptr(node);
    if !visited.insert(ptr) {
        return Ok(());
    }

    let noisy = noise.noisy_circuit(&node.borrow().circuit)?;
    debug!("{}: {} -> {} instructions after noise injection", node.borrow().name, node.borrow().circuit.instructions.len(), noisy.instructions.len());
    node.borrow_mut().circuit = noisy;

    let children: Vec<_> = node.borrow().children.clone();
    for child in children.into_iter().flatten() {
        apply_noise_to_nodes_rec(&child, noise, visited)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use qpframe_core::{Instruction, Opcode};

    use super::*;
    use crate::uniform::UniformDepolarizingModel;

    #[test]
    fn rewrites_root_and_every_descendant_once() {
        let leaf = CircuitNode::new("leaf");
        leaf.borrow_mut().circuit.append(Instruction::new(Opcode::H, vec![0]));

        let root = CircuitNode::new("root");
        root.borrow_mut().circuit.append(Instruction::new(Opcode::H, vec![0]));
        root.borrow_mut().children.push(Some(Rc::clone(&leaf)));
        root.borrow_mut().children.push(Some(Rc::clone(&leaf)));

        let model = UniformDepolarizingModel::uniform(0.1);
        apply_noise_to_nodes(&root, &model).unwrap();

        assert_eq!(root.borrow().circuit.instructions.len(), 2);
        assert_eq!(leaf.borrow().circuit.instructions.len(), 2);
    }

    #[test]
    fn tolerates_a_cycle() {
        let a = CircuitNode::new("a");
        let b = CircuitNode::new("b");
        a.borrow_mut().children.push(Some(Rc::clone(&b)));
        b.borrow_mut().children.push(Some(Rc::clone(&a)));

        let model = UniformDepolarizingModel::uniform(0.0);
        assert!(apply_noise_to_nodes(&a, &model).is_ok());
    }

    #[test]
    fn propagates_programming_errors_from_double_gating() {
        let root = CircuitNode::new("root");
        root.borrow_mut().circuit.append(Instruction::new(Opcode::Cx, vec![0, 1]));
        root.borrow_mut().circuit.append(Instruction::new(Opcode::H, vec![0]));

        let model = UniformDepolarizingModel::uniform(0.0);
        assert!(matches!(apply_noise_to_nodes(&root, &model), Err(FrameError::Programming(_))));
    }
}
