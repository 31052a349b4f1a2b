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

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use crate::circuit::Circuit;
use crate::instruction::MeasurementTag;
use crate::opcode::Opcode;

/// A read/write view onto one shot's recorded measurement flips, as seen
/// by a node's `next_node_index`/`error_corrections` callbacks.
///
/// Implemented by the frame backends in `qpframe-sim`; this crate only
/// depends on the trait so the circuit-tree model stays independent of any
/// particular frame representation.
pub trait MeasurementView {
    fn is_flipped(&self, qubit: usize, tag: &MeasurementTag) -> bool;
    fn reset_flipped(&mut self, qubit: usize, tag: &MeasurementTag) -> bool;
    fn flip(&mut self, qubit: usize, tag: &MeasurementTag);
}

/// Selects the next child index from the current shot's measurement
/// history; `-1` discards the shot via post-selection.
pub type BranchFn = Rc<dyn Fn(&mut dyn MeasurementView) -> i64>;

/// Returns the qubits whose X and Z frame bits should be flipped to apply
/// error correction for the current shot.
pub type CorrectionFn = Rc<dyn Fn(&mut dyn MeasurementView) -> (BTreeSet<usize>, BTreeSet<usize>)>;

/// A handle to a shared, possibly cyclic, circuit-tree vertex.
pub type NodeHandle = Rc<RefCell<CircuitNode>>;

/// One vertex of a circuit tree (in general a DAG): a straight-line
/// [`Circuit`] plus the branch-select and error-correction callbacks that
/// determine which child continues each shot.
///
/// `children[i] == None` means "no successor on that branch": shots routed
/// there simply stop, carrying their final frame state with them.
pub struct CircuitNode {
    pub name: String,
    pub circuit: Circuit,
    pub children: Vec<Option<NodeHandle>>,
    pub next_node_index: Option<BranchFn>,
    pub error_corrections: Option<CorrectionFn>,
}

impl CircuitNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> NodeHandle {
        Rc::new(RefCell::new(CircuitNode {
            name: name.into(),
            circuit: Circuit::new(),
            children: Vec::new(),
            next_node_index: None,
            error_corrections: None,
        }))
    }

    /// Recursively duplicates this node and every reachable descendant,
    /// sharing no `Rc` with the original tree. Callbacks are cheap to
    /// duplicate (`Rc::clone`) since they are immutable once attached.
    #[must_use]
    pub fn deep_copy(this: &NodeHandle) -> NodeHandle {
        let borrowed = this.borrow();
        let copy = Rc::new(RefCell::new(CircuitNode {
            name: borrowed.name.clone(),
            circuit: borrowed.circuit.clone(),
            children: Vec::new(),
            next_node_index: borrowed.next_node_index.clone(),
            error_corrections: borrowed.error_corrections.clone(),
        }));
        let children = borrowed
            .children
            .iter()
            .map(|child| child.as_ref().map(Self::deep_copy))
            .collect();
        copy.borrow_mut().children = children;
        copy
    }
}

#[derive(Clone)]
struct Cursor {
    node: NodeHandle,
    index: usize,
}

fn at_end(cursor: &Option<Cursor>) -> bool {
    cursor
        .as_ref()
        .is_some_and(|c| c.index >= c.node.borrow().circuit.instructions.len())
}

fn drain_one_tick(node0: &NodeHandle, cursor: &mut Option<Cursor>) {
    let Some(cur) = cursor.as_mut() else { return };
    loop {
        let next = {
            let node = cur.node.borrow();
            node.circuit.instructions.get(cur.index).cloned()
        };
        let Some(instr) = next else { break };
        cur.index += 1;
        if instr.opcode == Opcode::Tick {
            break;
        }
        node0.borrow_mut().circuit.append(instr);
    }
}

/// Combines two independent circuit DAGs into one whose circuits are
/// tick-aligned interleavings of the inputs. The inputs must be acyclic;
/// [`apply_node_to_end`] is the cycle-tolerant counterpart for appending
/// rather than interleaving.
#[must_use]
pub fn merge_nodes(node_a: &NodeHandle, node_b: &NodeHandle) -> NodeHandle {
    merge_rec(
        Some(Cursor { node: node_a.clone(), index: 0 }),
        Some(Cursor { node: node_b.clone(), index: 0 }),
    )
}

fn merge_rec(mut a: Option<Cursor>, mut b: Option<Cursor>) -> NodeHandle {
    let name_a = a.as_ref().map(|c| c.node.borrow().name.clone()).unwrap_or_default();
    let name_b = b.as_ref().map(|c| c.node.borrow().name.clone()).unwrap_or_default();
    let node0 = CircuitNode::new(format!("{name_a} + {name_b}"));

    loop {
        drain_one_tick(&node0, &mut a);
        drain_one_tick(&node0, &mut b);

        let end_a = at_end(&a);
        let end_b = at_end(&b);

        if end_a && end_b {
            let a_node = a.as_ref().unwrap().node.clone();
            let b_node = b.as_ref().unwrap().node.clone();
            let a_has_children = !a_node.borrow().children.is_empty();
            let b_has_children = !b_node.borrow().children.is_empty();

            if a_has_children && b_has_children {
                let a_children = a_node.borrow().children.clone();
                let b_children = b_node.borrow().children.clone();
                for child_a in &a_children {
                    for child_b in &b_children {
                        let next_a = child_a.clone().map(|n| Cursor { node: n, index: 0 });
                        let next_b = child_b.clone().map(|n| Cursor { node: n, index: 0 });
                        node0.borrow_mut().children.push(Some(merge_rec(next_a, next_b)));
                    }
                }
                let b_len = b_children.len() as i64;
                let fn_a = a_node.borrow().next_node_index.clone();
                let fn_b = b_node.borrow().next_node_index.clone();
                node0.borrow_mut().next_node_index = Some(Rc::new(move |view: &mut dyn MeasurementView| {
                    let i = fn_a.as_ref().map_or(0, |f| f(view));
                    let j = fn_b.as_ref().map_or(0, |f| f(view));
                    if i < 0 || j < 0 {
                        -1
                    } else {
                        i * b_len + j
                    }
                }));
            } else if a_has_children {
                node0.borrow_mut().children = a_node.borrow().children.clone();
                node0.borrow_mut().next_node_index = a_node.borrow().next_node_index.clone();
            } else if b_has_children {
                node0.borrow_mut().children = b_node.borrow().children.clone();
                node0.borrow_mut().next_node_index = b_node.borrow().next_node_index.clone();
            }

            let corr_a = a_node.borrow().error_corrections.clone();
            let corr_b = b_node.borrow().error_corrections.clone();
            node0.borrow_mut().error_corrections = combine_corrections(corr_a, corr_b);
            break;
        } else if end_a && !a.as_ref().unwrap().node.borrow().children.is_empty() {
            let a_node = a.as_ref().unwrap().node.clone();
            let a_children = a_node.borrow().children.clone();
            if b.is_none() {
                node0.borrow_mut().children = a_children;
            } else {
                for child in &a_children {
                    let next_a = child.clone().map(|n| Cursor { node: n, index: 0 });
                    node0.borrow_mut().children.push(Some(merge_rec(next_a, b.clone())));
                }
            }
            node0.borrow_mut().next_node_index = a_node.borrow().next_node_index.clone();
            node0.borrow_mut().error_corrections = a_node.borrow().error_corrections.clone();
            break;
        } else if end_b && !b.as_ref().unwrap().node.borrow().children.is_empty() {
            let b_node = b.as_ref().unwrap().node.clone();
            let b_children = b_node.borrow().children.clone();
            if a.is_none() {
                node0.borrow_mut().children = b_children;
            } else {
                for child in &b_children {
                    let next_b = child.clone().map(|n| Cursor { node: n, index: 0 });
                    node0.borrow_mut().children.push(Some(merge_rec(a.clone(), next_b)));
                }
            }
            node0.borrow_mut().next_node_index = b_node.borrow().next_node_index.clone();
            node0.borrow_mut().error_corrections = b_node.borrow().error_corrections.clone();
            break;
        } else if end_a && b.is_none() {
            let a_node = a.as_ref().unwrap().node.clone();
            node0.borrow_mut().circuit.append_opcode(Opcode::Tick);
            node0.borrow_mut().next_node_index = a_node.borrow().next_node_index.clone();
            node0.borrow_mut().error_corrections = a_node.borrow().error_corrections.clone();
            break;
        } else if end_b && a.is_none() {
            let b_node = b.as_ref().unwrap().node.clone();
            node0.borrow_mut().circuit.append_opcode(Opcode::Tick);
            node0.borrow_mut().next_node_index = b_node.borrow().next_node_index.clone();
            node0.borrow_mut().error_corrections = b_node.borrow().error_corrections.clone();
            break;
        }
        node0.borrow_mut().circuit.append_opcode(Opcode::Tick);
    }
    node0
}

fn combine_corrections(a: Option<CorrectionFn>, b: Option<CorrectionFn>) -> Option<CorrectionFn> {
    match (a, b) {
        (Some(fa), Some(fb)) => Some(Rc::new(move |view: &mut dyn MeasurementView| {
            let (mut xs, mut zs) = fa(view);
            let (xb, zb) = fb(view);
            for q in xb {
                if !xs.remove(&q) {
                    xs.insert(q);
                }
            }
            for q in zb {
                if !zs.remove(&q) {
                    zs.insert(q);
                }
            }
            (xs, zs)
        }) as CorrectionFn),
        (Some(fa), None) => Some(fa),
        (None, Some(fb)) => Some(fb),
        (None, None) => None,
    }
}

/// Appends `ft_node` after every leaf of `root` reachable by the path that
/// never hits a non-zero-indexed branch, and `fallback_node` everywhere
/// else. Tolerates cycles via a visited set. Use after a detected error to
/// switch the "good" (fault-tolerant) continuation to a different recovery
/// gadget than every other branch.
pub fn apply_node_to_end(root: &NodeHandle, fallback_node: &NodeHandle, ft_node: Option<&NodeHandle>) {
    let mut visited = HashSet::new();
    apply_node_to_end_rec(root, fallback_node, ft_node.cloned(), &mut visited);
}

fn apply_node_to_end_rec(
    node0: &NodeHandle,
    fallback_node: &NodeHandle,
    mut ft_node: Option<NodeHandle>,
    visited: &mut HashSet<*const RefCell<CircuitNode>>,
) {
    let ptr = Rc::as_ptr(node0);
    if !visited.insert(ptr) {
        return;
    }
    let is_leaf = node0.borrow().children.is_empty();
    if is_leaf {
        if let Some(ft) = ft_node {
            node0.borrow_mut().children.push(Some(ft));
        }
        return;
    }
    let len = node0.borrow().children.len();
    for i in 0..len {
        if i > 0 {
            ft_node = Some(fallback_node.clone());
        }
        let child = node0.borrow().children[i].clone();
        match child {
            None => {
                node0.borrow_mut().children[i] = ft_node.clone();
            }
            Some(child) => {
                apply_node_to_end_rec(&child, fallback_node, ft_node.clone(), visited);
            }
        }
    }
}

/// For each depth below `root`, the number of leaves reachable at exactly
/// that depth. Index 0 is the count of leaves that `root` itself is.
#[must_use]
pub fn node_depth(root: &NodeHandle) -> Vec<usize> {
    let node = root.borrow();
    if node.children.is_empty() {
        return vec![1];
    }
    let mut depths = vec![0usize];
    for child in node.children.iter().flatten() {
        let child_depths = node_depth(child);
        for (j, count) in child_depths.into_iter().enumerate() {
            if j + 1 < depths.len() {
                depths[j + 1] += count;
            } else {
                depths.push(count);
            }
        }
    }
    depths
}

/// The number of distinct nodes reachable from `root`, counting a shared
/// node once regardless of how many paths reach it.
#[must_use]
pub fn node_count(root: &NodeHandle) -> usize {
    let mut visited = HashSet::new();
    node_count_rec(root, &mut visited)
}

fn node_count_rec(node: &NodeHandle, visited: &mut HashSet<*const RefCell<CircuitNode>>) -> usize {
    if !visited.insert(Rc::as_ptr(node)) {
        return 0;
    }
    let mut count = 1;
    let children = node.borrow().children.clone();
    for child in children.into_iter().flatten() {
        count += node_count_rec(&child, visited);
    }
    count
}

/// The number of `CX` applications accumulated along each root-to-leaf
/// path, one entry per distinct path (a node visited twice via different
/// parents contributes once per arriving path, but a cycle is never
/// re-entered).
#[must_use]
pub fn cnot_count(root: &NodeHandle) -> Vec<usize> {
    let mut visited = HashSet::new();
    let mut totals = Vec::new();
    cnot_count_rec(root, &mut visited, 0, &mut totals);
    totals
}

fn cnot_count_rec(
    node: &NodeHandle,
    visited: &mut HashSet<*const RefCell<CircuitNode>>,
    mut current: usize,
    totals: &mut Vec<usize>,
) {
    {
        let borrowed = node.borrow();
        for instr in &borrowed.circuit.instructions {
            if instr.opcode == Opcode::Cx {
                current += instr.targets.len() / 2;
            }
        }
    }
    let children = node.borrow().children.clone();
    if children.is_empty() {
        totals.push(current);
        return;
    }
    for child in children.into_iter().flatten() {
        if visited.insert(Rc::as_ptr(&child)) {
            cnot_count_rec(&child, visited, current, totals);
        }
    }
}
