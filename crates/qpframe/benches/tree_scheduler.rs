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

//! End-to-end benchmark: build a branching circuit tree, inject noise, and
//! run the sparse scheduler over it, exercising the full facade pipeline
//! rather than any one crate in isolation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qpframe::prelude::*;
use std::rc::Rc;

/// A repetition-code round (syndrome extraction + mid-circuit reset) that
/// branches to a `recover` child when the syndrome is non-trivial, and to a
/// `continue` child otherwise.
fn branching_round(distance: usize) -> NodeHandle {
    let root = CircuitNode::new("round");
    {
        let mut circuit = Circuit::new();
        for q in 0..distance - 1 {
            circuit.append(Instruction::new(Opcode::Cx, vec![q, distance + q]));
        }
        for q in 0..distance - 1 {
            circuit.append(Instruction::measurement(Opcode::Mz, distance + q, MeasurementTag::new(0, "syndrome")));
            circuit.append(Instruction::new(Opcode::Rz, vec![distance + q]));
        }
        circuit.append_opcode(Opcode::Tick);
        root.borrow_mut().circuit = circuit;
    }

    let recover = CircuitNode::new("recover");
    let cont = CircuitNode::new("continue");
    root.borrow_mut().children.push(Some(Rc::clone(&recover)));
    root.borrow_mut().children.push(Some(Rc::clone(&cont)));
    root.borrow_mut().next_node_index = Some(Rc::new(|view: &mut dyn MeasurementView| {
        if view.is_flipped(0, &MeasurementTag::new(0, "syndrome")) { 0 } else { 1 }
    }));

    root
}

fn bench_noisy_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("noisy_tree_scheduler");
    for &distance in &[5usize, 9] {
        group.bench_with_input(BenchmarkId::from_parameter(distance), &distance, |b, &distance| {
            b.iter(|| {
                let root = branching_round(distance);
                let model = UniformDepolarizingModel::with_cnot_rate(0.001, 0.01);
                apply_noise_to_nodes(&root, &model).unwrap();

                let mut sim = SparseFrame::new(500, false).unwrap();
                let mut rng = ChaCha8Rng::seed_from_u64(0);
                scheduler::run_sparse(&mut sim, &root, &mut rng).unwrap();
                black_box(&sim);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_noisy_tree);
criterion_main!(benches);
