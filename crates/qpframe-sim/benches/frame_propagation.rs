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

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qpframe_core::{CircuitNode, Instruction, MeasurementTag, Opcode};
use qpframe_sim::scheduler::{run_dense, run_sparse};
use qpframe_sim::{DenseFrame, SparseFrame};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn repetition_code_node(distance: usize, rounds: usize) -> qpframe_core::NodeHandle {
    let root = CircuitNode::new("repetition-code");
    let mut circuit = qpframe_core::Circuit::new();
    for round in 0..rounds {
        for q in 0..distance {
            circuit.append(Instruction::with_rate(Opcode::XError, vec![q], 0.01));
        }
        for q in 0..distance - 1 {
            circuit.append(Instruction::new(Opcode::Cx, vec![q, distance + q]));
        }
        for q in 0..distance - 1 {
            circuit.append(Instruction::measurement(
                Opcode::Mz,
                distance + q,
                MeasurementTag::new(round, "syndrome"),
            ));
            circuit.append(Instruction::new(Opcode::Rz, vec![distance + q]));
        }
    }
    root.borrow_mut().circuit = circuit;
    root
}

fn bench_sparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_frame_propagation");
    for &distance in &[5usize, 9, 17] {
        group.bench_with_input(BenchmarkId::from_parameter(distance), &distance, |b, &distance| {
            b.iter(|| {
                let node = repetition_code_node(distance, 10);
                let mut sim = SparseFrame::new(1000, false).unwrap();
                let mut rng = ChaCha8Rng::seed_from_u64(0);
                run_sparse(&mut sim, &node, &mut rng).unwrap();
                black_box(&sim);
            });
        });
    }
    group.finish();
}

fn bench_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_frame_propagation");
    for &distance in &[5usize, 9, 17] {
        group.bench_with_input(BenchmarkId::from_parameter(distance), &distance, |b, &distance| {
            b.iter(|| {
                let node = repetition_code_node(distance, 10);
                let mut sim = DenseFrame::new(1000, false);
                let mut rng = ChaCha8Rng::seed_from_u64(0);
                run_dense(&mut sim, &node, &mut rng).unwrap();
                black_box(&sim);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sparse, bench_dense);
criterion_main!(benches);
