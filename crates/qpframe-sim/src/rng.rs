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

//! Geometric-skip shot sampling and per-branch RNG derivation.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws a single geometric-distributed skip (number of failures before the
/// first success, matching `std::geometric_distribution<size_t>`) with
/// success probability `p`. Callers must not invoke this with `p <= 0.0` or
/// `p >= 1.0`; both are handled specially by [`for_each_affected_shot`].
fn geometric_skip(rng: &mut ChaCha8Rng, p: f64) -> u64 {
    let u: f64 = rng.random();
    ((1.0 - u).ln() / (1.0 - p).ln()).floor() as u64
}

/// Visits every shot in `0..num_shots` that an error channel with rate `p`
/// affects, via the geometric-skip technique: `shot = next_candidate +
/// Geometric(p)`, then `next_candidate = shot + 1`, repeated until `shot >=
/// num_shots`. At `p == 1.0` every candidate is affected and no draw is
/// consumed for the skip itself, matching the reference implementation's
/// degenerate-rate handling. `p <= 0.0` affects no shots.
///
/// `f` receives the RNG (so callers can draw a per-shot Pauli type using the
/// same stream immediately after the shot is selected) and the shot index.
pub(crate) fn for_each_affected_shot(
    rng: &mut ChaCha8Rng,
    p: f64,
    num_shots: usize,
    mut f: impl FnMut(&mut ChaCha8Rng, usize),
) {
    if p <= 0.0 {
        return;
    }
    let mut next_candidate: usize = 0;
    loop {
        let skip = if p >= 1.0 { 0 } else { geometric_skip(rng, p) as usize };
        let shot = next_candidate + skip;
        if shot >= num_shots {
            break;
        }
        next_candidate = shot + 1;
        f(rng, shot);
    }
}

/// Derives a child RNG for branch `branch_index` by drawing a fresh 32-byte
/// seed from `parent`'s stream and mixing in the branch index. Each branch
/// consumes a disjoint slice of the parent's stream, in branch order, so a
/// future parallel scheduler could perform the same derivation up front and
/// dispatch branches to threads without changing which shot sees which
/// random draws.
pub(crate) fn derive_branch_rng(parent: &mut ChaCha8Rng, branch_index: usize) -> ChaCha8Rng {
    let mut seed = [0u8; 32];
    parent.fill_bytes(&mut seed);
    for (i, b) in branch_index.to_le_bytes().iter().enumerate() {
        seed[i] ^= *b;
    }
    ChaCha8Rng::from_seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_one_affects_every_shot_with_no_draws() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut seen = Vec::new();
        for_each_affected_shot(&mut rng, 1.0, 5, |_, shot| seen.push(shot));
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_rate_affects_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut seen = Vec::new();
        for_each_affected_shot(&mut rng, 0.0, 1000, |_, shot| seen.push(shot));
        assert!(seen.is_empty());
    }

    #[test]
    fn low_rate_concentrates_near_expectation() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let num_shots = 100_000;
        let p = 0.01;
        let mut count = 0usize;
        for_each_affected_shot(&mut rng, p, num_shots, |_, _| count += 1);
        let expected = num_shots as f64 * p;
        assert!((count as f64 - expected).abs() < expected * 0.1);
    }

    #[test]
    fn branch_rngs_are_distinct_and_deterministic() {
        let mut parent_a = ChaCha8Rng::seed_from_u64(7);
        let mut parent_b = ChaCha8Rng::seed_from_u64(7);
        let mut child0_a = derive_branch_rng(&mut parent_a, 0);
        let mut child1_a = derive_branch_rng(&mut parent_a, 1);
        let mut child0_b = derive_branch_rng(&mut parent_b, 0);

        assert_eq!(child0_a.random::<u64>(), child0_b.random::<u64>());
        assert_ne!(child0_a.random::<u64>(), child1_a.random::<u64>());
    }
}
