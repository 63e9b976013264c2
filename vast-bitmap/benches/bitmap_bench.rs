// SPDX-License-Identifier: AGPL-3.0-or-later
// VAST - Distributed Network Forensics and Security Analytics
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Benchmarks for bitmap append, combination, rank, and select.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vast_bitmap::{ops, Bitmap};

const N: u64 = 1_000_000;

/// Sparse bitmaps dominate index workloads: long zero fills with
/// occasional set bits.
fn sparse_bitmap(seed: u64, density: f64) -> Bitmap {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bm = Bitmap::new();
    let mut pos = 0;
    while pos < N {
        let gap = ((rng.gen::<f64>().ln() / -density) as u64)
            .max(1)
            .min(N - pos);
        if gap > 1 {
            bm.append_bits(false, gap - 1);
        }
        bm.append_bits(true, 1);
        pos += gap;
    }
    bm
}

fn bench_append(c: &mut Criterion) {
    c.bench_function("append_1m_mixed", |b| {
        b.iter(|| {
            let mut bm = Bitmap::new();
            for i in 0..N / 100 {
                bm.append_bits(false, 99);
                bm.append_bits(i % 7 == 0, 1);
            }
            black_box(bm.size())
        })
    });
}

fn bench_combine(c: &mut Criterion) {
    let a = sparse_bitmap(1, 0.001);
    let b = sparse_bitmap(2, 0.001);
    c.bench_function("and_1m_sparse", |bench| {
        bench.iter(|| black_box(ops::and(&a, &b).count(true)))
    });
    c.bench_function("or_1m_sparse", |bench| {
        bench.iter(|| black_box(ops::or(&a, &b).count(true)))
    });
}

fn bench_rank_select(c: &mut Criterion) {
    let a = sparse_bitmap(3, 0.01);
    let total = a.count(true);
    c.bench_function("rank_1m", |bench| {
        bench.iter(|| black_box(ops::rank(&a, true, N - 1)))
    });
    c.bench_function("select_1m", |bench| {
        bench.iter(|| black_box(ops::select(&a, true, total)))
    });
    c.bench_function("ones_1m", |bench| {
        bench.iter(|| black_box(a.ones().count()))
    });
}

criterion_group!(benches, bench_append, bench_combine, bench_rank_select);
criterion_main!(benches);
