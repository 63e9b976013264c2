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

//! Property-based tests for the compressed bitmap
//!
//! Verifies the structural invariants against a naive Vec<bool> model:
//! counts partition the size, rank and select invert each other, the
//! bitwise identities hold, and De Morgan holds up to length alignment.

use proptest::prelude::*;
use vast_bitmap::{ops, word, Bitmap};

/// A run-length encoded recipe keeps generated bitmaps interesting: long
/// fills and short literals interleave instead of degenerating into pure
/// literal noise.
fn bitmap_recipe() -> impl Strategy<Value = Vec<(bool, u64)>> {
    prop::collection::vec((any::<bool>(), 1u64..200), 0..12)
}

fn build(recipe: &[(bool, u64)]) -> (Bitmap, Vec<bool>) {
    let mut bm = Bitmap::new();
    let mut model = Vec::new();
    for &(bit, n) in recipe {
        bm.append_bits(bit, n);
        model.extend(std::iter::repeat(bit).take(n as usize));
    }
    (bm, model)
}

proptest! {
    #[test]
    fn prop_structure_matches_model(recipe in bitmap_recipe()) {
        let (bm, model) = build(&recipe);
        prop_assert_eq!(bm.size(), model.len() as u64);
        for (i, &bit) in model.iter().enumerate() {
            prop_assert_eq!(bm.get(i as u64), bit);
        }
    }

    #[test]
    fn prop_counts_partition_size(recipe in bitmap_recipe()) {
        let (bm, _) = build(&recipe);
        prop_assert_eq!(bm.count(true) + bm.count(false), bm.size());
    }

    #[test]
    fn prop_blocks_obey_invariants(recipe in bitmap_recipe()) {
        let (bm, _) = build(&recipe);
        let mut total = 0;
        let mut prev_fill_value = None;
        for b in bm.blocks() {
            total += b.size();
            if b.is_fill() {
                // Adjacent fills of the same value must have merged.
                prop_assert_ne!(prev_fill_value, Some(b.value()));
                prev_fill_value = Some(b.value());
            } else {
                prop_assert!(b.size() <= word::WIDTH);
                prev_fill_value = None;
            }
        }
        prop_assert_eq!(total, bm.size());
    }

    #[test]
    fn prop_rank_partitions_prefix(recipe in bitmap_recipe()) {
        let (bm, _) = build(&recipe);
        if bm.is_empty() {
            return Ok(());
        }
        for i in [0, bm.size() / 2, bm.size() - 1] {
            prop_assert_eq!(
                ops::rank(&bm, true, i) + ops::rank(&bm, false, i),
                i + 1
            );
        }
    }

    #[test]
    fn prop_select_inverts_rank(recipe in bitmap_recipe()) {
        let (bm, model) = build(&recipe);
        for bit in [true, false] {
            let total = bm.count(bit);
            for i in 1..=total.min(64) {
                let pos = ops::select(&bm, bit, i);
                prop_assert!(pos != word::NPOS);
                prop_assert_eq!(model[pos as usize], bit);
                prop_assert_eq!(ops::rank(&bm, bit, pos), i);
            }
            prop_assert_eq!(ops::select(&bm, bit, total + 1), word::NPOS);
        }
    }

    #[test]
    fn prop_bitwise_identities(recipe in bitmap_recipe()) {
        let (a, _) = build(&recipe);
        prop_assert_eq!(&ops::and(&a, &a), &a);
        prop_assert_eq!(&ops::or(&a, &a), &a);
        prop_assert_eq!(ops::xor(&a, &a).count(true), 0);
        prop_assert_eq!(ops::nand(&a, &a).count(true), 0);
        // A OR NOT A covers the whole universe.
        let mut universe = Bitmap::new();
        universe.append_bits(true, a.size());
        let not_a = ops::nand(&universe, &a);
        prop_assert_eq!(ops::or(&a, &not_a).count(true), a.size());
        prop_assert_eq!(ops::and(&a, &not_a).count(true), 0);
    }

    #[test]
    fn prop_combination_matches_model(
        lhs in bitmap_recipe(),
        rhs in bitmap_recipe(),
    ) {
        let (a, ma) = build(&lhs);
        let (b, mb) = build(&rhs);
        if a.is_empty() || b.is_empty() {
            // Combination treats an empty operand as absent.
            return Ok(());
        }
        let n = ma.len().max(mb.len());
        let at = |m: &Vec<bool>, i: usize| m.get(i).copied().unwrap_or(false);
        let checks: [(&str, Bitmap, Box<dyn Fn(bool, bool) -> bool>); 3] = [
            ("and", ops::and(&a, &b), Box::new(|x, y| x & y)),
            ("or", ops::or(&a, &b), Box::new(|x, y| x | y)),
            ("xor", ops::xor(&a, &b), Box::new(|x, y| x ^ y)),
        ];
        for (name, result, op) in &checks {
            prop_assert_eq!(result.size(), n as u64, "{} size", name);
            for i in 0..n {
                prop_assert_eq!(
                    result.get(i as u64),
                    op(at(&ma, i), at(&mb, i)),
                    "{} at {}",
                    name,
                    i
                );
            }
        }
    }

    #[test]
    fn prop_demorgan(lhs in bitmap_recipe(), rhs in bitmap_recipe()) {
        let (a, ma) = build(&lhs);
        let (b, mb) = build(&rhs);
        if a.is_empty() || b.is_empty() {
            return Ok(());
        }
        let n = (ma.len().max(mb.len())) as u64;
        let mut universe = Bitmap::new();
        universe.append_bits(true, n);
        let not = |x: &Bitmap| ops::nand(&universe, x);
        let lhs_side = not(&ops::and(&a, &b));
        let rhs_side = ops::or(&not(&a), &not(&b));
        prop_assert_eq!(lhs_side.size(), rhs_side.size());
        for i in 0..n {
            prop_assert_eq!(lhs_side.get(i), rhs_side.get(i));
        }
    }
}
