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

//! Bitwise algorithms over compressed bitmaps
//!
//! All combinations are non-mutating and allocate a fresh bitmap. The
//! walk operates block-wise: aligned fills combine in O(1) regardless of
//! their length, and literals combine word-at-a-time. Results are
//! zero-extended to `max(|lhs|, |rhs|)` so that complements of a result
//! remain well-defined in later operations.

use crate::bitmap::Bitmap;
use crate::bits::Bits;
use crate::word;

/// Applies a block-wise binary operation to two bitmaps.
///
/// The fill flags control behavior once one side is exhausted: a side
/// with its flag set has its remaining blocks appended verbatim. `AND`
/// binds `(false, false)`, `OR` and `XOR` bind `(true, true)`, and
/// `NAND` binds `(true, false)`.
pub fn apply<F>(lhs: &Bitmap, rhs: &Bitmap, fill_lhs: bool, fill_rhs: bool, op: F) -> Bitmap
where
    F: Fn(u64, u64) -> u64,
{
    let mut result = Bitmap::new();
    if lhs.is_empty() && rhs.is_empty() {
        return result;
    }
    if lhs.is_empty() {
        return rhs.clone();
    }
    if rhs.is_empty() {
        return lhs.clone();
    }
    let lb = lhs.blocks();
    let rb = rhs.blocks();
    let mut li = 0;
    let mut ri = 0;
    // Bits remaining in the current block on each side.
    let mut lhs_bits = lb[0].size();
    let mut rhs_bits = rb[0].size();
    // A fill here means: homogeneous with at least a word of bits left.
    // A fill whose remainder dropped below the word width combines as a
    // literal, masked to its remaining length.
    let fill = |b: &Bits, remaining: u64| b.homogeneous() && remaining >= word::WIDTH;
    while li < lb.len() && ri < rb.len() {
        let l = &lb[li];
        let r = &rb[ri];
        if fill(l, lhs_bits) && fill(r, rhs_bits) {
            let n = lhs_bits.min(rhs_bits);
            let block = op(l.data(), r.data());
            debug_assert!(word::all_or_none(block));
            result.append_bits(block != word::NONE, n);
            lhs_bits -= n;
            rhs_bits -= n;
        } else if fill(l, lhs_bits) {
            debug_assert!(rhs_bits > 0 && rhs_bits <= word::WIDTH);
            let block = op(l.data(), r.data() & word::lsb_fill(rhs_bits));
            result.append_block(block, word::WIDTH);
            lhs_bits -= word::WIDTH;
            rhs_bits = 0;
        } else if fill(r, rhs_bits) {
            debug_assert!(lhs_bits > 0 && lhs_bits <= word::WIDTH);
            let block = op(l.data() & word::lsb_fill(lhs_bits), r.data());
            result.append_block(block, word::WIDTH);
            rhs_bits -= word::WIDTH;
            lhs_bits = 0;
        } else {
            let block = op(
                l.data() & word::lsb_fill(lhs_bits),
                r.data() & word::lsb_fill(rhs_bits),
            );
            result.append_block(block, lhs_bits.max(rhs_bits));
            lhs_bits = 0;
            rhs_bits = 0;
        }
        if lhs_bits == 0 {
            li += 1;
            if li < lb.len() {
                lhs_bits = lb[li].size();
            }
        }
        if rhs_bits == 0 {
            ri += 1;
            if ri < rb.len() {
                rhs_bits = rb[ri].size();
            }
        }
    }
    if fill_lhs {
        while li < lb.len() {
            append_remaining(&mut result, &lb[li], lhs_bits);
            li += 1;
            if li < lb.len() {
                lhs_bits = lb[li].size();
            }
        }
    }
    if fill_rhs {
        while ri < rb.len() {
            append_remaining(&mut result, &rb[ri], rhs_bits);
            ri += 1;
            if ri < rb.len() {
                rhs_bits = rb[ri].size();
            }
        }
    }
    // Zero-extend so the complement of the result stays meaningful for
    // operands of size max(|lhs|, |rhs|).
    let max_size = lhs.size().max(rhs.size());
    debug_assert!(max_size >= result.size());
    result.append_bits(false, max_size - result.size());
    result
}

fn append_remaining(result: &mut Bitmap, block: &Bits, remaining: u64) {
    if block.homogeneous() {
        result.append_bits(block.value(), remaining);
    } else {
        result.append_block(block.data(), block.size());
    }
}

pub fn and(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    apply(lhs, rhs, false, false, |x, y| x & y)
}

pub fn or(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    apply(lhs, rhs, true, true, |x, y| x | y)
}

pub fn xor(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    apply(lhs, rhs, true, true, |x, y| x ^ y)
}

/// `lhs AND NOT rhs`.
pub fn nand(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    apply(lhs, rhs, true, false, |x, y| x & !y)
}

/// `lhs OR NOT rhs`.
pub fn nor(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    apply(lhs, rhs, true, true, |x, y| x | !y)
}

/// Counts occurrences of *bit* in positions `[0, i]`.
///
/// Pre: `i < bm.size()`.
pub fn rank(bm: &Bitmap, bit: bool, i: u64) -> u64 {
    assert!(i < bm.size(), "rank position out of range");
    let mut result = 0;
    let mut n = 0;
    for b in bm.blocks() {
        if i < n + b.size() {
            return result + b.rank(bit, i - n);
        }
        result += b.count_bit(bit);
        n += b.size();
    }
    unreachable!()
}

/// Position of the *i*-th occurrence of *bit* (1-based), or `NPOS`.
///
/// Pre: `i > 0`.
pub fn select(bm: &Bitmap, bit: bool, i: u64) -> u64 {
    assert!(i > 0, "select is 1-based");
    let mut cum = 0;
    let mut n = 0;
    for b in bm.blocks() {
        let count = b.count_bit(bit);
        if cum + count >= i {
            return n + b.select(bit, i - cum);
        }
        cum += count;
        n += b.size();
    }
    word::NPOS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bm(bits: &[u8]) -> Bitmap {
        Bitmap::from_bits(bits.iter().map(|&b| b != 0))
    }

    fn to_vec(bm: &Bitmap) -> Vec<u8> {
        (0..bm.size()).map(|i| bm.get(i) as u8).collect()
    }

    #[test]
    fn test_and_literals() {
        let a = bm(&[1, 1, 0, 1]);
        let b = bm(&[1, 0, 0, 1]);
        assert_eq!(to_vec(&and(&a, &b)), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_or_different_sizes() {
        let a = bm(&[1, 0]);
        let b = bm(&[0, 0, 1, 1]);
        assert_eq!(to_vec(&or(&a, &b)), vec![1, 0, 1, 1]);
    }

    #[test]
    fn test_and_result_zero_extended() {
        let a = bm(&[1, 1]);
        let b = bm(&[1, 1, 1, 1]);
        let r = and(&a, &b);
        assert_eq!(r.size(), 4);
        assert_eq!(to_vec(&r), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_or_across_word_boundary() {
        // A = two ones in an otherwise zero word, then two zero bits.
        // B = a zero word, then two ones. The union sets {0, 1, 64, 65}.
        let mut a = Bitmap::new();
        a.append_block(0b11, 64);
        a.append_bits(false, 2);
        let mut b = Bitmap::new();
        b.append_bits(false, 64);
        b.append_bits(true, 2);
        let r = or(&a, &b);
        assert_eq!(r.size(), 66);
        assert_eq!(r.count(true), 4);
        assert!(r.get(0) && r.get(1) && r.get(64) && r.get(65));
    }

    #[test]
    fn test_fill_heavy_operands() {
        let mut a = Bitmap::new();
        a.append_bits(true, 1000);
        a.append_bits(false, 1000);
        let mut b = Bitmap::new();
        b.append_bits(false, 500);
        b.append_bits(true, 1500);
        let r = and(&a, &b);
        assert_eq!(r.size(), 2000);
        assert_eq!(r.count(true), 500);
        assert_eq!(select(&r, true, 1), 500);
        assert_eq!(select(&r, true, 500), 999);
    }

    #[test]
    fn test_misaligned_fill_meets_literal() {
        // lhs fill partially consumed below a word before rhs turns
        // literal; the remainder must combine masked, not as a full word.
        let mut a = Bitmap::new();
        a.append_bits(true, 70);
        let mut b = Bitmap::new();
        b.append_bits(false, 40);
        b.append_block(0b1111, 4);
        let r = and(&a, &b);
        assert_eq!(r.size(), 70);
        assert_eq!(r.count(true), 4);
        assert_eq!(select(&r, true, 1), 40);
        assert_eq!(select(&r, true, 4), 43);
    }

    #[test]
    fn test_idempotence_and_annihilation() {
        let a = bm(&[1, 0, 1, 1, 0, 1, 0, 0, 1]);
        assert_eq!(and(&a, &a), a);
        assert_eq!(or(&a, &a), a);
        assert_eq!(xor(&a, &a).count(true), 0);
        assert_eq!(nand(&a, &a).count(true), 0);
    }

    #[test]
    fn test_demorgan() {
        let a = bm(&[1, 0, 1, 0, 1, 1]);
        let b = bm(&[0, 0, 1, 1, 0, 1]);
        let mut universe = Bitmap::new();
        universe.append_bits(true, 6);
        // NOT x within the universe is universe AND NOT x.
        let not = |x: &Bitmap| nand(&universe, x);
        let lhs = not(&and(&a, &b));
        let rhs = or(&not(&a), &not(&b));
        assert_eq!(to_vec(&lhs), to_vec(&rhs));
    }

    #[test]
    fn test_rank() {
        let mut bm = Bitmap::new();
        bm.append_bits(true, 2);
        bm.append_bits(false, 6);
        bm.append_bits(true, 1);
        assert_eq!(rank(&bm, true, 8), 3);
        assert_eq!(rank(&bm, true, 1), 2);
        assert_eq!(rank(&bm, false, 8), 6);
        // rank(true) + rank(false) = i + 1
        for i in 0..9 {
            assert_eq!(rank(&bm, true, i) + rank(&bm, false, i), i + 1);
        }
    }

    #[test]
    fn test_select() {
        let mut bm = Bitmap::new();
        bm.append_bits(true, 2);
        bm.append_bits(false, 6);
        bm.append_bits(true, 1);
        assert_eq!(select(&bm, true, 1), 0);
        assert_eq!(select(&bm, true, 2), 1);
        assert_eq!(select(&bm, true, 3), 8);
        assert_eq!(select(&bm, true, 4), word::NPOS);
        assert_eq!(select(&bm, false, 6), 7);
    }

    #[test]
    fn test_select_in_long_fill() {
        let mut bm = Bitmap::new();
        bm.append_bits(false, 1_000_000);
        bm.append_bits(true, 10);
        assert_eq!(select(&bm, true, 1), 1_000_000);
        assert_eq!(select(&bm, true, 10), 1_000_009);
        assert_eq!(select(&bm, false, 1_000_000), 999_999);
    }
}
