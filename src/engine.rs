//! The dual-cursor Boolean engine (spec.md §4.3).
//!
//! Every binary set-algebra operation — union, intersection, difference,
//! symmetric difference — and their cardinality-only counterparts are one
//! walk of this engine with a different [`Op`]. Two cursors advance over
//! their operand's words in lock-step, each step consuming
//! `k = min(remaining blocks in L's current word, remaining blocks in R's
//! current word)` blocks at once, so a long run on either side is absorbed
//! in one step regardless of how the other operand happens to be
//! segmented.

use crate::canon::{push_canonical, trim};
use crate::word::{
    block_count, classify, literal_at, make_literal, make_one_fill, make_zero_fill,
    position_bit, word_popcount, Word, WordKind, LITERAL_MASK,
};

/// The four binary Boolean operations this engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Union,
    Intersection,
    Difference,
    SymDiff,
}

impl Op {
    #[inline]
    fn apply(self, l: u32, r: u32) -> u32 {
        match self {
            Op::Union => l | r,
            Op::Intersection => l & r,
            Op::Difference => l & !r,
            Op::SymDiff => l ^ r,
        }
    }

    /// Whether this op still has output once `L` is exhausted but `R`
    /// has words left.
    #[inline]
    fn wants_right_tail(self) -> bool {
        matches!(self, Op::Union | Op::SymDiff)
    }

    /// Whether this op still has output once `R` is exhausted but `L`
    /// has words left.
    #[inline]
    fn wants_left_tail(self) -> bool {
        matches!(self, Op::Union | Op::Difference | Op::SymDiff)
    }
}

/// Walks one operand's words, tracking how many blocks of the current
/// word's run have already been consumed.
struct Cursor<'a> {
    words: &'a [Word],
    idx: usize,
    consumed: u64,
}

impl<'a> Cursor<'a> {
    fn new(words: &'a [Word]) -> Self {
        Self { words, idx: 0, consumed: 0 }
    }

    #[inline]
    fn done(&self) -> bool {
        self.idx >= self.words.len()
    }

    #[inline]
    fn current(&self) -> Word {
        self.words[self.idx]
    }

    #[inline]
    fn remaining_in_word(&self) -> u64 {
        block_count(self.current()) as u64 - self.consumed
    }

    #[inline]
    fn is_fill(&self) -> bool {
        classify(self.current()) != WordKind::Literal
    }

    /// The 31-bit pattern of the block the cursor is currently positioned
    /// at (applies the fill's flip only when `consumed == 0`).
    #[inline]
    fn literal_mask(&self) -> u32 {
        literal_at(self.current(), self.consumed as u32)
    }

    /// Advance by `k` blocks, moving to the next word when the current
    /// run is exhausted.
    fn advance(&mut self, k: u64) {
        self.consumed += k;
        if self.consumed >= block_count(self.current()) as u64 {
            self.idx += 1;
            self.consumed = 0;
        }
    }

    /// The remainder of the current word's run (from `consumed` onward),
    /// re-encoded as its own word. A flip already consumed (i.e.
    /// `consumed > 0`) is dropped, since that block has already passed.
    fn remainder_word(&self) -> Word {
        let w = self.current();
        let remaining = self.remaining_in_word();
        match classify(w) {
            WordKind::Literal => w,
            WordKind::ZeroFill => {
                let flip = if self.consumed == 0 { position_bit(w) } else { 0 };
                make_zero_fill_raw(remaining, flip)
            }
            WordKind::OneFill => {
                let flip = if self.consumed == 0 { position_bit(w) } else { 0 };
                make_one_fill_raw(remaining, flip)
            }
        }
    }
}

fn make_zero_fill_raw(count: u64, flip_field: u32) -> Word {
    make_zero_fill(count, if flip_field == 0 { None } else { Some(flip_field - 1) })
}

fn make_one_fill_raw(count: u64, flip_field: u32) -> Word {
    make_one_fill(count, if flip_field == 0 { None } else { Some(flip_field - 1) })
}

/// Push the `n` (`n >= 1`) constant blocks of `pattern` (`0` or
/// `LITERAL_MASK`) as a single run word, preferring a literal when `n == 1`
/// (spec.md §4.1's "tie -> prefer literal" rule).
fn push_run(out: &mut Vec<Word>, pattern: u32, n: u64) {
    if n == 0 {
        return;
    }
    if n == 1 {
        push_canonical(out, make_literal(pattern));
    } else if pattern == 0 {
        push_canonical(out, make_zero_fill(n, None));
    } else {
        push_canonical(out, make_one_fill(n, None));
    }
}

fn copy_remaining(out: &mut Vec<Word>, cursor: &mut Cursor) {
    while !cursor.done() {
        push_canonical(out, cursor.remainder_word());
        cursor.idx += 1;
        cursor.consumed = 0;
    }
}

/// Run the dual-cursor walk, materializing the result as a new canonical
/// word vector. Returns `(words, size, last)`.
pub fn apply(op: Op, l: &[Word], r: &[Word]) -> (Vec<Word>, usize, i64) {
    let mut out = Vec::new();
    let mut lc = Cursor::new(l);
    let mut rc = Cursor::new(r);

    loop {
        match (lc.done(), rc.done()) {
            (true, true) => break,
            (true, false) => {
                if op.wants_right_tail() {
                    copy_remaining(&mut out, &mut rc);
                }
                break;
            }
            (false, true) => {
                if op.wants_left_tail() {
                    copy_remaining(&mut out, &mut lc);
                }
                break;
            }
            (false, false) => step(op, &mut lc, &mut rc, &mut out),
        }
    }

    let (size, last) = trim(&mut out);
    (out, size, last)
}

/// Identical walk, but only accumulates a running popcount instead of
/// materializing an output vector — the zero-allocation path behind
/// `unionSize`/`intersectionSize`/`differenceSize`/`symmetricDifferenceSize`.
pub fn apply_size(op: Op, l: &[Word], r: &[Word]) -> u64 {
    let mut lc = Cursor::new(l);
    let mut rc = Cursor::new(r);
    let mut total: u64 = 0;

    loop {
        match (lc.done(), rc.done()) {
            (true, true) => break,
            (true, false) => {
                if op.wants_right_tail() {
                    total += tail_popcount(&rc);
                }
                break;
            }
            (false, true) => {
                if op.wants_left_tail() {
                    total += tail_popcount(&lc);
                }
                break;
            }
            (false, false) => total += step_size(op, &mut lc, &mut rc),
        }
    }
    total
}

/// Same block-aligned step as [`step`], but only returns the popcount of
/// the result instead of materializing it — no allocation.
fn step_size(op: Op, lc: &mut Cursor, rc: &mut Cursor) -> u64 {
    let k = lc.remaining_in_word().min(rc.remaining_in_word());
    let count;

    if lc.is_fill() && rc.is_fill() {
        let l_special = lc.consumed == 0 && position_bit(lc.current()) != 0;
        let r_special = rc.consumed == 0 && position_bit(rc.current()) != 0;
        if l_special || r_special {
            let first = op.apply(lc.literal_mask(), rc.literal_mask()).count_ones() as u64;
            let rest_pattern = op.apply(block_pattern(lc, 1), block_pattern(rc, 1));
            let rest = if k > 1 { (k - 1) * rest_pattern.count_ones() as u64 } else { 0 };
            count = first + rest;
        } else {
            let pattern = op.apply(block_pattern(lc, 0), block_pattern(rc, 0));
            count = k * pattern.count_ones() as u64;
        }
    } else {
        count = op.apply(lc.literal_mask(), rc.literal_mask()).count_ones() as u64;
    }

    lc.advance(k);
    rc.advance(k);
    count
}

fn tail_popcount(cursor: &Cursor) -> u64 {
    let w = cursor.current();
    let remaining = cursor.remaining_in_word();
    let this_word = match classify(w) {
        WordKind::Literal => (w & LITERAL_MASK).count_ones() as u64,
        WordKind::ZeroFill => {
            if cursor.consumed == 0 && position_bit(w) != 0 {
                1
            } else {
                0
            }
        }
        WordKind::OneFill => {
            let cleared = if cursor.consumed == 0 && position_bit(w) != 0 { 1 } else { 0 };
            remaining * 31 - cleared
        }
    };
    let rest_ones: u64 = cursor.words[cursor.idx + 1..]
        .iter()
        .map(|&w| word_popcount(w))
        .sum();
    this_word + rest_ones
}

/// Process one step of the walk: consume `k = min(remaining)` blocks from
/// both cursors and emit (or count, depending on `out`'s use) the result.
fn step(op: Op, lc: &mut Cursor, rc: &mut Cursor, out: &mut Vec<Word>) {
    let k = lc.remaining_in_word().min(rc.remaining_in_word());

    if lc.is_fill() && rc.is_fill() {
        let l_special = lc.consumed == 0 && position_bit(lc.current()) != 0;
        let r_special = rc.consumed == 0 && position_bit(rc.current()) != 0;
        if l_special || r_special {
            let merged = op.apply(lc.literal_mask(), rc.literal_mask());
            push_canonical(out, make_literal(merged));
            if k > 1 {
                let pattern = op.apply(block_pattern(lc, 1), block_pattern(rc, 1));
                push_run(out, pattern, k - 1);
            }
        } else {
            let pattern = op.apply(block_pattern(lc, 0), block_pattern(rc, 0));
            push_run(out, pattern, k);
        }
    } else {
        let merged = op.apply(lc.literal_mask(), rc.literal_mask());
        push_canonical(out, make_literal(merged));
    }

    lc.advance(k);
    rc.advance(k);
}

/// The constant pattern (`0` or `LITERAL_MASK`) a fill cursor produces at
/// any block offset `>= first_nonflip_offset` blocks past its current
/// position (i.e. ignoring the possible flip at `consumed == 0`).
fn block_pattern(cursor: &Cursor, _offset_hint: u32) -> u32 {
    match classify(cursor.current()) {
        WordKind::ZeroFill => 0,
        WordKind::OneFill => LITERAL_MASK,
        WordKind::Literal => unreachable!("block_pattern only called for fill cursors"),
    }
}
