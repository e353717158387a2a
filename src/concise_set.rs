//! `ConciseSet`: the compressed, canonical, ordered integer set.
//!
//! This is the crate's primary type. It owns a single `Vec<Word>` (its
//! only heap allocation), keeps cached `size`/`last`, and bumps a
//! `modcount` on every mutation (spec.md §3's "Set state"). Every mutating
//! operation funnels through [`crate::canon::push_canonical`] /
//! [`crate::canon::trim`] — directly for bulk range operations, or via the
//! [`crate::engine`] dual-cursor walk for set algebra and interior element
//! mutation — so the canonical-form invariant (spec.md §3 invariant 5)
//! holds no matter which path produced the final content.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builder::{full_range_words, singleton_words, RunBuilder};
use crate::engine::{self, Op};
use crate::error::{Result, SetError};
use crate::iter::{Iter, RevIter};
use crate::subset::SubSet;
use crate::word::{
    block_count, literal_at, make_literal, make_zero_fill, word_popcount, Word, MAX_ALLOWED,
};

/// A compressed, canonically-represented, ordered set of non-negative
/// integers in `[0, MAX_ALLOWED]`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConciseSet {
    words: Vec<Word>,
    size: usize,
    last: i64,
    #[serde(skip)]
    modcount: u64,
}

impl Default for ConciseSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConciseSet {
    /// An empty set.
    pub fn new() -> Self {
        Self { words: Vec::new(), size: 0, last: -1, modcount: 0 }
    }

    /// Build a set from an ascending, duplicate-free stream of elements.
    /// Every element must satisfy `0 <= e <= MAX_ALLOWED` and the stream
    /// must already be sorted; this is the fast block-aware builder spec.md
    /// §4.2 calls out, not a general `add` loop.
    pub fn from_sorted<I: IntoIterator<Item = i64>>(iter: I) -> Result<Self> {
        let mut b = RunBuilder::new();
        let mut last_elem: i64 = -1;
        let mut cur_block: i64 = -1;
        let mut cur_mask: u32 = 0;
        for e in iter {
            if !(0..=MAX_ALLOWED).contains(&e) {
                return Err(SetError::OutOfRange(e));
            }
            if e <= last_elem {
                return Err(SetError::OutOfRange(e));
            }
            let block = e / 31;
            let bit = (e % 31) as u32;
            if cur_block == -1 {
                b.push_zero(block as u64);
            } else if block == cur_block {
                cur_mask |= 1 << bit;
                last_elem = e;
                continue;
            } else {
                b.push_literal(cur_mask);
                b.push_zero((block - cur_block - 1) as u64);
            }
            cur_block = block;
            cur_mask = 1 << bit;
            last_elem = e;
        }
        if cur_block != -1 {
            b.push_literal(cur_mask);
        }
        let (words, size, last) = b.finish();
        Ok(Self { words, size, last, modcount: 0 })
    }

    /// Build from any iterator (not necessarily sorted) by sorting and
    /// de-duplicating first. Prefer [`ConciseSet::from_sorted`] when the
    /// input is already ordered.
    pub fn from_iter_unsorted<I: IntoIterator<Item = i64>>(iter: I) -> Result<Self> {
        let mut v: Vec<i64> = iter.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self::from_sorted(v)
    }

    fn from_parts(words: Vec<Word>, size: usize, last: i64) -> Self {
        Self { words, size, last, modcount: 0 }
    }

    fn bump(&mut self) {
        self.modcount = self.modcount.wrapping_add(1);
    }

    /// Replace the backing word vector wholesale. Used by [`SubSet`] to
    /// write back range-scoped algebra results computed against a
    /// snapshot of `self.words()`.
    pub(crate) fn replace_words(&mut self, words: Vec<Word>, size: usize, last: i64) {
        self.words = words;
        self.size = size;
        self.last = last;
        self.bump();
    }

    // ---------------------------------------------------------------
    // Basic queries
    // ---------------------------------------------------------------

    /// Number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The current modification count, used by detached iterators to
    /// detect concurrent mutation (spec.md §5).
    #[inline]
    pub fn modcount(&self) -> u64 {
        self.modcount
    }

    /// Read-only access to the backing word vector (for diagnostics and
    /// interchange dumps).
    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn first(&self) -> Result<i64> {
        let mut it = Iter::new(&self.words);
        it.next().ok_or(SetError::Empty)
    }

    pub fn last(&self) -> Result<i64> {
        if self.last < 0 {
            return Err(SetError::Empty);
        }
        Ok(self.last)
    }

    pub fn contains(&self, i: i64) -> bool {
        if i < 0 || i > MAX_ALLOWED || i > self.last {
            return false;
        }
        let block = (i / 31) as u64;
        let bit = (i % 31) as u32;
        let mut block_base: u64 = 0;
        for &w in &self.words {
            let n = block_count(w) as u64;
            if block < block_base + n {
                let offset = (block - block_base) as u32;
                return literal_at(w, offset) & (1 << bit) != 0;
            }
            block_base += n;
        }
        false
    }

    // ---------------------------------------------------------------
    // Element mutation
    // ---------------------------------------------------------------

    /// Insert `i`. Returns whether the set changed.
    pub fn add(&mut self, i: i64) -> Result<bool> {
        if !(0..=MAX_ALLOWED).contains(&i) {
            return Err(SetError::OutOfRange(i));
        }
        if self.contains(i) {
            return Ok(false);
        }
        if i > self.last {
            self.append_fast(i);
        } else {
            let singleton = singleton_words(i);
            let (words, size, last) = engine::apply(Op::Union, &self.words, &singleton);
            self.words = words;
            self.size = size;
            self.last = last;
        }
        self.bump();
        Ok(true)
    }

    /// O(1)-amortized tail append for `i > last` (or an empty set).
    ///
    /// `singleton_words(i)` computes its leading zero-block gap relative to
    /// *absolute* block 0, which is only correct as a fresh, standalone word
    /// vector. Concatenating it onto a non-empty `self.words` would place
    /// `i` at absolute block `total_blocks(self.words) + i/31` instead of
    /// `i/31`, so the gap here is computed relative to the current tail's
    /// block instead, and only the new bit itself is pushed.
    fn append_fast(&mut self, i: i64) {
        if self.last < 0 {
            self.words = singleton_words(i);
            self.size = 1;
            self.last = i;
            return;
        }
        let last_block = self.last / 31;
        let new_block = i / 31;
        let new_bit = (i % 31) as u32;
        if new_block == last_block {
            // `i > last` and they share a block means the tail word covers
            // exactly this one block (a multi-block run's last block is
            // always fully one, per canon::trim's invariant, so `i` would
            // already be contained otherwise): fold the new bit into it.
            let old = self.words.pop().expect("non-empty set has a tail word");
            let pattern = literal_at(old, 0) | (1 << new_bit);
            crate::canon::push_canonical(&mut self.words, make_literal(pattern));
        } else {
            let gap = (new_block - last_block - 1) as u64;
            if gap > 0 {
                crate::canon::push_canonical(&mut self.words, make_zero_fill(gap, None));
            }
            crate::canon::push_canonical(&mut self.words, make_literal(1 << new_bit));
        }
        self.size += 1;
        self.last = i;
    }

    /// Remove `i`. Returns whether the set changed.
    pub fn remove(&mut self, i: i64) -> Result<bool> {
        if !(0..=MAX_ALLOWED).contains(&i) {
            return Err(SetError::OutOfRange(i));
        }
        if !self.contains(i) {
            return Ok(false);
        }
        let singleton = singleton_words(i);
        let (words, size, last) = engine::apply(Op::Difference, &self.words, &singleton);
        self.words = words;
        self.size = size;
        self.last = last;
        self.bump();
        Ok(true)
    }

    /// Toggle membership of `i`.
    pub fn flip(&mut self, i: i64) -> Result<bool> {
        if self.contains(i) {
            self.remove(i).map(|_| false)
        } else {
            self.add(i)
        }
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.size = 0;
        self.last = -1;
        self.bump();
    }

    /// Remove every element in `[from, to)`.
    pub fn clear_range(&mut self, from: i64, to: i64) {
        let range = full_range_words(from, to);
        let (words, size, last) = engine::apply(Op::Difference, &self.words, &range);
        self.words = words;
        self.size = size;
        self.last = last;
        self.bump();
    }

    /// Insert every element in `[from, to)`.
    pub fn fill_range(&mut self, from: i64, to: i64) -> Result<()> {
        if to - 1 > MAX_ALLOWED || from < 0 {
            return Err(SetError::OutOfRange(if from < 0 { from } else { to - 1 }));
        }
        let range = full_range_words(from, to);
        let (words, size, last) = engine::apply(Op::Union, &self.words, &range);
        self.words = words;
        self.size = size;
        self.last = last;
        self.bump();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Positional access
    // ---------------------------------------------------------------

    /// The `rank`-th smallest element (0-indexed).
    pub fn get(&self, rank: usize) -> Result<i64> {
        if rank >= self.size {
            return Err(SetError::OutOfRange(rank as i64));
        }
        let mut remaining = rank as u64;
        let mut block_base: u64 = 0;
        for &w in &self.words {
            let pc = word_popcount(w);
            if remaining < pc {
                return Ok(nth_set_bit(w, block_base, remaining));
            }
            remaining -= pc;
            block_base += block_count(w) as u64;
        }
        unreachable!("rank < size but ran out of words")
    }

    /// The rank of element `i`, or `None` if absent.
    pub fn index_of(&self, i: i64) -> Option<usize> {
        if i < 0 || i > self.last {
            return None;
        }
        if !self.contains(i) {
            return None;
        }
        let target_block = (i / 31) as u64;
        let target_bit = (i % 31) as u32;
        let mut rank: u64 = 0;
        let mut block_base: u64 = 0;
        for &w in &self.words {
            let n = block_count(w) as u64;
            if target_block < block_base + n {
                let offset = (target_block - block_base) as u32;
                let pattern = literal_at(w, offset);
                let within_target_block = (pattern & ((1u32 << target_bit) - 1)).count_ones() as u64;
                // Blocks before `offset` within this run: block 0 is
                // special (may carry a fill's flip), every later block has
                // a constant pattern, so its contribution is computed
                // arithmetically instead of scanned one block at a time.
                let before_target_block = if offset == 0 {
                    0
                } else {
                    let first_count = literal_at(w, 0).count_ones() as u64;
                    let tail_count = match crate::word::classify(w) {
                        crate::word::WordKind::OneFill => 31u64,
                        _ => 0u64,
                    };
                    first_count + (offset as u64 - 1) * tail_count
                };
                rank += before_target_block + within_target_block;
                return Some(rank as usize);
            }
            rank += word_popcount(w);
            block_base += n;
        }
        None
    }

    // ---------------------------------------------------------------
    // Iteration
    // ---------------------------------------------------------------

    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.words)
    }

    pub fn iter_rev(&self) -> RevIter<'_> {
        RevIter::new(&self.words)
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.iter().collect()
    }

    // ---------------------------------------------------------------
    // Set algebra — new-set variants
    // ---------------------------------------------------------------

    pub fn union(&self, other: &ConciseSet) -> ConciseSet {
        let (words, size, last) = engine::apply(Op::Union, &self.words, &other.words);
        ConciseSet::from_parts(words, size, last)
    }

    pub fn intersection(&self, other: &ConciseSet) -> ConciseSet {
        let (words, size, last) = engine::apply(Op::Intersection, &self.words, &other.words);
        ConciseSet::from_parts(words, size, last)
    }

    pub fn difference(&self, other: &ConciseSet) -> ConciseSet {
        let (words, size, last) = engine::apply(Op::Difference, &self.words, &other.words);
        ConciseSet::from_parts(words, size, last)
    }

    pub fn symmetric_difference(&self, other: &ConciseSet) -> ConciseSet {
        let (words, size, last) = engine::apply(Op::SymDiff, &self.words, &other.words);
        ConciseSet::from_parts(words, size, last)
    }

    /// A new set with every element in `[0, last]` flipped.
    pub fn complemented(&self) -> ConciseSet {
        let mut c = self.clone();
        c.complement();
        c
    }

    // ---------------------------------------------------------------
    // Set algebra — in-place variants
    // ---------------------------------------------------------------

    pub fn add_all(&mut self, other: &ConciseSet) {
        let (words, size, last) = engine::apply(Op::Union, &self.words, &other.words);
        self.words = words;
        self.size = size;
        self.last = last;
        self.bump();
    }

    pub fn remove_all(&mut self, other: &ConciseSet) {
        let (words, size, last) = engine::apply(Op::Difference, &self.words, &other.words);
        self.words = words;
        self.size = size;
        self.last = last;
        self.bump();
    }

    pub fn retain_all(&mut self, other: &ConciseSet) {
        let (words, size, last) = engine::apply(Op::Intersection, &self.words, &other.words);
        self.words = words;
        self.size = size;
        self.last = last;
        self.bump();
    }

    /// Flip every element in `[0, last]` in place (spec.md §4.4).
    /// Implemented as `difference(full_range(0, last+1), self)`, which is
    /// algebraically identical to the per-word class-inversion pass spec.md
    /// describes and reuses the engine instead of a second bespoke walk.
    pub fn complement(&mut self) {
        if self.last < 0 {
            return;
        }
        let universe = full_range_words(0, self.last + 1);
        let (words, size, last) = engine::apply(Op::Difference, &universe, &self.words);
        self.words = words;
        self.size = size;
        self.last = last;
        self.bump();
    }

    // ---------------------------------------------------------------
    // Cardinality-only algebra
    // ---------------------------------------------------------------

    pub fn union_size(&self, other: &ConciseSet) -> usize {
        engine::apply_size(Op::Union, &self.words, &other.words) as usize
    }

    pub fn intersection_size(&self, other: &ConciseSet) -> usize {
        engine::apply_size(Op::Intersection, &self.words, &other.words) as usize
    }

    pub fn difference_size(&self, other: &ConciseSet) -> usize {
        engine::apply_size(Op::Difference, &self.words, &other.words) as usize
    }

    pub fn symmetric_difference_size(&self, other: &ConciseSet) -> usize {
        engine::apply_size(Op::SymDiff, &self.words, &other.words) as usize
    }

    /// `(last + 1) - size`, the size of [`ConciseSet::complemented`]
    /// without materializing it.
    pub fn complement_size(&self) -> usize {
        if self.last < 0 {
            0
        } else {
            (self.last + 1) as usize - self.size
        }
    }

    // ---------------------------------------------------------------
    // Containment tests
    // ---------------------------------------------------------------

    pub fn contains_all(&self, other: &ConciseSet) -> bool {
        self.intersection_size(other) == other.size
    }

    pub fn contains_any(&self, other: &ConciseSet) -> bool {
        self.intersection_size(other) > 0
    }

    pub fn contains_at_least(&self, other: &ConciseSet, k: usize) -> bool {
        self.intersection_size(other) >= k
    }

    // ---------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------

    pub fn sub_set(&mut self, from: i64, to: i64) -> SubSet<'_> {
        SubSet::new(self, from, to)
    }

    pub fn head_set(&mut self, to: i64) -> SubSet<'_> {
        SubSet::new(self, 0, to)
    }

    pub fn tail_set(&mut self, from: i64) -> SubSet<'_> {
        let to = self.last.max(-1) + 1;
        SubSet::new(self, from, to.max(from))
    }

    // ---------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------

    pub fn debug_info(&self) -> String {
        let mut s = format!(
            "ConciseSet {{ words: {}, size: {}, last: {} }}\n",
            self.words.len(),
            self.size,
            self.last
        );
        for (idx, &w) in self.words.iter().enumerate() {
            use crate::word::{classify, position_bit, WordKind};
            let kind = match classify(w) {
                WordKind::Literal => "LITERAL",
                WordKind::ZeroFill => "ZERO_FILL",
                WordKind::OneFill => "ONE_FILL",
            };
            s.push_str(&format!(
                "  [{idx:>4}] {kind:<9} blocks={:<10} flip={:<3} raw=0x{w:08x}\n",
                block_count(w),
                position_bit(w),
            ));
        }
        s
    }

    /// Compressed bits over uncompressed bits needed to store `[0, last]`
    /// as a dense bitmap.
    pub fn bitmap_compression_ratio(&self) -> f64 {
        if self.last < 0 {
            return 0.0;
        }
        (self.words.len() as f64 * 32.0) / (self.last as f64 + 1.0)
    }

    /// Compressed bits over 32 bits per element stored as a plain integer
    /// array.
    pub fn collection_compression_ratio(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        (self.words.len() as f64 * 32.0) / (32.0 * self.size as f64)
    }

    // ---------------------------------------------------------------
    // Wire format
    // ---------------------------------------------------------------

    /// Serialize as `(size, last, words)` via `bincode`. An interchange
    /// convenience, not a stability promise across crate versions.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(&(self.size, self.last, &self.words))
            .map_err(|_| SetError::TypeMismatch)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (size, last, words): (usize, i64, Vec<Word>) =
            bincode::deserialize(bytes).map_err(|_| SetError::TypeMismatch)?;
        Ok(Self { words, size, last, modcount: 0 })
    }

    // ---------------------------------------------------------------
    // Detached iteration
    // ---------------------------------------------------------------

    /// A snapshot of the current elements, paired with the `modcount` at
    /// capture time. Unlike [`ConciseSet::iter`], which borrows the set and
    /// so cannot observe a mutation while it's alive, a `SnapshotIter` is
    /// detached and must be driven with the set passed back in on every
    /// call — letting it detect the one case the borrow checker can't rule
    /// out statically: the set was mutated, then handed back to an
    /// iteration that started before the mutation.
    pub fn snapshot_iter(&self) -> SnapshotIter {
        SnapshotIter { elems: self.to_vec(), pos: 0, modcount: self.modcount }
    }
}

/// See [`ConciseSet::snapshot_iter`].
pub struct SnapshotIter {
    elems: Vec<i64>,
    pos: usize,
    modcount: u64,
}

impl SnapshotIter {
    /// Advance by one, checking `set` hasn't been mutated since this
    /// snapshot was captured.
    pub fn next(&mut self, set: &ConciseSet) -> Result<Option<i64>> {
        if set.modcount != self.modcount {
            return Err(SetError::ConcurrentModification);
        }
        let v = self.elems.get(self.pos).copied();
        if v.is_some() {
            self.pos += 1;
        }
        Ok(v)
    }
}

/// Find the `n`-th (0-indexed) set bit within word `w`, whose run starts at
/// block `block_base`. Runs in time independent of the run's block count:
/// only the first block (which may carry a fill's flip) is scanned bit by
/// bit, every later block has a constant pattern so its contribution is
/// computed arithmetically.
fn nth_set_bit(w: Word, block_base: u64, n: u64) -> i64 {
    let first = literal_at(w, 0);
    let first_count = first.count_ones() as u64;
    if n < first_count {
        let mut remaining = n;
        for b in 0..31u32 {
            if first & (1 << b) != 0 {
                if remaining == 0 {
                    return (block_base * 31 + b as u64) as i64;
                }
                remaining -= 1;
            }
        }
        unreachable!()
    }

    let rest_n = n - first_count;
    let tail_pattern: u32 = match crate::word::classify(w) {
        crate::word::WordKind::OneFill => crate::word::LITERAL_MASK,
        crate::word::WordKind::ZeroFill => 0,
        crate::word::WordKind::Literal => unreachable!("a literal word has only one block"),
    };
    let per_block = tail_pattern.count_ones() as u64;
    debug_assert!(per_block > 0, "nth_set_bit called with n beyond this word's popcount");
    let block_offset = 1 + rest_n / per_block;
    let bit = (rest_n % per_block) as u32;
    ((block_base + block_offset) * 31 + bit as u64) as i64
}

impl fmt::Debug for ConciseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConciseSet")
            .field("size", &self.size)
            .field("last", &self.last)
            .field("words", &self.words.len())
            .finish()
    }
}

impl PartialEq for ConciseSet {
    fn eq(&self, other: &Self) -> bool {
        self.words == other.words
    }
}
impl Eq for ConciseSet {}

impl PartialOrd for ConciseSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConciseSet {
    /// Lexicographic order over the ascending element streams; a shorter
    /// common-prefix set sorts before a longer one (spec.md §9).
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.iter();
        let mut b = other.iter();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) => {
                    if x != y {
                        return x.cmp(&y);
                    }
                }
            }
        }
    }
}
