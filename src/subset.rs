//! Ranged sub-views over a `ConciseSet` (spec.md §4.6).
//!
//! A `SubSet` is a live handle onto `[from, to)` of a parent set: reads and
//! writes through it only ever touch elements in that range, and changes
//! are visible immediately in the parent (and vice versa) since both are
//! the same backing word vector. Concurrent-modification detection is
//! handled by the borrow checker rather than at runtime: holding a
//! `SubSet<'a>` exclusively borrows the parent for `'a`, so no other
//! handle can observe or cause the kind of torn read the Java-style
//! "ConcurrentModificationException" guards against.

use crate::builder::full_range_words;
use crate::concise_set::ConciseSet;
use crate::engine::{self, Op};
use crate::error::{Result, SetError};

/// A view restricted to `[from, to)` of a mutably-borrowed `ConciseSet`.
pub struct SubSet<'a> {
    set: &'a mut ConciseSet,
    from: i64,
    to: i64,
}

impl<'a> SubSet<'a> {
    pub(crate) fn new(set: &'a mut ConciseSet, from: i64, to: i64) -> Self {
        Self { set, from, to: to.max(from) }
    }

    #[inline]
    fn in_range(&self, i: i64) -> bool {
        i >= self.from && i < self.to
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn to(&self) -> i64 {
        self.to
    }

    pub fn contains(&self, i: i64) -> bool {
        self.in_range(i) && self.set.contains(i)
    }

    pub fn add(&mut self, i: i64) -> Result<bool> {
        if !self.in_range(i) {
            return Err(SetError::OutOfBounds { value: i, from: self.from, to: self.to });
        }
        self.set.add(i)
    }

    pub fn remove(&mut self, i: i64) -> Result<bool> {
        if !self.in_range(i) {
            return Err(SetError::OutOfBounds { value: i, from: self.from, to: self.to });
        }
        self.set.remove(i)
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_err()
    }

    /// Number of elements within `[from, to)`.
    pub fn size(&self) -> usize {
        let range = full_range_words(self.from, self.to);
        engine::apply_size(Op::Intersection, self.set.words(), &range) as usize
    }

    pub fn first(&self) -> Result<i64> {
        self.iter().next().ok_or(SetError::Empty)
    }

    pub fn last(&self) -> Result<i64> {
        self.iter().last().ok_or(SetError::Empty)
    }

    /// Ascending iteration restricted to `[from, to)`.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        let (from, to) = (self.from, self.to);
        self.set.iter().skip_while(move |&e| e < from).take_while(move |&e| e < to)
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.iter().collect()
    }

    /// Remove every element in `[from, to)`.
    pub fn clear(&mut self) {
        self.set.clear_range(self.from, self.to);
    }

    /// Insert every element in `[from, to)`.
    pub fn fill(&mut self) -> Result<()> {
        self.set.fill_range(self.from, self.to)
    }

    /// Within `[from, to)`, keep only elements also present in `other`.
    pub fn retain_all(&mut self, other: &ConciseSet) {
        let range = full_range_words(self.from, self.to);
        let (range_part, _, _) = engine::apply(Op::Intersection, self.set.words(), &range);
        let (to_remove, _, _) = engine::apply(Op::Difference, &range_part, other.words());
        let (words, size, last) = engine::apply(Op::Difference, self.set.words(), &to_remove);
        self.set.replace_words(words, size, last);
    }

    /// Within `[from, to)`, remove every element present in `other`.
    pub fn remove_all(&mut self, other: &ConciseSet) {
        let range = full_range_words(self.from, self.to);
        let (range_part, _, _) = engine::apply(Op::Intersection, other.words(), &range);
        let (words, size, last) = engine::apply(Op::Difference, self.set.words(), &range_part);
        self.set.replace_words(words, size, last);
    }

    /// Within `[from, to)`, insert every element present in `other`.
    pub fn add_all(&mut self, other: &ConciseSet) {
        let range = full_range_words(self.from, self.to);
        let (range_part, _, _) = engine::apply(Op::Intersection, other.words(), &range);
        let (words, size, last) = engine::apply(Op::Union, self.set.words(), &range_part);
        self.set.replace_words(words, size, last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_respect_bounds() {
        let mut s = ConciseSet::new();
        let mut view = s.sub_set(10, 20);
        assert!(view.add(15).unwrap());
        assert_eq!(
            view.add(5),
            Err(SetError::OutOfBounds { value: 5, from: 10, to: 20 })
        );
        assert!(view.contains(15));
        assert!(!view.contains(25));
    }

    #[test]
    fn size_and_iter_are_scoped() {
        let mut s = ConciseSet::new();
        for i in [1, 11, 15, 19, 25] {
            s.add(i).unwrap();
        }
        let view = s.sub_set(10, 20);
        assert_eq!(view.size(), 2);
        assert_eq!(view.to_vec(), vec![11, 15]);
    }

    #[test]
    fn clear_and_fill_are_scoped() {
        let mut s = ConciseSet::new();
        s.add(5).unwrap();
        s.add(15).unwrap();
        {
            let mut view = s.sub_set(10, 20);
            view.fill().unwrap();
        }
        assert!(s.contains(5));
        for i in 10..20 {
            assert!(s.contains(i));
        }
        assert!(!s.contains(20));
        {
            let mut view = s.sub_set(10, 20);
            view.clear();
        }
        assert!(s.contains(5));
        for i in 10..20 {
            assert!(!s.contains(i));
        }
    }

    #[test]
    fn retain_all_scoped_to_range() {
        let mut s = ConciseSet::new();
        for i in [1, 11, 12, 13, 25] {
            s.add(i).unwrap();
        }
        let keep = ConciseSet::from_sorted(vec![12]).unwrap();
        {
            let mut view = s.sub_set(10, 20);
            view.retain_all(&keep);
        }
        assert_eq!(s.to_vec(), vec![1, 12, 25]);
    }
}
