//! concise_set - A compressed, canonically-represented integer set.
//!
//! This crate implements the Concise (COmpressed 'N' Composable Integer
//! SEt) encoding: a WAH-family compressed bitmap where each 32-bit word is
//! either a literal 31-bit block or a run-length-encoded fill of all-zero
//! or all-one blocks (with an optional single-bit flip in the run's first
//! block). Two sets with the same members always produce byte-equal word
//! vectors, which makes equality, hashing, and on-disk comparison all a
//! plain slice comparison.
//!
//! # Architecture
//!
//! - [`word`] — the word codec: classify, pack, and unpack a single `Word`.
//! - [`canon`] — the canonical-form enforcer every mutation path funnels
//!   through.
//! - [`builder`] — block-aware construction of canonical runs (bulk build,
//!   singleton, full range).
//! - [`engine`] — the dual-cursor Boolean engine behind every set-algebra
//!   operation, materializing or cardinality-only.
//! - [`iter`] — amortized-O(1)-per-element ascending/descending iteration.
//! - [`concise_set`] — [`ConciseSet`], the public collection type.
//! - [`subset`] — [`SubSet`], a live range-restricted view over a set.
//!
//! # Example
//!
//! ```
//! use concise_set::ConciseSet;
//!
//! let mut a = ConciseSet::new();
//! for i in [1, 2, 3, 100, 1_000] {
//!     a.add(i).unwrap();
//! }
//!
//! let b = ConciseSet::from_sorted(vec![100, 101]).unwrap();
//!
//! assert_eq!(a.intersection(&b).to_vec(), vec![100]);
//! assert_eq!(a.union_size(&b), 6);
//! ```
//!
//! # Safety
//!
//! There is no `unsafe` in this crate. Bounds on element ranges are
//! validated at the public API boundary and returned as [`SetError`]
//! rather than asserted; internal word-shape invariants that the codec
//! itself guarantees are checked with `debug_assert!` in hot paths, so
//! release builds pay nothing for them.

pub mod builder;
pub mod canon;
pub mod concise_set;
pub mod engine;
pub mod error;
pub mod iter;
pub mod subset;
pub mod word;

pub use concise_set::{ConciseSet, SnapshotIter};
pub use error::{Result, SetError};
pub use subset::SubSet;
pub use word::{Word, MAX_ALLOWED};

/// The operation surface a compressed integer-set backend exposes,
/// independent of its internal representation. `ConciseSet` is the only
/// implementor this crate carries; the trait exists as the seam an
/// alternate backend (an uncompressed bitmap, say) would implement
/// against, without disturbing callers written against this interface.
pub trait IntSet {
    fn size(&self) -> usize;
    fn contains(&self, i: i64) -> bool;
    fn add(&mut self, i: i64) -> Result<bool>;
    fn remove(&mut self, i: i64) -> Result<bool>;
    fn first(&self) -> Result<i64>;
    fn last(&self) -> Result<i64>;
    fn clear(&mut self);
    fn to_vec(&self) -> Vec<i64>;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl IntSet for ConciseSet {
    fn size(&self) -> usize {
        ConciseSet::size(self)
    }
    fn contains(&self, i: i64) -> bool {
        ConciseSet::contains(self, i)
    }
    fn add(&mut self, i: i64) -> Result<bool> {
        ConciseSet::add(self, i)
    }
    fn remove(&mut self, i: i64) -> Result<bool> {
        ConciseSet::remove(self, i)
    }
    fn first(&self) -> Result<i64> {
        ConciseSet::first(self)
    }
    fn last(&self) -> Result<i64> {
        ConciseSet::last(self)
    }
    fn clear(&mut self) {
        ConciseSet::clear(self)
    }
    fn to_vec(&self) -> Vec<i64> {
        ConciseSet::to_vec(self)
    }
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name, for diagnostics.
pub const NAME: &str = "concise_set";

/// `"{NAME} v{VERSION}"`, for diagnostics.
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}
