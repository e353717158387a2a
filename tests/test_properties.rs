use std::collections::BTreeSet;

use concise_set::ConciseSet;
use proptest::prelude::*;

fn elems_strategy() -> impl Strategy<Item = Vec<i64>> {
    proptest::collection::vec(0i64..1_000_000, 0..200)
}

proptest! {
    #[test]
    fn representation_canonicality(
        ops in proptest::collection::vec((any::<bool>(), 0i64..1_000_000), 0..300)
    ) {
        let mut s = ConciseSet::new();
        let mut reference: BTreeSet<i64> = BTreeSet::new();
        for (is_add, v) in ops {
            if is_add {
                s.add(v).unwrap();
                reference.insert(v);
            } else {
                s.remove(v).unwrap();
                reference.remove(&v);
            }
        }
        let fresh = ConciseSet::from_sorted(reference.into_iter().collect::<Vec<_>>()).unwrap();
        prop_assert_eq!(s.words(), fresh.words());
    }

    #[test]
    fn membership_consistency(v in 0i64..1_000_000) {
        let mut s = ConciseSet::new();
        prop_assert!(s.add(v).unwrap());
        prop_assert!(s.contains(v));
        let before = s.words().to_vec();
        prop_assert!(!s.add(v).unwrap());
        prop_assert_eq!(s.words(), before.as_slice());
        prop_assert!(s.remove(v).unwrap());
        prop_assert!(!s.contains(v));
    }

    #[test]
    fn size_consistency(elems in elems_strategy()) {
        let s = ConciseSet::from_iter_unsorted(elems.clone()).unwrap();
        prop_assert_eq!(s.size(), s.iter().count());

        let shifted: Vec<i64> = elems.iter().map(|&x| (x + 7) % 1_000_000).collect();
        let other = ConciseSet::from_iter_unsorted(shifted).unwrap();
        prop_assert_eq!(s.union_size(&other), s.union(&other).size());
        prop_assert_eq!(s.intersection_size(&other), s.intersection(&other).size());
        prop_assert_eq!(s.difference_size(&other), s.difference(&other).size());
        prop_assert_eq!(
            s.symmetric_difference_size(&other),
            s.symmetric_difference(&other).size()
        );
    }

    #[test]
    fn algebra_laws(a in elems_strategy(), b in elems_strategy()) {
        let l = ConciseSet::from_iter_unsorted(a).unwrap();
        let r = ConciseSet::from_iter_unsorted(b).unwrap();

        prop_assert_eq!(l.union(&r).words(), r.union(&l).words());
        prop_assert_eq!(l.intersection(&r).words(), r.intersection(&l).words());
        prop_assert_eq!(
            l.symmetric_difference(&r).words(),
            r.symmetric_difference(&l).words()
        );

        let sym = l.symmetric_difference(&r);
        let expect_sym = l.union(&r).difference(&l.intersection(&r));
        prop_assert_eq!(sym.words(), expect_sym.words());

        let universe_last = l.last().unwrap_or(-1).max(r.last().unwrap_or(-1));
        if universe_last >= 0 {
            let universe = ConciseSet::from_sorted((0..=universe_last).collect::<Vec<_>>()).unwrap();
            let union_complement = universe.difference(&l.union(&r));
            let intersection_of_complements =
                universe.difference(&l).intersection(&universe.difference(&r));
            prop_assert_eq!(union_complement.words(), intersection_of_complements.words());
        }
    }

    #[test]
    fn double_complement_is_identity(elems in elems_strategy()) {
        let s = ConciseSet::from_iter_unsorted(elems).unwrap();
        let twice = s.complemented().complemented();
        prop_assert_eq!(s.words(), twice.words());
    }

    #[test]
    fn sub_view_fidelity(elems in elems_strategy(), a in 0i64..1_000_000, span in 1i64..5000) {
        let b = a + span;
        let mut expect: Vec<i64> = elems.iter().copied().filter(|&x| x >= a && x < b).collect();
        expect.sort_unstable();
        expect.dedup();

        let mut s = ConciseSet::from_iter_unsorted(elems).unwrap();
        let view = s.sub_set(a, b);
        prop_assert_eq!(view.to_vec(), expect);
    }

    #[test]
    fn comparator_is_lexicographic(a in elems_strategy(), b in elems_strategy()) {
        let l = ConciseSet::from_iter_unsorted(a.clone()).unwrap();
        let r = ConciseSet::from_iter_unsorted(b.clone()).unwrap();

        let mut sa = a;
        sa.sort_unstable();
        sa.dedup();
        let mut sb = b;
        sb.sort_unstable();
        sb.dedup();

        prop_assert_eq!(l.cmp(&r), sa.cmp(&sb));
    }
}
