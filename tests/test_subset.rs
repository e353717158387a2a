use concise_set::ConciseSet;

#[test]
fn sub_view_mirrors_parent_both_ways() {
    let mut s = ConciseSet::from_sorted(vec![1, 5, 10, 15, 20, 25, 30]).unwrap();

    {
        let view = s.sub_set(10, 25);
        assert_eq!(view.to_vec(), vec![10, 15, 20]);
    }

    s.sub_set(10, 25).add(12).unwrap();
    assert!(s.contains(12));

    s.remove(15).unwrap();
    let view = s.sub_set(10, 25);
    assert_eq!(view.to_vec(), vec![10, 12, 20]);
}

#[test]
fn head_and_tail_views() {
    let mut s = ConciseSet::from_sorted(vec![1, 5, 10, 50, 100]).unwrap();
    assert_eq!(s.head_set(10).to_vec(), vec![1, 5]);
    assert_eq!(s.tail_set(10).to_vec(), vec![10, 50, 100]);
}

#[test]
fn sub_view_clear_and_fill_round_trip() {
    let mut s = ConciseSet::new();
    s.sub_set(1000, 1010).fill().unwrap();
    assert_eq!(s.size(), 10);
    for i in 1000..1010 {
        assert!(s.contains(i));
    }
    s.sub_set(1003, 1006).clear();
    assert_eq!(s.to_vec(), vec![1000, 1001, 1002, 1006, 1007, 1008, 1009]);
}

#[test]
fn out_of_bounds_mutation_is_rejected() {
    let mut s = ConciseSet::new();
    let mut view = s.sub_set(10, 20);
    assert!(view.add(10).is_ok());
    assert!(view.add(20).is_err());
    assert!(view.add(9).is_err());
}
