use occupa::*;

fn job(id: u64, start: Time, finish: Time, alloc: &str) -> Job {
    Job::from_finish(id, start, finish, alloc.parse().unwrap())
}

fn window(begin: Time, end: Time) -> Option<Window> {
    Some(Window::new(begin, end).unwrap())
}

#[test]
fn saturated_universe_has_no_free_slots() {
    let t = Trace::new(vec![job(1, 0.0, 10.0, "0-3")]).unwrap();
    let r = analyze(&t, window(0.0, 10.0), FragPolicy::default()).unwrap();
    assert_eq!(r.universe.to_string(), "0-3");
    assert!(r.free_slots.is_empty());
    assert_eq!(r.fragmentation.per_resource.len(), 4);
    let frag = t.fragmentation(None, FragPolicy::WindowNormalized { p: 2.0 }).unwrap();
    for res in 0..4 {
        assert_eq!(r.fragmentation.get(res), Some(0.0));
        assert_eq!(frag.get(res), Some(0.0));
    }
}

#[test]
fn single_gap_between_two_jobs() {
    let t = Trace::new(vec![
        job(1, 0.0, 100.0, "0"),
        job(2, 0.0, 50.0, "1"),
        job(3, 60.0, 100.0, "1"),
    ]).unwrap();
    let r = analyze(&t, window(0.0, 100.0), FragPolicy::PowerSkew { p: 2.0 }).unwrap();
    assert_eq!(r.free_slots, vec![FreeSlot {
        resources:  IntervalSet::range(1, 1),
        begin_time: 50.0,
        end_time:   60.0,
    }]);
    assert_eq!(r.gaps[&0], Vec::<Time>::new());
    assert_eq!(r.gaps[&1], vec![10.0]);
    assert_eq!(r.fragmentation.get(0), Some(0.0));
    assert_eq!(r.fragmentation.get(1), Some(0.0));

    // Same gaps, window-normalized: 1 - sqrt(10^2) / (100 × 2).
    let frag = t.fragmentation(window(0.0, 100.0), FragPolicy::WindowNormalized { p: 2.0 }).unwrap();
    assert_eq!(frag.get(0), Some(0.0));
    assert!((frag.get(1).unwrap() - 0.95).abs() < 1e-12);
}

#[test]
fn interval_set_notation() {
    let a: IntervalSet = "1 2 3 7-9 13".parse().unwrap();
    assert_eq!(a.ranges(), &[(1, 3), (7, 9), (13, 13)]);

    let lhs = IntervalSet::aggregate([(1, 1), (3, 4)]).unwrap();
    let rhs = IntervalSet::aggregate([(1, 2), (4, 7)]).unwrap();
    assert_eq!(lhs.difference(&rhs).ranges(), &[(3, 3)]);
    assert_eq!(lhs.ranges(), &[(1, 1), (3, 4)]);

    assert_eq!(IntervalSet::aggregate([(1, 2), (3, 4)]).unwrap().ranges(), &[(1, 4)]);
    assert_eq!(a.to_string().parse::<IntervalSet>().unwrap(), a);
}

#[test]
fn full_occupancy_means_full_utilisation() {
    let t = Trace::new(vec![job(1, 0.0, 10.0, "0-3")]).unwrap();
    assert_eq!(t.mean_utilisation(0.0, 10.0).unwrap(), 4.0);
    assert_eq!(analyze(&t, None, FragPolicy::default()).unwrap().mean_utilisation, 4.0);

    let empty = Trace::new(vec![]).unwrap();
    assert_eq!(empty.mean_utilisation(0.0, 10.0).unwrap(), 0.0);
}

#[test]
fn overlapping_rows_are_reported() {
    let t = Trace::new(vec![job(1, 0.0, 10.0, "0-3"), job(2, 5.0, 15.0, "3-4")]).unwrap();
    assert!(matches!(
        t.free_slots(None),
        Err(TraceError::InconsistentAllocation { job: JobId::Int(2), .. })
    ));
}

#[test]
fn back_to_back_jobs_leave_no_gap() {
    let t = Trace::new(vec![job(1, 0.0, 10.0, "0-1"), job(2, 10.0, 20.0, "0-1")]).unwrap();
    let series = t.free_series(None).unwrap();
    assert_eq!(series.len(), 1);
    assert!(t.free_slots(None).unwrap().is_empty());
}

#[test]
fn idle_start_is_one_slot() {
    let t = Trace::new(vec![job(1, 5.0, 10.0, "0-1")]).unwrap();
    let slots = t.free_slots(None).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!((slots[0].begin_time, slots[0].end_time), (0.0, 5.0));
    assert_eq!(slots[0].area(), 10.0);
}

#[test]
fn string_job_ids_flow_through() {
    let jobs = vec![
        Job::from_finish("w0!1", 0.0, 10.0, "0-1".parse().unwrap()),
        Job::from_finish("w0!2", 5.0, 15.0, "1-2".parse().unwrap()),
    ];
    let t = Trace::new(jobs).unwrap();
    assert_eq!(t.allocations().get(&JobId::from("w0!2")).unwrap().ranges(), &[(1, 2)]);
    match t.free_series(None) {
        Err(TraceError::InconsistentAllocation { job, .. }) => assert_eq!(job.to_string(), "w0!2"),
        other => panic!("expected an inconsistency, got {other:?}"),
    }

    let dup = Trace::new(vec![
        Job::new("w0!1", 0.0, 1.0, IntervalSet::range(0, 0)),
        Job::new("w0!1", 2.0, 1.0, IntervalSet::range(1, 1)),
    ]);
    assert!(matches!(dup, Err(TraceError::InvalidJob(_))));
}
