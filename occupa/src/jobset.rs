use crate::helpe::*;

/// Initializes a JobSet with a given set of jobs.
/// A successfully returned JobSet is guaranteed to be
/// compliant with all of `occupa`'s assumptions. These are:
/// - all times are finite and non-negative
/// - no job has negative execution time
/// - no job starts before being submitted
/// - no two jobs share an id
///
/// The returned set is sorted by starting time.
///
/// This function is the gatekeeper to the rest of the library.
pub fn init(mut in_elts: Vec<Job>) -> Result<JobSet, JobError> {
    let mut seen: HashSet<&JobId> = HashSet::with_capacity(in_elts.len());
    let mut bad: Option<(usize, &'static str)> = None;
    for (idx, j) in in_elts.iter().enumerate() {
        let msg = if ![j.submission_time, j.starting_time, j.execution_time]
            .iter()
            .all(|t| t.is_finite()) {
            "Job with non-finite time found!"
        } else if j.submission_time < 0.0 || j.starting_time < 0.0 {
            "Job with negative timestamp found!"
        } else if j.execution_time < 0.0 {
            "Job with negative execution time found!"
        } else if j.starting_time < j.submission_time {
            "Job starting before its submission found!"
        } else if !seen.insert(&j.id) {
            "Duplicate job id found!"
        } else { continue; };
        bad = Some((idx, msg));
        break;
    }
    if let Some((idx, msg)) = bad {
        return Err(JobError {
            message: String::from(msg),
            culprit: in_elts.swap_remove(idx),
        });
    }
    in_elts.sort_unstable();

    Ok(in_elts
        .into_iter()
        .map(Arc::new)
        .collect())
}

/// Builds the min-heap of occupancy events: a [EventKind::Grab] at each
/// job's start and a [EventKind::Release] at its finish.
///
/// Jobs that hold nothing, or hold it for zero time, never change the
/// occupancy and are left out.
#[inline(always)]
pub fn get_events(jobs: &JobSet) -> Events {
    events_by(jobs, |j| (j.starting_time, j.finish_time()))
}

/// Same as [get_events], but on the queue side of each job's life: it
/// grabs a queue slot at submission and releases it when starting.
#[inline(always)]
pub fn get_queue_events(jobs: &JobSet) -> Events {
    events_by(jobs, |j| (j.submission_time, j.starting_time))
}

fn events_by<F>(jobs: &JobSet, endpoints: F) -> Events
where F: Fn(&Job) -> (Time, Time) {
    let mut res = BinaryHeap::with_capacity(2 * jobs.len());
    for j in jobs {
        let (grab, release) = endpoints(j);
        if release <= grab || j.allocated.is_empty() {
            continue;
        }
        res.push(Event {
            job:    j.clone(),
            kind:   EventKind::Grab,
            time:   grab,
        });
        res.push(Event {
            job:    j.clone(),
            kind:   EventKind::Release,
            time:   release,
        });
    };

    res
}

/// Pops every event sharing the earliest timestamp. Releases come
/// out first.
#[inline(always)]
pub fn pop_batch(evts: &mut Events) -> Option<(Time, Vec<Event>)> {
    let first = evts.pop()?;
    let time = first.time;
    let mut batch = vec![first];
    while evts.peek().is_some_and(|e| e.time == time) {
        if let Some(e) = evts.pop() {
            batch.push(e);
        }
    }

    Some((time, batch))
}

/// Returns (earliest start, latest finish), or `None` for an empty set.
#[inline(always)]
pub fn get_horizon(jobs: &JobSet) -> Option<(Time, Time)> {
    if jobs.is_empty() {
        return None;
    }

    Some(jobs.iter()
        .fold((Time::INFINITY, 0.0), |(earliest, latest): (Time, Time), j| {
            (earliest.min(j.starting_time), latest.max(j.finish_time()))
        }))
}

/// Maximum number of resources simultaneously in use.
#[inline(always)]
pub fn get_max_load(jobs: &JobSet) -> u64 {
    let (mut running, mut max) = (0u64, 0u64);
    let mut evts = get_events(jobs);
    // The `evts` variable is a min-priority queue on the
    // starts and ends of the jobs. Releases have priority
    // over grabs. By popping again and again, we have
    // our "traversal" from left to right.
    while let Some(evt) = evts.pop() {
        match evt.kind {
            EventKind::Grab     => {
                running += evt.job.size();
                max = max.max(running);
            },
            EventKind::Release  => {
                debug_assert!(running >= evt.job.size(), "Almost overflowed load!");
                running = running.saturating_sub(evt.job.size());
            },
        }
    }

    max
}

/// The jobs holding resources at moment `t`.
pub fn running_at(jobs: &JobSet, t: Time) -> JobSet {
    jobs.iter()
        .filter(|j| j.is_running_at(t))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn job(id: u64, start: Time, exec: Time, b: ResourceId, e: ResourceId) -> Job {
        Job::new(id, start, exec, IntervalSet::range(b, e))
    }

    #[test]
    fn init_sorts_by_start() {
        let set = init(vec![
            job(1, 5.0, 1.0, 0, 0),
            job(2, 0.0, 1.0, 0, 0),
            job(3, 2.0, 1.0, 0, 0),
        ]).unwrap();
        let ids: Vec<JobId> = set.iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids, [2u64, 3, 1].map(JobId::from));
    }

    #[test]
    fn init_rejects_bad_jobs() {
        let err = init(vec![job(1, 0.0, 1.0, 0, 0), job(1, 3.0, 1.0, 0, 0)]).unwrap_err();
        assert_eq!(err.message, "Duplicate job id found!");
        assert_eq!(err.culprit.starting_time, 3.0);

        assert!(init(vec![job(1, 0.0, -1.0, 0, 0)]).is_err());
        assert!(init(vec![job(1, Time::NAN, 1.0, 0, 0)]).is_err());
        assert!(init(vec![job(1, -2.0, 1.0, 0, 0)]).is_err());
        assert!(init(vec![job(1, 2.0, 1.0, 0, 0).with_submission(3.0)]).is_err());
        assert!(init(vec![]).unwrap().is_empty());
    }

    #[test]
    fn string_ids_are_checked_too() {
        let r = IntervalSet::range(0, 0);
        let err = init(vec![
            Job::new("w0!1", 0.0, 1.0, r.clone()),
            Job::new(1u64, 1.0, 1.0, r.clone()),
            Job::new("w0!1", 2.0, 1.0, r.clone()),
        ]).unwrap_err();
        assert_eq!(err.culprit.id, JobId::from("w0!1"));
        assert_eq!(err.culprit.starting_time, 2.0);

        // "1" as a string and 1 as an integer are different jobs.
        assert!(init(vec![Job::new("1", 0.0, 1.0, r.clone()), Job::new(1u64, 0.0, 1.0, r)]).is_ok());
    }

    #[test]
    fn releases_pop_before_grabs() {
        let set = init(vec![job(1, 0.0, 10.0, 0, 1), job(2, 10.0, 5.0, 0, 1)]).unwrap();
        let mut evts = get_events(&set);
        let order: Vec<(Time, EventKind, JobId)> = std::iter::from_fn(|| evts.pop())
            .map(|e| (e.time, e.kind, e.job.id.clone()))
            .collect();
        assert_eq!(order, vec![
            (0.0, EventKind::Grab, JobId::Int(1)),
            (10.0, EventKind::Release, JobId::Int(1)),
            (10.0, EventKind::Grab, JobId::Int(2)),
            (15.0, EventKind::Release, JobId::Int(2)),
        ]);
    }

    #[test]
    fn void_jobs_emit_nothing() {
        let set = init(vec![
            job(1, 3.0, 0.0, 0, 1),
            Job::new(2u64, 0.0, 4.0, IntervalSet::new()),
        ]).unwrap();
        assert!(get_events(&set).is_empty());
    }

    #[test]
    fn batches_group_equal_times() {
        let set = init(vec![job(1, 0.0, 10.0, 0, 1), job(2, 10.0, 5.0, 2, 3), job(3, 0.0, 10.0, 4, 4)]).unwrap();
        let mut evts = get_events(&set);
        let (t, batch) = pop_batch(&mut evts).unwrap();
        assert_eq!((t, batch.len()), (0.0, 2));
        let (t, batch) = pop_batch(&mut evts).unwrap();
        assert_eq!((t, batch.len()), (10.0, 3));
        assert_eq!(batch[0].kind, EventKind::Release);
        assert_eq!(batch[2].kind, EventKind::Grab);
    }

    #[test]
    fn horizon_and_load() {
        let set = init(vec![job(1, 0.0, 10.0, 0, 1), job(2, 5.0, 10.0, 2, 4), job(3, 10.0, 2.0, 0, 0)]).unwrap();
        assert_eq!(get_horizon(&set), Some((0.0, 15.0)));
        assert_eq!(get_max_load(&set), 5);
        assert_eq!(running_at(&set, 10.0).len(), 2);
        assert_eq!(get_horizon(&vec![]), None);
    }
}
