//! Event-driven reconstruction of the free resources over time.

use crate::helpe::*;

/// The set of free resources right after every event at `time` has
/// been applied. It holds until the next sample.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeIntervalSample {
    pub time: Time,
    pub free: IntervalSet,
}

/// Samples in strictly increasing time order. Two consecutive samples
/// never carry the same free set.
pub type FreeSeries = Vec<FreeIntervalSample>;

/// Applies one event to the running free set.
///
/// A grab must take resources that are all free; a release must give back
/// resources that are all busy. Anything else means two jobs overlap in
/// the input (or a job lies outside the universe) and is reported.
pub(crate) fn apply_event(free: &mut IntervalSet, evt: &Event) -> Result<(), TraceError> {
    let alloc = &evt.job.allocated;
    let consistent = match evt.kind {
        EventKind::Grab     => alloc.is_subset(free),
        EventKind::Release  => !alloc.intersects(free),
    };
    if !consistent {
        return Err(TraceError::InconsistentAllocation {
            job:        evt.job.id.clone(),
            time:       evt.time,
            kind:       evt.kind,
            resources:  alloc.clone(),
        });
    }
    *free = match evt.kind {
        EventKind::Grab     => &*free - alloc,
        EventKind::Release  => &*free | alloc,
    };

    Ok(())
}

/// Sweeps the jobs' start/finish events in time order and records the
/// free resources of `universe` at every instant the running set changes.
///
/// - The first sample is taken at `begin`, after every event at or before
///   `begin` has been applied (jobs already running count as busy).
/// - Events sharing a timestamp are applied as one batch, releases first,
///   and produce a single sample. A resource released and re-grabbed at
///   the same instant never shows up as free.
/// - Events at or after `end` (when given) are ignored.
pub fn free_series(
    jobs:       &JobSet,
    universe:   &IntervalSet,
    begin:      Time,
    end:        Option<Time>,
) -> Result<FreeSeries, TraceError> {
    if !begin.is_finite() || end.is_some_and(|e| !(e > begin) || !e.is_finite()) {
        return Err(TraceError::InvalidWindow {
            begin,
            end: end.unwrap_or(Time::INFINITY),
        });
    }
    let mut free = universe.clone();
    let mut evts = get_events(jobs);
    let num_evts = evts.len();

    // Clamp everything that happened before the window to its left edge.
    while evts.peek().is_some_and(|e| e.time <= begin) {
        if let Some(e) = evts.pop() {
            apply_event(&mut free, &e)?;
        }
    }
    let mut res = vec![FreeIntervalSample {
        time:   begin,
        free:   free.clone(),
    }];

    while let Some((time, batch)) = pop_batch(&mut evts) {
        if end.is_some_and(|e| time >= e) {
            break;
        }
        for e in &batch {
            apply_event(&mut free, e)?;
        }
        if res.last().is_some_and(|s| s.free == free) {
            continue;
        }
        res.push(FreeIntervalSample {
            time,
            free: free.clone(),
        });
    }
    debug!("Free series: {} events swept into {} samples", num_evts, res.len());

    Ok(res)
}

/// Appends the "nothing is free" sample at `end`, for consumers that
/// expect the series to be closed explicitly.
pub fn with_sentinel(mut series: FreeSeries, end: Time) -> FreeSeries {
    if series.last().map_or(true, |s| s.time < end) {
        series.push(FreeIntervalSample {
            time: end,
            free: IntervalSet::new(),
        });
    }

    series
}

/// The free set in effect at moment `t`, if `t` is not before the
/// first sample.
pub fn free_at(series: &FreeSeries, t: Time) -> Option<&IntervalSet> {
    let idx = series.partition_point(|s| s.time <= t);
    idx.checked_sub(1).map(|i| &series[i].free)
}
