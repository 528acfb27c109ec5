use crate::helpe::*;

/// A free rectangle: every resource in `resources` is free throughout
/// `[begin_time, end_time)`. The rectangle cannot be stretched in time
/// without hitting a moment where (part of) `resources` is busy.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeSlot {
    pub resources:  IntervalSet,
    pub begin_time: Time,
    pub end_time:   Time,
}

impl FreeSlot {
    #[inline(always)]
    pub fn duration(&self) -> Time {
        self.end_time - self.begin_time
    }

    /// Resource × time covered by the slot.
    #[inline(always)]
    pub fn area(&self) -> f64 {
        self.resources.total() as f64 * self.duration()
    }

    /// Returns `true` if the two slots share some resource at some moment.
    pub fn overlaps_with(&self, other: &Self) -> bool {
        self.begin_time < other.end_time &&
        other.begin_time < self.end_time &&
        self.resources.intersects(&other.resources)
    }
}

/// Turns the free-resource time series into free rectangles.
///
/// Rectangles are kept "open" while their resources stay free. Whenever
/// some resources get taken, the open rectangles holding them are cut:
/// the taken part is emitted, the rest stays open. Resources that become
/// free open a new rectangle. At `end_time` everything is closed, as if
/// the whole universe got busy.
///
/// Slots come out in the order they were closed. They never overlap, and
/// together they cover exactly the free area of `series` up to `end_time`.
pub fn extract_free_slots(series: &FreeSeries, end_time: Time) -> Result<Vec<FreeSlot>, TraceError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Ok(vec![]);
    };
    if !(end_time > last.time) {
        return Err(TraceError::InvalidWindow {
            begin:  first.time,
            end:    end_time,
        });
    }

    let mut res = vec![];
    // Resources continuously free since the paired moment.
    let mut open: Vec<(IntervalSet, Time)> = vec![];
    if !first.free.is_empty() {
        open.push((first.free.clone(), first.time));
    }
    let closing = FreeIntervalSample {
        time:   end_time,
        free:   IntervalSet::new(),
    };

    for (prev, next) in series.iter()
        .chain(std::iter::once(&closing))
        .tuple_windows() {
        let taken = &prev.free - &next.free;
        let freed = &next.free - &prev.free;
        if !taken.is_empty() {
            open = open.into_iter()
                .filter_map(|(resources, begin_time)| {
                    let closed = &resources & &taken;
                    if !closed.is_empty() {
                        res.push(FreeSlot {
                            resources:  closed,
                            begin_time,
                            end_time:   next.time,
                        });
                    }
                    let rest = &resources - &taken;
                    (!rest.is_empty()).then_some((rest, begin_time))
                })
                .collect();
        }
        if !freed.is_empty() {
            open.push((freed, next.time));
        }
    }
    debug_assert!(open.is_empty(), "Unclosed free slots!");

    Ok(res)
}

/// Presents free slots as a job table (id = row index), for consumers
/// that draw jobs, e.g. Gantt charts of the idle capacity.
pub fn as_jobs(slots: &[FreeSlot]) -> Vec<Job> {
    slots.iter()
        .enumerate()
        .map(|(idx, s)| Job::new(idx as u64, s.begin_time, s.duration(), s.resources.clone()))
        .collect()
}
