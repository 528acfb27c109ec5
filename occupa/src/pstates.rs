//! Machine power states over time, as rectangles (time × machines) that
//! can be drawn next to the job Gantt chart.

use crate::helpe::*;

pub type PState = i32;

/// From `time` on, every machine of `machines` is in power state `pstate`.
///
/// Changes at `time == 0` set the initial states. Every later change must
/// only touch machines that already have one.
#[derive(Clone, Debug, PartialEq)]
pub struct PStateChange {
    pub time:       Time,
    pub machines:   IntervalSet,
    pub pstate:     PState,
}

impl PStateChange {
    /// Same as building the struct, with the machines given in the
    /// trace-file notation (`"0-31"`).
    pub fn new(time: Time, machines: &str, pstate: PState) -> Result<Self, ParseError> {
        Ok(Self {
            time,
            machines: machines.parse()?,
            pstate,
        })
    }
}

/// The machines of `machines` stayed in `pstate` throughout
/// `[begin_time, end_time)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PStateSpan {
    pub machines:   IntervalSet,
    pub pstate:     PState,
    pub begin_time: Time,
    pub end_time:   Time,
}

impl PStateSpan {
    #[inline(always)]
    pub fn duration(&self) -> Time {
        self.end_time - self.begin_time
    }
}

/// Heap entry: changes pop in time order, ties in input order.
struct Pending<'a> {
    idx:    usize,
    change: &'a PStateChange,
}

impl Ord for Pending<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed, BinaryHeap is a max-heap.
        other.change.time.total_cmp(&self.change.time)
            .then(other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for Pending<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pending<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending<'_> {}

/// Machines in the same state since the same moment. Machine sets are
/// pairwise disjoint.
type Open = Vec<(IntervalSet, PState, Time)>;

/// Closes `machines` at `time` in every open span that holds some of them.
/// Zero-length spans are dropped.
fn close(open: &mut Open, machines: &IntervalSet, time: Time, res: &mut Vec<PStateSpan>) {
    *open = std::mem::take(open)
        .into_iter()
        .filter_map(|(held, pstate, since)| {
            let closed = &held & machines;
            if !closed.is_empty() && time > since {
                res.push(PStateSpan {
                    machines:   closed,
                    pstate,
                    begin_time: since,
                    end_time:   time,
                });
            }
            let rest = &held - machines;
            (!rest.is_empty()).then_some((rest, pstate, since))
        })
        .collect();
}

/// Replays power-state changes and returns the spans every group of
/// machines spent in each state, up to `end_time`.
///
/// Machines that leave the same state (entered at the same moment) through
/// the same change end up in one span. Changes may come in any order. A
/// machine initialised twice at `t = 0` keeps its last state.
pub fn pstate_spans(changes: &[PStateChange], end_time: Time) -> Result<Vec<PStateSpan>, TraceError> {
    if let Some(bad) = changes.iter().find(|c| !c.time.is_finite() || c.time < 0.0) {
        return Err(TraceError::InvalidPStateTime(bad.time));
    }
    if let Some(latest) = changes.iter().map(|c| c.time).max_by(|a, b| a.total_cmp(b)) {
        if !end_time.is_finite() || end_time < latest {
            return Err(TraceError::InvalidWindow { begin: latest, end: end_time });
        }
    }

    let mut pending: BinaryHeap<Pending> = changes.iter()
        .enumerate()
        .map(|(idx, change)| Pending { idx, change })
        .collect();
    let mut open: Open = vec![];
    let mut known = IntervalSet::new();
    let mut res = vec![];

    while let Some(Pending { change: c, .. }) = pending.pop() {
        if c.machines.is_empty() {
            continue;
        }
        if c.time > 0.0 {
            if let Some(machine) = (&c.machines - &known).first() {
                return Err(TraceError::NoInitialPState { machine, time: c.time });
            }
        } else if known.intersects(&c.machines) {
            warn!("Machines {} initialised more than once", &known & &c.machines);
        }
        close(&mut open, &c.machines, c.time, &mut res);
        match open.iter_mut().find(|(_, p, since)| *p == c.pstate && *since == c.time) {
            Some((held, ..)) => { *held = &*held | &c.machines; },
            None => { open.push((c.machines.clone(), c.pstate, c.time)); },
        }
        known = &known | &c.machines;
    }
    close(&mut open, &known, end_time, &mut res);
    debug!("Power states: {} changes replayed into {} spans", changes.len(), res.len());

    Ok(res)
}
