pub use std::{
    sync::Arc,
    cell::{Cell, OnceCell},
    collections::{BinaryHeap, BTreeSet, HashSet},
    cmp::Ordering,
    str::FromStr,
    fmt,
    time::Instant,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use rayon::prelude::*;
pub use indexmap::IndexMap;
pub(crate) use log::{debug, info, warn};

pub use crate::{Job, Trace,
    interval_set::IntervalSet,
    alloc::AllocationIndex,
    jobset::*,
    sweep::*,
    slots::*,
    frag::*,
    metrics::*,
    pstates::*,
    trace::Window,
    analyze::*,
};

/// The unit for measuring trace time. Simulators (Batsim and friends)
/// write fractional seconds, so this is a float. Every [Job] that makes
/// it past [init] has finite, non-negative times.
pub type Time = f64;

/// Resource (processor, host, core...) identifiers are non-negative
/// integers. Nothing else is assumed about them.
pub type ResourceId = u32;

/// Job identifiers, as found in trace files: mostly integers, but some
/// simulators write strings (e.g. Batsim's `workload!number`).
///
/// Integer ids sort before string ids; each kind sorts naturally.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobId {
    Int(u64),
    Str(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Int(v) => write!(f, "{v}"),
            JobId::Str(v) => write!(f, "{v}"),
        }
    }
}

/// A trace-file field: an integer if it reads as one, a string otherwise.
impl FromStr for JobId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u64>() {
            Ok(v) => JobId::Int(v),
            Err(_) => JobId::Str(s.to_string()),
        })
    }
}

impl From<u64> for JobId {
    fn from(v: u64) -> Self {
        JobId::Int(v)
    }
}

impl From<u32> for JobId {
    fn from(v: u32) -> Self {
        JobId::Int(v as u64)
    }
}

impl From<&str> for JobId {
    fn from(v: &str) -> Self {
        JobId::Str(v.to_string())
    }
}

impl From<String> for JobId {
    fn from(v: String) -> Self {
        JobId::Str(v)
    }
}

/// A group of jobs, sorted in order of increasing starting time.
pub type JobSet = Vec<Arc<Job>>;
// `Arc` is needed for `analyze_many`.

/// A token of an interval-set string that is neither `k` nor `b-e`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("bad interval token `{token}` in \"{input}\"")]
pub struct ParseError {
    pub token:  String,
    pub input:  String,
}

#[derive(Error, Debug)]
#[error("{message}\n{:?}", culprit)]
/// Appears while constructing the [JobSet] to be analyzed.
pub struct JobError {
    pub message: String,
    pub culprit: Job,
}

/// Which side of a job's lifetime an [Event] stands for.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum EventKind {
    Grab,
    Release,
}

#[derive(Error, Debug)]
pub enum TraceError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    InvalidJob(#[from] JobError),
    #[error("empty trace: {0}")]
    EmptyTrace(&'static str),
    #[error("job {job} at t={time}: {kind:?} of resources {resources} is inconsistent with the running set")]
    InconsistentAllocation {
        job:        JobId,
        time:       Time,
        kind:       EventKind,
        resources:  IntervalSet,
    },
    #[error("invalid window [{begin}, {end})")]
    InvalidWindow {
        begin:  Time,
        end:    Time,
    },
    #[error("reversed resource range [{min}, {max}]")]
    InvalidBounds {
        min:    ResourceId,
        max:    ResourceId,
    },
    #[error("machine {machine} changes power state at t={time} without an initial state")]
    NoInitialPState {
        machine:    ResourceId,
        time:       Time,
    },
    #[error("invalid power-state change time {0}")]
    InvalidPStateTime(Time),
}

#[derive(Clone, Debug)]
pub struct Event {
    pub job:    Arc<Job>,
    pub kind:   EventKind,
    // Copy time here to elude pattern matching during
    // comparison.
    pub time:   Time,
}

/// Traversal of a [JobSet] can be thought as an ordered stream
/// of events, with increasing time of occurence. Each [Job] generates
/// two events, corresponding to the start/end of its lifetime
/// respectively.
///
/// We use these events to reconstruct the free resources, the load
/// and the queue size over time.
pub type Events = BinaryHeap<Event>;

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // We're using a BinaryHeap, which is
        // a max-priority queue. We want a min-one
        // and so we're reversing the order of `cmp`.
        other.time.total_cmp(&self.time)
            .then(
                if self.kind == other.kind {
                    Ordering::Equal
                } else {
                    match self.kind {
                        // Releases pop before grabs of the same instant.
                        EventKind::Grab     => { Ordering::Less },
                        EventKind::Release  => { Ordering::Greater },
                    }
                })
            .then(other.job.id.cmp(&self.job.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}
