//! Welcome to `occupa`!
//!
//! `occupa` reconstructs resource occupancy from parallel-job scheduling
//! traces (the kind cluster and HPC simulators write out) and derives
//! metrics from it:
//!
//! 1. a time series of the set of *free* resources ([free_series]),
//! 2. the maximal free rectangles, time × resources ([extract_free_slots]),
//! 3. a per-resource fragmentation index over those rectangles ([fragmentation]),
//! 4. utilisation and queue step functions ([load_series]),
//! 5. machine power-state spans ([pstate_spans]).
//!
//! Reading trace files and plotting are left to the caller: `occupa`
//! consumes a table of [Job]s and produces plain data.

mod job;
mod trace;

pub mod interval_set;
pub mod alloc;
pub mod jobset;
pub mod sweep;
pub mod slots;
pub mod frag;
pub mod metrics;
pub mod pstates;
pub mod analyze;
pub mod helpe;

pub use crate::helpe::*;

/// One row of a scheduling trace: a job that waited in the queue from
/// [`submission_time`](Job::submission_time), then ran on the
/// [`allocated`](Job::allocated) resources from
/// [`starting_time`](Job::starting_time) for
/// [`execution_time`](Job::execution_time) time units.
///
/// > ***ATTENTION:*** Lifetimes are *half-open*. A job occupies its
/// > resources during `[starting_time, finish_time)`. If a job finishes at
/// > the same time that another one starts, the two may use the same
/// > resources.
#[derive(Debug, Clone)]
pub struct Job {
    pub id:                 JobId,
    pub submission_time:    Time,
    pub starting_time:      Time,
    pub execution_time:     Time,
    pub allocated:          IntervalSet,
}

/// The entity most of `occupa`'s operations hang from: a validated
/// [JobSet], the resource universe it lives in, and the results derived
/// from it so far.
///
/// Derived results are computed on first use and cached. Only explicit
/// mutation of the trace (see [Trace::rebase]) throws them away.
#[derive(Clone, Debug)]
pub struct Trace {
    jobs:   JobSet,
    bounds: Option<(ResourceId, ResourceId)>,
    info:   trace::Info,
}
