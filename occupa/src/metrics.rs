//! Step-function metrics: how many resources are in use (or asked for by
//! queued jobs) over time, and their mean over a window.

use crate::helpe::*;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LoadKind {
    /// Resources held by running jobs, from start to finish.
    Utilisation,
    /// Resources asked for by waiting jobs, from submission to start.
    Queue,
}

/// `load` resources are in use from `time` until the next sample;
/// `area` is `load` times the length of that stretch.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct LoadSample {
    pub time: Time,
    pub load: u64,
    pub area: f64,
}

pub type LoadSeries = Vec<LoadSample>;

/// Sweeps the jobs' events and sums their resource counts. Simultaneous
/// events are summed before sampling, and only changes are recorded.
/// The last sample's area is 0.
pub fn load_series(jobs: &JobSet, kind: LoadKind) -> LoadSeries {
    let mut evts = match kind {
        LoadKind::Utilisation   => get_events(jobs),
        LoadKind::Queue         => get_queue_events(jobs),
    };
    let mut running: u64 = 0;
    let mut res: LoadSeries = vec![];
    while let Some((time, batch)) = pop_batch(&mut evts) {
        for e in batch {
            match e.kind {
                EventKind::Grab     => { running += e.job.size(); },
                EventKind::Release  => {
                    debug_assert!(running >= e.job.size(), "Almost overflowed load!");
                    running = running.saturating_sub(e.job.size());
                },
            }
        }
        if res.last().is_some_and(|s| s.load == running) {
            continue;
        }
        if let Some(prev) = res.last_mut() {
            prev.area = prev.load as f64 * (time - prev.time);
        }
        res.push(LoadSample {
            time,
            load: running,
            area: 0.0,
        });
    }

    res
}

/// Integral of the step function over `[begin, end)`, counting 0 outside it.
fn integrate(series: &LoadSeries, begin: Time, end: Time) -> f64 {
    series.iter()
        .zip(series.iter().skip(1).map(|s| s.time).chain(std::iter::once(Time::INFINITY)))
        .map(|(s, next)| {
            let overlap = end.min(next) - begin.max(s.time);
            if overlap > 0.0 { s.load as f64 * overlap } else { 0.0 }
        })
        .sum()
}

/// Mean load over `[begin, end)`. Load is 0 outside the series.
///
/// Fails if the window is empty, or lies entirely outside the observed
/// stretch `[first sample, last sample)` of a non-empty series.
pub fn mean_load(series: &LoadSeries, begin: Time, end: Time) -> Result<f64, TraceError> {
    let bad_window = TraceError::InvalidWindow { begin, end };
    if !(begin < end) || !begin.is_finite() || !end.is_finite() {
        return Err(bad_window);
    }
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Ok(0.0);
    };
    if !(begin < last.time && end > first.time) {
        return Err(bad_window);
    }

    Ok(integrate(series, begin, end) / (end - begin))
}

/// A job table split around a time slice.
#[derive(Clone, Debug)]
pub struct Cut {
    pub window:     Window,
    /// Submitted within the slice.
    pub workload:   JobSet,
    /// Submitted before the slice, started within or after it.
    pub queue:      JobSet,
    /// Started before the slice and still running when it begins.
    pub running:    JobSet,
}

/// Splits `jobs` around `[begin, end)`. Each part is sorted by id.
pub fn cut(jobs: &JobSet, begin: Time, end: Time) -> Result<Cut, TraceError> {
    let window = Window::new(begin, end)?;
    let pick = |pred: &dyn Fn(&Job) -> bool| -> JobSet {
        jobs.iter()
            .filter(|j| pred(j))
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .cloned()
            .collect()
    };

    Ok(Cut {
        window,
        workload:   pick(&|j| begin <= j.submission_time && j.submission_time < end),
        queue:      pick(&|j| j.submission_time < begin && j.starting_time >= begin),
        running:    pick(&|j| j.starting_time < begin && j.finish_time() > begin),
    })
}

/// Slices the trace into back-to-back periods of length `period`, starting
/// at 0, and keeps those whose mean utilisation, as a fraction of the
/// resource universe, lies within `target ± variation`. The last period
/// may stretch past the latest finish; nothing runs there.
///
/// Useful to pick sub-workloads with a known load out of a long trace.
pub fn periods_with_utilisation(
    trace:      &Trace,
    period:     Time,
    target:     f64,
    variation:  f64,
) -> Result<Vec<Cut>, TraceError> {
    if !(period > 0.0) || !period.is_finite() {
        return Err(TraceError::InvalidWindow { begin: 0.0, end: period });
    }
    let capacity = trace.universe()?.total() as f64;
    let Some((_, latest)) = trace.horizon() else {
        return Err(TraceError::EmptyTrace("no jobs to cut periods from"));
    };
    let series = trace.utilisation();

    let mut res = vec![];
    let mut begin: Time = 0.0;
    while begin < latest {
        let end = begin + period;
        let load = integrate(series, begin, end) / (period * capacity);
        if (load - target).abs() <= variation {
            res.push(cut(trace.jobs(), begin, end)?);
        }
        begin = end;
    }
    debug!("{} periods of length {} with utilisation {} ± {}", res.len(), period, target, variation);

    Ok(res)
}
