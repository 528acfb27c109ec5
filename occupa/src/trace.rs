use crate::helpe::*;

/// A non-empty stretch of time `[begin, end)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    begin:  Time,
    end:    Time,
}

impl Window {
    pub fn new(begin: Time, end: Time) -> Result<Self, TraceError> {
        if begin.is_finite() && end.is_finite() && begin < end {
            Ok(Self { begin, end })
        } else {
            Err(TraceError::InvalidWindow { begin, end })
        }
    }

    pub fn begin(&self) -> Time {
        self.begin
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn duration(&self) -> Time {
        self.end - self.begin
    }
}

/// Stores what has been derived from a [Trace] so far.
#[derive(Clone, Debug, Default)]
pub struct Info {
    bounds:         Cell<Option<(ResourceId, ResourceId)>>,
    allocations:    OnceCell<AllocationIndex>,
    utilisation:    OnceCell<LoadSeries>,
    queue:          OnceCell<LoadSeries>,
    // Both for the default window only.
    free_series:    OnceCell<FreeSeries>,
    free_slots:     OnceCell<Vec<FreeSlot>>,
}

/// Returns the cached value, computing it first if needed. Failures are
/// not cached.
fn cached<T, F>(cell: &OnceCell<T>, f: F) -> Result<&T, TraceError>
where F: FnOnce() -> Result<T, TraceError> {
    if let Some(v) = cell.get() {
        return Ok(v);
    }
    let v = f()?;

    Ok(cell.get_or_init(|| v))
}

impl Trace {
    /// Creates a new [Trace] out of a job table, after validating it
    /// (see [init]).
    pub fn new(jobs: Vec<Job>) -> Result<Self, TraceError> {
        Ok(Self {
            jobs:   init(jobs)?,
            bounds: None,
            // We will compute the info later, on
            // a need-to basis.
            info:   Info::default(),
        })
    }

    /// Overrides the resource universe inferred from the allocations.
    pub fn with_bounds(mut self, min: ResourceId, max: ResourceId) -> Result<Self, TraceError> {
        if min > max {
            return Err(TraceError::InvalidBounds { min, max });
        }
        self.bounds = Some((min, max));
        self.info = Info::default();

        Ok(self)
    }

    pub fn jobs(&self) -> &JobSet {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Job id to allocation, plus the inferred bounds.
    pub fn allocations(&self) -> &AllocationIndex {
        self.info.allocations.get_or_init(|| AllocationIndex::build(&self.jobs))
    }

    /// Returns the explicit bounds if any were given, else the smallest
    /// and largest resource id allocated.
    pub fn resource_bounds(&self) -> Result<(ResourceId, ResourceId), TraceError> {
        match self.info.bounds.get() {
            Some(v) => Ok(v),
            None => {
                if self.jobs.is_empty() {
                    return Err(TraceError::EmptyTrace("no jobs to take resource bounds from"));
                }
                let res = match self.bounds {
                    Some(v) => v,
                    None => self.allocations().bounds()?,
                };
                self.info.bounds.set(Some(res));

                Ok(res)
            }
        }
    }

    pub fn universe(&self) -> Result<IntervalSet, TraceError> {
        let (min, max) = self.resource_bounds()?;
        Ok(IntervalSet::range(min, max))
    }

    /// Returns (earliest start, latest finish).
    pub fn horizon(&self) -> Option<(Time, Time)> {
        get_horizon(&self.jobs)
    }

    /// `[0, latest finish)`.
    pub fn default_window(&self) -> Result<Window, TraceError> {
        match self.horizon() {
            Some((_, latest)) => Window::new(0.0, latest),
            None => Err(TraceError::EmptyTrace("no jobs to take a window from")),
        }
    }

    fn window_or_default(&self, window: Option<Window>) -> Result<Window, TraceError> {
        match window {
            Some(w) => Ok(w),
            None => self.default_window(),
        }
    }

    fn compute_free_series(&self, window: Window) -> Result<FreeSeries, TraceError> {
        free_series(&self.jobs, &self.universe()?, window.begin(), Some(window.end()))
    }

    /// Free resources over `window` (default: [Trace::default_window]).
    pub fn free_series(&self, window: Option<Window>) -> Result<FreeSeries, TraceError> {
        match window {
            Some(w) => self.compute_free_series(w),
            None => cached(&self.info.free_series, || {
                self.compute_free_series(self.default_window()?)
            }).cloned(),
        }
    }

    /// Free rectangles over `window` (default: [Trace::default_window]).
    pub fn free_slots(&self, window: Option<Window>) -> Result<Vec<FreeSlot>, TraceError> {
        match window {
            Some(w) => extract_free_slots(&self.free_series(Some(w))?, w.end()),
            None => cached(&self.info.free_slots, || {
                let w = self.default_window()?;
                extract_free_slots(&self.free_series(None)?, w.end())
            }).cloned(),
        }
    }

    /// Durations of the free slots covering each resource of the universe.
    pub fn gaps(&self, window: Option<Window>) -> Result<ResourceGaps, TraceError> {
        Ok(free_resources_gaps(&self.free_slots(window)?, &self.universe()?))
    }

    pub fn fragmentation(&self, window: Option<Window>, policy: FragPolicy) -> Result<Fragmentation, TraceError> {
        let w = self.window_or_default(window)?;
        Ok(fragmentation(&self.gaps(Some(w))?, policy, w.duration()))
    }

    /// Resources in use over time.
    pub fn utilisation(&self) -> &LoadSeries {
        self.info.utilisation.get_or_init(|| load_series(&self.jobs, LoadKind::Utilisation))
    }

    /// Resources asked for by waiting jobs over time.
    pub fn queue(&self) -> &LoadSeries {
        self.info.queue.get_or_init(|| load_series(&self.jobs, LoadKind::Queue))
    }

    pub fn mean_utilisation(&self, begin: Time, end: Time) -> Result<f64, TraceError> {
        mean_load(self.utilisation(), begin, end)
    }

    pub fn max_load(&self) -> u64 {
        get_max_load(&self.jobs)
    }

    /// Shifts every timestamp so that the earliest submission happens
    /// at 0. Everything derived so far is forgotten.
    pub fn rebase(&mut self) {
        let Some(delta) = self.jobs.iter()
            .map(|j| j.submission_time)
            .min_by(|a, b| a.total_cmp(b)) else { return };
        self.jobs = self.jobs.iter()
            .map(|j| Arc::new(j.shifted(delta)))
            .collect();
        self.info = Info::default();
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn job(id: u64, start: Time, exec: Time, alloc: &str) -> Job {
        Job::with_allocation_str(id, start, exec, alloc).unwrap()
    }

    #[test]
    fn windows_must_be_non_empty() {
        assert!(Window::new(0.0, 1.0).is_ok());
        assert!(matches!(Window::new(1.0, 1.0), Err(TraceError::InvalidWindow { .. })));
        assert!(Window::new(2.0, 1.0).is_err());
        assert!(Window::new(0.0, Time::INFINITY).is_err());
        assert_eq!(Window::new(2.0, 5.0).unwrap().duration(), 3.0);
    }

    #[test]
    fn empty_trace_has_no_bounds() {
        let t = Trace::new(vec![]).unwrap();
        assert!(matches!(t.resource_bounds(), Err(TraceError::EmptyTrace(_))));
        assert!(matches!(t.fragmentation(None, FragPolicy::default()), Err(TraceError::EmptyTrace(_))));
        assert!(t.utilisation().is_empty());
    }

    #[test]
    fn invalid_jobs_are_refused() {
        let err = Trace::new(vec![job(1, 0.0, -1.0, "0")]).unwrap_err();
        assert!(matches!(err, TraceError::InvalidJob(_)));
    }

    #[test]
    fn explicit_bounds_override_inferred_ones() {
        let t = Trace::new(vec![job(1, 0.0, 10.0, "2-3")]).unwrap();
        assert_eq!(t.resource_bounds().unwrap(), (2, 3));
        let t = t.with_bounds(0, 5).unwrap();
        assert_eq!(t.universe().unwrap(), IntervalSet::range(0, 5));
        let slots = t.free_slots(None).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].resources.ranges(), &[(0, 1), (4, 5)]);
        assert_eq!(slots[0].duration(), 10.0);
    }

    #[test]
    fn reversed_bounds_are_refused() {
        let t = Trace::new(vec![job(1, 0.0, 10.0, "2-3")]).unwrap();
        assert!(matches!(t.with_bounds(5, 2), Err(TraceError::InvalidBounds { min: 5, max: 2 })));
    }

    #[test]
    fn cached_and_explicit_windows_agree() {
        let t = Trace::new(vec![job(1, 0.0, 10.0, "0"), job(2, 4.0, 2.0, "1")]).unwrap();
        let w = t.default_window().unwrap();
        assert_eq!(t.free_series(None).unwrap(), t.free_series(Some(w)).unwrap());
        assert_eq!(t.free_slots(None).unwrap(), t.free_slots(Some(w)).unwrap());
        // Second call hits the cache.
        assert_eq!(t.free_slots(None).unwrap().len(), 2);
    }

    #[test]
    fn rebase_shifts_and_invalidates() {
        let mut t = Trace::new(vec![
            job(1, 100.0, 10.0, "0").with_submission(90.0),
            job(2, 105.0, 10.0, "1"),
        ]).unwrap();
        assert_eq!(t.utilisation()[0].time, 100.0);
        t.rebase();
        assert_eq!(t.horizon(), Some((10.0, 25.0)));
        assert_eq!(t.jobs()[0].submission_time, 0.0);
        assert_eq!(t.utilisation()[0].time, 10.0);
        assert_eq!(t.queue()[0].time, 0.0);
    }
}
