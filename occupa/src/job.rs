use crate::helpe::*;

impl Job {
    /// Creates a job that started as soon as it was submitted.
    pub fn new(
        id:             impl Into<JobId>,
        starting_time:  Time,
        execution_time: Time,
        allocated:      IntervalSet,
    ) -> Self {
        Self {
            id: id.into(),
            submission_time: starting_time,
            starting_time,
            execution_time,
            allocated,
        }
    }

    /// Creates a job out of its endpoints instead of its duration.
    pub fn from_finish(
        id:             impl Into<JobId>,
        starting_time:  Time,
        finish_time:    Time,
        allocated:      IntervalSet,
    ) -> Self {
        Self::new(id, starting_time, finish_time - starting_time, allocated)
    }

    /// Same as [Job::new], with the allocation given in the trace-file
    /// notation (`"0-3 8 10-11"`).
    pub fn with_allocation_str(
        id:             impl Into<JobId>,
        starting_time:  Time,
        execution_time: Time,
        allocated:      &str,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(id, starting_time, execution_time, allocated.parse()?))
    }

    pub fn with_submission(mut self, submission_time: Time) -> Self {
        self.submission_time = submission_time;
        self
    }

    #[inline(always)]
    pub fn finish_time(&self) -> Time {
        self.starting_time + self.execution_time
    }

    #[inline(always)]
    pub fn waiting_time(&self) -> Time {
        self.starting_time - self.submission_time
    }

    /// Number of resources held while running.
    #[inline(always)]
    pub fn size(&self) -> u64 {
        self.allocated.total()
    }

    /// Resource × time consumed by the job.
    #[inline(always)]
    pub fn area(&self) -> f64 {
        self.size() as f64 * self.execution_time
    }

    /// Returns `true` if the job holds its resources at moment `t`.
    #[inline(always)]
    pub fn is_running_at(&self, t: Time) -> bool {
        self.starting_time <= t && t < self.finish_time()
    }

    /// Returns `true` if the job was submitted but not started at moment `t`.
    #[inline(always)]
    pub fn is_queued_at(&self, t: Time) -> bool {
        self.submission_time <= t && t < self.starting_time
    }

    /// Returns `true` if the job never holds anything.
    #[inline(always)]
    pub fn is_void(&self) -> bool {
        self.execution_time <= 0.0 || self.allocated.is_empty()
    }

    /// A copy of the job with all its timestamps moved by `-delta`.
    pub(crate) fn shifted(&self, delta: Time) -> Self {
        Self {
            submission_time:    self.submission_time - delta,
            starting_time:      self.starting_time - delta,
            ..self.clone()
        }
    }
}

//-----TREATING GROUPS OF JOBS (START)---------------------
/*
   A (very) common operation is iterating over a set of jobs
   in order of increasing starting time.

   To support such job containers, we implement the Ord trait
   of Job according to `starting_time`, ties broken by id.
*/
impl Ord for Job {
    fn cmp(&self, other: &Self) -> Ordering {
        self.starting_time.total_cmp(&other.starting_time)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Job {}

impl std::hash::Hash for Job {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
//-----TREATING GROUPS OF JOBS (END)---------------------
