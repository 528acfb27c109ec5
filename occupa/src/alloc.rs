//! The resource allocation index: who holds what, and over which
//! universe of resources.

use crate::helpe::*;

/// Maps every job to its allocation and knows the global resource bounds.
#[derive(Clone, Debug, Default)]
pub struct AllocationIndex {
    by_job: IndexMap<JobId, IntervalSet>,
    bounds: Option<(ResourceId, ResourceId)>,
}

impl AllocationIndex {
    /// Indexes `jobs` in their given order.
    pub fn build(jobs: &JobSet) -> Self {
        let mut bounds: Option<(ResourceId, ResourceId)> = None;
        let by_job = jobs.iter()
            .map(|j| {
                if let (Some(lo), Some(hi)) = (j.allocated.first(), j.allocated.last()) {
                    bounds = Some(match bounds {
                        Some((min, max)) => (min.min(lo), max.max(hi)),
                        None => (lo, hi),
                    });
                }
                (j.id.clone(), j.allocated.clone())
            })
            .collect();

        Self { by_job, bounds }
    }

    pub fn get(&self, id: &JobId) -> Option<&IntervalSet> {
        self.by_job.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_job.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_job.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobId, &IntervalSet)> {
        self.by_job.iter()
    }

    /// Smallest and largest resource id allocated to any job.
    pub fn bounds(&self) -> Result<(ResourceId, ResourceId), TraceError> {
        if self.by_job.is_empty() {
            return Err(TraceError::EmptyTrace("no jobs to take resource bounds from"));
        }
        self.bounds
            .ok_or(TraceError::EmptyTrace("no job has allocated resources"))
    }

    /// The full resource range `[min, max]`, used for complementing.
    pub fn universe(&self) -> Result<IntervalSet, TraceError> {
        let (min, max) = self.bounds()?;
        Ok(IntervalSet::range(min, max))
    }

    /// Union of every indexed allocation.
    pub fn used(&self) -> IntervalSet {
        self.by_job.values()
            .fold(IntervalSet::new(), |acc, a| &acc | a)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn bounds_span_all_jobs() {
        let jobs = init(vec![
            Job::with_allocation_str(1u64, 0.0, 1.0, "3-5").unwrap(),
            Job::with_allocation_str("w0!2", 0.0, 1.0, "8 12").unwrap(),
            Job::new(3u64, 0.0, 1.0, IntervalSet::new()),
        ]).unwrap();
        let idx = AllocationIndex::build(&jobs);
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.bounds().unwrap(), (3, 12));
        assert_eq!(idx.universe().unwrap(), IntervalSet::range(3, 12));
        assert_eq!(idx.get(&JobId::from("w0!2")).unwrap().ranges(), &[(8, 8), (12, 12)]);
        assert_eq!(idx.used().ranges(), &[(3, 5), (8, 8), (12, 12)]);
        assert!(idx.get(&JobId::Int(4)).is_none());
        assert!(idx.get(&JobId::from("2")).is_none());
    }

    #[test]
    fn empty_traces_have_no_bounds() {
        let idx = AllocationIndex::build(&vec![]);
        assert!(matches!(idx.bounds(), Err(TraceError::EmptyTrace(_))));

        let jobs = init(vec![Job::new(1u64, 0.0, 1.0, IntervalSet::new())]).unwrap();
        assert!(matches!(AllocationIndex::build(&jobs).universe(), Err(TraceError::EmptyTrace(_))));
    }
}
