use crate::helpe::*;

/// How the free gaps of one resource are reduced to a fragmentation index.
///
/// Both variants see the same input: the durations `G_r` of the free
/// slots covering resource `r`. A resource that is never free scores 0
/// under both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FragPolicy {
    /// `1 - Σ g^p / (Σ g)^p`. 0 for a single contiguous gap, tending to
    /// 1 as the free time splits into many small gaps. Stays within
    /// `[0, 1]` for `p >= 1`.
    PowerSkew { p: f64 },
    /// `1 - sqrt(Σ g^p) / (window_duration × resource_count)`.
    WindowNormalized { p: f64 },
}

impl Default for FragPolicy {
    fn default() -> Self {
        FragPolicy::PowerSkew { p: 2.0 }
    }
}

impl FragPolicy {
    /// Scores one resource's gap durations.
    pub fn score(&self, gaps: &[Time], window_duration: Time, resource_count: u64) -> f64 {
        if gaps.is_empty() {
            return 0.0;
        }
        match *self {
            FragPolicy::PowerSkew { p } => {
                let total: f64 = gaps.iter().sum();
                if total <= 0.0 {
                    return 0.0;
                }
                1.0 - gaps.iter().map(|g| g.powf(p)).sum::<f64>() / total.powf(p)
            },
            FragPolicy::WindowNormalized { p } => {
                let norm = window_duration * resource_count as f64;
                if norm <= 0.0 {
                    return 0.0;
                }
                1.0 - gaps.iter().map(|g| g.powf(p)).sum::<f64>().sqrt() / norm
            },
        }
    }
}

/// For every resource of the universe, the durations of the free slots
/// covering it (possibly none).
pub type ResourceGaps = IndexMap<ResourceId, Vec<Time>>;

/// Distributes each slot's duration to every resource it covers.
pub fn free_resources_gaps(slots: &[FreeSlot], universe: &IntervalSet) -> ResourceGaps {
    let mut res: ResourceGaps = universe.iter()
        .map(|r| (r, vec![]))
        .collect();
    for s in slots {
        let d = s.duration();
        for r in s.resources.iter() {
            if let Some(gaps) = res.get_mut(&r) {
                gaps.push(d);
            }
        }
    }

    res
}

/// Per-resource fragmentation indices, in universe order.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragmentation {
    pub policy:         FragPolicy,
    pub per_resource:   IndexMap<ResourceId, f64>,
}

impl Fragmentation {
    pub fn get(&self, r: ResourceId) -> Option<f64> {
        self.per_resource.get(&r).copied()
    }

    /// Mean index over all resources of the universe (0 if there are none).
    pub fn mean(&self) -> f64 {
        if self.per_resource.is_empty() {
            return 0.0;
        }
        self.per_resource.values().sum::<f64>() / self.per_resource.len() as f64
    }

    pub fn max(&self) -> f64 {
        self.per_resource.values().copied().fold(0.0, f64::max)
    }
}

/// Scores every resource of `gaps` with `policy`, in parallel. The
/// result keeps the order of `gaps`.
pub fn fragmentation(gaps: &ResourceGaps, policy: FragPolicy, window_duration: Time) -> Fragmentation {
    let resource_count = gaps.len() as u64;

    Fragmentation {
        policy,
        per_resource: gaps.par_iter()
            .map(|(r, g)| (*r, policy.score(g, window_duration, resource_count)))
            .collect(),
    }
}
