//! Compact sets of resource identifiers.
//!
//! An [IntervalSet] stores a set of non-negative integers as a sorted
//! list of closed ranges `(begin, end)`. The list is kept in canonical
//! form at all times: for two consecutive ranges `(b1, e1)` and `(b2, e2)`
//! we have `e1 + 1 < b2`, i.e. ranges neither overlap nor touch.
//!
//! ```
//! use occupa::IntervalSet;
//!
//! let a: IntervalSet = "1 2 3 7-9 13".parse().unwrap();
//! assert_eq!(a.ranges(), &[(1, 3), (7, 9), (13, 13)]);
//! assert_eq!(a.to_string(), "1-3 7-9 13-13");
//! assert_eq!(a.total(), 7);
//! ```
//!
//! All set operations work directly on the range lists with linear
//! two-pointer merges, and never mutate their operands.

use crate::helpe::*;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntervalSet {
    ranges: Vec<(ResourceId, ResourceId)>,
}

/// Appends `(b, e)` to a begin-sorted range list, merging it with the last
/// range if the two overlap or touch.
#[inline(always)]
fn push_merged(ranges: &mut Vec<(ResourceId, ResourceId)>, (b, e): (ResourceId, ResourceId)) {
    debug_assert!(b <= e, "Reversed range ({b}, {e})");
    if let Some(last) = ranges.last_mut() {
        debug_assert!(last.0 <= b, "Ranges must arrive sorted by begin");
        if b <= last.1.saturating_add(1) {
            last.1 = last.1.max(e);
            return;
        }
    }
    ranges.push((b, e));
}

/// Parses a single `k` or `b-e` token.
fn parse_token(token: &str) -> Option<(ResourceId, ResourceId)> {
    match token.split_once('-') {
        Some((b, e)) => {
            let b: ResourceId = b.parse().ok()?;
            let e: ResourceId = e.parse().ok()?;
            (b <= e).then_some((b, e))
        },
        None => token.parse().ok().map(|k| (k, k)),
    }
}

impl IntervalSet {
    /// The empty set.
    pub fn new() -> Self {
        Self { ranges: vec![] }
    }

    /// The set `{begin, begin + 1, ..., end}`.
    ///
    /// # Panics
    ///
    /// If `begin > end`. Use [IntervalSet::aggregate] (or `try_from`) for
    /// ranges that come from outside.
    pub fn range(begin: ResourceId, end: ResourceId) -> Self {
        assert!(begin <= end, "Reversed range ({begin}, {end})");
        Self { ranges: vec![(begin, end)] }
    }

    /// Coalesces an ascending list of ids into maximal consecutive runs.
    /// Repeated ids are tolerated.
    pub fn from_sorted_ids<I>(ids: I) -> Self
    where I: IntoIterator<Item = ResourceId> {
        let mut ranges: Vec<(ResourceId, ResourceId)> = vec![];
        for id in ids {
            match ranges.last_mut() {
                Some(last) if id <= last.1 => {
                    debug_assert!(id >= last.0, "Ids must arrive sorted");
                },
                Some(last) if id == last.1 + 1 => { last.1 = id; },
                _ => { ranges.push((id, id)); },
            }
        }

        Self { ranges }
    }

    /// Same as [IntervalSet::from_sorted_ids], for ids in any order.
    pub fn from_ids<I>(ids: I) -> Self
    where I: IntoIterator<Item = ResourceId> {
        Self::from_sorted_ids(ids.into_iter().sorted_unstable().dedup())
    }

    /// Merges a sequence of ranges sorted by begin into canonical form.
    ///
    /// Touching ranges are joined: `[(1, 2), (3, 4)]` becomes `[(1, 4)]`.
    /// Overlapping ranges are joined as well, so the result is always the
    /// union of the input ranges. A reversed range (`begin > end`) fails
    /// with [TraceError::InvalidBounds].
    pub fn aggregate<I>(ranges: I) -> Result<Self, TraceError>
    where I: IntoIterator<Item = (ResourceId, ResourceId)> {
        let mut res = vec![];
        for (b, e) in ranges {
            if b > e {
                return Err(TraceError::InvalidBounds { min: b, max: e });
            }
            push_merged(&mut res, (b, e));
        }

        Ok(Self { ranges: res })
    }

    /// Parses a space-separated list of `k` and `b-e` tokens.
    /// See the [FromStr] implementation.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        s.parse()
    }

    /// The canonical ranges, sorted by begin.
    pub fn ranges(&self) -> &[(ResourceId, ResourceId)] {
        &self.ranges
    }

    /// Number of ranges (not of ids, see [IntervalSet::total]).
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Cardinality of the set.
    pub fn total(&self) -> u64 {
        self.ranges.iter()
            .fold(0, |sum, &(b, e)| sum + (e - b) as u64 + 1)
    }

    pub fn first(&self) -> Option<ResourceId> {
        self.ranges.first().map(|r| r.0)
    }

    pub fn last(&self) -> Option<ResourceId> {
        self.ranges.last().map(|r| r.1)
    }

    /// Every covered id, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.ranges.iter().flat_map(|&(b, e)| b..=e)
    }

    pub fn contains(&self, value: ResourceId) -> bool {
        let idx = self.ranges.partition_point(|r| r.1 < value);
        match self.ranges.get(idx) {
            Some(&(b, _)) => b <= value,
            None => false,
        }
    }

    /// Returns `true` if the two sets share at least one id.
    pub fn intersects(&self, other: &Self) -> bool {
        let (mut i, mut k) = (0, 0);
        while let (Some(x), Some(y)) = (self.ranges.get(i), other.ranges.get(k)) {
            if x.0.max(y.0) <= x.1.min(y.1) {
                return true;
            }
            if x.1 < y.1 { i += 1; } else { k += 1; }
        }

        false
    }

    /// Returns `true` if every id of `self` is also in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.difference(other).is_empty()
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut res = Vec::with_capacity(self.ranges.len() + other.ranges.len());
        let mut left = self.ranges.iter().copied().peekable();
        let mut right = other.ranges.iter().copied().peekable();
        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(x), Some(y)) => {
                    if x.0 <= y.0 { left.next() } else { right.next() }
                },
                (Some(_), None) => left.next(),
                (None, Some(_)) => right.next(),
                (None, None) => break,
            };
            if let Some(r) = next {
                push_merged(&mut res, r);
            }
        }

        Self { ranges: res }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut res = vec![];
        let (mut i, mut k) = (0, 0);
        while let (Some(&x), Some(&y)) = (self.ranges.get(i), other.ranges.get(k)) {
            let (lo, hi) = (x.0.max(y.0), x.1.min(y.1));
            if lo <= hi {
                push_merged(&mut res, (lo, hi));
            }
            // Whichever range ends first cannot meet anything else.
            if x.1 < y.1 { i += 1; } else { k += 1; }
        }

        Self { ranges: res }
    }

    /// Ids of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        let mut res = vec![];
        let mut k = 0;
        for &(b, e) in &self.ranges {
            // Skip subtrahend ranges that end before this one starts.
            while other.ranges.get(k).is_some_and(|y| y.1 < b) {
                k += 1;
            }
            let mut cur = Some(b);
            for &(yb, ye) in other.ranges[k..].iter().take_while(|y| y.0 <= e) {
                let Some(start) = cur else { break };
                if yb > start {
                    res.push((start, yb - 1));
                }
                cur = if ye >= e { None } else { Some(ye + 1) };
            }
            if let Some(start) = cur {
                res.push((start, e));
            }
        }

        Self { ranges: res }
    }
}

impl FromStr for IntervalSet {
    type Err = ParseError;

    /// Tokens are either a bare id `k` or a range `b-e`, separated by
    /// whitespace, in any order. An empty string is an empty set (with a
    /// warning), since sparse trace rows carry such placeholders.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            warn!("Interval set string is empty");
            return Ok(Self::new());
        }
        let ranges: Vec<(ResourceId, ResourceId)> = s.split_whitespace()
            .map(|token| parse_token(token).ok_or_else(|| ParseError {
                token:  token.to_string(),
                input:  s.to_string(),
            }))
            .collect::<Result<_, _>>()?;

        // Tokens are never reversed here, `parse_token` refuses them.
        let mut res = vec![];
        for r in ranges.into_iter().sorted_unstable() {
            push_merged(&mut res, r);
        }

        Ok(Self { ranges: res })
    }
}

/// Renders every range as `b-e`, singletons included (`k-k`).
impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ranges.iter()
            .map(|(b, e)| format!("{b}-{e}"))
            .join(" "))
    }
}

impl std::ops::BitOr for &IntervalSet {
    type Output = IntervalSet;

    fn bitor(self, rhs: Self) -> IntervalSet {
        self.union(rhs)
    }
}

impl std::ops::BitAnd for &IntervalSet {
    type Output = IntervalSet;

    fn bitand(self, rhs: Self) -> IntervalSet {
        self.intersection(rhs)
    }
}

impl std::ops::Sub for &IntervalSet {
    type Output = IntervalSet;

    fn sub(self, rhs: Self) -> IntervalSet {
        self.difference(rhs)
    }
}

impl TryFrom<(ResourceId, ResourceId)> for IntervalSet {
    type Error = TraceError;

    fn try_from(r: (ResourceId, ResourceId)) -> Result<Self, Self::Error> {
        Self::aggregate([r])
    }
}
