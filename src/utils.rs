//! Utility functions and types used accross the library
use crate::{Scalar, Vector3};

/// Restrict value to a certain interval
#[inline]
pub fn clamp<T>(val: T, min: T, max: T) -> T
where
    T: PartialOrd,
{
    if val < min {
        min
    } else if val > max {
        max
    } else {
        val
    }
}

/// Pair of committed and draft values.
///
/// Interactive edits only ever touch the draft, `commit` makes the draft permanent
/// and `cancel` throws it away.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Staged<T> {
    committed: T,
    draft: T,
}

impl<T: Clone> Staged<T> {
    /// Create staged value with identical committed and draft state
    pub fn new(value: T) -> Self {
        Self {
            draft: value.clone(),
            committed: value,
        }
    }

    /// Last committed value
    #[inline]
    pub fn committed(&self) -> &T {
        &self.committed
    }

    /// Value currently being edited
    #[inline]
    pub fn draft(&self) -> &T {
        &self.draft
    }

    #[inline]
    pub fn draft_mut(&mut self) -> &mut T {
        &mut self.draft
    }

    /// Make draft permanent
    pub fn commit(&mut self) {
        self.committed = self.draft.clone();
    }

    /// Discard draft, restoring committed value
    pub fn cancel(&mut self) {
        self.draft = self.committed.clone();
    }

    /// Apply the same modification to both committed and draft values
    pub fn update_both(&mut self, mut f: impl FnMut(&mut T)) {
        f(&mut self.committed);
        f(&mut self.draft);
    }
}

impl<T: Clone + PartialEq> Staged<T> {
    /// Whether draft differs from the committed value
    pub fn is_dirty(&self) -> bool {
        self.committed != self.draft
    }
}

/// Find `y` at `x` on a polyline, interpolating linearly between samples.
///
/// Values outside of the sampled range are clamped to the first or the last
/// sample. Samples may be ordered by either increasing or decreasing `x`.
/// Returns `0.0` for an empty polyline or when no segment spans `x`.
pub fn interpolate_x(points: &[Vector3], x: Scalar) -> Scalar {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return 0.0,
    };
    let ascending = first.x() <= last.x();
    let (low, high) = if ascending { (first, last) } else { (last, first) };
    if x <= low.x() {
        return low.y();
    }
    if x >= high.x() {
        return high.y();
    }

    let mut found = None;
    for (index, pair) in points.windows(2).enumerate() {
        let (x0, x1) = (pair[0].x(), pair[1].x());
        if (x0 <= x && x <= x1) || (x1 <= x && x <= x0) {
            found = Some(index);
        }
    }
    let Some(index) = found else {
        return 0.0;
    };
    let (p0, p1) = (points[index], points[index + 1]);
    let span = p1.x() - p0.x();
    if span.abs() < crate::EPSILON {
        return p0.y();
    }
    p0.y() + (p1.y() - p0.y()) * (x - p0.x()) / span
}
