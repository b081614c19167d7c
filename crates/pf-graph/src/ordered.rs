//! Totally ordered `f64` wrapper for `BinaryHeap` keys.

use std::cmp::Ordering;

/// `f64` ordered by [`f64::total_cmp`].
///
/// Costs in this workspace are sums of haversine distances, so they are
/// never NaN; `f64::INFINITY` marks unreachable targets and sorts last.
#[derive(Debug, Copy, Clone)]
#[repr(transparent)]
pub struct TotalF64(pub f64);

impl PartialEq for TotalF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for TotalF64 {}

impl PartialOrd for TotalF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for TotalF64 {
    fn from(x: f64) -> Self {
        TotalF64(x)
    }
}
