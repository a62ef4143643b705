//! Regions - a span of the buffer with an anchor (fixed end) and a head (cursor end)
//!
//! Offsets are character offsets into the buffer, the same unit ropey uses.

use serde::{Deserialize, Serialize};

/// A half-open character span `(start, end)` with `start <= end`
pub type Extent = (usize, usize);

/// Which end of a cell (or region) the cursor sits at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellDirection {
    /// Anchor at the start, head at the end
    #[default]
    Forward,
    /// Anchor at the end, head at the start
    Reverse,
}

impl CellDirection {
    /// Direction for a plain forward/backward request
    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Self::Forward
        } else {
            Self::Reverse
        }
    }

    /// Direction for a cell move of `(dr, dc)`.
    ///
    /// Horizontal moves follow the sign of `dc`. Vertical moves produce forward
    /// cells when selecting and reverse cells when moving cursors.
    pub fn for_move(dr: isize, dc: isize, select: bool) -> Self {
        match dc.signum() {
            -1 => Self::Reverse,
            1 => Self::Forward,
            _ if dr != 0 && !select => Self::Reverse,
            _ => Self::Forward,
        }
    }

    pub fn is_forward(self) -> bool {
        self == Self::Forward
    }

    /// Representative point of a region: its end when moving forward, its begin otherwise
    pub fn point_of(self, region: &Region) -> usize {
        match self {
            Self::Forward => region.end(),
            Self::Reverse => region.begin(),
        }
    }
}

/// A selection region with anchor (start of the drag) and head (cursor end)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Where the selection started (fixed point)
    #[serde(rename = "a")]
    pub anchor: usize,
    /// Where the cursor is (moving point)
    #[serde(rename = "b")]
    pub head: usize,
}

impl Region {
    pub const fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// An empty region (a bare cursor)
    pub const fn cursor(point: usize) -> Self {
        Self::new(point, point)
    }

    /// Region over `extent` oriented according to `direction`
    pub fn from_extent(extent: Extent, direction: CellDirection) -> Self {
        match direction {
            CellDirection::Forward => Self::new(extent.0, extent.1),
            CellDirection::Reverse => Self::new(extent.1, extent.0),
        }
    }

    pub fn begin(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn extent(&self) -> Extent {
        (self.begin(), self.end())
    }

    pub fn len(&self) -> usize {
        self.end() - self.begin()
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Check if the region is reversed (head before anchor)
    pub fn is_reversed(&self) -> bool {
        self.head < self.anchor
    }

    pub fn direction(&self) -> CellDirection {
        CellDirection::from_forward(!self.is_reversed())
    }

    /// Whether `other` lies entirely within this region (boundaries included)
    pub fn contains(&self, other: &Region) -> bool {
        self.begin() <= other.begin() && other.end() <= self.end()
    }

    /// Strict overlap: shared boundaries do not count
    pub fn overlaps(&self, other: &Region) -> bool {
        self.begin() < other.end() && other.begin() < self.end()
    }

    /// Smallest region covering both, keeping this region's direction
    pub fn cover(&self, other: &Region) -> Region {
        let extent = (self.begin().min(other.begin()), self.end().max(other.end()));
        Region::from_extent(extent, self.direction())
    }
}

/// Regions are the same when their endpoints agree, whatever their direction
pub fn same_extent(a: &Region, b: &Region) -> bool {
    a.extent() == b.extent()
}

/// Inclusive intersection test: an extent touches a region when they overlap
/// or merely share an endpoint. An empty region touches any extent it sits on.
pub fn touches(extent: Extent, region: &Region) -> bool {
    let (c0, c1) = extent;
    let (r0, r1) = region.extent();
    (r0 <= c0 && c0 <= r1)
        || (r0 <= c1 && c1 <= r1)
        || (c0 <= r0 && r0 <= c1)
        || (c0 <= r1 && r1 <= c1)
}
