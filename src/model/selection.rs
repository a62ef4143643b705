//! The editor's multi-region selection
//!
//! Regions are kept sorted by their begin offset. Adding regions normalizes the
//! set the way editors do: duplicates collapse, overlapping regions merge and a
//! cursor strictly inside a selection is absorbed. Regions that merely touch
//! stay separate.

use super::region::{same_extent, Region};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    regions: Vec<Region>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        let mut set = Self {
            regions: regions.into_iter().collect(),
        };
        set.normalize();
        set
    }

    /// Build from `(anchor, head)` pairs
    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        Self::from_regions(pairs.iter().map(|&(a, b)| Region::new(a, b)))
    }

    pub fn add(&mut self, region: Region) {
        self.regions.push(region);
        self.normalize();
    }

    pub fn add_all(&mut self, regions: impl IntoIterator<Item = Region>) {
        self.regions.extend(regions);
        self.normalize();
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Remove `region` from the selection.
    ///
    /// Selections overlapping it are trimmed, and cursors inside it (boundaries
    /// included) are dropped.
    pub fn subtract(&mut self, region: Region) {
        let (cut_begin, cut_end) = region.extent();
        let mut kept = Vec::with_capacity(self.regions.len());

        for r in self.regions.drain(..) {
            if r.is_empty() {
                if !(cut_begin <= r.head && r.head <= cut_end) {
                    kept.push(r);
                }
                continue;
            }
            if region.is_empty() || !r.overlaps(&region) {
                kept.push(r);
                continue;
            }
            let direction = r.direction();
            if r.begin() < cut_begin {
                kept.push(Region::from_extent((r.begin(), cut_begin), direction));
            }
            if cut_end < r.end() {
                kept.push(Region::from_extent((cut_end, r.end()), direction));
            }
        }

        self.regions = kept;
        self.normalize();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn to_vec(&self) -> Vec<Region> {
        self.regions.clone()
    }

    /// `(anchor, head)` pairs, in order
    pub fn to_pairs(&self) -> Vec<(usize, usize)> {
        self.regions.iter().map(|r| (r.anchor, r.head)).collect()
    }

    fn normalize(&mut self) {
        self.regions
            .sort_by(|a, b| a.begin().cmp(&b.begin()).then_with(|| a.end().cmp(&b.end())));

        let mut merged: Vec<Region> = Vec::with_capacity(self.regions.len());
        for region in self.regions.drain(..) {
            let Some(last) = merged.last_mut() else {
                merged.push(region);
                continue;
            };
            if same_extent(last, &region) {
                continue;
            }
            if !last.is_empty() && !region.is_empty() && region.begin() < last.end() {
                *last = last.cover(&region);
                continue;
            }
            // Cursor strictly inside the previous selection
            if region.is_empty() && last.begin() < region.head && region.head < last.end() {
                continue;
            }
            merged.push(region);
        }
        self.regions = merged;
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl FromIterator<Region> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self::from_regions(iter)
    }
}
