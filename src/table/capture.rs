//! Capture levels - how much of a cell's text a selection covers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered granularity of a cell capture.
///
/// `Trimmed` is the cell text without surrounding whitespace, `Content` adds
/// the padding, `Markup` is everything up to the delimiters and `Cell`
/// includes the delimiter itself.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CaptureLevel {
    Trimmed,
    #[default]
    Content,
    Markup,
    Cell,
}

impl CaptureLevel {
    pub const ALL: [CaptureLevel; 4] = [Self::Trimmed, Self::Content, Self::Markup, Self::Cell];
    pub const MAX: CaptureLevel = Self::Cell;

    /// Regex group name that captures this level
    pub fn group_name(self) -> &'static str {
        match self {
            Self::Trimmed => "trimmed",
            Self::Content => "content",
            Self::Markup => "markup",
            Self::Cell => "cell",
        }
    }

    /// Order in which a pattern's groups are tried when `self` is the threshold:
    /// levels at or below it from the threshold downward, then the levels above
    /// it from the nearest upward.
    pub fn priority_order(self) -> Vec<CaptureLevel> {
        let mut order: Vec<CaptureLevel> =
            Self::ALL.iter().rev().copied().filter(|l| *l <= self).collect();
        order.extend(Self::ALL.iter().copied().filter(|l| *l > self));
        order
    }

    /// Smallest level at or above `self` accepted by `accept`
    pub fn escalate(self, mut accept: impl FnMut(CaptureLevel) -> bool) -> Option<CaptureLevel> {
        Self::ALL.into_iter().filter(|l| *l >= self).find(|l| accept(*l))
    }
}

/// Keep the items whose level is at most the smallest threshold (starting at
/// `threshold`) that keeps anything. Returns an empty list when even the
/// widest level keeps nothing.
pub fn filter_escalating<T>(
    items: Vec<T>,
    threshold: CaptureLevel,
    level_of: impl Fn(&T) -> CaptureLevel,
) -> Vec<T> {
    let Some(level) = threshold.escalate(|l| items.iter().any(|item| level_of(item) <= l)) else {
        return Vec::new();
    };
    items.into_iter().filter(|item| level_of(item) <= level).collect()
}

impl fmt::Display for CaptureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name())
    }
}

impl FromStr for CaptureLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.group_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown capture level: '{}'", s))
    }
}
