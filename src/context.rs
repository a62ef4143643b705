//! Table contexts - the pattern sets and scope gating for one kind of table
//!
//! A context is built once from configuration and never changes afterwards.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::buffer::TextBuffer;
use crate::config::PatternSet;
use crate::table::{CaptureLevel, PatternError, RowParser};

/// Scores how well the text at a position matches some scope description.
/// Zero means no match.
pub trait ScopeSelector: fmt::Debug + Send + Sync {
    fn score(&self, buffer: &dyn TextBuffer, point: usize) -> u32;
}

/// Selector matching a regex against the line containing the position.
///
/// Longer matches score higher, so an except selector that matches more of a
/// line than the selector rejects it.
#[derive(Debug, Clone)]
pub struct LineSelector {
    pattern: Regex,
}

impl LineSelector {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let pattern = Regex::new(pattern).map_err(|e| PatternError::Regex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { pattern })
    }
}

impl ScopeSelector for LineSelector {
    fn score(&self, buffer: &dyn TextBuffer, point: usize) -> u32 {
        let row = buffer.row_at(point);
        let Some(line) = buffer.line(row) else {
            return 0;
        };
        self.pattern.find(&line).map_or(0, |m| {
            u32::try_from(m.len()).unwrap_or(u32::MAX).saturating_add(1)
        })
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    name: String,
    capture_level: CaptureLevel,
    parsers: Vec<RowParser>,
    selector: Option<Arc<dyn ScopeSelector>>,
    except_selector: Option<Arc<dyn ScopeSelector>>,
}

impl Context {
    /// Compile `patterns` for `capture_level`. Pattern sets are tried in order.
    pub fn new(
        name: impl Into<String>,
        patterns: &[PatternSet],
        capture_level: CaptureLevel,
    ) -> Result<Self, PatternError> {
        let parsers = patterns
            .iter()
            .map(|set| RowParser::new(set.line.as_deref(), set.cell.as_slice(), capture_level))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            capture_level,
            parsers,
            selector: None,
            except_selector: None,
        })
    }

    pub fn with_selector(mut self, selector: Arc<dyn ScopeSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_except_selector(mut self, selector: Arc<dyn ScopeSelector>) -> Self {
        self.except_selector = Some(selector);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capture_level(&self) -> CaptureLevel {
        self.capture_level
    }

    pub fn parsers(&self) -> &[RowParser] {
        &self.parsers
    }

    /// Selector score at `point`: `None` without a selector, `-1` when the
    /// except selector outscores it, the selector score otherwise.
    pub fn score_selectors(&self, buffer: &dyn TextBuffer, point: usize) -> Option<i64> {
        let selector = self.selector.as_ref()?;
        let score = i64::from(selector.score(buffer, point));
        let except = self
            .except_selector
            .as_ref()
            .map_or(0, |except| i64::from(except.score(buffer, point)));
        Some(if except > score { -1 } else { score })
    }

    /// Whether a row starting at `point` may be parsed at all
    pub fn admits(&self, buffer: &dyn TextBuffer, point: usize) -> bool {
        !matches!(self.score_selectors(buffer, point), Some(score) if score <= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ropey::Rope;

    fn context() -> Context {
        let patterns = [PatternSet {
            line: None,
            cell: vec![r"(?P<cell>\|(?P<markup>(?P<content>[^|]*)))".to_string()],
        }];
        Context::new("test", &patterns, CaptureLevel::Content).unwrap()
    }

    #[test]
    fn test_scores_without_selector() {
        let rope = Rope::from_str("|a|b|\n");
        let context = context();
        assert_eq!(context.score_selectors(&rope, 0), None);
        assert!(context.admits(&rope, 0));
    }

    #[test]
    fn test_selector_gates_rows() {
        let rope = Rope::from_str("|a|b|\n# |c|d|\nplain\n");
        let context = context()
            .with_selector(Arc::new(LineSelector::new(r"\|").unwrap()))
            .with_except_selector(Arc::new(LineSelector::new(r"^#").unwrap()));
        assert_eq!(context.score_selectors(&rope, 0), Some(2));
        assert_eq!(context.score_selectors(&rope, 7), Some(2), "equal scores keep the row");
        assert_eq!(context.score_selectors(&rope, 15), Some(0));
        assert!(context.admits(&rope, 0));
        assert!(!context.admits(&rope, 15));
    }

    #[test]
    fn test_longer_except_match_rejects_row() {
        let rope = Rope::from_str("|a|\n# |b|\n");
        let context = context()
            .with_selector(Arc::new(LineSelector::new(r"\|").unwrap()))
            .with_except_selector(Arc::new(LineSelector::new(r"^#.*").unwrap()));
        assert_eq!(context.score_selectors(&rope, 0), Some(2));
        assert_eq!(context.score_selectors(&rope, 4), Some(-1));
        assert!(!context.admits(&rope, 4));
    }

    #[test]
    fn test_except_selector_outscoring() {
        #[derive(Debug)]
        struct Fixed(u32);
        impl ScopeSelector for Fixed {
            fn score(&self, _: &dyn TextBuffer, _: usize) -> u32 {
                self.0
            }
        }

        let rope = Rope::from_str("|a|\n");
        let context = context()
            .with_selector(Arc::new(Fixed(1)))
            .with_except_selector(Arc::new(Fixed(2)));
        assert_eq!(context.score_selectors(&rope, 0), Some(-1));
        assert!(!context.admits(&rope, 0));
    }
}
