//! Temporary capture level overrides
//!
//! Setting a capture level pushes onto the stack, resetting pops the most
//! recent override. The effective level falls back to the configured one when
//! nothing has been pushed.

use serde::{Deserialize, Serialize};

use crate::table::CaptureLevel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureLevelStack {
    configured: CaptureLevel,
    #[serde(default)]
    overrides: Vec<CaptureLevel>,
}

impl CaptureLevelStack {
    pub fn new(configured: CaptureLevel) -> Self {
        Self {
            configured,
            overrides: Vec::new(),
        }
    }

    pub fn set(&mut self, level: CaptureLevel) {
        tracing::debug!("capture level override: {level}");
        self.overrides.push(level);
    }

    /// Drop the most recent override, returning it
    pub fn reset(&mut self) -> Option<CaptureLevel> {
        let popped = self.overrides.pop();
        tracing::debug!("capture level reset, now {}", self.current());
        popped
    }

    pub fn current(&self) -> CaptureLevel {
        self.overrides.last().copied().unwrap_or(self.configured)
    }
}
