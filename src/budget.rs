//! Step-count budget shared by the generation pipeline and the fallback
//! planner. Whichever path produced a plan, the budget bounds its length.

use serde_json::Value;

use crate::plan::BrowserFunction;

/// Smallest budget a caller may request.
pub const MIN_STEPS: usize = 1;
/// Hard ceiling on plan length.
pub const MAX_STEPS: usize = 50;
/// Applied when the caller supplies nothing, or a non-numeric value.
pub const DEFAULT_STEPS: usize = 10;

/// A caller-supplied step limit, clamped to `[MIN_STEPS, MAX_STEPS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBudget(usize);

impl Default for StepBudget {
    fn default() -> Self {
        Self(DEFAULT_STEPS)
    }
}

impl StepBudget {
    pub fn new(limit: usize) -> Self {
        Self(limit.clamp(MIN_STEPS, MAX_STEPS))
    }

    /// Budget from an untyped caller value; absent or non-numeric values
    /// fall back to [`DEFAULT_STEPS`].
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_u64)
            .map(|limit| Self::new(limit as usize))
            .unwrap_or_default()
    }

    pub fn limit(self) -> usize {
        self.0
    }

    /// Steps still available after `used` have been emitted.
    pub fn remaining(self, used: usize) -> usize {
        self.0.saturating_sub(used)
    }

    /// Keeps the first `min(len, limit)` functions. Returns whether
    /// anything was dropped.
    pub fn truncate(self, functions: &mut Vec<BrowserFunction>) -> bool {
        if functions.len() > self.0 {
            functions.truncate(self.0);
            true
        } else {
            false
        }
    }

    /// How many fixed-length per-entity blocks fit after a preamble.
    ///
    /// Computed before building so an oversized structure is never
    /// constructed and then chopped mid-entity. When the preamble alone
    /// exceeds the limit the allowance is zero (the preamble itself is
    /// then truncated by [`StepBudget::truncate`]).
    pub fn entity_allowance(self, preamble_len: usize, per_entity_len: usize, requested: usize) -> usize {
        if per_entity_len == 0 {
            return 0;
        }
        requested.min(self.0.saturating_sub(preamble_len) / per_entity_len)
    }
}
