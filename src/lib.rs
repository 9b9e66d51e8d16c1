//! Plan generation engine for browser automation.
//!
//! Converts a plain-English task description ("search Google for X and
//! extract headlines") into an ordered, budget-bounded sequence of typed
//! browser operations that a downstream automation runtime can execute
//! step by step. A generative model drafts the plan; JSON repair, a
//! safety filter for serialization-unsafe evaluate bodies, and a hard
//! step budget validate it; a deterministic pattern-matched fallback
//! planner covers every failure, so a plan is always returned.

pub mod budget;
pub mod errors;
pub mod fallback;
pub mod generator;
pub mod plan;
pub mod prompt;
pub mod provider;
pub mod render;
pub mod safety;

pub use budget::{StepBudget, DEFAULT_STEPS, MAX_STEPS, MIN_STEPS};
pub use errors::PlanError;
pub use fallback::fallback_plan;
pub use generator::PlanGenerator;
pub use plan::{BrowserFunction, BrowserPlan, KNOWN_OPERATIONS};
pub use provider::{LanguageModel, MockModel, OpenAiConfig, OpenAiModel};
pub use render::{step_by_step, summary};
pub use safety::{contains_hazard, HAZARDOUS_FRAGMENTS};
