//! Generation pipeline: one model call, parsed and validated into a
//! [`BrowserPlan`], with the deterministic fallback planner behind every
//! failure path. The caller always receives a usable plan.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::budget::StepBudget;
use crate::errors::PlanError;
use crate::fallback::fallback_plan;
use crate::plan::{BrowserFunction, BrowserPlan};
use crate::prompt;
use crate::provider::LanguageModel;
use crate::safety::{contains_hazard, scan_functions};

/// Turns a plain-English action description into a validated plan.
///
/// Stateless apart from the injected model provider; concurrent
/// `generate` calls share nothing and need no coordination. The model
/// call is the only suspension point, and a single attempt is made.
pub struct PlanGenerator {
    model: Arc<dyn LanguageModel>,
}

impl PlanGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Never fails: any generation or validation error resolves to a
    /// fallback plan. The returned plan has between 1 and
    /// `budget.limit()` functions, whichever path produced it.
    pub async fn generate(&self, description: &str, budget: StepBudget) -> BrowserPlan {
        match self.try_generate(description, budget).await {
            Ok(plan) => plan,
            Err(err) => {
                match &err {
                    // A hazardous fragment inside the transport error text
                    // gets its own log line; the handling is identical.
                    PlanError::Model(message) if contains_hazard(message).is_some() => {
                        error!(%message, "model error text carried a hazardous fragment; falling back");
                    }
                    _ => warn!(error = %err, "plan generation failed; falling back"),
                }
                fallback_plan(description, budget)
            }
        }
    }

    async fn try_generate(
        &self,
        description: &str,
        budget: StepBudget,
    ) -> Result<BrowserPlan, PlanError> {
        // Defense in depth: a hazardous fragment in the request itself is
        // rejected before any model call.
        if let Some(fragment) = contains_hazard(description) {
            return Err(PlanError::Unsafe(fragment));
        }

        info!(limit = budget.limit(), "generating plan for: {description}");
        let raw = self
            .model
            .complete(
                prompt::SYSTEM_PROMPT,
                &prompt::build_user_prompt(description, budget),
            )
            .await?;
        debug!(raw = %raw, "raw model response");

        if let Some(fragment) = contains_hazard(&raw) {
            return Err(PlanError::Unsafe(fragment));
        }

        let json = extract_json_object(&raw).ok_or(PlanError::MissingJson)?;
        let value: Value = serde_json::from_str(json)?;

        let mut functions = build_functions(&value)?;
        scan_functions(&functions)?;

        if budget.truncate(&mut functions) {
            warn!(
                limit = budget.limit(),
                "model plan exceeded the step budget; truncated"
            );
        }

        let mut plan = BrowserPlan::new(description, functions);
        plan.explanation = value
            .get("explanation")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(plan)
    }
}

/// Locates the JSON object in raw model text: the whole text when it
/// already starts with `{`, otherwise the region from the first `{` to
/// the last `}`.
fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return Some(trimmed);
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Builds operations from the decoded `functions` array: elements
/// without a string `name` are skipped, non-mapping `args` coerce to an
/// empty mapping. Zero survivors is a failure.
fn build_functions(value: &Value) -> Result<Vec<BrowserFunction>, PlanError> {
    let entries = value
        .get("functions")
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
        .ok_or(PlanError::EmptyPlan)?;

    let mut functions = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            warn!(element = %entry, "skipping function element without a name");
            continue;
        };
        let args = match entry.get("args") {
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                warn!(args = %other, "coercing non-mapping args to empty");
                Map::new()
            }
            None => Map::new(),
        };
        let description = entry
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        functions.push(BrowserFunction {
            name: name.to_string(),
            args,
            description,
        });
    }

    if functions.is_empty() {
        return Err(PlanError::EmptyPlan);
    }
    Ok(functions)
}
