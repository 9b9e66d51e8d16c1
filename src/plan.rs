use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Operation names the renderer knows how to phrase. Unrecognized names
/// are still accepted and rendered generically.
pub const KNOWN_OPERATIONS: &[&str] = &[
    "navigate",
    "goto",
    "click",
    "type",
    "extract",
    "wait",
    "waitForSelector",
    "waitForNavigation",
    "scrollTo",
    "scrollIntoView",
    "hover",
    "focus",
    "select",
    "evaluate",
    "waitForFunction",
    "screenshot",
];

/// One atomic browser-automation instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserFunction {
    /// Operation name, e.g. `navigate`, `click`, `evaluate`.
    pub name: String,
    /// Operation arguments. Always a mapping; a malformed value is
    /// coerced to an empty mapping rather than rejected.
    #[serde(default, deserialize_with = "coerce_args")]
    pub args: Map<String, Value>,
    /// Optional human-readable annotation, independent of `args`.
    #[serde(default)]
    pub description: Option<String>,
}

impl BrowserFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Map::new(),
            description: None,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// String argument lookup, `None` when absent or not a string.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }
}

/// An ordered, budget-bounded sequence of operations plus provenance.
///
/// `functions` order is execution order and is never reordered. A plan
/// returned by the generation pipeline always has at least one function;
/// it is constructed once per request and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserPlan {
    pub functions: Vec<BrowserFunction>,
    /// Optional one-paragraph rationale.
    #[serde(default)]
    pub explanation: Option<String>,
    /// The natural-language input that produced this plan, verbatim.
    pub action_description: String,
}

impl BrowserPlan {
    pub fn new(action_description: impl Into<String>, functions: Vec<BrowserFunction>) -> Self {
        Self {
            functions,
            explanation: None,
            action_description: action_description.into(),
        }
    }

    pub fn with_explanation(mut self, text: impl Into<String>) -> Self {
        self.explanation = Some(text.into());
        self
    }

    /// Numbered, one-line-per-operation rendering of the plan.
    pub fn step_by_step(&self) -> String {
        crate::render::step_by_step(self)
    }

    /// Short natural-language summary of what the plan does.
    pub fn summary(&self) -> String {
        crate::render::summary(self)
    }
}

fn coerce_args<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}
