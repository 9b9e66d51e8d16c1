use thiserror::Error;

/// Failure modes of the generation pipeline.
///
/// None of these cross the [`crate::PlanGenerator::generate`] boundary;
/// every variant routes the request to the deterministic fallback planner.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The model request itself failed (transport, auth, rate limit).
    #[error("model request failed: {0}")]
    Model(String),

    /// No JSON object could be located in the model output.
    #[error("no JSON object in model output")]
    MissingJson,

    /// The located JSON region failed to decode.
    #[error("failed to decode plan JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The decoded plan carried no usable function calls.
    #[error("model output contained no usable function calls")]
    EmptyPlan,

    /// An evaluate body (or the raw output) would return a whole
    /// browser object that cannot be serialized.
    #[error("unsafe evaluate body: contains `{0}`")]
    Unsafe(&'static str),
}

impl PlanError {
    /// Helper for wrapping transport-level failures.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }
}
