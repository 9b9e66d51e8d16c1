//! Hazard scan for whole-object serialization.
//!
//! An in-page evaluation that returns the entire `document` or `window`
//! object cannot be serialized back over the automation protocol. The
//! filter is a strict, case-sensitive substring block: on a hit the
//! candidate is discarded and the caller falls back, never repaired.

use crate::errors::PlanError;
use crate::plan::BrowserFunction;

/// Literal fragments that indicate a whole browser object would be
/// returned. Specific property reads such as
/// `return window.location.href;` do not match.
pub const HAZARDOUS_FRAGMENTS: [&str; 2] = ["return document;", "return window;"];

/// Returns the first hazardous fragment contained in `text`, if any.
pub fn contains_hazard(text: &str) -> Option<&'static str> {
    HAZARDOUS_FRAGMENTS
        .iter()
        .copied()
        .find(|fragment| text.contains(fragment))
}

/// Checks the `functionString` of every `evaluate` operation individually.
pub fn scan_functions(functions: &[BrowserFunction]) -> Result<(), PlanError> {
    for function in functions {
        if function.name != "evaluate" {
            continue;
        }
        if let Some(body) = function.arg_str("functionString") {
            if let Some(fragment) = contains_hazard(body) {
                return Err(PlanError::Unsafe(fragment));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_whole_document_return() {
        assert_eq!(
            contains_hazard("() => { return document; }"),
            Some("return document;")
        );
    }

    #[test]
    fn flags_whole_window_return() {
        assert_eq!(
            contains_hazard("() => { return window; }"),
            Some("return window;")
        );
    }

    #[test]
    fn allows_specific_property_reads() {
        assert!(contains_hazard("() => { return window.location.href; }").is_none());
        assert!(contains_hazard("() => { return document.title; }").is_none());
    }

    #[test]
    fn scan_rejects_hazardous_evaluate() {
        let functions = vec![
            BrowserFunction::new("navigate").with_arg("url", "https://example.com"),
            BrowserFunction::new("evaluate")
                .with_arg("functionString", "() => { return document; }"),
        ];
        assert!(scan_functions(&functions).is_err());
    }

    #[test]
    fn scan_ignores_non_evaluate_operations() {
        // The fragment in a typed text is inert; only evaluate bodies run.
        let functions =
            vec![BrowserFunction::new("type").with_arg("text", "return document; is unsafe")];
        assert!(scan_functions(&functions).is_ok());
    }
}
