//! Textual renderings of a plan: a numbered step list and a short
//! summary. Both are pure functions of the plan.
//!
//! Phrasing is keyed by operation name through a lookup table with a
//! generic default, so new operations render without code changes here.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

use crate::plan::{BrowserFunction, BrowserPlan};

type StepFormatter = fn(&BrowserFunction) -> String;

static FORMATTERS: Lazy<HashMap<&'static str, StepFormatter>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, StepFormatter> = HashMap::new();
    table.insert("navigate", format_navigate);
    table.insert("goto", format_navigate);
    table.insert("click", format_click);
    table.insert("type", format_type);
    table.insert("extract", format_extract);
    table.insert("wait", format_wait);
    table.insert("waitForSelector", format_wait_for_selector);
    table.insert("waitForNavigation", |_| {
        "Wait for the page navigation to finish".to_string()
    });
    table.insert("scrollTo", format_scroll_to);
    table.insert("scrollIntoView", format_scroll_into_view);
    table.insert("hover", format_hover);
    table.insert("focus", format_focus);
    table.insert("select", format_select);
    table.insert("evaluate", |_| "Run a script in the page".to_string());
    table.insert("waitForFunction", |_| {
        "Wait until an in-page condition holds".to_string()
    });
    table.insert("screenshot", |_| "Take a screenshot".to_string());
    table
});

/// One numbered line per operation.
///
/// A function's own `description` replaces the generated phrase when it
/// is present and carries more detail (judged by length).
pub fn step_by_step(plan: &BrowserPlan) -> String {
    plan.functions
        .iter()
        .enumerate()
        .map(|(index, function)| format!("{}. {}", index + 1, phrase_for(function)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A short natural-language account: distinct operation kinds in
/// first-seen order, up to three destination URLs, up to two typed
/// strings, and the total step count.
pub fn summary(plan: &BrowserPlan) -> String {
    let mut kinds: Vec<&str> = Vec::new();
    for function in &plan.functions {
        if !kinds.contains(&function.name.as_str()) {
            kinds.push(&function.name);
        }
    }

    let urls: Vec<&str> = plan
        .functions
        .iter()
        .filter(|f| f.name == "navigate" || f.name == "goto")
        .filter_map(|f| f.arg_str("url"))
        .take(3)
        .collect();
    let typed: Vec<String> = plan
        .functions
        .iter()
        .filter(|f| f.name == "type")
        .filter_map(|f| f.arg_str("text"))
        .take(2)
        .map(|text| format!("\"{text}\""))
        .collect();

    let mut parts = vec![format!(
        "This plan runs {} step{} ({})",
        plan.functions.len(),
        if plan.functions.len() == 1 { "" } else { "s" },
        kinds.join(", ")
    )];
    if !urls.is_empty() {
        parts.push(format!("visits {}", urls.join(", ")));
    }
    if !typed.is_empty() {
        parts.push(format!("types {}", typed.join(", ")));
    }
    format!("{}.", parts.join("; "))
}

fn phrase_for(function: &BrowserFunction) -> String {
    let formatter = FORMATTERS
        .get(function.name.as_str())
        .copied()
        .unwrap_or(format_generic);
    let generated = formatter(function);
    match &function.description {
        Some(description) if description.len() > generated.len() => description.clone(),
        _ => generated,
    }
}

fn format_navigate(function: &BrowserFunction) -> String {
    match function.arg_str("url") {
        Some(url) => format!("Navigate to {url}"),
        None => "Navigate to an unspecified URL".to_string(),
    }
}

fn format_click(function: &BrowserFunction) -> String {
    match function.arg_str("selector") {
        Some(selector) => format!("Click on '{selector}'"),
        None => "Click on an unspecified element".to_string(),
    }
}

fn format_type(function: &BrowserFunction) -> String {
    let text = function.arg_str("text").unwrap_or("");
    match function.arg_str("selector") {
        Some(selector) => format!("Type \"{text}\" into '{selector}'"),
        None => format!("Type \"{text}\""),
    }
}

fn format_extract(function: &BrowserFunction) -> String {
    match function.arg_str("selector") {
        Some(selector) => format!("Extract content from '{selector}'"),
        None => "Extract content from the page".to_string(),
    }
}

fn format_wait(function: &BrowserFunction) -> String {
    match function.args.get("milliseconds").and_then(Value::as_u64) {
        Some(ms) => format!("Wait for {ms} ms"),
        None => "Wait".to_string(),
    }
}

fn format_wait_for_selector(function: &BrowserFunction) -> String {
    match function.arg_str("selector") {
        Some(selector) => format!("Wait for '{selector}' to appear"),
        None => "Wait for an element to appear".to_string(),
    }
}

fn format_scroll_to(function: &BrowserFunction) -> String {
    let x = function.args.get("x").and_then(Value::as_i64).unwrap_or(0);
    let y = function.args.get("y").and_then(Value::as_i64).unwrap_or(0);
    format!("Scroll to position ({x}, {y})")
}

fn format_scroll_into_view(function: &BrowserFunction) -> String {
    match function.arg_str("selector") {
        Some(selector) => format!("Scroll until '{selector}' is in view"),
        None => "Scroll an element into view".to_string(),
    }
}

fn format_hover(function: &BrowserFunction) -> String {
    match function.arg_str("selector") {
        Some(selector) => format!("Hover over '{selector}'"),
        None => "Hover over an unspecified element".to_string(),
    }
}

fn format_focus(function: &BrowserFunction) -> String {
    match function.arg_str("selector") {
        Some(selector) => format!("Focus '{selector}'"),
        None => "Focus an unspecified element".to_string(),
    }
}

fn format_select(function: &BrowserFunction) -> String {
    let value = function.arg_str("value").unwrap_or("");
    match function.arg_str("selector") {
        Some(selector) => format!("Select \"{value}\" in '{selector}'"),
        None => format!("Select \"{value}\""),
    }
}

fn format_generic(function: &BrowserFunction) -> String {
    if function.args.is_empty() {
        format!("Execute {}", function.name)
    } else {
        format!(
            "Execute {} with {}",
            function.name,
            Value::Object(function.args.clone())
        )
    }
}
