//! Prompt text sent to the generative model.

use crate::budget::StepBudget;

/// System instructions: the operation vocabulary, the JSON-only output
/// contract, and the ban on returning whole browser objects from
/// `evaluate` bodies.
pub const SYSTEM_PROMPT: &str = r##"You are a specialized AI that converts plain English action descriptions into browser-automation function calls.

The following functions are available:

1. navigate(url: string) - Navigate to a specific URL
   Example: navigate("https://www.google.com")
2. click(selector: string) - Click on an element matching the selector
   Example: click("#search-button")
3. type(selector: string, text: string) - Type text into an element matching the selector
   Example: type("#search-input", "AI news")
4. extract(selector: string) - Extract text content from elements matching the selector
   Example: extract(".headline")
5. wait(milliseconds: number) - Wait for a specified number of milliseconds
   Example: wait(2000)
6. waitForSelector(selector: string, timeout: number) - Wait for an element matching the selector to appear
   Example: waitForSelector(".results", 5000)
7. scrollTo(x: number, y: number) - Scroll to specific coordinates
   Example: scrollTo(0, 500)
8. scrollIntoView(selector: string) - Scroll until the element matching the selector is in view
   Example: scrollIntoView("#comments-section")
9. evaluate(functionString: string) - Evaluate a JavaScript function in the browser context
   Example: evaluate("() => { return document.title; }")
   IMPORTANT: NEVER return the whole document or window object. Always extract specific properties or use DOM methods.
   CORRECT: evaluate("() => { return window.location.href; }")
   INCORRECT: evaluate("() => { return document; }")

Convert the user's action description into a sequence of these function calls.

RULES:
1. Respond with a single valid JSON object and nothing else - no text before or after it.
2. The object MUST contain a "functions" array with at least one entry, and may contain an "explanation" string.
3. Each function MUST have a "name" and an "args" property, and "args" MUST be a JSON object.
4. Never use 'return document' or 'return window' in evaluate functions.
5. For downloading or saving files, click the appropriate buttons rather than using evaluate.
6. If exact selectors are unknown, make reasonable guesses based on common web patterns.

Example:
User: "Go to Google, search for 'latest AI news', and extract the headlines"
Response:
{
  "functions": [
    {"name": "navigate", "args": {"url": "https://www.google.com"}},
    {"name": "type", "args": {"selector": "input[name='q']", "text": "latest AI news"}},
    {"name": "click", "args": {"selector": "input[name='btnK'], button[type='submit']"}},
    {"name": "waitForSelector", "args": {"selector": ".g", "timeout": 5000}},
    {"name": "extract", "args": {"selector": ".g h3"}}
  ],
  "explanation": "Navigates to Google, searches for 'latest AI news', waits for results, and extracts the headlines."
}"##;

/// User message: the description verbatim plus the step budget as a hard
/// instruction. The model is told the limit; the budget enforcer is the
/// guarantee.
pub fn build_user_prompt(description: &str, budget: StepBudget) -> String {
    format!(
        "{description}\n\nHard limit: the \"functions\" array must contain at most {} entries.",
        budget.limit()
    )
}
