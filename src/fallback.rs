//! Deterministic fallback planner.
//!
//! A priority-ordered decision tree over the lower-cased task text; the
//! first matching rule wins and the final branch is unconditional, so a
//! syntactically valid, non-empty plan is always produced without any
//! external call. Used whenever model-based generation fails validation.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;
use url::Url;

use crate::budget::StepBudget;
use crate::plan::{BrowserFunction, BrowserPlan};

const DEFAULT_SEARCH_ENGINE: &str = "https://www.google.com";
const DEFAULT_NOTEPAD_URL: &str = "https://onlinenotepad.org/notepad";
const DEFAULT_FILENAME: &str = "document.txt";
const DEFAULT_AWARD_YEAR: &str = "2021";
const DEFAULT_AWARD_CATEGORY: &str = "best supporting actor";
const DEFAULT_ENTITY_COUNT: usize = 5;

/// Fixed shape of the award-lookup branch: a search preamble followed by
/// one block per nominee.
const LOOKUP_PREAMBLE_LEN: usize = 5;
const LOOKUP_ENTITY_LEN: usize = 8;
const SAVE_BLOCK_LEN: usize = 4;

const SEARCH_QUERY_INPUT: &str = "input[name='q']";
const SEARCH_SUBMIT: &str = "input[name='btnK'], button[type='submit']";
const SEARCH_RESULTS: &str = ".g";
const SEARCH_RESULT_TITLES: &str = ".g h3";

const EDITOR_AREA: &str = "textarea, [contenteditable='true']";
const SAVE_BUTTON: &str = "button:contains('Save'), .save-button, [aria-label='Save']";
const FILENAME_INPUT: &str =
    "input[type='text'], input[placeholder*='file'], input[name='filename']";
const DOWNLOAD_BUTTON: &str =
    "button:contains('Save'), button:contains('Download'), .download-button";

const VIDEO_SEARCH_INPUT: &str = "input#search";
const VIDEO_SEARCH_BUTTON: &str = "button#search-icon-legacy";
const VIDEO_RESULT: &str = "ytd-video-renderer";
const VIDEO_RESULT_TITLES: &str = "ytd-video-renderer h3";

const PROFILE_SEARCH_INPUT: &str = "input#suggestion-search";
const PROFILE_SEARCH_BUTTON: &str = "button[type='submit'], #suggestion-search-button";
const PROFILE_RESULT: &str = ".findResult";
const PROFILE_FIRST_RESULT_LINK: &str = ".findResult:first-child .result_text a";
const PROFILE_HEADER: &str = "h1.header";
const CURRENT_URL_SCRIPT: &str = "() => { return window.location.href; }";

const WAIT_TIMEOUT_MS: u64 = 5_000;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("url regex"));
static YEAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19\d\d|20\d\d)\b").expect("year regex"));
static COUNT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"first (\d+)").expect("count regex"));
static NOTEPAD_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+(?:notepad|paste|pad)[^\s]*").expect("notepad regex"));
static FILENAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"save (?:as|it as|the document as|file as) ["']?([^"']+\.(?:txt|pdf|doc|docx|csv))["']?"#,
    )
    .expect("filename regex")
});

/// Builds a plan from the task text alone. Pure and total: identical
/// inputs yield identical plans, and every input matches some branch.
pub fn fallback_plan(description: &str, budget: StepBudget) -> BrowserPlan {
    let lowered = description.to_lowercase();
    info!(limit = budget.limit(), "building deterministic fallback plan");

    if (lowered.contains("oscar") || lowered.contains("academy award"))
        && lowered.contains("actor")
        && lowered.contains("imdb")
    {
        award_lookup_plan(description, &lowered, budget)
    } else if lowered.contains("youtube")
        && (lowered.contains("notepad") || lowered.contains("paste"))
    {
        video_search_save_plan(description, &lowered, budget)
    } else if lowered.contains("youtube") && lowered.contains("search") {
        video_search_plan(description, budget)
    } else if (lowered.contains("notepad") || lowered.contains("paste"))
        && URL_REGEX.is_match(description)
    {
        paste_plan(description, &lowered, budget)
    } else if lowered.contains("search") {
        generic_search_plan(description, budget)
    } else {
        navigate_plan(description, budget)
    }
}

/// Rule 1: awards context + actor role + profile-directory site. A fixed
/// search preamble, then one lookup block per nominee, sized up front so
/// no block is ever cut in half.
fn award_lookup_plan(description: &str, lowered: &str, budget: StepBudget) -> BrowserPlan {
    let year = YEAR_REGEX
        .find(description)
        .map(|m| m.as_str())
        .unwrap_or(DEFAULT_AWARD_YEAR);
    let category = award_category(lowered);
    let requested = COUNT_REGEX
        .captures(lowered)
        .and_then(|caps| caps[1].parse::<usize>().ok())
        .unwrap_or(DEFAULT_ENTITY_COUNT);

    let query = format!("{year} Oscar nominees {category}");
    let mut functions = search_preamble(&query);
    debug_assert_eq!(functions.len(), LOOKUP_PREAMBLE_LEN);

    let entities = budget.entity_allowance(functions.len(), LOOKUP_ENTITY_LEN, requested);
    for index in 1..=entities {
        functions.extend(profile_lookup_block(year, category, index));
    }
    let preamble_cut = budget.truncate(&mut functions);

    let mut explanation = format!(
        "Fallback plan: search for {year} Oscar nominees for {category}, \
         then visit IMDB profiles for {entities} nominees"
    );
    if entities < requested {
        explanation.push_str(&format!(
            " ({requested} requested, limited by the {}-step budget)",
            budget.limit()
        ));
    }
    if preamble_cut {
        explanation.push_str(&format!(
            " (search steps truncated to the {}-step budget)",
            budget.limit()
        ));
    }

    BrowserPlan::new(description, functions).with_explanation(explanation)
}

/// Rule 2: video-platform search whose results get pasted into an online
/// notepad and saved under a derived filename.
fn video_search_save_plan(description: &str, lowered: &str, budget: StepBudget) -> BrowserPlan {
    let search_term = extract_search_term(description);
    let notepad_url = extract_notepad_url(description);
    let filename = extract_filename(lowered);

    let mut functions = vec![
        navigate("https://www.youtube.com"),
        type_text(VIDEO_SEARCH_INPUT, &search_term),
        click(VIDEO_SEARCH_BUTTON),
        wait_for(VIDEO_RESULT),
        extract(VIDEO_RESULT_TITLES),
        navigate(&notepad_url),
        wait_for(EDITOR_AREA),
        type_text(
            EDITOR_AREA,
            &format!("YouTube search results for: {search_term}"),
        ),
    ];
    functions.extend(save_block(&filename));
    let truncated = budget.truncate(&mut functions);

    let mut explanation = format!(
        "Fallback plan: search YouTube for '{search_term}', paste the results \
         into {notepad_url}, and save as {filename}"
    );
    if truncated {
        explanation.push_str(&format!(" (truncated to {} steps)", budget.limit()));
    }

    BrowserPlan::new(description, functions).with_explanation(explanation)
}

/// Rule 3: video-platform search with no save destination.
fn video_search_plan(description: &str, budget: StepBudget) -> BrowserPlan {
    let search_term = extract_search_term(description);
    let mut functions = vec![
        navigate("https://www.youtube.com"),
        type_text(VIDEO_SEARCH_INPUT, &search_term),
        click(VIDEO_SEARCH_BUTTON),
        wait_for(VIDEO_RESULT),
    ];
    let truncated = budget.truncate(&mut functions);

    let mut explanation = format!("Fallback plan: search YouTube for '{search_term}'");
    if truncated {
        explanation.push_str(&format!(" (truncated to {} steps)", budget.limit()));
    }

    BrowserPlan::new(description, functions).with_explanation(explanation)
}

/// Rule 4: paste search results into a notepad named by URL, appending
/// the save block only when asked for and the budget still has room.
fn paste_plan(description: &str, lowered: &str, budget: StepBudget) -> BrowserPlan {
    let search_term = extract_search_term(description);
    let notepad_url = extract_notepad_url(description);
    let filename = extract_filename(lowered);
    let wants_save = lowered.contains("save") || lowered.contains("download");

    let mut functions = vec![
        navigate(DEFAULT_SEARCH_ENGINE),
        type_text(SEARCH_QUERY_INPUT, &search_term),
        click(SEARCH_SUBMIT),
        wait_for(SEARCH_RESULTS),
        extract(SEARCH_RESULTS),
        navigate(&notepad_url),
        wait_for(EDITOR_AREA),
        type_text(EDITOR_AREA, &format!("Search results for: {search_term}")),
    ];

    // Explicit flag rather than inferring from the final step count.
    let mut saved = false;
    if wants_save && budget.remaining(functions.len()) >= SAVE_BLOCK_LEN {
        functions.extend(save_block(&filename));
        saved = true;
    }
    let truncated = budget.truncate(&mut functions);

    let mut explanation = format!(
        "Fallback plan: search for '{search_term}' and paste the results into {notepad_url}"
    );
    if saved {
        explanation.push_str(&format!(" and save as {filename}"));
    }
    if truncated {
        explanation.push_str(&format!(" (truncated to {} steps)", budget.limit()));
    }

    BrowserPlan::new(description, functions).with_explanation(explanation)
}

/// Rule 5: plain search.
fn generic_search_plan(description: &str, budget: StepBudget) -> BrowserPlan {
    let search_term = extract_search_term(description);
    let mut functions = vec![
        navigate(DEFAULT_SEARCH_ENGINE),
        type_text(SEARCH_QUERY_INPUT, &search_term),
        click(SEARCH_SUBMIT),
    ];
    let truncated = budget.truncate(&mut functions);

    let mut explanation = format!("Fallback plan: search Google for '{search_term}'");
    if truncated {
        explanation.push_str(&format!(" (truncated to {} steps)", budget.limit()));
    }

    BrowserPlan::new(description, functions).with_explanation(explanation)
}

/// Rule 6: nothing matched; navigate to the first URL in the text, or to
/// the default search engine.
fn navigate_plan(description: &str, _budget: StepBudget) -> BrowserPlan {
    let url = extract_first_url(description)
        .unwrap_or_else(|| DEFAULT_SEARCH_ENGINE.to_string());
    let explanation = format!("Fallback plan: navigate to {url}");

    BrowserPlan::new(description, vec![navigate(&url)]).with_explanation(explanation)
}

fn search_preamble(query: &str) -> Vec<BrowserFunction> {
    vec![
        navigate(DEFAULT_SEARCH_ENGINE),
        type_text(SEARCH_QUERY_INPUT, query),
        click(SEARCH_SUBMIT),
        wait_for(SEARCH_RESULTS),
        extract(SEARCH_RESULT_TITLES),
    ]
}

/// Fixed-length lookup for one nominee on the profile directory. Ends
/// with an evaluate that reads the profile URL (a specific property, not
/// the whole window object).
fn profile_lookup_block(year: &str, category: &str, index: usize) -> Vec<BrowserFunction> {
    vec![
        navigate("https://www.imdb.com"),
        type_text(
            PROFILE_SEARCH_INPUT,
            &format!("{year} Oscar nominee {category} actor {index}"),
        ),
        click(PROFILE_SEARCH_BUTTON),
        wait_for(PROFILE_RESULT),
        click(PROFILE_FIRST_RESULT_LINK),
        wait_for(PROFILE_HEADER),
        extract(PROFILE_HEADER),
        BrowserFunction::new("evaluate").with_arg("functionString", CURRENT_URL_SCRIPT),
    ]
}

fn save_block(filename: &str) -> Vec<BrowserFunction> {
    vec![
        click(SAVE_BUTTON),
        wait_for(FILENAME_INPUT),
        type_text(FILENAME_INPUT, filename),
        click(DOWNLOAD_BUTTON),
    ]
}

fn navigate(url: &str) -> BrowserFunction {
    BrowserFunction::new("navigate").with_arg("url", url)
}

fn type_text(selector: &str, text: &str) -> BrowserFunction {
    BrowserFunction::new("type")
        .with_arg("selector", selector)
        .with_arg("text", text)
}

fn click(selector: &str) -> BrowserFunction {
    BrowserFunction::new("click").with_arg("selector", selector)
}

fn wait_for(selector: &str) -> BrowserFunction {
    BrowserFunction::new("waitForSelector")
        .with_arg("selector", selector)
        .with_arg("timeout", WAIT_TIMEOUT_MS)
}

fn extract(selector: &str) -> BrowserFunction {
    BrowserFunction::new("extract").with_arg("selector", selector)
}

fn award_category(lowered: &str) -> &'static str {
    if lowered.contains("lead") || lowered.contains("best actor") {
        "best actor"
    } else if lowered.contains("supporting actress") {
        "best supporting actress"
    } else if lowered.contains("actress") {
        "best actress"
    } else {
        DEFAULT_AWARD_CATEGORY
    }
}

/// Pulls a search term out of the task text.
///
/// Scans for "search for" / "find" / "search" / "look for" in that
/// priority order (case-insensitively) and takes the original-cased text
/// after the first match, with surrounding quotes trimmed. An empty or
/// over-long result falls back to the first five words of the input.
fn extract_search_term(description: &str) -> String {
    let lowered = description.to_lowercase();
    let after_keyword = ["search for", "find", "search", "look for"]
        .iter()
        .find_map(|keyword| lowered.find(keyword).map(|pos| pos + keyword.len()));

    let Some(start) = after_keyword else {
        return description.trim().to_string();
    };
    // Byte offsets come from the lowered copy; on the rare non-ASCII input
    // where they fail to line up, keep the leading-words fallback.
    let term = description
        .get(start..)
        .map(|rest| rest.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .unwrap_or("");

    if term.is_empty() || term.len() > 100 {
        leading_words(description, 5)
    } else {
        term.to_string()
    }
}

fn leading_words(text: &str, count: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > count {
        words[..count].join(" ")
    } else {
        text.trim().to_string()
    }
}

fn extract_notepad_url(description: &str) -> String {
    NOTEPAD_URL_REGEX
        .find(description)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_NOTEPAD_URL.to_string())
}

fn extract_filename(lowered: &str) -> String {
    FILENAME_REGEX
        .captures(lowered)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

fn extract_first_url(text: &str) -> Option<String> {
    let candidate = URL_REGEX
        .find(text)?
        .as_str()
        .trim_end_matches(['.', ',', ';']);
    // Unparseable matches fall through to the default search engine.
    Url::parse(candidate).ok()?;
    Some(candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::scan_functions;

    #[test]
    fn generic_search_produces_three_steps() {
        let plan = fallback_plan("search for cats", StepBudget::default());
        assert_eq!(plan.functions.len(), 3);
        assert_eq!(plan.functions[0].name, "navigate");
        assert_eq!(
            plan.functions[0].arg_str("url"),
            Some(DEFAULT_SEARCH_ENGINE)
        );
        assert_eq!(plan.functions[1].arg_str("text"), Some("cats"));
        assert_eq!(plan.functions[2].name, "click");
        assert!(plan.explanation.as_deref().unwrap_or("").contains("cats"));
    }

    #[test]
    fn bare_url_produces_single_navigation() {
        let plan = fallback_plan("go to https://example.com", StepBudget::default());
        assert_eq!(plan.functions.len(), 1);
        assert_eq!(plan.functions[0].name, "navigate");
        assert_eq!(plan.functions[0].arg_str("url"), Some("https://example.com"));
    }

    #[test]
    fn trailing_punctuation_is_stripped_from_urls() {
        let plan = fallback_plan("open https://example.com/page, please", StepBudget::default());
        assert_eq!(
            plan.functions[0].arg_str("url"),
            Some("https://example.com/page")
        );
    }

    #[test]
    fn award_lookup_fits_one_nominee_in_thirteen_steps() {
        let plan = fallback_plan(
            "Find IMDB profiles for the 2021 Oscar nominees best supporting actor",
            StepBudget::new(13),
        );
        // 5-step preamble plus exactly one 8-step nominee block.
        assert_eq!(plan.functions.len(), 13);
        assert_eq!(plan.functions[5].arg_str("url"), Some("https://www.imdb.com"));
        assert_eq!(plan.functions[12].name, "evaluate");
        let explanation = plan.explanation.as_deref().unwrap();
        assert!(explanation.contains("2021"));
        assert!(explanation.contains("best supporting actor"));
        assert!(explanation.contains("limited"));
    }

    #[test]
    fn award_lookup_respects_requested_count() {
        let plan = fallback_plan(
            "Find IMDB profiles for the first 2 2024 Oscar nominated actors",
            StepBudget::new(50),
        );
        assert_eq!(
            plan.functions.len(),
            LOOKUP_PREAMBLE_LEN + 2 * LOOKUP_ENTITY_LEN
        );
        assert!(plan.explanation.as_deref().unwrap().contains("2024"));
    }

    #[test]
    fn award_lookup_with_budget_of_one_keeps_only_first_step() {
        let plan = fallback_plan(
            "Find IMDB profiles for the 2021 Oscar nominated actors",
            StepBudget::new(1),
        );
        assert_eq!(plan.functions.len(), 1);
        assert_eq!(plan.functions[0].name, "navigate");
        assert!(plan.explanation.as_deref().unwrap().contains("truncated"));
    }

    #[test]
    fn award_lookup_step_count_is_monotonic_in_budget() {
        let description = "Find IMDB profiles for the 2021 Oscar nominated actors";
        let mut last = 0;
        for limit in 1..=50 {
            let plan = fallback_plan(description, StepBudget::new(limit));
            assert!(plan.functions.len() >= last);
            assert!(plan.functions.len() <= limit);
            last = plan.functions.len();
        }
        // Natural length: preamble plus five nominee blocks.
        assert_eq!(last, LOOKUP_PREAMBLE_LEN + 5 * LOOKUP_ENTITY_LEN);
    }

    #[test]
    fn video_save_branch_carries_filename_and_destination() {
        let plan = fallback_plan(
            "Search YouTube for rust tutorials, paste the titles into \
             https://my.notepad.example/pad and save as 'links.txt'",
            StepBudget::new(50),
        );
        assert_eq!(plan.functions.len(), 12);
        assert_eq!(
            plan.functions[5].arg_str("url"),
            Some("https://my.notepad.example/pad")
        );
        let typed_filename = plan.functions[10].arg_str("text").unwrap();
        assert_eq!(typed_filename, "links.txt");
        assert!(plan.explanation.as_deref().unwrap().contains("links.txt"));
    }

    #[test]
    fn video_search_without_destination_is_four_steps() {
        let plan = fallback_plan("search youtube for lo-fi beats", StepBudget::default());
        assert_eq!(plan.functions.len(), 4);
        assert_eq!(
            plan.functions[0].arg_str("url"),
            Some("https://www.youtube.com")
        );
    }

    #[test]
    fn paste_branch_appends_save_steps_only_when_requested() {
        let base = "search for rust news and paste them into https://onlinenotepad.org/notepad";
        let without_save = fallback_plan(base, StepBudget::new(50));
        assert_eq!(without_save.functions.len(), 8);
        assert!(!without_save.explanation.as_deref().unwrap().contains("save as"));

        let with_save = format!("{base} and save the file");
        let saved = fallback_plan(&with_save, StepBudget::new(50));
        assert_eq!(saved.functions.len(), 12);
        assert!(saved
            .explanation
            .as_deref()
            .unwrap()
            .contains("save as document.txt"));
    }

    #[test]
    fn paste_branch_skips_save_steps_when_budget_is_tight() {
        let description =
            "search for rust news, paste into https://onlinenotepad.org/notepad and save it";
        let plan = fallback_plan(description, StepBudget::new(9));
        // Save steps need four slots; only one remains, so none are added
        // and the explanation does not promise a save.
        assert_eq!(plan.functions.len(), 8);
        assert!(!plan.explanation.as_deref().unwrap().contains("save as"));
    }

    #[test]
    fn planner_is_idempotent() {
        let description = "Find IMDB profiles for the first 3 2020 Oscar nominated actors";
        let first = fallback_plan(description, StepBudget::new(40));
        let second = fallback_plan(description, StepBudget::new(40));
        assert_eq!(first, second);
    }

    #[test]
    fn no_branch_emits_hazardous_evaluate_bodies() {
        let inputs = [
            "Find IMDB profiles for the 2021 Oscar nominated actors",
            "Search YouTube for cooking videos and paste them to a notepad",
            "search youtube for cats",
            "search for weather and paste into https://paste.example.org and save",
            "search for anything",
            "go to https://example.com",
        ];
        for input in inputs {
            let plan = fallback_plan(input, StepBudget::new(50));
            assert!(!plan.functions.is_empty(), "empty plan for {input:?}");
            assert!(scan_functions(&plan.functions).is_ok(), "hazard in {input:?}");
        }
    }

    #[test]
    fn search_term_extraction_prefers_earlier_keywords() {
        assert_eq!(extract_search_term("search for 'AI news'"), "AI news");
        assert_eq!(extract_search_term("please find cute cats"), "cute cats");
        assert_eq!(extract_search_term("search rust planners"), "rust planners");
        assert_eq!(extract_search_term("look for a hotel"), "a hotel");
        // No keyword: the whole input is the term.
        assert_eq!(extract_search_term("weather in Lisbon"), "weather in Lisbon");
    }

    #[test]
    fn overlong_search_terms_fall_back_to_leading_words() {
        let long_tail = vec!["chunk"; 30].join(" ");
        let description = format!("search for {long_tail}");
        assert_eq!(
            extract_search_term(&description),
            "search for chunk chunk chunk"
        );
        // An empty tail behaves the same way; five or fewer words means
        // the whole input is used.
        assert_eq!(extract_search_term("search for"), "search for");
    }

    #[test]
    fn award_category_detection() {
        assert_eq!(award_category("best lead actor"), "best actor");
        assert_eq!(
            award_category("nominees for best supporting actress"),
            "best supporting actress"
        );
        assert_eq!(award_category("best actress nominees"), "best actress");
        assert_eq!(award_category("oscar actor imdb"), DEFAULT_AWARD_CATEGORY);
    }
}
