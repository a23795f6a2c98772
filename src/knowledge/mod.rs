//! Pattern knowledge base: identifier names → intent.
//!
//! Identifiers are split into lowercase words (`getUserProfile` and
//! `get_user_profile` both become `get user profile`). The verb prefix is
//! matched against [`PREFIX_PATTERNS`], an ordered table evaluated top to
//! bottom where multi-word prefixes come first. The remaining words form the
//! object phrase of the generated description.

pub mod overrides;

use serde::Serialize;

pub use overrides::{class_role, library_call_description, special_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Retrieval,
    Mutation,
    Creation,
    Deletion,
    Validation,
    Computation,
    Search,
    Ordering,
    Formatting,
    Caching,
    Concurrency,
    ErrorHandling,
    Logging,
    Testing,
    Initialization,
    Cleanup,
    Eventing,
    DataModeling,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Retrieval => "retrieval",
            Intent::Mutation => "mutation",
            Intent::Creation => "creation",
            Intent::Deletion => "deletion",
            Intent::Validation => "validation",
            Intent::Computation => "computation",
            Intent::Search => "search",
            Intent::Ordering => "ordering",
            Intent::Formatting => "formatting",
            Intent::Caching => "caching",
            Intent::Concurrency => "concurrency",
            Intent::ErrorHandling => "error_handling",
            Intent::Logging => "logging",
            Intent::Testing => "testing",
            Intent::Initialization => "initialization",
            Intent::Cleanup => "cleanup",
            Intent::Eventing => "eventing",
            Intent::DataModeling => "data_modeling",
        }
    }

    /// Object phrase used when the identifier is the bare verb.
    fn default_object(&self) -> &'static str {
        match self {
            Intent::Retrieval => "the requested data",
            Intent::Mutation => "the stored state",
            Intent::Creation => "the item",
            Intent::Deletion => "the item",
            Intent::Validation => "the input",
            Intent::Computation => "the result",
            Intent::Search => "matching entries",
            Intent::Ordering => "the items",
            Intent::Formatting => "the data",
            Intent::Caching => "the result",
            Intent::Concurrency => "the work",
            Intent::ErrorHandling => "the failure",
            Intent::Logging => "the message",
            Intent::Testing => "the behaviour",
            Intent::Initialization => "the component",
            Intent::Cleanup => "resources",
            Intent::Eventing => "the event",
            Intent::DataModeling => "the data structure",
        }
    }
}

/// One row of the prefix table. `template` contains `{object}`.
#[derive(Debug, Clone, Copy)]
pub struct PrefixPattern {
    pub words: &'static [&'static str],
    pub intent: Intent,
    pub template: &'static str,
}

const fn prefix(
    words: &'static [&'static str],
    intent: Intent,
    template: &'static str,
) -> PrefixPattern {
    PrefixPattern {
        words,
        intent,
        template,
    }
}

/// Verb prefixes in priority order. First match wins.
pub static PREFIX_PATTERNS: &[PrefixPattern] = &[
    // multi-word prefixes
    prefix(&["get", "or", "create"], Intent::Creation, "Retrieve or create {object}"),
    prefix(&["set", "up"], Intent::Initialization, "Set up {object}"),
    prefix(&["tear", "down"], Intent::Cleanup, "Tear down {object}"),
    prefix(&["clean", "up"], Intent::Cleanup, "Clean up {object}"),
    prefix(&["look", "up"], Intent::Search, "Look up {object}"),
    prefix(&["find", "all"], Intent::Search, "Find all {object}"),
    prefix(&["is", "valid"], Intent::Validation, "Check if {object} is valid"),
    prefix(&["sign", "in"], Intent::Validation, "Log user in"),
    prefix(&["log", "in"], Intent::Validation, "Log user in"),
    prefix(&["sign", "out"], Intent::Cleanup, "Log user out"),
    prefix(&["log", "out"], Intent::Cleanup, "Log user out"),
    prefix(&["sign", "up"], Intent::Creation, "Register new user"),
    // retrieval
    prefix(&["get"], Intent::Retrieval, "Retrieve {object}"),
    prefix(&["retrieve"], Intent::Retrieval, "Retrieve {object}"),
    prefix(&["fetch"], Intent::Retrieval, "Fetch {object}"),
    prefix(&["load"], Intent::Retrieval, "Load {object}"),
    prefix(&["read"], Intent::Retrieval, "Read {object}"),
    prefix(&["receive"], Intent::Retrieval, "Receive {object}"),
    prefix(&["download"], Intent::Retrieval, "Download {object}"),
    // mutation
    prefix(&["set"], Intent::Mutation, "Set {object}"),
    prefix(&["update"], Intent::Mutation, "Update {object}"),
    prefix(&["modify"], Intent::Mutation, "Update {object}"),
    prefix(&["change"], Intent::Mutation, "Update {object}"),
    prefix(&["edit"], Intent::Mutation, "Update {object}"),
    prefix(&["save"], Intent::Mutation, "Save {object}"),
    prefix(&["write"], Intent::Mutation, "Save {object}"),
    prefix(&["store"], Intent::Mutation, "Save {object}"),
    prefix(&["persist"], Intent::Mutation, "Save {object}"),
    prefix(&["export"], Intent::Mutation, "Export {object}"),
    // creation
    prefix(&["create"], Intent::Creation, "Create new {object}"),
    prefix(&["make"], Intent::Creation, "Create new {object}"),
    prefix(&["new"], Intent::Creation, "Create new {object}"),
    prefix(&["add"], Intent::Creation, "Add {object}"),
    prefix(&["insert"], Intent::Creation, "Insert {object}"),
    prefix(&["build"], Intent::Creation, "Build {object}"),
    prefix(&["generate"], Intent::Creation, "Build {object}"),
    prefix(&["construct"], Intent::Creation, "Build {object}"),
    prefix(&["compile"], Intent::Creation, "Build {object}"),
    prefix(&["from"], Intent::Creation, "Construct an instance from {object}"),
    // deletion
    prefix(&["delete"], Intent::Deletion, "Remove {object}"),
    prefix(&["remove"], Intent::Deletion, "Remove {object}"),
    prefix(&["destroy"], Intent::Deletion, "Remove {object}"),
    prefix(&["drop"], Intent::Deletion, "Remove {object}"),
    prefix(&["clear"], Intent::Deletion, "Clear {object}"),
    // validation
    prefix(&["is"], Intent::Validation, "Check if {object}"),
    prefix(&["has"], Intent::Validation, "Check whether it has {object}"),
    prefix(&["can"], Intent::Validation, "Check whether it can {object}"),
    prefix(&["should"], Intent::Validation, "Decide whether to {object}"),
    prefix(&["validate"], Intent::Validation, "Validate {object}"),
    prefix(&["verify"], Intent::Validation, "Validate {object}"),
    prefix(&["check"], Intent::Validation, "Validate {object}"),
    prefix(&["ensure"], Intent::Validation, "Validate {object}"),
    prefix(&["authenticate"], Intent::Validation, "Verify credentials for {object}"),
    prefix(&["authorize"], Intent::Validation, "Verify permissions for {object}"),
    // computation
    prefix(&["calculate"], Intent::Computation, "Calculate {object}"),
    prefix(&["compute"], Intent::Computation, "Calculate {object}"),
    prefix(&["determine"], Intent::Computation, "Calculate {object}"),
    prefix(&["process"], Intent::Computation, "Process {object}"),
    prefix(&["manage"], Intent::Computation, "Process {object}"),
    prefix(&["count"], Intent::Computation, "Count {object}"),
    // search
    prefix(&["find"], Intent::Search, "Find {object}"),
    prefix(&["search"], Intent::Search, "Find {object}"),
    prefix(&["lookup"], Intent::Search, "Find {object}"),
    prefix(&["locate"], Intent::Search, "Find {object}"),
    prefix(&["filter"], Intent::Search, "Filter {object}"),
    prefix(&["select"], Intent::Search, "Filter {object}"),
    prefix(&["query"], Intent::Search, "Filter {object}"),
    // ordering
    prefix(&["sort"], Intent::Ordering, "Sort {object}"),
    prefix(&["order"], Intent::Ordering, "Sort {object}"),
    prefix(&["arrange"], Intent::Ordering, "Sort {object}"),
    prefix(&["rank"], Intent::Ordering, "Rank {object}"),
    prefix(&["shuffle"], Intent::Ordering, "Shuffle {object}"),
    // formatting
    prefix(&["parse"], Intent::Formatting, "Parse {object}"),
    prefix(&["decode"], Intent::Formatting, "Parse {object}"),
    prefix(&["extract"], Intent::Formatting, "Parse {object}"),
    prefix(&["format"], Intent::Formatting, "Format {object}"),
    prefix(&["encode"], Intent::Formatting, "Format {object}"),
    prefix(&["serialize"], Intent::Formatting, "Format {object}"),
    prefix(&["stringify"], Intent::Formatting, "Format {object}"),
    prefix(&["convert"], Intent::Formatting, "Convert {object}"),
    prefix(&["transform"], Intent::Formatting, "Convert {object}"),
    prefix(&["map"], Intent::Formatting, "Convert {object}"),
    prefix(&["to"], Intent::Formatting, "Convert to {object}"),
    prefix(&["render"], Intent::Formatting, "Display {object}"),
    prefix(&["draw"], Intent::Formatting, "Display {object}"),
    prefix(&["display"], Intent::Formatting, "Display {object}"),
    prefix(&["show"], Intent::Formatting, "Display {object}"),
    prefix(&["print"], Intent::Formatting, "Display {object}"),
    // caching
    prefix(&["cache"], Intent::Caching, "Cache {object}"),
    prefix(&["memoize"], Intent::Caching, "Cache {object}"),
    prefix(&["invalidate"], Intent::Caching, "Invalidate cached {object}"),
    prefix(&["evict"], Intent::Caching, "Evict {object} from the cache"),
    // concurrency
    prefix(&["spawn"], Intent::Concurrency, "Spawn {object} concurrently"),
    prefix(&["schedule"], Intent::Concurrency, "Schedule {object}"),
    prefix(&["acquire"], Intent::Concurrency, "Acquire {object}"),
    prefix(&["release"], Intent::Concurrency, "Release {object}"),
    prefix(&["lock"], Intent::Concurrency, "Lock {object}"),
    prefix(&["unlock"], Intent::Concurrency, "Unlock {object}"),
    prefix(&["wait"], Intent::Concurrency, "Wait for {object}"),
    prefix(&["await"], Intent::Concurrency, "Wait for {object}"),
    // error handling
    prefix(&["raise"], Intent::ErrorHandling, "Raise {object} error"),
    prefix(&["throw"], Intent::ErrorHandling, "Raise {object} error"),
    prefix(&["retry"], Intent::ErrorHandling, "Retry {object} after a failure"),
    prefix(&["recover"], Intent::ErrorHandling, "Recover from {object}"),
    // logging
    prefix(&["log"], Intent::Logging, "Log {object}"),
    prefix(&["debug"], Intent::Logging, "Log {object} for debugging"),
    prefix(&["trace"], Intent::Logging, "Trace {object}"),
    prefix(&["warn"], Intent::Logging, "Warn about {object}"),
    // testing
    prefix(&["test"], Intent::Testing, "Test {object}"),
    prefix(&["mock"], Intent::Testing, "Mock {object} for testing"),
    prefix(&["assert"], Intent::Testing, "Assert {object}"),
    // initialization
    prefix(&["init"], Intent::Initialization, "Set up {object}"),
    prefix(&["initialize"], Intent::Initialization, "Set up {object}"),
    prefix(&["setup"], Intent::Initialization, "Set up {object}"),
    prefix(&["configure"], Intent::Initialization, "Set up {object}"),
    prefix(&["bootstrap"], Intent::Initialization, "Set up {object}"),
    prefix(&["open"], Intent::Initialization, "Open {object}"),
    prefix(&["connect"], Intent::Initialization, "Connect to {object}"),
    prefix(&["start"], Intent::Initialization, "Start {object}"),
    // cleanup
    prefix(&["cleanup"], Intent::Cleanup, "Clean up {object}"),
    prefix(&["dispose"], Intent::Cleanup, "Clean up {object}"),
    prefix(&["teardown"], Intent::Cleanup, "Clean up {object}"),
    prefix(&["reset"], Intent::Cleanup, "Reset {object}"),
    prefix(&["free"], Intent::Cleanup, "Free {object}"),
    prefix(&["close"], Intent::Cleanup, "Close {object}"),
    prefix(&["disconnect"], Intent::Cleanup, "Disconnect from {object}"),
    prefix(&["stop"], Intent::Cleanup, "Stop {object}"),
    // eventing
    prefix(&["on"], Intent::Eventing, "Handle {object} event"),
    prefix(&["handle"], Intent::Eventing, "Handle {object}"),
    prefix(&["emit"], Intent::Eventing, "Trigger {object} event"),
    prefix(&["trigger"], Intent::Eventing, "Trigger {object} event"),
    prefix(&["fire"], Intent::Eventing, "Trigger {object} event"),
    prefix(&["dispatch"], Intent::Eventing, "Dispatch {object}"),
    prefix(&["notify"], Intent::Eventing, "Notify {object}"),
    prefix(&["subscribe"], Intent::Eventing, "Subscribe to {object}"),
    prefix(&["listen"], Intent::Eventing, "Listen for {object}"),
    prefix(&["send"], Intent::Eventing, "Send {object}"),
    prefix(&["post"], Intent::Eventing, "Send {object} to server"),
    prefix(&["publish"], Intent::Eventing, "Publish {object}"),
    // data modeling
    prefix(&["define"], Intent::DataModeling, "Define {object}"),
    prefix(&["declare"], Intent::DataModeling, "Declare {object}"),
];

/// Whole-word keywords consulted when no prefix matched.
pub static KEYWORD_PATTERNS: &[(&[&str], Intent, &str)] = &[
    (&["sum", "total"], Intent::Computation, "Sum all values"),
    (&["average", "mean", "avg"], Intent::Computation, "Calculate average"),
    (&["count"], Intent::Computation, "Count the number of items"),
    (&["login", "signin"], Intent::Validation, "Log user in"),
    (&["logout", "signout"], Intent::Cleanup, "Log user out"),
    (&["register", "signup"], Intent::Creation, "Register new user"),
    (&["authentication", "authorization"], Intent::Validation, "Verify user credentials"),
    (&["helper", "util", "utils"], Intent::Computation, "Helper function"),
    (&["wrapper"], Intent::Computation, "Wrap function with extra logic"),
    (&["decorator"], Intent::Computation, "Add functionality to function"),
    (&["callback", "listener", "handler"], Intent::Eventing, "Respond to an event"),
    (&["error", "errors", "exception"], Intent::ErrorHandling, "Deal with errors"),
    (&["logger"], Intent::Logging, "Record log output"),
    (&["cache", "cached"], Intent::Caching, "Cache results for reuse"),
    (&["worker", "thread", "task", "async"], Intent::Concurrency, "Run work concurrently"),
    (&["model", "schema", "entity", "record"], Intent::DataModeling, "Describe a data structure"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub description: String,
}

/// Classify an identifier or keyword by its verb prefix, falling back to
/// whole-word keyword containment. Returns `None` when nothing matches.
pub fn classify(identifier: &str) -> Option<Classification> {
    let words = split_identifier(identifier);
    if words.is_empty() {
        return None;
    }

    if let Some((pattern, object)) = match_prefix(&words) {
        let object = if object.is_empty() {
            pattern.intent.default_object().to_string()
        } else {
            object
        };
        let description = pattern.template.replace("{object}", &object);
        return Some(Classification {
            intent: pattern.intent,
            description: description.trim_end().to_string(),
        });
    }

    KEYWORD_PATTERNS
        .iter()
        .find(|(keywords, _, _)| words.iter().any(|w| keywords.contains(&w.as_str())))
        .map(|(_, intent, description)| Classification {
            intent: *intent,
            description: description.to_string(),
        })
}

/// The first prefix pattern opening `words`, with the object phrase left
/// after stripping it.
pub fn match_prefix(words: &[String]) -> Option<(&'static PrefixPattern, String)> {
    PREFIX_PATTERNS.iter().find_map(|pattern| {
        let n = pattern.words.len();
        let opens = words.len() >= n
            && words
                .iter()
                .zip(pattern.words.iter())
                .all(|(w, p)| w == p);
        opens.then(|| (pattern, words[n..].join(" ")))
    })
}

/// Split an identifier into lowercase words on `_`, `-`, `.`, `$` and
/// camelCase boundaries. Runs of capitals stay together (`HTTPServer` →
/// `http`, `server`).
pub fn split_identifier(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    for part in s.split(|c: char| !c.is_alphanumeric()) {
        if part.is_empty() {
            continue;
        }
        let chars: Vec<char> = part.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            let boundary = i > 0
                && c.is_uppercase()
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || chars.get(i + 1).is_some_and(|n| n.is_lowercase()) && chars[i - 1].is_uppercase());
            if boundary && !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current.to_lowercase());
        }
    }
    words
}

/// Variables whose name suggests a key/value mapping.
pub fn is_mapping_name(name: &str) -> bool {
    const HINTS: &[&str] = &[
        "dict", "dictionary", "map", "mapping", "lookup", "registry", "table", "mydict",
    ];
    split_identifier(name)
        .iter()
        .any(|w| HINTS.contains(&w.as_str()))
}

/// Variables whose name suggests a numeric counter.
pub fn is_counter_name(name: &str) -> bool {
    const HINTS: &[&str] = &[
        "count", "counter", "total", "num", "score", "tally", "index", "idx", "attempts",
    ];
    if matches!(name, "i" | "j" | "k" | "n") {
        return true;
    }
    split_identifier(name)
        .iter()
        .any(|w| HINTS.contains(&w.as_str()))
}

/// Function names that imply their arguments are numbers.
pub fn is_arithmetic_name(name: &str) -> bool {
    const HINTS: &[&str] = &[
        "add", "subtract", "multiply", "divide", "sum", "total", "average", "calculate",
        "compute", "square", "sqrt", "power",
    ];
    split_identifier(name)
        .iter()
        .any(|w| HINTS.contains(&w.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_identifier() {
        assert_eq!(split_identifier("get_user_profile"), vec!["get", "user", "profile"]);
        assert_eq!(split_identifier("getUserProfile"), vec!["get", "user", "profile"]);
        assert_eq!(split_identifier("HTTPServer"), vec!["http", "server"]);
        assert_eq!(split_identifier("__init__"), vec!["init"]);
        assert!(split_identifier("__").is_empty());
    }

    #[test]
    fn test_classify_get_prefix() {
        let c = classify("get_user_profile").expect("get_ is a known prefix");
        assert_eq!(c.intent, Intent::Retrieval);
        assert_eq!(c.description, "Retrieve user profile");
    }

    #[test]
    fn test_classify_camel_case_matches_snake_case() {
        assert_eq!(classify("getUserProfile"), classify("get_user_profile"));
    }

    #[test]
    fn test_multi_word_prefixes_precede_single_word() {
        let multi = PREFIX_PATTERNS
            .iter()
            .position(|p| p.words == ["set", "up"])
            .unwrap();
        let single = PREFIX_PATTERNS
            .iter()
            .position(|p| p.words == ["set"])
            .unwrap();
        assert!(multi < single);

        let first_single = PREFIX_PATTERNS
            .iter()
            .position(|p| p.words.len() == 1)
            .unwrap();
        assert!(PREFIX_PATTERNS[first_single..]
            .iter()
            .all(|p| p.words.len() == 1));

        assert_eq!(classify("setUpDatabase").unwrap().intent, Intent::Initialization);
        assert_eq!(classify("set_timeout").unwrap().intent, Intent::Mutation);
    }

    #[test]
    fn test_prefix_matches_whole_words_only() {
        // "isolate" must not be read as "is" + "olate"
        assert!(classify("isolate").is_none());
        assert_eq!(classify("is_empty").unwrap().description, "Check if empty");
        assert_eq!(classify("settings_view"), None);
    }

    #[test]
    fn test_bare_verb_uses_default_object() {
        let c = classify("fetch").unwrap();
        assert_eq!(c.description, "Fetch the requested data");
    }

    #[test]
    fn test_keyword_fallback() {
        let c = classify("running_total").unwrap();
        assert_eq!(c.intent, Intent::Computation);
        assert_eq!(c.description, "Sum all values");
        assert!(classify("frobnicate").is_none());
    }

    #[test]
    fn test_naming_heuristics() {
        assert!(is_mapping_name("user_dict"));
        assert!(is_mapping_name("priceMap"));
        assert!(!is_mapping_name("users"));
        assert!(is_counter_name("count"));
        assert!(is_counter_name("retryCounter"));
        assert!(!is_counter_name("message"));
        assert!(is_arithmetic_name("multiply"));
    }
}
