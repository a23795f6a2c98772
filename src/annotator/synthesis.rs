//! Sentence synthesis for each structural kind.
//!
//! Loops and conditionals go through ordered rule tables; the first rule
//! that matches writes the sentence.

use regex::Regex;
use std::sync::LazyLock;

use super::Scope;
use crate::knowledge::{self, class_role, library_call_description, special_name, split_identifier};
use crate::languages::Language;
use crate::parser::{Callable, CallableKind, ValueShape};
use crate::text::truncate;

const EXPR_MAX: usize = 50;

// ── Callables and types ──

pub fn callable(c: &Callable, language: Language) -> String {
    let owner = c.owner.as_deref().unwrap_or("the object");
    match c.flavor {
        CallableKind::Constructor => {
            if let Some(text) = special_name(&c.name, language) {
                return text.to_string();
            }
            return format!("Construct a new {owner} instance");
        }
        CallableKind::Destructor => return format!("Release resources held by {owner}"),
        CallableKind::Prototype => return format!("Declare the {} function signature", c.name),
        _ => {}
    }
    if let Some(text) = special_name(&c.name, language) {
        return text.to_string();
    }
    match knowledge::classify(&c.name) {
        Some(found) => found.description,
        None => format!("Execute the {} operation", c.name),
    }
}

pub fn class(name: &str, bases: &[String]) -> String {
    if let Some(role) = class_role(name) {
        format!("Define {role} class for {name}")
    } else if let Some(base) = bases.first() {
        format!("Create {name} class that extends {base}")
    } else {
        format!("Define the {name} class structure and behavior")
    }
}

pub fn interface(name: &str, extends: Option<&str>) -> String {
    match extends {
        Some(parent) => format!("Describe the {name} interface, extending {}", parent.trim()),
        None => format!("Describe the shape of {name} objects"),
    }
}

pub fn type_alias(name: &str, definition: &str) -> String {
    format!("Define {name} as an alias for {definition}")
}

pub fn enumeration(name: &str) -> String {
    format!("List the allowed values of {name}")
}

pub fn record(keyword: &str, name: &str) -> String {
    let noun = keyword.rsplit(' ').next().unwrap_or(keyword);
    if name.is_empty() {
        format!("Define an anonymous {noun} type")
    } else {
        format!("Define the {name} {noun} layout")
    }
}

// ── Loops ──

struct IterableRule {
    name: &'static str,
    needles: &'static [&'static str],
    /// All of these must appear too.
    with: &'static [&'static str],
    sentence: &'static str,
}

static ITERABLE_RULES: &[IterableRule] = &[
    IterableRule {
        name: "index_range",
        needles: &["range("],
        with: &["len("],
        sentence: "Loop through each index position in the collection",
    },
    IterableRule {
        name: "numeric_range",
        needles: &["range("],
        with: &[],
        sentence: "Repeat operation for each number in the range",
    },
    IterableRule {
        name: "key_value_pairs",
        needles: &[".items()", "Object.entries("],
        with: &[],
        sentence: "Process each key-value pair in the dictionary",
    },
    IterableRule {
        name: "keys",
        needles: &[".keys()", "Object.keys("],
        with: &[],
        sentence: "Iterate through all dictionary keys",
    },
    IterableRule {
        name: "values",
        needles: &[".values()", "Object.values("],
        with: &[],
        sentence: "Iterate through all dictionary values",
    },
    IterableRule {
        name: "enumerate",
        needles: &["enumerate(", ".entries()"],
        with: &[],
        sentence: "Loop with both index number and value for each item",
    },
    IterableRule {
        name: "zip",
        needles: &["zip("],
        with: &[],
        sentence: "Process multiple lists together element by element",
    },
    IterableRule {
        name: "reversed",
        needles: &["reversed("],
        with: &[],
        sentence: "Loop through items in reverse order",
    },
    IterableRule {
        name: "sorted",
        needles: &["sorted("],
        with: &[],
        sentence: "Loop through items in sorted order",
    },
    IterableRule {
        name: "file_lines",
        needles: &["readlines", "open("],
        with: &[],
        sentence: "Read and process each line from the file",
    },
];

/// Loop-variable words and the sentence each one selects. A word matches a
/// stem exactly or with a plural `s`.
static TARGET_RULES: &[(&[&str], &str)] = &[
    (&["user"], "Process each user in the collection"),
    (&["item"], "Process each item one by one"),
    (&["row"], "Process each row of data"),
    (&["file"], "Process each file in the directory"),
    (&["char", "letter"], "Process each character in the string"),
    (&["word"], "Process each word in the text"),
    (&["line"], "Process each line of text"),
    (&["element", "elem"], "Process each element in the collection"),
];

/// Name of the iterable rule selected for `iterable`, if any.
pub fn iterable_rule(iterable: &str) -> Option<&'static str> {
    matching_iterable_rule(iterable).map(|r| r.name)
}

fn matching_iterable_rule(iterable: &str) -> Option<&'static IterableRule> {
    ITERABLE_RULES.iter().find(|rule| {
        rule.needles.iter().any(|n| iterable.contains(n))
            && rule.with.iter().all(|w| iterable.contains(w))
    })
}

pub fn for_loop(target: &str, iterable: &str) -> String {
    if let Some(rule) = matching_iterable_rule(iterable) {
        return rule.sentence.to_string();
    }
    let words = split_identifier(target);
    let by_name = TARGET_RULES.iter().find(|(stems, _)| {
        words.iter().any(|w| {
            let word = w.as_str();
            let singular = word.strip_suffix('s').unwrap_or(word);
            stems.iter().any(|stem| word == *stem || singular == *stem)
        })
    });
    match by_name {
        Some((_, sentence)) => sentence.to_string(),
        None => format!("Loop through each {} and perform operations", target.trim()),
    }
}

pub fn while_loop(condition: &str) -> String {
    match condition.trim() {
        "True" | "true" | "1" => "Run continuously until explicitly stopped".to_string(),
        _ => "Keep repeating until the condition becomes false".to_string(),
    }
}

static COUNTING_INIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*=\s*([^,;]+)$").expect("counting init pattern"));
static COUNTING_COND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\s*(<=|<|>=|>|!=)\s*(.+?)\s*$").expect("counting condition pattern")
});

pub fn counting_loop(header: &str) -> String {
    let parts: Vec<&str> = header.split(';').collect();
    if let [init, cond, _step] = parts.as_slice() {
        if let (Some(init), Some(cond)) = (
            COUNTING_INIT_RE.captures(init.trim()),
            COUNTING_COND_RE.captures(cond),
        ) {
            if init[1] == cond[1] {
                let direction = if cond[2].starts_with('>') { "down" } else { "up" };
                return format!(
                    "Count {} from {} {direction} to {}",
                    &init[1],
                    init[2].trim(),
                    truncate(&cond[3], EXPR_MAX)
                );
            }
        }
    }
    format!("Repeat with a loop counter: {}", truncate(header, EXPR_MAX))
}

pub fn do_while() -> String {
    "Run the block once, then keep repeating while the condition holds".to_string()
}

// ── Conditionals ──

static NULL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(None|null|NULL|nullptr|undefined)\b").expect("null literal pattern")
});
static COMPARISON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"===|!==|==|!=|>=|<=|>|<").expect("comparison pattern"));

/// A condition with `->` member access already rewritten, plus the
/// comparison operators it contains in order.
pub struct Condition<'a> {
    raw: &'a str,
    normalized: String,
    lower: String,
    ops: Vec<(usize, &'static str)>,
}

impl<'a> Condition<'a> {
    pub fn new(raw: &'a str) -> Self {
        let normalized = raw.trim().replace("->", ".");
        let ops = COMPARISON_RE
            .find_iter(&normalized)
            .map(|m| (m.start(), canonical_op(m.as_str())))
            .collect();
        Self {
            raw,
            lower: normalized.to_lowercase(),
            normalized,
            ops,
        }
    }

    fn has_op(&self, op: &str) -> bool {
        self.ops.iter().any(|(_, o)| *o == op)
    }

    /// Split around `op` when it is the only comparison of its kind.
    fn sides(&self, op: &str) -> Option<(String, String)> {
        let mut found = self.ops.iter().filter(|(_, o)| *o == op);
        let (pos, _) = found.next()?;
        if found.next().is_some() {
            return None;
        }
        let token_len = COMPARISON_RE.find_at(&self.normalized, *pos)?.as_str().len();
        let left = self.normalized[..*pos].trim();
        let right = self.normalized[pos + token_len..]
            .trim()
            .trim_matches(|c| c == '"' || c == '\'');
        Some((truncate(left, EXPR_MAX), truncate(right, EXPR_MAX)))
    }
}

fn canonical_op(op: &str) -> &'static str {
    match op {
        "===" | "==" => "==",
        "!==" | "!=" => "!=",
        ">=" => ">=",
        "<=" => "<=",
        ">" => ">",
        _ => "<",
    }
}

struct ConditionRule {
    name: &'static str,
    describe: fn(&Condition) -> Option<String>,
}

fn fixed(text: &str) -> Option<String> {
    Some(text.to_string())
}

static CONDITION_RULES: &[ConditionRule] = &[
    ConditionRule {
        name: "main_guard",
        describe: |c| {
            (c.raw.contains("__name__") && c.raw.contains("__main__")).then(|| {
                "Execute this code only when script runs directly, not when imported as module"
                    .to_string()
            })
        },
    },
    ConditionRule {
        name: "null_check",
        describe: |c| {
            if !NULL_RE.is_match(&c.normalized) {
                return None;
            }
            if c.lower.contains("is not") || c.has_op("!=") {
                fixed("Proceed only if value exists and is not empty")
            } else {
                fixed("Handle case when value is empty or not set")
            }
        },
    },
    ConditionRule {
        name: "length",
        describe: |c| {
            let measured = ["len(", ".length", ".size()", "strlen("]
                .iter()
                .any(|n| c.normalized.contains(n));
            if !measured {
                None
            } else if c.has_op(">") || c.has_op(">=") {
                fixed("Check if collection has items before processing")
            } else if c.has_op("==") && c.normalized.contains('0') {
                fixed("Check if collection is empty")
            } else {
                fixed("Check the size of the collection before continuing")
            }
        },
    },
    ConditionRule {
        name: "type_check",
        describe: |c| {
            ["isinstance(", "typeof ", " instanceof "]
                .iter()
                .any(|n| c.normalized.contains(n))
                .then(|| "Verify object is of correct type before using".to_string())
        },
    },
    ConditionRule {
        name: "attribute_check",
        describe: |c| {
            ["hasattr(", "hasOwnProperty("]
                .iter()
                .any(|n| c.normalized.contains(n))
                .then(|| "Check if object has required attribute".to_string())
        },
    },
    ConditionRule {
        name: "exists",
        describe: |c| {
            (c.lower.contains(".exists()") || c.lower.contains("exists("))
                .then(|| "Check if file or resource exists before accessing".to_string())
        },
    },
    ConditionRule {
        name: "valid",
        describe: |c| {
            (c.lower.contains("is_valid") || c.lower.contains("isvalid"))
                .then(|| "Verify data passes validation rules".to_string())
        },
    },
    ConditionRule {
        name: "error_flag",
        describe: |c| {
            (c.lower.contains("error") || c.lower.contains("exception"))
                .then(|| "Handle error condition if it occurred".to_string())
        },
    },
    ConditionRule {
        name: "success_flag",
        describe: |c| {
            c.lower
                .contains("success")
                .then(|| "Proceed if operation completed successfully".to_string())
        },
    },
    ConditionRule {
        name: "authenticated",
        describe: |c| {
            ["authenticated", "logged_in", "loggedin"]
                .iter()
                .any(|n| c.lower.contains(n))
                .then(|| "Check if user is logged in before allowing access".to_string())
        },
    },
    ConditionRule {
        name: "authorized",
        describe: |c| {
            (c.lower.contains("authorized") || c.lower.contains("permission"))
                .then(|| "Verify user has permission to perform action".to_string())
        },
    },
    ConditionRule {
        name: "equality",
        describe: |c| {
            let (left, right) = c.sides("==")?;
            Some(format!("Check if {left} matches expected value {right}"))
        },
    },
    ConditionRule {
        name: "inequality",
        describe: |c| {
            let (left, right) = c.sides("!=")?;
            Some(format!("Check if {left} is different from {right}"))
        },
    },
    ConditionRule {
        name: "at_least",
        describe: |c| c.has_op(">=").then(|| "Proceed if value meets or exceeds minimum".to_string()),
    },
    ConditionRule {
        name: "at_most",
        describe: |c| c.has_op("<=").then(|| "Proceed if value is at or below maximum".to_string()),
    },
    ConditionRule {
        name: "greater",
        describe: |c| c.has_op(">").then(|| "Proceed if value exceeds threshold".to_string()),
    },
    ConditionRule {
        name: "less",
        describe: |c| c.has_op("<").then(|| "Proceed if value is below threshold".to_string()),
    },
    ConditionRule {
        name: "conjunction",
        describe: |c| {
            (c.lower.contains(" and ") || c.normalized.contains("&&"))
                .then(|| "Proceed only if all conditions are satisfied".to_string())
        },
    },
    ConditionRule {
        name: "disjunction",
        describe: |c| {
            (c.lower.contains(" or ") || c.normalized.contains("||"))
                .then(|| "Proceed if any of the conditions is true".to_string())
        },
    },
    ConditionRule {
        name: "negation",
        describe: |c| {
            (c.normalized.starts_with("not ") || c.normalized.starts_with('!'))
                .then(|| "Proceed if condition is false".to_string())
        },
    },
    ConditionRule {
        name: "bool_literal",
        describe: |c| match c.normalized.as_str() {
            "True" | "true" => fixed("Always execute this block"),
            "False" | "false" => fixed("Always skip this block"),
            _ => None,
        },
    },
];

/// Name of the first condition rule that fires for `condition`.
pub fn condition_rule(condition: &str) -> Option<&'static str> {
    let c = Condition::new(condition);
    CONDITION_RULES
        .iter()
        .find(|rule| (rule.describe)(&c).is_some())
        .map(|rule| rule.name)
}

pub fn conditional(condition: &str) -> String {
    let c = Condition::new(condition);
    CONDITION_RULES
        .iter()
        .find_map(|rule| (rule.describe)(&c))
        .unwrap_or_else(|| "Check condition before proceeding with operation".to_string())
}

pub fn switch(subject: &str) -> String {
    format!("Choose a branch based on the value of {}", truncate(subject, EXPR_MAX))
}

pub fn case(label: Option<&str>) -> String {
    match label {
        Some(label) => format!("Handle the case where the value is {}", truncate(label, EXPR_MAX)),
        None => "Handle any value not matched by the cases above".to_string(),
    }
}

// ── Resources and errors ──

pub fn with_block(items: &[String], is_async: bool) -> String {
    let first = items.first().map(String::as_str).unwrap_or_default();
    let sentence = if items.iter().any(|i| i.contains("open(")) {
        "Open the file and close it automatically when done".to_string()
    } else if items.iter().any(|i| i.to_lowercase().contains("lock")) {
        "Hold the lock while this block runs".to_string()
    } else {
        format!(
            "Use {} as a managed resource, released on exit",
            truncate(first, EXPR_MAX)
        )
    };
    if is_async {
        format!("Asynchronously: {}", lower_first(&sentence))
    } else {
        sentence
    }
}

pub fn try_block(handlers: &[String], catches_all: bool, has_finally: bool) -> String {
    let base = if catches_all {
        "Try to run code and catch all errors".to_string()
    } else {
        match handlers {
            [] => "Try to run code and catch any errors".to_string(),
            [only] => format!("Try to run code and catch {only} errors if they occur"),
            _ => "Try to run code and handle any errors that might happen".to_string(),
        }
    };
    if has_finally {
        format!("{base}, always running the cleanup step")
    } else {
        base
    }
}

pub fn catch(error: Option<&str>) -> String {
    match error {
        Some(e) if !e.is_empty() => format!("Handle {e} raised in the try block"),
        _ => "Handle errors raised in the try block".to_string(),
    }
}

pub fn finally() -> String {
    "Clean up regardless of whether an error occurred".to_string()
}

pub fn raise(exception: Option<&str>) -> String {
    match exception {
        Some(e) => format!("Raise exception: {}", truncate(e, EXPR_MAX)),
        None => "Re-raise current exception".to_string(),
    }
}

pub fn assertion(test: &str, message: Option<&str>) -> String {
    let mut sentence = format!("Make sure {} holds", truncate(test, EXPR_MAX));
    if let Some(message) = message {
        sentence.push_str(&format!(", failing with {}", truncate(message, EXPR_MAX)));
    }
    sentence
}

// ── Modules ──

pub fn import(module: &str, names: &[String], from: bool) -> String {
    match (from, names) {
        (true, [only]) => format!("Bring in {only} functionality from {module}"),
        (true, _) => format!("Load multiple tools from the {module} library"),
        (false, _) => format!("Load the {module} library for use in this code"),
    }
}

pub fn export(item: &str, default: bool) -> String {
    if default {
        format!("Export {} as the module default", truncate(item, EXPR_MAX))
    } else {
        format!("Export {} from this module", truncate(item, EXPR_MAX))
    }
}

pub fn include(header: &str, system: bool) -> String {
    let origin = if system { "system" } else { "local" };
    format!("Include the {origin} header {header}")
}

pub fn macro_definition(name: &str, params: Option<&str>, value: Option<&str>) -> String {
    match (params, value) {
        (Some(params), _) => format!("Define macro function {name}({params})"),
        (None, Some(value)) => format!("Define macro {name} as {value}"),
        (None, None) => format!("Define macro {name}"),
    }
}

pub fn preprocessor(directive: &str, argument: &str) -> String {
    match directive {
        "ifdef" => format!("Compile the following only if {argument} is defined"),
        "ifndef" => format!("Compile the following only if {argument} is not defined"),
        "if" => format!("Compile the following only if {argument}"),
        "elif" => format!("Otherwise compile the following if {argument}"),
        "else" => "Otherwise compile the following".to_string(),
        "endif" => "End of conditional compilation".to_string(),
        "pragma" => format!("Compiler directive: pragma {argument}"),
        other => format!("Preprocessor directive: #{other} {argument}")
            .trim_end()
            .to_string(),
    }
}

pub fn namespace(name: &str, using: bool) -> String {
    if using {
        format!("Use names from the {name} namespace")
    } else {
        format!("Group the following declarations in the {name} namespace")
    }
}

pub fn template(params: &str) -> String {
    format!("Generic definition over {params}")
}

// ── Statements ──

pub fn global_variable(declaration: &str, name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("Global {declaration} {name} initialised to {value}"),
        None => format!("Declare global {declaration} {name}"),
    }
}

pub fn return_value(value: Option<&str>, scope: &Scope) -> String {
    let value = value.map(str::trim).unwrap_or("None");
    match value {
        "None" | "null" | "undefined" | "" => "Return without value".to_string(),
        "True" | "False" | "true" | "false" => format!("Return boolean: {value}"),
        "self" | "this" | "*this" => "Return instance for method chaining".to_string(),
        v if v.starts_with('{') || v.starts_with('[') => {
            "Return collection/data structure".to_string()
        }
        _ => match &scope.function {
            Some(function) => format!("Return the result of {function}"),
            None => "Return computed value".to_string(),
        },
    }
}

pub fn assignment(targets: &[String], value: &str, shape: ValueShape) -> String {
    let target = targets.join(", ");
    let value = value.trim();
    match shape {
        ValueShape::Call => format!("Store result of function call in {target}"),
        ValueShape::List if value == "[]" => format!("Initialize empty list {target}"),
        ValueShape::List => format!("Initialize {target} as list"),
        ValueShape::Dict if value == "{}" => format!("Initialize empty dictionary {target}"),
        ValueShape::Dict => format!("Initialize {target} as dictionary"),
        ValueShape::Lambda => format!("Define inline function {target}"),
        ValueShape::Comprehension => format!("Build {target} using comprehension"),
        ValueShape::Other => match value {
            "None" | "null" | "NULL" => format!("Set {target} to null/none"),
            "True" | "False" | "true" | "false" => format!("Set {target} to boolean value"),
            v if !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()) => {
                format!("Initialize {target} with numeric value")
            }
            _ => format!("Assign value to {target}"),
        },
    }
}

pub fn augmented_assignment(target: &str, operator: &str, value: &str) -> String {
    let verb = match operator {
        "+=" => "Increase",
        "-=" => "Decrease",
        "*=" => "Multiply",
        "/=" | "//=" => "Divide",
        _ => "Update",
    };
    format!("{verb} {target} by {}", truncate(value, EXPR_MAX))
}

pub fn library_call(function: &str, argument: Option<&str>) -> String {
    library_call_description(function, argument)
        .unwrap_or_else(|| format!("Call {function}"))
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
