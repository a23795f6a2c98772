//! Exact-name tables consulted before prefix matching.

use crate::languages::Language;

static PYTHON_SPECIAL: &[(&str, &str)] = &[
    ("__init__", "Set up the initial state and properties of this object"),
    ("__str__", "Define how this object appears when converted to string"),
    ("__repr__", "Define the official string representation for debugging"),
    ("__call__", "Make this object callable like a function"),
    ("__enter__", "Set up resources when entering a 'with' block"),
    ("__exit__", "Clean up resources when exiting a 'with' block"),
    ("__len__", "Return the length/size of this object"),
    ("__getitem__", "Enable accessing items using bracket notation [index]"),
    ("__setitem__", "Enable setting items using bracket notation [index] = value"),
    ("__iter__", "Make this object iterable in loops"),
    ("__next__", "Get the next item in iteration"),
    ("__eq__", "Define how to check if two objects are equal"),
    ("__lt__", "Define how to compare if this object is less than another"),
    ("__gt__", "Define how to compare if this object is greater than another"),
    ("__add__", "Define what happens when using the + operator"),
    ("__sub__", "Define what happens when using the - operator"),
    ("__mul__", "Define what happens when using the * operator"),
    ("__truediv__", "Define what happens when using the / operator"),
    ("__div__", "Define what happens when using the / operator"),
    ("main", "Program starts here"),
];

static JAVASCRIPT_SPECIAL: &[(&str, &str)] = &[
    ("constructor", "Initialize new instance with provided parameters"),
    ("render", "Generate and return the visual representation of this component"),
    ("componentDidMount", "Execute code after component is added to the page"),
    ("componentWillUnmount", "Clean up before component is removed from the page"),
    ("useState", "Create a state variable that triggers re-render when changed"),
    ("useEffect", "Run side effects after render or when dependencies change"),
    ("main", "Program starts here"),
];

static C_SPECIAL: &[(&str, &str)] = &[
    ("main", "Program starts execution here - entry point"),
    ("malloc", "Allocate memory dynamically on the heap"),
    ("free", "Release previously allocated memory to prevent leaks"),
    ("printf", "Print formatted output to console"),
    ("scanf", "Read formatted input from user"),
];

/// Fixed description for a special method or entry point, if `name` is one.
pub fn special_name(name: &str, language: Language) -> Option<&'static str> {
    let table = match language {
        Language::Python => PYTHON_SPECIAL,
        Language::JavaScript => JAVASCRIPT_SPECIAL,
        Language::C => C_SPECIAL,
    };
    table.iter().find(|(n, _)| *n == name).map(|(_, d)| *d)
}

static CLASS_ROLES: &[(&[&str], &str)] = &[
    (&["manager"], "a manager"),
    (&["handler"], "a handler"),
    (&["controller"], "a controller"),
    (&["service"], "a service"),
    (&["model"], "a data model"),
    (&["view"], "a view"),
    (&["factory"], "a factory"),
    (&["builder"], "a builder"),
    (&["adapter"], "an adapter"),
    (&["exception", "error"], "an exception"),
    (&["interface"], "an interface"),
];

/// Role implied by a class name suffix, e.g. `UserManager` → "a manager".
pub fn class_role(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    CLASS_ROLES
        .iter()
        .find(|(suffixes, _)| suffixes.iter().any(|s| lower.ends_with(s)))
        .map(|(_, role)| *role)
}

/// Well-known C library functions and what a call to each does. The
/// function name is the first element; longer names come before names
/// they contain.
pub static C_LIBRARY_CALLS: &[(&str, &str)] = &[
    ("malloc", "Allocate memory"),
    ("calloc", "Allocate and zero memory"),
    ("realloc", "Reallocate memory block"),
    ("free", "Free allocated memory"),
    ("memcpy", "Copy memory block"),
    ("memset", "Set memory block"),
    ("memmove", "Move memory block"),
    ("memcmp", "Compare memory blocks"),
    ("strncpy", "Copy string"),
    ("strcpy", "Copy string"),
    ("strncat", "Concatenate strings"),
    ("strcat", "Concatenate strings"),
    ("strncmp", "Compare strings"),
    ("strcmp", "Compare strings"),
    ("strlen", "Get string length"),
    ("fopen", "Open file"),
    ("fclose", "Close file"),
    ("fread", "Read from file"),
    ("fwrite", "Write to file"),
    ("fprintf", "Formatted write to file"),
    ("fscanf", "Formatted read from file"),
    ("printf", "Print formatted output"),
    ("scanf", "Read formatted input"),
    ("puts", "Print string with newline"),
    ("gets", "Read string (unsafe)"),
];

/// Description of a library call. Allocation and release calls mention
/// their argument.
pub fn library_call_description(function: &str, argument: Option<&str>) -> Option<String> {
    let (_, base) = C_LIBRARY_CALLS.iter().find(|(f, _)| *f == function)?;
    Some(match (function, argument) {
        ("malloc" | "calloc" | "free", Some(arg)) if !arg.is_empty() => {
            format!("{base}: {function}({arg})")
        }
        _ => base.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_names_are_per_language() {
        assert_eq!(
            special_name("__init__", Language::Python),
            Some("Set up the initial state and properties of this object")
        );
        assert_eq!(special_name("__init__", Language::C), None);
        assert!(special_name("componentDidMount", Language::JavaScript).is_some());
        assert_eq!(
            special_name("main", Language::C),
            Some("Program starts execution here - entry point")
        );
    }

    #[test]
    fn test_class_role() {
        assert_eq!(class_role("UserManager"), Some("a manager"));
        assert_eq!(class_role("ValidationError"), Some("an exception"));
        assert_eq!(class_role("Point"), None);
    }

    #[test]
    fn test_library_call_description() {
        assert_eq!(
            library_call_description("malloc", Some("sizeof(int) * n")).as_deref(),
            Some("Allocate memory: malloc(sizeof(int) * n)")
        );
        assert_eq!(
            library_call_description("strlen", Some("s")).as_deref(),
            Some("Get string length")
        );
        assert_eq!(library_call_description("my_func", None), None);
    }
}
