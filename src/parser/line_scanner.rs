//! Best-effort line classifier for brace languages.
//!
//! The scanner is a small state machine fed one line at a time. It tracks
//! block comments, the stack of open braces (and what opened each one) and
//! the class currently being defined. Anything it cannot classify is simply
//! skipped.

use regex::Regex;
use std::sync::LazyLock;

use super::{Callable, CallableKind, NodeKind, StructuralNode};
use crate::knowledge::overrides::C_LIBRARY_CALLS;
use crate::languages::Language;
use crate::text::{code_part, find_top_level, first_group, matching_close, split_top_level, truncate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// if / else / loops / switch
    Control,
    Class,
    /// struct, union, enum, interface bodies
    Type,
    Function,
    Other,
}

macro_rules! re {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect(concat!("invalid regex ", stringify!($name))));
    };
}

// ── Shared control flow ──
re!(IF_RE, r"^if\s*\(");
re!(ELSE_IF_RE, r"^else\s+if\s*\(");
re!(ELSE_RE, r"^else\b");
re!(FOR_RE, r"^for\s*(?:await\s*)?\(");
re!(WHILE_RE, r"^while\s*\(");
re!(DO_RE, r"^do\b");
re!(SWITCH_RE, r"^switch\s*\(");
re!(CASE_RE, r"^case\s+(.+?)\s*:");
re!(DEFAULT_RE, r"^default\s*:");
re!(TRY_RE, r"^try\b");
re!(CATCH_RE, r"^catch\b");
re!(FINALLY_RE, r"^finally\b");
re!(RETURN_RE, r"^return\b\s*(.*)$");
re!(THROW_RE, r"^throw\s+(.+)$");

// ── JavaScript / TypeScript ──
re!(
    JS_CLASS_RE,
    r"^(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(\w+)(?:\s*<[^>]*>)?(?:\s+extends\s+([\w.]+))?(?:\s+implements\s+([^{]+))?"
);
re!(JS_INTERFACE_RE, r"^(?:export\s+)?interface\s+(\w+)(?:\s*<[^>]*>)?(?:\s+extends\s+([^{]+))?");
re!(JS_TYPE_RE, r"^(?:export\s+)?type\s+(\w+)(?:\s*<[^>]*>)?\s*=\s*(.+)$");
re!(JS_ENUM_RE, r"^(?:export\s+)?(?:const\s+)?enum\s+(\w+)");
re!(
    JS_FUNCTION_RE,
    r"^(?:export\s+)?(?:default\s+)?(async\s+)?function\s*\*?\s*(\w+)\s*(?:<[^>]+>)?\s*\("
);
re!(
    JS_ARROW_RE,
    r"^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*(?::[^=]+)?=\s*(async\s+)?(?:\([^)]*\)|\w+)\s*(?::\s*[^=]+?)?\s*=>"
);
re!(JS_CONSTRUCTOR_RE, r"^constructor\s*\(");
re!(
    JS_METHOD_RE,
    r"^(?:(?:public|private|protected|readonly)\s+)*(?:static\s+)?(async\s+)?(?:(?:get|set)\s+)?\*?\s*(\w+)\s*(?:<[^>]+>)?\s*\("
);
re!(
    JS_REQUIRE_RE,
    r#"^(?:const|let|var)\s+(\w+|\{[^}]*\})\s*=\s*require\(\s*['"]([^'"]+)['"]\s*\)"#
);
re!(JS_IMPORT_FROM_RE, r#"^import\s+(.+?)\s+from\s+['"]([^'"]+)['"]"#);
re!(JS_IMPORT_RE, r#"^import\s+['"]([^'"]+)['"]"#);
re!(JS_EXPORT_DEFAULT_RE, r"^export\s+default\s+(.+)$");
re!(JS_EXPORT_LIST_RE, r"^export\s*\{(.+?)\}");

// ── C / C++ ──
re!(C_INCLUDE_RE, r#"^#\s*include\s*([<"])([^>"]+)[>"]"#);
re!(C_DEFINE_RE, r"^#\s*define\s+(\w+)(\(([^)]*)\))?\s*(.*)$");
re!(C_DIRECTIVE_RE, r"^#\s*(ifdef|ifndef|if|elif|else|endif|pragma|undef|error|warning)\b\s*(.*)$");
re!(C_NAMESPACE_RE, r"^namespace\s+(\w+)");
re!(C_USING_RE, r"^using\s+namespace\s+([\w:]+)");
re!(C_CLASS_RE, r"^class\s+(\w+)(?:\s*:\s*(?:public|private|protected)?\s*([\w:]+))?");
re!(C_TYPEDEF_STRUCT_RE, r"^typedef\s+(struct|union|enum)\s*(\w*)");
re!(C_TYPEDEF_RE, r"^typedef\s+(.+?)\s+\**(\w+)\s*;");
re!(C_RECORD_RE, r"^(struct|union|enum)\s+(\w+)\s*(?:\{.*)?$");
re!(C_TEMPLATE_RE, r"^template\s*<(.+)>");
re!(
    C_FUNCTION_RE,
    r"^(?:(?:static|inline|virtual|extern|const|unsigned|signed|struct|explicit)\s+)*([\w:<>]+)(?:\s*(\*+|&)\s*|\s+)([\w:~]+)\s*\(([^)]*)\)\s*(?:const\s*)?(?:override\s*)?(\{|;)?"
);
re!(C_CTOR_RE, r"^(~?\w+)\s*\(([^)]*)\)");
re!(
    C_GLOBAL_RE,
    r"^((?:extern\s+)?(?:static\s+)?(?:const\s+)?(?:volatile\s+)?(?:unsigned\s+|signed\s+)?(?:int|float|double|char|long|short|void|bool|size_t|uint8_t|uint16_t|uint32_t|uint64_t|int8_t|int16_t|int32_t|int64_t)\b\s*\**)\s*(\w+)(?:\[([^\]]*)\])?\s*(?:=\s*(.+?))?\s*;?$"
);

static LIBRARY_CALL_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    C_LIBRARY_CALLS
        .iter()
        .map(|(name, _)| {
            let re = Regex::new(&format!(r"\b{name}\s*\(")).expect("library call pattern");
            (re, *name)
        })
        .collect()
});

const NOT_CALLABLE: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "sizeof", "function", "else", "new",
    "delete", "case", "throw", "typeof", "await",
];

/// Line-oriented classifier for languages without a grammar.
pub struct LineScanner {
    language: Language,
    blocks: Vec<BlockKind>,
    /// Block kind for a `{` expected on the next line.
    pending: Option<BlockKind>,
    in_block_comment: bool,
    class_name: Option<String>,
}

impl LineScanner {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            blocks: Vec::new(),
            pending: None,
            in_block_comment: false,
            class_name: None,
        }
    }

    /// Classify every line of `source`.
    pub fn scan(mut self, source: &str) -> Vec<StructuralNode> {
        source
            .split('\n')
            .enumerate()
            .filter_map(|(i, line)| self.feed(i + 1, line))
            .collect()
    }

    /// Feed one line (1-based `line_no`) and return its classification.
    pub fn feed(&mut self, line_no: usize, raw: &str) -> Option<StructuralNode> {
        let stripped = raw.trim();

        if self.in_block_comment {
            if stripped.contains("*/") {
                self.in_block_comment = false;
            }
            return None;
        }
        if stripped.is_empty() || stripped.starts_with("//") {
            return None;
        }
        if stripped.starts_with("/*") {
            if !stripped[2..].contains("*/") {
                self.in_block_comment = true;
            }
            return None;
        }

        let mut code = code_part(stripped, "//");
        if let Some(start) = code.find("/*") {
            if !code[start + 2..].contains("*/") {
                self.in_block_comment = true;
            }
            code = code[..start].trim_end();
        }

        // closers leading the line belong to the previous block
        let body = code.trim_start_matches(|c: char| c == '}' || c.is_whitespace());
        for _ in code[..code.len() - body.len()].chars().filter(|&c| c == '}') {
            self.close_block();
        }

        let classified = if is_trivial(body) {
            None
        } else {
            match self.language {
                Language::C => self.classify_c(body, code.starts_with('}')),
                _ => self.classify_js(body, code.starts_with('}')),
            }
        };

        let opens = classified.as_ref().map(|(_, b)| *b);
        self.track_braces(body, opens);

        classified.map(|(kind, _)| StructuralNode::leaf(kind, line_no))
    }

    fn close_block(&mut self) {
        self.blocks.pop();
        if !self.blocks.contains(&BlockKind::Class) {
            self.class_name = None;
        }
    }

    fn track_braces(&mut self, body: &str, opens: Option<BlockKind>) {
        let mut first = opens.or(self.pending.take());
        let mut saw_brace = false;
        for c in crate::text::code_chars(body) {
            match c.ch {
                '{' => {
                    saw_brace = true;
                    self.blocks.push(first.take().unwrap_or(BlockKind::Other));
                }
                '}' => self.close_block(),
                _ => {}
            }
        }
        // `if (x)` / `int main(void)` with the brace on the next line
        if !saw_brace && !body.ends_with(';') {
            if let Some(kind) = opens {
                self.pending = Some(kind);
            }
        }
    }

    fn in_class(&self) -> bool {
        self.class_name.is_some() && self.blocks.last() == Some(&BlockKind::Class)
    }

    fn in_control(&self) -> bool {
        self.blocks.contains(&BlockKind::Control)
    }

    /// Statements shared by both dialects. `after_close` is set when the
    /// line began with `}`.
    fn classify_control(&self, code: &str, after_close: bool) -> Option<(NodeKind, BlockKind)> {
        let group = || first_group(code).map(|g| g.trim().to_string()).unwrap_or_default();

        if ELSE_IF_RE.is_match(code) {
            let kind = NodeKind::Conditional {
                condition: group(),
                nested: true,
            };
            return Some((kind, BlockKind::Control));
        }
        if IF_RE.is_match(code) {
            let kind = NodeKind::Conditional {
                condition: group(),
                nested: self.in_control(),
            };
            return Some((kind, BlockKind::Control));
        }
        if ELSE_RE.is_match(code) {
            return Some((NodeKind::Else, BlockKind::Control));
        }
        if FOR_RE.is_match(code) {
            return Some((for_header(&group()), BlockKind::Control));
        }
        if WHILE_RE.is_match(code) {
            // tail of a do-while
            if after_close && code.ends_with(';') {
                return None;
            }
            let kind = NodeKind::WhileLoop { condition: group() };
            return Some((kind, BlockKind::Control));
        }
        if DO_RE.is_match(code) && (code.ends_with('{') || code == "do") {
            return Some((NodeKind::DoWhile, BlockKind::Control));
        }
        if SWITCH_RE.is_match(code) {
            let kind = NodeKind::Switch {
                subject: group(),
                nested: self.in_control(),
            };
            return Some((kind, BlockKind::Control));
        }
        if let Some(caps) = CASE_RE.captures(code) {
            let kind = NodeKind::Case {
                label: Some(caps[1].to_string()),
            };
            return Some((kind, BlockKind::Other));
        }
        if DEFAULT_RE.is_match(code) {
            return Some((NodeKind::Case { label: None }, BlockKind::Other));
        }
        if TRY_RE.is_match(code) {
            let kind = NodeKind::Try {
                handlers: Vec::new(),
                catches_all: false,
                has_else: false,
                has_finally: false,
            };
            return Some((kind, BlockKind::Other));
        }
        if CATCH_RE.is_match(code) {
            let error = first_group(code).map(|g| g.trim().to_string());
            return Some((NodeKind::Catch { error }, BlockKind::Other));
        }
        if FINALLY_RE.is_match(code) {
            return Some((NodeKind::Finally, BlockKind::Other));
        }
        if let Some(caps) = RETURN_RE.captures(code) {
            let value = caps[1].trim_end_matches(';').trim();
            let value = (!value.is_empty()).then(|| truncate(value, 50));
            return Some((NodeKind::Return { value }, BlockKind::Other));
        }
        if let Some(caps) = THROW_RE.captures(code) {
            let exception = Some(caps[1].trim_end_matches(';').trim().to_string());
            return Some((NodeKind::Raise { exception }, BlockKind::Other));
        }
        None
    }

    fn classify_js(&mut self, code: &str, after_close: bool) -> Option<(NodeKind, BlockKind)> {
        if let Some(caps) = JS_CLASS_RE.captures(code) {
            let name = caps[1].to_string();
            let mut bases: Vec<String> = caps.get(2).map(|m| m.as_str().to_string()).into_iter().collect();
            if let Some(implements) = caps.get(3) {
                bases.extend(
                    split_top_level(implements.as_str(), ',')
                        .into_iter()
                        .map(str::to_string),
                );
            }
            self.class_name = Some(name.clone());
            let kind = NodeKind::Class {
                name,
                bases,
                decorators: Vec::new(),
            };
            return Some((kind, BlockKind::Class));
        }
        if let Some(caps) = JS_INTERFACE_RE.captures(code) {
            let kind = NodeKind::Interface {
                name: caps[1].to_string(),
                extends: caps.get(2).map(|m| m.as_str().trim().to_string()),
            };
            return Some((kind, BlockKind::Type));
        }
        if let Some(caps) = JS_TYPE_RE.captures(code) {
            let kind = NodeKind::TypeAlias {
                name: caps[1].to_string(),
                definition: truncate(caps[2].trim_end_matches(';').trim(), 50),
            };
            return Some((kind, BlockKind::Type));
        }
        if let Some(caps) = JS_ENUM_RE.captures(code) {
            let kind = NodeKind::Enum {
                name: caps[1].to_string(),
            };
            return Some((kind, BlockKind::Type));
        }
        if let Some(caps) = JS_FUNCTION_RE.captures(code) {
            let callable = Callable {
                name: caps[2].to_string(),
                params: params_of(code),
                decorators: Vec::new(),
                is_async: caps.get(1).is_some(),
                flavor: CallableKind::Function,
                owner: None,
            };
            return Some((NodeKind::Function(callable), BlockKind::Function));
        }
        if let Some(caps) = JS_ARROW_RE.captures(code) {
            let callable = Callable {
                name: caps[1].to_string(),
                params: params_of(code),
                decorators: Vec::new(),
                is_async: caps.get(2).is_some(),
                flavor: CallableKind::Arrow,
                owner: None,
            };
            return Some((NodeKind::Function(callable), BlockKind::Function));
        }
        if self.in_class() && JS_CONSTRUCTOR_RE.is_match(code) {
            let callable = Callable {
                name: "constructor".to_string(),
                params: params_of(code),
                decorators: Vec::new(),
                is_async: false,
                flavor: CallableKind::Constructor,
                owner: self.class_name.clone(),
            };
            return Some((NodeKind::Function(callable), BlockKind::Function));
        }
        if self.in_class() {
            if let Some(caps) = JS_METHOD_RE.captures(code) {
                let name = caps[2].to_string();
                let opens_body = caps.get(0).is_some_and(|m| body_follows_params(code, m.end() - 1));
                if opens_body && !NOT_CALLABLE.contains(&name.as_str()) {
                    let callable = Callable {
                        name,
                        params: params_of(code),
                        decorators: Vec::new(),
                        is_async: caps.get(1).is_some(),
                        flavor: CallableKind::Method,
                        owner: self.class_name.clone(),
                    };
                    return Some((NodeKind::Function(callable), BlockKind::Function));
                }
            }
        }
        if let Some(caps) = JS_REQUIRE_RE.captures(code) {
            let kind = NodeKind::Import {
                module: caps[2].to_string(),
                names: vec![caps[1].to_string()],
                from: true,
                top_level: self.blocks.is_empty(),
            };
            return Some((kind, BlockKind::Other));
        }

        if let Some(found) = self.classify_control(code, after_close) {
            return Some(found);
        }

        if let Some(caps) = JS_IMPORT_FROM_RE.captures(code) {
            let kind = NodeKind::Import {
                module: caps[2].to_string(),
                names: vec![caps[1].to_string()],
                from: true,
                top_level: self.blocks.is_empty(),
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(caps) = JS_IMPORT_RE.captures(code) {
            let kind = NodeKind::Import {
                module: caps[1].to_string(),
                names: Vec::new(),
                from: false,
                top_level: self.blocks.is_empty(),
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(caps) = JS_EXPORT_DEFAULT_RE.captures(code) {
            let kind = NodeKind::Export {
                item: caps[1].trim_end_matches(';').trim().to_string(),
                default: true,
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(caps) = JS_EXPORT_LIST_RE.captures(code) {
            let kind = NodeKind::Export {
                item: caps[1].trim().to_string(),
                default: false,
            };
            return Some((kind, BlockKind::Other));
        }
        None
    }

    fn classify_c(&mut self, code: &str, after_close: bool) -> Option<(NodeKind, BlockKind)> {
        if let Some(caps) = C_INCLUDE_RE.captures(code) {
            let kind = NodeKind::Include {
                header: caps[2].to_string(),
                system: &caps[1] == "<",
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(caps) = C_DEFINE_RE.captures(code) {
            let value = caps[4].trim();
            let kind = NodeKind::Macro {
                name: caps[1].to_string(),
                params: caps.get(3).map(|m| m.as_str().to_string()),
                value: (!value.is_empty()).then(|| truncate(value, 40)),
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(caps) = C_DIRECTIVE_RE.captures(code) {
            let kind = NodeKind::Preprocessor {
                directive: caps[1].to_string(),
                argument: caps[2].trim().to_string(),
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(caps) = C_NAMESPACE_RE.captures(code) {
            let kind = NodeKind::Namespace {
                name: caps[1].to_string(),
                using: false,
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(caps) = C_USING_RE.captures(code) {
            let kind = NodeKind::Namespace {
                name: caps[1].to_string(),
                using: true,
            };
            return Some((kind, BlockKind::Other));
        }
        if !code.ends_with(';') {
            if let Some(caps) = C_CLASS_RE.captures(code) {
                let name = caps[1].to_string();
                self.class_name = Some(name.clone());
                let kind = NodeKind::Class {
                    name,
                    bases: caps.get(2).map(|m| m.as_str().to_string()).into_iter().collect(),
                    decorators: Vec::new(),
                };
                return Some((kind, BlockKind::Class));
            }
        }
        if let Some(caps) = C_TYPEDEF_STRUCT_RE.captures(code) {
            let kind = NodeKind::Record {
                keyword: format!("typedef {}", &caps[1]),
                name: caps[2].to_string(),
            };
            return Some((kind, BlockKind::Type));
        }
        if let Some(caps) = C_TYPEDEF_RE.captures(code) {
            let kind = NodeKind::TypeAlias {
                name: caps[2].to_string(),
                definition: caps[1].to_string(),
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(caps) = C_RECORD_RE.captures(code) {
            let name = caps[2].to_string();
            let kind = if &caps[1] == "enum" {
                NodeKind::Enum { name }
            } else {
                NodeKind::Record {
                    keyword: caps[1].to_string(),
                    name,
                }
            };
            return Some((kind, BlockKind::Type));
        }
        if let Some(caps) = C_TEMPLATE_RE.captures(code) {
            let kind = NodeKind::Template {
                params: caps[1].trim().to_string(),
            };
            return Some((kind, BlockKind::Other));
        }
        if let Some(found) = self.c_function(code) {
            return Some(found);
        }
        if self.in_class() {
            if let Some(caps) = C_CTOR_RE.captures(code) {
                let name = &caps[1];
                let class = self.class_name.clone().unwrap_or_default();
                let flavor = if name == class {
                    Some(CallableKind::Constructor)
                } else if name.strip_prefix('~') == Some(class.as_str()) {
                    Some(CallableKind::Destructor)
                } else {
                    None
                };
                if let Some(flavor) = flavor {
                    let callable = Callable {
                        name: name.to_string(),
                        params: params_of(code),
                        decorators: Vec::new(),
                        is_async: false,
                        flavor,
                        owner: Some(class),
                    };
                    return Some((NodeKind::Function(callable), BlockKind::Function));
                }
            }
        }
        if self.blocks.is_empty() {
            if let Some(caps) = C_GLOBAL_RE.captures(code) {
                let kind = NodeKind::GlobalVariable {
                    declaration: caps[1].split_whitespace().collect::<Vec<_>>().join(" "),
                    name: caps[2].to_string(),
                    value: caps.get(4).map(|m| truncate(m.as_str().trim(), 40)),
                };
                return Some((kind, BlockKind::Other));
            }
        }

        if let Some(found) = self.classify_control(code, after_close) {
            return Some(found);
        }

        for (re, function) in LIBRARY_CALL_RES.iter() {
            if let Some(m) = re.find(code) {
                let argument = first_group(&code[m.start()..]).map(|a| a.trim().to_string());
                let kind = NodeKind::LibraryCall {
                    function: function.to_string(),
                    argument,
                };
                return Some((kind, BlockKind::Other));
            }
        }
        None
    }

    fn c_function(&self, code: &str) -> Option<(NodeKind, BlockKind)> {
        let caps = C_FUNCTION_RE.captures(code)?;
        let return_type = &caps[1];
        let full_name = &caps[3];
        if NOT_CALLABLE.contains(&return_type) || NOT_CALLABLE.contains(&full_name) {
            return None;
        }
        // `a = f(x);` and friends never reach here; `return f(x);` is filtered above
        let (owner, name) = match full_name.rsplit_once("::") {
            Some((owner, name)) => (Some(owner.to_string()), name.to_string()),
            None => (None, full_name.to_string()),
        };
        let prototype = caps.get(5).is_some_and(|m| m.as_str() == ";");
        let flavor = match &owner {
            _ if prototype => CallableKind::Prototype,
            Some(o) if name == *o => CallableKind::Constructor,
            Some(o) if name.strip_prefix('~') == Some(o.as_str()) => CallableKind::Destructor,
            Some(_) => CallableKind::Method,
            None => CallableKind::Function,
        };
        let block = if prototype {
            BlockKind::Other
        } else {
            BlockKind::Function
        };
        let callable = Callable {
            name,
            params: params_of(code),
            decorators: Vec::new(),
            is_async: false,
            flavor,
            owner,
        };
        Some((NodeKind::Function(callable), block))
    }
}

fn is_trivial(code: &str) -> bool {
    matches!(code, "" | "{" | "}" | "};" | ");" | "];" | "})" | "});")
}

/// Whether the parameter list opened at `open` is followed by a `{` body,
/// possibly after a `: Type` return annotation.
fn body_follows_params(code: &str, open: usize) -> bool {
    let Some(close) = matching_close(code, open) else {
        return false;
    };
    let rest = code[close + 1..].trim_start();
    rest.starts_with('{') || (rest.starts_with(':') && rest.contains('{') && !rest.contains("=>"))
}

fn params_of(code: &str) -> Vec<String> {
    first_group(code)
        .map(|g| {
            split_top_level(g, ',')
                .into_iter()
                .filter(|p| !p.is_empty() && *p != "void")
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Classify the header of a `for (...)`.
fn for_header(header: &str) -> NodeKind {
    let strip_decl = |s: &str| {
        let s = s.trim();
        ["const ", "let ", "var ", "auto& ", "auto ", "const auto& "]
            .iter()
            .find_map(|p| s.strip_prefix(p))
            .unwrap_or(s)
            .trim()
            .to_string()
    };
    if header.contains(';') {
        return NodeKind::CountingLoop {
            header: header.trim().to_string(),
        };
    }
    for sep in [" of ", " in "] {
        if let Some((target, iterable)) = header.split_once(sep) {
            return NodeKind::ForLoop {
                target: strip_decl(target),
                iterable: iterable.trim().to_string(),
                is_async: false,
            };
        }
    }
    // C++ range-for
    if let Some(colon) = find_top_level(header, ':') {
        if !header[colon..].starts_with("::") {
            return NodeKind::ForLoop {
                target: strip_decl(&header[..colon])
                    .rsplit(' ')
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                iterable: header[colon + 1..].trim().to_string(),
                is_async: false,
            };
        }
    }
    NodeKind::CountingLoop {
        header: header.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(language: Language, source: &str) -> Vec<StructuralNode> {
        LineScanner::new(language).scan(source)
    }

    #[test]
    fn test_js_class_and_methods() {
        let nodes = scan(
            Language::JavaScript,
            "class Cart extends Base {\n  constructor(items) {\n    this.items = items;\n  }\n  getTotal() {\n    return 0;\n  }\n}\nfunction helper() {}\n",
        );
        let kinds: Vec<_> = nodes.iter().map(|n| (n.line, &n.kind)).collect();
        assert!(matches!(kinds[0], (1, NodeKind::Class { name, .. }) if name == "Cart"));
        assert!(matches!(
            kinds[1],
            (2, NodeKind::Function(Callable { flavor: CallableKind::Constructor, .. }))
        ));
        assert!(matches!(
            kinds[2],
            (5, NodeKind::Function(Callable { name, flavor: CallableKind::Method, owner: Some(o), .. }))
                if name == "getTotal" && o == "Cart"
        ));
        assert!(matches!(kinds[3], (6, NodeKind::Return { .. })));
        assert!(matches!(
            kinds[4],
            (9, NodeKind::Function(Callable { name, flavor: CallableKind::Function, .. })) if name == "helper"
        ));
    }

    #[test]
    fn test_js_one_line_and_typed_methods() {
        let nodes = scan(
            Language::JavaScript,
            "class Box {\n  m() { if (x) { y(); } }\n  area(): number {\n    return 1;\n  }\n}\n",
        );
        let methods: Vec<(usize, &str)> = nodes
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::Function(Callable {
                    name,
                    flavor: CallableKind::Method,
                    owner: Some(owner),
                    ..
                }) if owner == "Box" => Some((n.line, name.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(methods, vec![(2, "m"), (3, "area")]);
    }

    #[test]
    fn test_js_method_outside_class_is_not_method() {
        let nodes = scan(Language::JavaScript, "doThing() {\n}\n");
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_js_nested_conditionals() {
        let nodes = scan(
            Language::JavaScript,
            "if (a) {\n  if (b) {\n  }\n} else if (c) {\n} else {\n}\nif (d) {\n}\n",
        );
        let nested: Vec<_> = nodes
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::Conditional { condition, nested } => Some((condition.as_str(), *nested)),
                _ => None,
            })
            .collect();
        assert_eq!(nested, vec![("a", false), ("b", true), ("c", true), ("d", false)]);
        assert!(nodes.iter().any(|n| n.kind == NodeKind::Else && n.line == 5));
    }

    #[test]
    fn test_js_for_variants() {
        let nodes = scan(
            Language::JavaScript,
            "for (const user of users) {}\nfor (let i = 0; i < n; i++) {}\n",
        );
        assert!(matches!(
            &nodes[0].kind,
            NodeKind::ForLoop { target, iterable, .. } if target == "user" && iterable == "users"
        ));
        assert!(matches!(&nodes[1].kind, NodeKind::CountingLoop { .. }));
    }

    #[test]
    fn test_block_comments_are_skipped() {
        let nodes = scan(
            Language::JavaScript,
            "/*\nfunction hidden() {}\n*/\nfunction shown() {}\n",
        );
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].line, 4);
    }

    #[test]
    fn test_js_imports() {
        let nodes = scan(
            Language::JavaScript,
            "import React from 'react';\nconst fs = require('fs');\nimport './styles.css';\n",
        );
        assert_eq!(nodes.len(), 3);
        assert!(nodes
            .iter()
            .all(|n| matches!(n.kind, NodeKind::Import { top_level: true, .. })));
    }

    #[test]
    fn test_c_program() {
        let nodes = scan(
            Language::C,
            "#include <stdio.h>\n#define MAX 10\nint counter = 0;\nint add(int a, int b);\nint main(void)\n{\n    int local = 1;\n    char *p = malloc(MAX);\n    free(p);\n    return 0;\n}\n",
        );
        let kinds: Vec<&NodeKind> = nodes.iter().map(|n| &n.kind).collect();
        assert!(matches!(kinds[0], NodeKind::Include { system: true, header } if header == "stdio.h"));
        assert!(matches!(kinds[1], NodeKind::Macro { name, .. } if name == "MAX"));
        assert!(matches!(kinds[2], NodeKind::GlobalVariable { name, .. } if name == "counter"));
        assert!(matches!(
            kinds[3],
            NodeKind::Function(Callable { flavor: CallableKind::Prototype, .. })
        ));
        assert!(matches!(kinds[4], NodeKind::Function(Callable { name, params, .. }) if name == "main" && params.is_empty()));
        // `int local` sits inside main: not a global
        assert!(matches!(kinds[5], NodeKind::LibraryCall { function, .. } if function == "malloc"));
        assert!(matches!(kinds[6], NodeKind::LibraryCall { function, argument, .. }
            if function == "free" && argument.as_deref() == Some("p")));
        assert!(matches!(kinds[7], NodeKind::Return { .. }));
        assert_eq!(kinds.len(), 8);
    }

    #[test]
    fn test_cpp_class_members() {
        let nodes = scan(
            Language::C,
            "class Stack : public Base {\npublic:\n    Stack() {\n    }\n    ~Stack() {\n    }\n};\n",
        );
        let flavors: Vec<_> = nodes
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::Function(c) => Some(c.flavor),
                _ => None,
            })
            .collect();
        assert_eq!(flavors, vec![CallableKind::Constructor, CallableKind::Destructor]);
    }

    #[test]
    fn test_do_while_tail_is_not_a_loop() {
        let nodes = scan(Language::C, "do {\n    x++;\n} while (x < 3);\n");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].kind, NodeKind::DoWhile);
    }
}
