use std::collections::HashSet;

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Words of an identifier: splits on non-alphanumerics and on lower->upper
/// case transitions (`petName` -> `pet`, `Name`; `X-Request-ID` -> `X`, `Request`, `ID`).
fn words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower_or_digit = false;
    for c in s.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower_or_digit = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower_or_digit && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Convert an arbitrary name to a PascalCase type name
///
/// ```rust,ignore
/// assert_eq!(to_pascal_case("user_profile"), "UserProfile");
/// assert_eq!(to_pascal_case("petName"), "PetName");
/// ```
#[must_use]
pub fn to_pascal_case(s: &str) -> String {
    let mut name: String = words(s)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() {
        name.push('_');
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if name == "Self" {
        name.push('_');
    }
    name
}

/// Convert an arbitrary name to a snake_case identifier
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let mut name = words(s)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    if name.is_empty() {
        name.push('_');
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Turn a snake_case name into a field identifier, escaping keywords
#[must_use]
pub fn field_ident(wire_key: &str) -> String {
    let name = to_snake_case(wire_key);
    match name.as_str() {
        // cannot be raw identifiers
        "self" | "super" | "crate" | "_" => format!("{name}_"),
        n if KEYWORDS.contains(&n) => format!("r#{name}"),
        _ => name,
    }
}

/// Hands out unique type names within one compiled unit.
///
/// The first request for a name gets it verbatim; later requests get a numeric
/// suffix (`Pet2`, `Pet3`). Allocation is deterministic in request order.
#[derive(Debug, Default)]
pub struct NameAllocator {
    seen: HashSet<String>,
}

impl NameAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name` exactly, returning `false` when it was already taken
    pub fn reserve(&mut self, name: &str) -> bool {
        self.seen.insert(name.to_string())
    }

    /// Allocate `name` or the first free suffixed variant
    pub fn allocate(&mut self, name: &str) -> String {
        if self.seen.insert(name.to_string()) {
            return name.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{name}{counter}");
            if self.seen.insert(candidate.clone()) {
                tracing::debug!(requested = %name, allocated = %candidate, "Type name collision");
                return candidate;
            }
            counter += 1;
        }
    }

    #[must_use]
    pub fn is_taken(&self, name: &str) -> bool {
        self.seen.contains(name)
    }
}
