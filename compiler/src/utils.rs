use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref IDENTIFIER:      Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref REQUEST_SUFFIX:      Regex = Regex::new(r"(?i)(?:req|request)$").unwrap();
}

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// `owner_id` → `OwnerId`, `widget` → `Widget`. Characters after the first of
/// each underscore-separated word are kept as written.
pub fn upper_camel_case(s: &str) -> String {
    s.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}

/// `owner_id` → `ownerId`, `CreatedAt` → `createdAt`.
pub fn lower_camel_case(s: &str) -> String {
    let upper = upper_camel_case(s);
    let mut chars = upper.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().to_string() + chars.as_str(),
    }
}

/// Drops a trailing, case-insensitive `req` or `request`.
pub fn strip_request_suffix(name: &str) -> &str {
    match REQUEST_SUFFIX.find(name) {
        Some(found) => &name[..found.start()],
        None => name,
    }
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}
