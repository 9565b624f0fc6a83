use std::fmt;

use serde::Serialize;

/// Structured identity of a message or enum: the dotted package split into
/// segments, followed by the lexical nesting chain ending in the type's own
/// simple name.
///
/// ```
/// use gqlbind_schema::TypePath;
///
/// let path = TypePath::new("acme.widgets", "Widget").child("Part");
/// assert_eq!(path.full_name(), "acme.widgets.Widget.Part");
/// assert_eq!(path.local_name(), "Widget_Part");
/// assert_eq!(path.lexical_parent(), Some("Widget"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypePath {
    package: Vec<String>,
    nesting: Vec<String>,
}

impl TypePath {
    /// A top-level type `name` declared in `package` (which may be empty).
    pub fn new(package: &str, name: &str) -> TypePath {
        let package = package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        TypePath {
            package,
            nesting: vec![name.to_string()],
        }
    }

    /// The path of a type declared lexically inside `self`.
    pub fn child(&self, name: &str) -> TypePath {
        let mut nesting = self.nesting.clone();
        nesting.push(name.to_string());
        TypePath {
            package: self.package.clone(),
            nesting,
        }
    }

    /// Simple (unqualified, unnested) name.
    pub fn name(&self) -> &str {
        self.nesting.last().map(String::as_str).unwrap_or_default()
    }

    pub fn package(&self) -> String {
        self.package.join(".")
    }

    pub fn package_segments(&self) -> &[String] {
        &self.package
    }

    pub fn nesting(&self) -> &[String] {
        &self.nesting
    }

    pub fn is_nested(&self) -> bool {
        self.nesting.len() > 1
    }

    /// Simple name of the enclosing message, if any.
    pub fn lexical_parent(&self) -> Option<&str> {
        let len = self.nesting.len();
        if len > 1 {
            Some(self.nesting[len - 2].as_str())
        } else {
            None
        }
    }

    /// Package-local name; nested types join every enclosing segment with `_`.
    pub fn local_name(&self) -> String {
        self.nesting.join("_")
    }

    /// Dotted, fully-qualified name without the leading dot.
    pub fn full_name(&self) -> String {
        self.package
            .iter()
            .chain(self.nesting.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
