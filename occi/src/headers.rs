//! HTTP header access for `text/occi` representations.
//!
//! The parser only needs a case-insensitive lookup of a header's first raw
//! value ([`HeaderSource`]); [`Headers`] is the concrete multi-valued map
//! produced by the renderers and accepted by the parser.

/// Read access to a set of HTTP headers. Names are matched case-insensitively.
pub trait HeaderSource {
    /// First raw value of the header `name`, if present.
    fn first(&self, name: &str) -> Option<&str>;

    /// Returns `true` if the header `name` is present.
    fn contains(&self, name: &str) -> bool {
        self.first(name).is_some()
    }
}

/// An insertion-ordered, multi-valued header map with case-insensitive names.
///
/// Equality compares names case-insensitively and values exactly, in order.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for `name`, keeping existing ones.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces every value of `name` with `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.entries.push((name, value.into()));
    }

    /// Every value of `name` in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of `(name, value)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no header is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HeaderSource for Headers {
    fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl PartialEq for Headers {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|((ln, lv), (rn, rv))| ln.eq_ignore_ascii_case(rn) && lv == rv)
    }
}

impl Eq for Headers {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.add(name, value);
        }
        headers
    }
}
