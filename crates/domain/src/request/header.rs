//! HTTP Header types

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "Authorization";

/// A single HTTP header with name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Content-Type")
    pub name: String,
    /// The header value (e.g., "application/json")
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered collection of HTTP headers.
///
/// Names compare case-insensitively. Insertion order is preserved so a
/// replayed request carries its headers in the order they were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a header without touching existing entries of the same name.
    pub fn add(&mut self, header: Header) {
        self.items.push(header);
    }

    /// Sets a header, replacing every existing entry with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains characters that
    /// are not valid in an HTTP token.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> DomainResult<()> {
        validate_name(name)?;
        let value = value.into();
        match self
            .items
            .iter()
            .position(|h| h.name.eq_ignore_ascii_case(name))
        {
            Some(index) => {
                self.items[index].value = value;
                let mut seen = 0usize;
                self.items.retain(|h| {
                    if h.name.eq_ignore_ascii_case(name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.items.push(Header::new(name, value)),
        }
        Ok(())
    }

    /// Returns the first value for a header name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Removes every header with the given name, returning whether any existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|h| !h.name.eq_ignore_ascii_case(name));
        self.items.len() != before
    }

    /// Returns true if a header with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns an iterator over all headers.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidHeaderName(name.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.add(Header::new("Accept", "application/json"));
        headers.add(Header::new("authorization", "Bearer old"));
        headers.add(Header::new("AUTHORIZATION", "Bearer older"));

        headers.set(AUTHORIZATION, "Bearer new").unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Authorization"), Some("Bearer new"));
        assert_eq!(headers.iter().next().unwrap().name, "Accept");
    }

    #[test]
    fn set_appends_missing_header() {
        let mut headers = Headers::new();
        headers.set("X-Request-Id", "abc").unwrap();
        assert_eq!(headers.get("x-request-id"), Some("abc"));
    }

    #[test]
    fn set_rejects_bad_names() {
        let mut headers = Headers::new();
        assert!(headers.set("", "x").is_err());
        assert!(headers.set("Bad Name", "x").is_err());
    }

    #[test]
    fn remove_reports_presence() {
        let mut headers: Headers = [Header::new("A", "1")].into_iter().collect();
        assert!(headers.remove("a"));
        assert!(!headers.remove("a"));
        assert!(headers.is_empty());
    }
}
