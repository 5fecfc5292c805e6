// Member signatures
//
// A signature names a callable member: `fetch(id:retries:)` in full form, or
// just `fetch` in abbreviated form. Abbreviated signatures are only valid as
// registration and query keys; recorded calls always carry the full form.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Textual identifier of a mocked member
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    text: Arc<str>,
}

impl Signature {
    /// Create a signature from its literal text
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: Arc::from(text.as_ref()),
        }
    }

    /// The full text, e.g. `fetch(id:)`
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The member name, i.e. everything before the parameter list
    pub fn name(&self) -> &str {
        match self.text.find('(') {
            Some(idx) => &self.text[..idx],
            None => &self.text,
        }
    }

    /// True when the text carries no parameter list
    pub fn is_abbreviated(&self) -> bool {
        !self.text.contains('(')
    }

    /// The name-only form of this signature
    pub fn abbreviated(&self) -> Signature {
        if self.is_abbreviated() {
            self.clone()
        } else {
            Signature::new(self.name())
        }
    }

    /// Parameter labels of a full signature.
    ///
    /// `fetch(id:retries:)` yields `["id", "retries"]`; `_` labels are kept as
    /// written. Abbreviated signatures have no labels.
    pub fn labels(&self) -> Vec<&str> {
        let Some(open) = self.text.find('(') else {
            return Vec::new();
        };
        let close = self.text.rfind(')').unwrap_or(self.text.len());
        if close <= open {
            return Vec::new();
        }
        self.text[open + 1..close]
            .split(':')
            .filter(|label| !label.is_empty())
            .collect()
    }

    /// Pattern match between a key and another signature.
    ///
    /// When either side is abbreviated only the names are compared, otherwise
    /// the full texts must be equal. The relation is symmetric.
    pub fn matches(&self, other: &Signature) -> bool {
        if self.is_abbreviated() || other.is_abbreviated() {
            self.name() == other.name()
        } else {
            self.text == other.text
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.text)
    }
}

impl From<&str> for Signature {
    fn from(text: &str) -> Self {
        Signature::new(text)
    }
}

impl From<String> for Signature {
    fn from(text: String) -> Self {
        Signature::new(text)
    }
}

impl From<&Signature> for Signature {
    fn from(signature: &Signature) -> Self {
        signature.clone()
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Signature::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_abbreviation() {
        let full = Signature::new("foo(paramOne:)");
        assert_eq!(full.name(), "foo");
        assert!(!full.is_abbreviated());
        assert_eq!(full.abbreviated(), Signature::new("foo"));

        let short = Signature::new("foo");
        assert_eq!(short.name(), "foo");
        assert!(short.is_abbreviated());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Signature::new("fetch(id:retries:)").labels(), vec!["id", "retries"]);
        assert_eq!(Signature::new("reset()").labels(), Vec::<&str>::new());
        assert_eq!(Signature::new("fetch").labels(), Vec::<&str>::new());
        assert_eq!(Signature::new("put(_:forKey:)").labels(), vec!["_", "forKey"]);
    }

    #[test]
    fn test_full_signatures_need_equal_text() {
        let a = Signature::new("foo(paramOne:)");
        let b = Signature::new("foo(paramTwo:)");
        assert!(a.matches(&a.clone()));
        assert!(!a.matches(&b));
        assert!(!b.matches(&a));
    }

    #[test]
    fn test_abbreviated_matching_is_symmetric() {
        let full = Signature::new("foo(paramOne:)");
        let short = Signature::new("foo");
        let other = Signature::new("bar");

        assert!(full.matches(&short));
        assert!(short.matches(&full));
        assert_eq!(full.matches(&other), other.matches(&full));
        assert!(!short.matches(&other));
    }

    #[test]
    fn test_structural_equality_differs_from_matching() {
        let full = Signature::new("foo(paramOne:)");
        let short = Signature::new("foo");
        assert_ne!(full, short);
        assert!(full.matches(&short));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let sig = Signature::new("load(path:)");
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, "\"load(path:)\"");
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
