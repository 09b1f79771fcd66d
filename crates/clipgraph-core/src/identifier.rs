//! Interned string identifiers for canvas nodes and edges.
//!
//! Node ids and edge ids handed to the engine by the host canvas are arbitrary
//! strings. They are interned once into [`Id`] so that the hot paths (drag
//! ticks, cycle search) compare and hash a small integer instead of a string.

use std::{
    cmp::Ordering,
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// Only strings live here. Per-session state (position caches, layout flags)
/// is always owned by the session that created it.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Interned identifier for canvas nodes and edges.
///
/// # Examples
///
/// ```
/// use clipgraph_core::identifier::Id;
///
/// let clip = Id::new("clip-1");
/// let same: Id = "clip-1".into();
/// assert_eq!(clip, same);
/// assert_eq!(clip, "clip-1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        let symbol = interner().get_or_intern(name);
        Self(symbol)
    }

    /// Runs `f` with the string this identifier was created from.
    ///
    /// Avoids allocating when the caller only needs to inspect the text.
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|value| write!(f, "{value}"))
    }
}

impl Ord for Id {
    /// Orders identifiers by their string value, not by interning order.
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        let interner = interner();
        let lhs = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        let rhs = interner
            .resolve(other.0)
            .expect("Symbol should exist in interner");
        lhs.cmp(rhs)
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Id {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        self.with_str(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.with_str(|value| serializer.serialize_str(value))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_string_same_id() {
        let a = Id::new("node_a");
        let b = Id::new("node_a");
        let c = Id::new("node_c");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_roundtrip() {
        let id = Id::new("video-node-42");
        assert_eq!(id.to_string(), "video-node-42");
        assert!(id == "video-node-42");
    }

    #[test]
    fn test_ordering_follows_string_value() {
        // Intern in reverse order so symbol order disagrees with string order
        let z = Id::new("zz_order_test");
        let a = Id::new("aa_order_test");

        let mut ids = vec![z, a];
        ids.sort();
        assert_eq!(ids, vec![a, z]);
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id = Id::new("edge-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"edge-7\"");

        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
