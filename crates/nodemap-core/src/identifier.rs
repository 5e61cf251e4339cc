//! Node identifiers backed by a global string interner.
//!
//! [`NodeId`] is the sole reconciliation key of a node map: every node in a
//! forest carries one, and the layout, scene and animation stages all key
//! their records by it. Interning keeps the id `Copy` and makes comparisons
//! and hashing a single integer operation.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for node identifiers.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Alphabet used by [`NodeId::generate`].
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of random characters appended by [`NodeId::generate`].
const GENERATED_SUFFIX_LEN: usize = 8;

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Stable, opaque identifier of a node.
///
/// Ids are unique across a whole forest. Two ids compare equal iff their
/// string forms are equal.
///
/// # Examples
///
/// ```
/// use nodemap_core::identifier::NodeId;
///
/// let root = NodeId::new("root-a");
/// let same = NodeId::new("root-a");
///
/// assert_eq!(root, same);
/// assert_eq!(root, "root-a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(DefaultSymbol);

impl NodeId {
    /// Creates a `NodeId` from its string form.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Generates a fresh id made of `prefix` followed by eight random
    /// base-36 characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use nodemap_core::identifier::NodeId;
    ///
    /// let id = NodeId::generate("n", &mut rand::rng());
    /// assert!(id.to_string().starts_with('n'));
    /// assert_eq!(id.to_string().len(), 9);
    /// ```
    pub fn generate<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> Self {
        let mut name = String::with_capacity(prefix.len() + GENERATED_SUFFIX_LEN);
        name.push_str(prefix);
        for _ in 0..GENERATED_SUFFIX_LEN {
            let idx = rng.random_range(0..BASE36.len());
            name.push(char::from(BASE36[idx]));
        }
        Self::new(&name)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_interner(|interner| {
            let value = interner
                .resolve(self.0)
                .expect("Symbol should exist in interner");
            f.write_str(value)
        })
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .is_some_and(|value| value == other)
        })
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_new() {
        let id1 = NodeId::new("main-a");
        let id2 = NodeId::new("main-a");
        let id3 = NodeId::new("main-b");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "main-a");
    }

    #[test]
    fn test_display_trait() {
        let id = NodeId::new("display_test");
        assert_eq!(format!("{id}"), "display_test");
    }

    #[test]
    fn test_from_trait() {
        let id1: NodeId = "from_test".into();
        assert_eq!(id1, NodeId::new("from_test"));
    }

    #[test]
    fn test_partial_eq_str() {
        let id = NodeId::new("child-1");
        assert!(id == "child-1");
        assert!(id != "child-2");

        let empty = NodeId::new("");
        assert!(empty == "");
    }

    #[test]
    fn test_generate_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = NodeId::generate("gc", &mut rng);
        let text = id.to_string();

        assert!(text.starts_with("gc"));
        assert_eq!(text.len(), 2 + GENERATED_SUFFIX_LEN);
        assert!(
            text[2..]
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_generate_is_deterministic_for_seeded_rng() {
        let a = NodeId::generate("n", &mut StdRng::seed_from_u64(42));
        let b = NodeId::generate("n", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_uses_string_form() {
        let id = NodeId::new("serde-id");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"serde-id\"");

        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(NodeId::new("key1"), 1);
        map.insert(NodeId::new("key2"), 2);

        assert_eq!(map.get(&NodeId::new("key1")), Some(&1));
        assert_eq!(map.len(), 2);
    }
}
