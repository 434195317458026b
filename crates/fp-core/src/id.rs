use lasso::{Spur, ThreadedRodeo};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for element IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Alphabet for generated suffixes (base 36, lowercase).
const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix appended by [`ElementId::generate`].
const SUFFIX_LEN: usize = 6;

/// A lightweight, interned identifier for elements in the layout tree.
/// Internally a 4-byte `Spur` index, so comparison and hashing are O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// The id every project reserves for its top-level element.
    pub fn root() -> Self {
        Self::intern("root")
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    pub fn is_root(&self) -> bool {
        *self == Self::root()
    }

    /// Generate an id like `planta-k3x9qa`: a semantic prefix plus a short
    /// random suffix. Collisions are not checked.
    pub fn generate(prefix: &str) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self::intern(&format!("{prefix}-{suffix}"))
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("estante_norte");
        let b = ElementId::intern("estante_norte");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "estante_norte");
    }

    #[test]
    fn generated_ids_have_prefix_and_suffix() {
        let id = ElementId::generate("planta");
        let (prefix, suffix) = id.as_str().split_once('-').unwrap();
        assert_eq!(prefix, "planta");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }

    #[test]
    fn generated_ids_differ() {
        let a = ElementId::generate("planta");
        let b = ElementId::generate("planta");
        assert_ne!(a, b);
    }

    #[test]
    fn root_id() {
        assert!(ElementId::intern("root").is_root());
        assert!(!ElementId::intern("planta-1").is_root());
    }
}
