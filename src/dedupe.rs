use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;

/// SHA-256 of a record body, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(body: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(body.as_bytes());
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory set of accepted body fingerprints, rebuilt from the table file on every start.
#[derive(Debug, Clone, Default)]
pub struct DedupStore {
    seen: HashSet<Fingerprint>,
}

impl DedupStore {
    /// Build the store from existing bodies. Empty bodies are skipped.
    pub fn seed<'a, I>(bodies: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let seen = bodies
            .into_iter()
            .filter(|b| !b.is_empty())
            .map(Fingerprint::of)
            .collect();
        Self { seen }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Returns false when the fingerprint was already present.
    pub fn add(&mut self, fingerprint: Fingerprint) -> bool {
        self.seen.insert(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic_hex() {
        let a = Fingerprint::of("Hello there");
        assert_eq!(a, Fingerprint::of("Hello there"));
        assert_eq!(a.as_str().len(), 64);
        assert_ne!(a, Fingerprint::of("Hello there "));
        assert_eq!(
            Fingerprint::of("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn seed_skips_empty_and_collapses_duplicates() {
        let store = DedupStore::seed(vec!["a", "", "b", "a"]);
        assert_eq!(store.len(), 2);
        assert!(store.contains(&Fingerprint::of("a")));
        assert!(store.contains(&Fingerprint::of("b")));
        assert!(!store.contains(&Fingerprint::of("")));
    }

    #[test]
    fn add_reports_collisions() {
        let mut store = DedupStore::default();
        assert!(store.is_empty());
        assert!(store.add(Fingerprint::of("body")));
        assert!(!store.add(Fingerprint::of("body")));
        assert_eq!(store.len(), 1);
    }
}
