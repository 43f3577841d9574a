use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use url::Url;

use crate::data::Fetched;

/// In-memory map from canonical URL to fetched body.
///
/// Lives for one build. Entries are never replaced or removed: the first
/// `put` for a key wins and later ones are ignored. Requested URLs that
/// redirected are recorded as aliases of their final URL.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: RwLock<HashMap<Url, Bytes>>,
    aliases: RwLock<HashMap<Url, Url>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body stored for `url`, directly or through a redirect alias.
    pub fn get(&self, url: &Url) -> Option<Bytes> {
        let key = self.canonical(url)?;
        self.entries.read().get(&key).cloned()
    }

    /// Body plus the canonical URL it is stored under.
    ///
    /// Hits report `redirects: 0` since no request was made.
    pub fn lookup(&self, url: &Url) -> Option<Fetched> {
        let key = self.canonical(url)?;
        let body = self.entries.read().get(&key).cloned()?;
        Some(Fetched {
            url: key,
            body,
            redirects: 0,
        })
    }

    /// Store `body` under `url` unless the key already exists.
    pub fn put(&self, url: Url, body: Bytes) {
        self.entries.write().entry(url).or_insert(body);
    }

    /// Record that requesting `from` ends at `to`.
    pub fn alias(&self, from: Url, to: Url) {
        if from != to {
            self.aliases.write().entry(from).or_insert(to);
        }
    }

    /// The key `url` is cached under, if it is cached at all.
    pub fn canonical(&self, url: &Url) -> Option<Url> {
        if self.entries.read().contains_key(url) {
            return Some(url.clone());
        }
        let target = self.aliases.read().get(url).cloned()?;
        self.entries.read().contains_key(&target).then_some(target)
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.canonical(url).is_some()
    }

    /// Number of bodies stored. Aliases are not counted.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_get_absent() {
        let cache = ContentCache::new();
        assert!(cache.get(&url("https://x.test/a.js")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_is_first_writer_wins() {
        let cache = ContentCache::new();
        let key = url("https://x.test/a.js");

        cache.put(key.clone(), Bytes::from_static(b"first"));
        cache.put(key.clone(), Bytes::from_static(b"second"));

        assert_eq!(cache.get(&key), Some(Bytes::from_static(b"first")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_alias_resolves_to_final_url() {
        let cache = ContentCache::new();
        let requested = url("https://x.test/pkg");
        let resolved = url("https://x.test/pkg@1.0.0/index.js");

        cache.put(resolved.clone(), Bytes::from_static(b"body"));
        cache.alias(requested.clone(), resolved.clone());

        assert_eq!(cache.canonical(&requested), Some(resolved.clone()));
        let hit = cache.lookup(&requested).unwrap();
        assert_eq!(hit.url, resolved);
        assert_eq!(hit.body, Bytes::from_static(b"body"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_dangling_alias_is_a_miss() {
        let cache = ContentCache::new();
        cache.alias(url("https://x.test/a"), url("https://x.test/b"));
        assert!(!cache.contains(&url("https://x.test/a")));
    }

    #[test]
    fn test_self_alias_ignored() {
        let cache = ContentCache::new();
        let key = url("https://x.test/a.js");
        cache.alias(key.clone(), key.clone());
        cache.put(key.clone(), Bytes::from_static(b"a"));
        assert_eq!(cache.lookup(&key).unwrap().url, key);
    }
}
