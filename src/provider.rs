//! Suppliers of raw class bytes for indexing.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::jar_utils::JarFile;

/// Supplies raw class files by internal name.
///
/// The indexer visits every class twice, so providers whose `get` is
/// expensive should be wrapped in a [`CachingClassProvider`].
pub trait ClassProvider {
    /// Internal names of every class this provider can supply.
    fn class_names(&self) -> Vec<String>;

    /// Raw bytes of the named class, or `None` if it is not present.
    fn get(&self, name: &str) -> Option<Vec<u8>>;
}

impl ClassProvider for JarFile {
    fn class_names(&self) -> Vec<String> {
        JarFile::class_names(self).map(|n| n.to_string()).collect()
    }

    fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.get_class_bytes(name).map(|b| b.to_vec())
    }
}

/// Memoizes lookups of an inner provider, including misses.
pub struct CachingClassProvider<P> {
    inner: P,
    cache: Mutex<BTreeMap<String, Option<Vec<u8>>>>,
}

impl<P: ClassProvider> CachingClassProvider<P> {
    pub fn new(inner: P) -> Self {
        CachingClassProvider {
            inner,
            cache: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<P: ClassProvider> ClassProvider for CachingClassProvider<P> {
    fn class_names(&self) -> Vec<String> {
        self.inner.class_names()
    }

    fn get(&self, name: &str) -> Option<Vec<u8>> {
        let mut cache = self.cache.lock().unwrap();
        if let Some(cached) = cache.get(name) {
            return cached.clone();
        }

        let fetched = self.inner.get(name);
        cache.insert(name.to_string(), fetched.clone());
        fetched
    }
}
