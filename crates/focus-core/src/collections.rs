pub mod map {
    pub type HashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
    pub type HashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;
}

/// Map keyed by host element handles.
pub type ElementMap<V> = map::HashMap<crate::ElementId, V>;
