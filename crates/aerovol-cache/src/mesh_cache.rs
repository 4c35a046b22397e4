//! Byte-bounded LRU cache for generated geometry. Entries are looked up by
//! structural [`CacheKey`]; when the byte budget is exceeded, least recently
//! used entries are dropped until usage falls below the low-water mark.
//! Losing an entry is never an error, only a regeneration.

use hashbrown::HashMap;
use tracing::debug;

use crate::buffer::GeometryBuffer;
use crate::expiry::Expiry;
use crate::key::CacheKey;

/// Default capacity, bytes.
pub const DEFAULT_CAPACITY: usize = 16 * 1024 * 1024;
/// Fraction of capacity eviction shrinks to.
pub const LOW_WATER_FRACTION: f64 = 0.85;

struct Entry {
    buffer: GeometryBuffer,
    expiry: Expiry,
    bytes: usize,
    last_used: u64,
}

/// The process-wide mesh cache. Owned by the geometry context and passed
/// through the render pass; never a global.
pub struct MeshCache {
    entries: HashMap<CacheKey, Entry>,
    capacity: usize,
    low_water: usize,
    used_bytes: usize,
    use_clock: u64,
}

impl MeshCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            low_water: (capacity as f64 * LOW_WATER_FRACTION) as usize,
            used_bytes: 0,
            use_clock: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the key holds an entry that has not expired at `now`.
    /// Does not bump recency.
    #[must_use]
    pub fn contains_valid(&self, key: &CacheKey, now: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| !e.expiry.is_expired(now))
    }

    /// Look up a buffer, bumping its recency. Expired entries are removed
    /// and reported as a miss.
    pub fn get(&mut self, key: &CacheKey, now: u64) -> Option<&GeometryBuffer> {
        if self
            .entries
            .get(key)
            .is_some_and(|e| e.expiry.is_expired(now))
        {
            self.remove(key);
            return None;
        }
        self.use_clock += 1;
        let clock = self.use_clock;
        self.entries.get_mut(key).map(|e| {
            e.last_used = clock;
            &e.buffer
        })
    }

    /// Insert or replace an entry, then evict LRU entries if over budget.
    pub fn put(&mut self, key: CacheKey, buffer: GeometryBuffer, expiry: Expiry) {
        let bytes = buffer.byte_size();
        self.use_clock += 1;
        if let Some(old) = self.entries.insert(
            key,
            Entry {
                buffer,
                expiry,
                bytes,
                last_used: self.use_clock,
            },
        ) {
            self.used_bytes -= old.bytes;
        }
        self.used_bytes += bytes;
        if self.used_bytes > self.capacity {
            self.evict_to_low_water();
        }
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<GeometryBuffer> {
        self.entries.remove(key).map(|e| {
            self.used_bytes -= e.bytes;
            e.buffer
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.used_bytes = 0;
    }

    fn evict_to_low_water(&mut self) {
        let mut by_age: Vec<(CacheKey, u64)> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.last_used))
            .collect();
        by_age.sort_by_key(|(_, last_used)| *last_used);

        let mut evicted = 0usize;
        for (key, _) in by_age {
            if self.used_bytes <= self.low_water {
                break;
            }
            if let Some(entry) = self.entries.remove(&key) {
                self.used_bytes -= entry.bytes;
                evicted += 1;
            }
        }
        debug!(
            evicted,
            used_bytes = self.used_bytes,
            capacity = self.capacity,
            "mesh cache eviction"
        );
    }
}

impl Default for MeshCache {
    fn default() -> Self {
        Self::new()
    }
}
