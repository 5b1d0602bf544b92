//! A small least-recently-used cache, used by the outbound client to memoise
//! user lookups.
//!
//! The recency list is doubly linked through slot indices rather than
//! pointers, with freed slots reused on eviction. A single [Mutex] guards the
//! whole structure.

use std::{collections::HashMap, fmt, sync::Mutex};

/// The interface the outbound client relies on. Implement it to plug in an
/// external cache.
pub trait Cache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V) -> Result<(), CacheError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum CacheError {
    EmptyKey,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::EmptyKey => write!(f, "Cache keys must not be empty"),
        }
    }
}

impl std::error::Error for CacheError {}

struct Entry<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Inner<V> {
    index: HashMap<String, usize>,
    slots: Vec<Entry<V>>,
    head: Option<usize>,
    tail: Option<usize>,
    evicted: usize,
}

pub struct LruCache<V> {
    capacity: usize,
    inner: Mutex<Inner<V>>,
}

impl<V> LruCache<V> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        LruCache {
            capacity,
            inner: Mutex::new(Inner {
                index: HashMap::with_capacity(capacity),
                slots: Vec::with_capacity(capacity),
                head: None,
                tail: None,
                evicted: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many entries have been pushed out to make room for others.
    pub fn evicted(&self) -> usize {
        self.lock().evicted
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<V>> {
        // A panic while holding the lock can't leave the list half-linked in a
        // way later operations would trip over, so poisoning is ignored.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V> Inner<V> {
    fn unlink(&mut self, i: usize) {
        let (prev, next) = (self.slots[i].prev, self.slots[i].next);

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }

        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }

        self.slots[i].prev = None;
        self.slots[i].next = None;
    }

    fn push_front(&mut self, i: usize) {
        self.slots[i].prev = None;
        self.slots[i].next = self.head;

        if let Some(h) = self.head {
            self.slots[h].prev = Some(i);
        }

        self.head = Some(i);

        if self.tail.is_none() {
            self.tail = Some(i);
        }
    }

    fn touch(&mut self, i: usize) {
        if self.head != Some(i) {
            self.unlink(i);
            self.push_front(i);
        }
    }
}

impl<V: Clone + Send> Cache<V> for LruCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        if key.is_empty() {
            return None;
        }

        let mut inner = self.lock();
        let i = *inner.index.get(key)?;
        inner.touch(i);

        Some(inner.slots[i].value.clone())
    }

    fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        let mut inner = self.lock();

        if let Some(&i) = inner.index.get(key) {
            inner.slots[i].value = value;
            inner.touch(i);
            return Ok(());
        }

        let entry = Entry {
            key: key.to_owned(),
            value,
            prev: None,
            next: None,
        };

        let i = if inner.index.len() >= self.capacity {
            // Full, so the tail exists. Reuse its slot for the new entry.
            let Some(t) = inner.tail else {
                unreachable!("a full cache has a tail")
            };
            inner.unlink(t);
            let old = std::mem::replace(&mut inner.slots[t], entry);
            inner.index.remove(&old.key);
            inner.evicted += 1;
            t
        } else {
            inner.slots.push(entry);
            inner.slots.len() - 1
        };

        inner.index.insert(key.to_owned(), i);
        inner.push_front(i);

        Ok(())
    }
}
