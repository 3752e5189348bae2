//! Recent results: a fixed-capacity circular buffer that overwrites its
//! oldest item when full.
//!
//! Fullness is an index collision (`back + 1 == front`, modulo capacity) with
//! no separate count, so a buffer of capacity `C` holds at most `C - 1` items.

use crate::chain::Chain;
use crate::error::ChainError;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub struct RecentResultsCache<T> {
    slots: Vec<Option<T>>,
    /// Index of the oldest item
    front: usize,
    /// Index of the next free slot
    back: usize,
}

impl<T> RecentResultsCache<T> {
    /// Create an empty buffer with `capacity` backing slots (`capacity - 1` usable).
    pub fn new(capacity: usize) -> Result<Self, ChainError> {
        if capacity < 2 {
            return Err(ChainError::InvalidArgument(format!(
                "cache capacity must be at least 2, got {}",
                capacity
            )));
        }

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots,
            front: 0,
            back: 0,
        })
    }

    /// Number of backing slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Most items the buffer can hold at once.
    pub fn usable_capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Append `item`, evicting and returning the oldest item if the buffer is full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.pop().ok()
        } else {
            None
        };

        self.slots[self.back] = Some(item);
        self.back = self.advance(self.back);
        evicted
    }

    /// Remove and return the oldest item.
    pub fn pop(&mut self) -> Result<T, ChainError> {
        if self.is_empty() {
            return Err(ChainError::EmptyCache);
        }

        let item = self.slots[self.front].take().ok_or(ChainError::EmptyCache)?;
        self.front = self.advance(self.front);
        Ok(item)
    }

    /// The oldest item, left in place.
    pub fn peek(&self) -> Result<&T, ChainError> {
        if self.is_empty() {
            return Err(ChainError::EmptyCache);
        }
        self.slots[self.front].as_ref().ok_or(ChainError::EmptyCache)
    }

    pub fn len(&self) -> usize {
        if self.front <= self.back {
            self.back - self.front
        } else {
            self.slots.len() - self.front + self.back
        }
    }

    pub fn is_empty(&self) -> bool {
        self.front == self.back
    }

    pub fn is_full(&self) -> bool {
        self.advance(self.back) == self.front
    }

    /// Held items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.slots.len();
        (0..self.len())
            .filter_map(move |offset| self.slots[(self.front + offset) % capacity].as_ref())
    }

    /// Snapshot of the held items, oldest first.
    pub fn to_ordered_list(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }
}

/// A completed chain as shown in the recent list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTranslation {
    pub results: Chain,
    /// Set when the chain was persisted.
    pub translation_id: Option<String>,
}

/// Thread-safe recent-translations list shared by concurrent requests.
///
/// Pushes and reads take the same lock, so every read sees a consistent
/// snapshot.
#[derive(Debug)]
pub struct RecentTranslations {
    inner: Mutex<RecentResultsCache<RecentTranslation>>,
}

impl RecentTranslations {
    pub fn new(capacity: usize) -> Result<Self, ChainError> {
        Ok(Self {
            inner: Mutex::new(RecentResultsCache::new(capacity)?),
        })
    }

    pub fn push(&self, item: RecentTranslation) {
        self.lock().push(item);
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<RecentTranslation> {
        self.lock().to_ordered_list()
    }

    /// Newest first, the order the recent list is presented in.
    pub fn newest_first(&self) -> Vec<RecentTranslation> {
        let mut list = self.snapshot();
        list.reverse();
        list
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, RecentResultsCache<RecentTranslation>> {
        // A panic while holding the lock cannot leave the pointers half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
