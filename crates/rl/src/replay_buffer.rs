//! # Experience Replay
//!
//! Fixed-capacity ring of transitions. Once full, every store overwrites the
//! oldest entry. Sampling draws a batch uniformly without replacement.

use crate::error::BufferError;
use physics::Observation;

/// One environment step as seen by a learner.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Observation,
    pub action: Vec<f64>,
    pub reward: f64,
    pub next_state: Observation,
    pub done: bool,
    /// Step index the transition started from
    pub t_step: usize,
}

#[derive(Clone, Debug)]
pub struct ReplayBuffer<T> {
    items: Vec<T>,
    capacity: usize,
    /// Next slot to overwrite once the buffer is full
    head: usize,
}

impl<T> ReplayBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay buffer needs a non-zero capacity");
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn store(&mut self, item: T) {
        if self.items.len() < self.capacity {
            self.items.push(item);
        } else {
            self.items[self.head] = item;
        }
        self.head = (self.head + 1) % self.capacity;
    }

    /// `batch_size` distinct entries chosen uniformly at random.
    ///
    /// # Errors
    ///
    /// [`BufferError::Underfilled`] if fewer than `batch_size` entries are
    /// stored.
    pub fn sample(&self, batch_size: usize, rng: &fastrand::Rng) -> Result<Vec<&T>, BufferError> {
        let available = self.items.len();
        if batch_size > available {
            return Err(BufferError::Underfilled {
                requested: batch_size,
                available,
            });
        }
        // partial Fisher-Yates: the first `batch_size` slots end up a uniform draw
        let mut order: Vec<usize> = (0..available).collect();
        for i in 0..batch_size {
            let j = rng.usize(i..available);
            order.swap(i, j);
        }
        Ok(order[..batch_size].iter().map(|&i| &self.items[i]).collect())
    }

    /// Drop every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
        self.head = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Stored entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.items.split_at(self.head.min(self.items.len()));
        older.iter().chain(newer)
    }
}
