use crate::error::{Error, Result};

/// An indexed binary min-heap over a fixed universe of client indices.
///
/// Each index in `[0, capacity)` holds at most one key at a time. A
/// position map records where every queued index currently sits in the
/// heap, so `decrease_key` and `delete` run in O(log capacity) instead of
/// requiring a linear scan. The heap is laid out 1-based; slot 0 is unused.
///
/// Ties between equal keys are broken by heap structural order. That is
/// not a total-order guarantee, but callers (Dijkstra in particular) only
/// rely on the minimum key being correct, never on secondary ordering.
#[derive(Debug, Clone)]
pub struct IndexMinPQ<K> {
    n: usize,
    /// Heap slot -> client index.
    pq: Vec<usize>,
    /// Client index -> heap slot, `None` while not queued.
    qp: Vec<Option<usize>>,
    /// Client index -> current key, `None` while not queued.
    keys: Vec<Option<K>>,
}

impl<K: Ord> IndexMinPQ<K> {
    /// Create an empty queue able to hold indices `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            n: 0,
            pq: vec![0; capacity + 1],
            qp: vec![None; capacity],
            keys: (0..capacity).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.qp.len()
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Whether `index` is currently queued. O(1).
    pub fn contains(&self, index: usize) -> bool {
        index < self.qp.len() && self.qp[index].is_some()
    }

    /// Queue `index` with the given key.
    pub fn insert(&mut self, index: usize, key: K) -> Result<()> {
        self.check_bounds(index)?;
        if self.contains(index) {
            return Err(Error::DuplicateIndex { index });
        }
        self.n += 1;
        self.qp[index] = Some(self.n);
        self.pq[self.n] = index;
        self.keys[index] = Some(key);
        self.swim(self.n);
        Ok(())
    }

    /// The index holding the minimum key, without removing it.
    pub fn min_index(&self) -> Result<usize> {
        if self.n == 0 {
            return Err(Error::EmptyQueue);
        }
        Ok(self.pq[1])
    }

    /// The key currently associated with `index`.
    pub fn key_of(&self, index: usize) -> Result<&K> {
        self.check_bounds(index)?;
        self.keys[index].as_ref().ok_or(Error::IndexNotFound { index })
    }

    /// Remove and return the index holding the minimum key.
    pub fn del_min(&mut self) -> Result<usize> {
        if self.n == 0 {
            return Err(Error::EmptyQueue);
        }
        let min = self.pq[1];
        self.exch(1, self.n);
        self.n -= 1;
        self.sink(1);
        self.qp[min] = None;
        self.keys[min] = None;
        Ok(min)
    }

    /// Lower the key of a queued `index` to `key` and restore heap order.
    ///
    /// A `key` that is not strictly smaller than the current one is a
    /// no-op; the entry keeps its existing key and position.
    pub fn decrease_key(&mut self, index: usize, key: K) -> Result<()> {
        self.check_bounds(index)?;
        let Some(position) = self.qp[index] else {
            return Err(Error::IndexNotFound { index });
        };
        let improves = self.keys[index]
            .as_ref()
            .is_some_and(|current| key < *current);
        if improves {
            self.keys[index] = Some(key);
            self.swim(position);
        }
        Ok(())
    }

    /// Remove a queued `index` from an arbitrary heap position.
    pub fn delete(&mut self, index: usize) -> Result<()> {
        self.check_bounds(index)?;
        let Some(position) = self.qp[index] else {
            return Err(Error::IndexNotFound { index });
        };
        self.exch(position, self.n);
        self.n -= 1;
        if position <= self.n {
            self.swim(position);
            self.sink(position);
        }
        self.qp[index] = None;
        self.keys[index] = None;
        Ok(())
    }

    fn check_bounds(&self, index: usize) -> Result<()> {
        if index < self.qp.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfBounds {
                index,
                capacity: self.qp.len(),
            })
        }
    }

    /// Key at heap slot `a` strictly greater than the key at slot `b`.
    /// Both slots always hold queued indices, so the options compare by
    /// their inner keys.
    fn greater(&self, a: usize, b: usize) -> bool {
        self.keys[self.pq[a]] > self.keys[self.pq[b]]
    }

    fn exch(&mut self, a: usize, b: usize) {
        self.pq.swap(a, b);
        self.qp[self.pq[a]] = Some(a);
        self.qp[self.pq[b]] = Some(b);
    }

    fn swim(&mut self, mut k: usize) {
        while k > 1 && self.greater(k / 2, k) {
            self.exch(k / 2, k);
            k /= 2;
        }
    }

    fn sink(&mut self, mut k: usize) {
        while 2 * k <= self.n {
            let mut j = 2 * k;
            if j < self.n && self.greater(j, j + 1) {
                j += 1;
            }
            if !self.greater(k, j) {
                break;
            }
            self.exch(k, j);
            k = j;
        }
    }
}
