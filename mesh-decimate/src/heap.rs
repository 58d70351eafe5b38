//! Indexed binary min-heap over edge candidates.
//!
//! The driver needs more than a plain priority queue: killed edges must
//! leave the queue in O(log n) and refreshed costs must move existing
//! entries, so the heap keeps a slot table from edge id to heap position.
//! Cost staleness is still resolved lazily at pop time by the driver; the
//! heap itself never recomputes anything.

use std::cmp::Ordering;

/// Marker for an edge with no heap entry.
const NO_SLOT: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    edge: u32,
    cost: f64,
}

/// Binary min-heap keyed by collapse cost with O(log n)
/// insert/update/remove by edge id.
#[derive(Debug, Clone)]
pub struct CostHeap {
    entries: Vec<HeapEntry>,
    slots: Vec<u32>,
}

impl CostHeap {
    /// Create a heap able to track edge ids `0..edge_count`.
    #[must_use]
    pub fn new(edge_count: usize) -> Self {
        Self {
            entries: Vec::with_capacity(edge_count),
            slots: vec![NO_SLOT; edge_count],
        }
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert an edge or move its existing entry to the new cost.
    pub fn push(&mut self, edge: u32, cost: f64) {
        let slot = self.slots[edge as usize];
        if slot == NO_SLOT {
            self.entries.push(HeapEntry { edge, cost });
            let i = self.entries.len() - 1;
            self.slots[edge as usize] = u32::try_from(i).unwrap_or(NO_SLOT);
            self.sift_up(i);
        } else {
            let i = slot as usize;
            let old = self.entries[i].cost;
            self.entries[i].cost = cost;
            if less(cost, old) {
                self.sift_up(i);
            } else {
                self.sift_down(i);
            }
        }
    }

    /// Remove an edge's entry, returning whether it was present.
    pub fn remove(&mut self, edge: u32) -> bool {
        let slot = self.slots[edge as usize];
        if slot == NO_SLOT {
            return false;
        }
        let i = slot as usize;
        self.slots[edge as usize] = NO_SLOT;
        let last = self.entries.len() - 1;
        if i != last {
            self.entries.swap(i, last);
            self.entries.pop();
            let moved = self.entries[i];
            self.slots[moved.edge as usize] = slot;
            if less(moved.cost, self.entries[parent(i).unwrap_or(i)].cost) && i > 0 {
                self.sift_up(i);
            } else {
                self.sift_down(i);
            }
        } else {
            self.entries.pop();
        }
        true
    }

    /// Pop the cheapest entry.
    pub fn pop(&mut self) -> Option<(u32, f64)> {
        if self.entries.is_empty() {
            return None;
        }
        let top = self.entries[0];
        self.slots[top.edge as usize] = NO_SLOT;
        let last = self.entries.len() - 1;
        if last > 0 {
            self.entries.swap(0, last);
            self.entries.pop();
            self.slots[self.entries[0].edge as usize] = 0;
            self.sift_down(0);
        } else {
            self.entries.pop();
        }
        Some((top.edge, top.cost))
    }

    fn sift_up(&mut self, mut i: usize) {
        while let Some(p) = parent(i) {
            if less(self.entries[i].cost, self.entries[p].cost) {
                self.swap_entries(i, p);
                i = p;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut smallest = i;
            if l < self.entries.len() && less(self.entries[l].cost, self.entries[smallest].cost) {
                smallest = l;
            }
            if r < self.entries.len() && less(self.entries[r].cost, self.entries[smallest].cost) {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.swap_entries(i, smallest);
            i = smallest;
        }
    }

    fn swap_entries(&mut self, i: usize, k: usize) {
        self.entries.swap(i, k);
        #[allow(clippy::cast_possible_truncation)]
        {
            self.slots[self.entries[i].edge as usize] = i as u32;
            self.slots[self.entries[k].edge as usize] = k as u32;
        }
    }
}

#[inline]
fn parent(i: usize) -> Option<usize> {
    if i == 0 {
        None
    } else {
        Some((i - 1) / 2)
    }
}

/// Total order on costs; NaN sorts last so it can never win a pop.
#[inline]
fn less(a: f64, b: f64) -> bool {
    a.partial_cmp(&b) == Some(Ordering::Less)
}
