/*!
This priority queue uses an implementation of heap that efficiently allows
updating the priority of an element. It accomplishes this by keeping track of
the positions of all elements in the heap, and then using sift-up and sift-down
operations to update the heap.

Prim's and Dijkstra's algorithms both need this "decrease-key" operation on
the frontier of the tree being grown.
*/

use crate::element::Handle;
use std::{cmp::Ordering, ops::Range};

/// Priority queue of graph elements.
///
/// When you pop an element, the one with the lowest cost is removed from the
/// queue and returned.
pub(crate) struct Queue<H, Cost>
where
    H: Handle,
    Cost: PartialOrd + Copy,
{
    items: Vec<(H, Cost)>,
    map: Vec<Option<usize>>,
}

/// Get the index of the parent in the binary heap.
const fn heap_parent(index: usize) -> Option<usize> {
    if index > 0 {
        Some((index - 1) >> 1)
    } else {
        None
    }
}

/// Get the indices of the children in the binary heap.
const fn heap_children(index: usize) -> Range<usize> {
    let off = index << 1;
    (off + 1)..(off + 3)
}

impl<H, Cost> Queue<H, Cost>
where
    H: Handle,
    Cost: PartialOrd + Copy,
{
    /// Create a new queue for handles with indices below `num_items`.
    pub fn new(num_items: usize) -> Self {
        Queue {
            items: Vec::with_capacity(num_items),
            map: vec![None; num_items],
        }
    }

    /// Number of items currently in the queue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The current cost of `val`, if it is queued.
    pub fn cost(&self, val: H) -> Option<Cost> {
        self.position(val).map(|i| self.items[i].1)
    }

    // Low level functions for moving things around inside the heap.

    fn compare(&self, i: usize, j: usize) -> Option<Ordering> {
        self.items[i].1.partial_cmp(&self.items[j].1)
    }

    fn position(&self, val: H) -> Option<usize> {
        self.map.get(val.index() as usize).copied().flatten()
    }

    fn set_position(&mut self, val: H, index: usize) {
        let vi = val.index() as usize;
        if vi >= self.map.len() {
            self.map.resize(vi + 1, None);
        }
        self.map[vi] = Some(index);
    }

    fn unset_position(&mut self, val: H) {
        if let Some(i) = self.map.get_mut(val.index() as usize) {
            *i = None;
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.set_position(self.items[i].0, j);
        self.set_position(self.items[j].0, i);
        self.items.swap(i, j);
    }

    fn remove_last(&mut self) -> Option<(H, Cost)> {
        let last = self.items.pop()?;
        self.unset_position(last.0);
        Some(last)
    }

    fn sift_up(&mut self, index: usize) {
        let mut index = index;
        while let Some(pi) = heap_parent(index) {
            if let Some(Ordering::Less) = self.compare(index, pi) {
                self.swap(index, pi);
                index = pi;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, index: usize) {
        let mut index = index;
        while index < self.len() {
            let smallest = heap_children(index)
                .filter(|ci| *ci < self.len())
                .fold(None, |prev: Option<usize>, ci| match prev {
                    Some(prev) => match self.compare(ci, prev) {
                        Some(Ordering::Less) => Some(ci),
                        _ => Some(prev),
                    },
                    None => Some(ci),
                });
            match smallest {
                Some(child) => match self.compare(index, child) {
                    Some(Ordering::Less) => break,
                    _ => {
                        self.swap(index, child);
                        index = child;
                    }
                },
                None => break,
            }
        }
    }

    // High level functions to work with the queue.

    /// Insert the given handle `val` with `cost` into the heap.
    ///
    /// If the handle is already present in the heap, it will be updated to have
    /// the new cost.
    pub fn insert(&mut self, val: H, cost: Cost) {
        match self.position(val) {
            Some(index) => {
                self.items[index].1 = cost;
                self.sift_down(index);
                self.sift_up(index);
            }
            None => {
                self.set_position(val, self.items.len());
                self.items.push((val, cost));
                self.sift_up(self.len() - 1)
            }
        }
    }

    /// Insert `val`, or lower its cost if it is queued with a higher cost.
    /// Returns true if the queue changed.
    pub fn decrease(&mut self, val: H, cost: Cost) -> bool {
        match self.cost(val) {
            Some(old) if old.partial_cmp(&cost) != Some(Ordering::Greater) => false,
            _ => {
                self.insert(val, cost);
                true
            }
        }
    }

    /// Remove the item from the front of the queue and return it.
    pub fn pop(&mut self) -> Option<(H, Cost)> {
        if self.len() > 1 {
            self.swap(0, self.len() - 1);
            let out = self.remove_last();
            self.sift_down(0);
            out
        } else {
            self.remove_last()
        }
    }
}
