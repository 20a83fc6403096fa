//! Slot arena with a free-list.
//!
//! Indices stay stable until `compact`, which moves live slots to the front (keeping
//! their relative order) and returns the old→new index map.

use std::ops::{Index, IndexMut};

#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<T> Arena<T> {
    /// Store `value`, reusing a freed slot when available.
    pub fn insert(&mut self, value: T) -> usize {
        self.insert_with(|_| value)
    }

    /// Store a value built from its own index.
    pub fn insert_with(&mut self, make: impl FnOnce(usize) -> T) -> usize {
        self.live += 1;
        match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(make(i));
                i
            }
            None => {
                let i = self.slots.len();
                self.slots.push(Some(make(i)));
                i
            }
        }
    }

    pub fn remove(&mut self, i: usize) -> Option<T> {
        let out = self.slots.get_mut(i).and_then(Option::take);
        if out.is_some() {
            self.free.push(i);
            self.live -= 1;
        }
        out
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.slots.get(i).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        self.slots.get_mut(i).and_then(Option::as_mut)
    }

    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        self.get(i).is_some()
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live indices in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| i))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Move live slots to the front. `map[old] = Some(new)` for live slots.
    pub fn compact(&mut self) -> Vec<Option<usize>> {
        let old = std::mem::take(&mut self.slots);
        let mut map = Vec::with_capacity(old.len());
        for slot in old {
            match slot {
                Some(v) => {
                    map.push(Some(self.slots.len()));
                    self.slots.push(Some(v));
                }
                None => map.push(None),
            }
        }
        self.free.clear();
        map
    }
}

impl<T> Index<usize> for Arena<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match self.get(i) {
            Some(v) => v,
            None => panic!("vacant arena slot {i}"),
        }
    }
}

impl<T> IndexMut<usize> for Arena<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match self.get_mut(i) {
            Some(v) => v,
            None => panic!("vacant arena slot {i}"),
        }
    }
}
