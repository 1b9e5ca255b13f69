//! Dense entity storage addressed by typed indices.
//!
//! Entities are stored in identity order (sorted by id) so iteration order is
//! stable across runs; an id → index map gives O(1) lookup by external id.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::error::ValidationError;

/// Entities stored in an [`Arena`] expose a stable external id.
pub trait Identified {
    fn id(&self) -> u32;
}

/// Typed index into an [`Arena`].
pub trait ArenaIndex: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! arena_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl ArenaIndex for $name {
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_index!(
    /// Position of a bike in the fleet arena.
    BikeIdx
);
arena_index!(
    /// Position of an order in the fleet arena.
    OrderIdx
);
arena_index!(
    /// Position of a station in the fleet arena.
    StationIdx
);

#[derive(Debug, Clone)]
pub struct Arena<T, I> {
    items: Vec<T>,
    by_id: HashMap<u32, usize>,
    _index: PhantomData<I>,
}

impl<T: Identified, I: ArenaIndex> Arena<T, I> {
    /// Build an arena from `items`, sorted by id. Duplicate ids are rejected.
    pub fn new(kind: &str, mut items: Vec<T>) -> Result<Self, ValidationError> {
        items.sort_by_key(|item| item.id());
        let mut by_id = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if by_id.insert(item.id(), index).is_some() {
                return Err(ValidationError::new(format!(
                    "duplicate {kind} id {}",
                    item.id()
                )));
            }
        }
        Ok(Self {
            items,
            by_id,
            _index: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn lookup(&self, id: u32) -> Option<I> {
        self.by_id.get(&id).map(|&index| I::from_index(index))
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.by_id.get(&id).map(|&index| &self.items[index])
    }

    pub fn indices(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.items.len()).map(I::from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (I::from_index(index), item))
    }

    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T, I: ArenaIndex> Index<I> for Arena<T, I> {
    type Output = T;

    fn index(&self, index: I) -> &T {
        &self.items[index.index()]
    }
}

impl<T, I: ArenaIndex> IndexMut<I> for Arena<T, I> {
    fn index_mut(&mut self, index: I) -> &mut T {
        &mut self.items[index.index()]
    }
}
