use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Declare a new strongly typed arena index.
#[macro_export]
macro_rules! new_index_type {
    ($vis:vis $name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        $vis struct $name($crate::util::arena::Idx);

        // trick to make the imports not leak outside of the macro
        const _: () = {
            use $crate::util::arena::IndexType;
            use $crate::util::arena::Idx;

            impl IndexType for $name {
                fn new(idx: Idx) -> Self {
                    Self(idx)
                }
                fn inner(&self) -> Idx {
                    self.0
                }
            }

            impl std::fmt::Debug for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "<{} {}>", stringify!($name), self.0.index())
                }
            }
        };
    };
}

pub trait IndexType: Sized + Debug + Copy + Eq + Hash {
    fn new(idx: Idx) -> Self;
    fn inner(&self) -> Idx;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Idx {
    index: usize,
    check: u64,
}

impl Idx {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Append-only storage, values are addressed by stable typed indices.
///
/// Each arena gets a random check value that is stored in all of its indices,
/// so using an index in an arena that did not create it panics instead of silently aliasing.
pub struct Arena<K: IndexType, T> {
    values: Vec<T>,
    check: u64,
    ph: PhantomData<K>,
}

impl<K: IndexType, T> Arena<K, T> {
    pub fn push(&mut self, value: T) -> K {
        let key = K::new(Idx {
            index: self.values.len(),
            check: self.check,
        });
        self.values.push(value);
        key
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    fn assert_owned(&self, key: K) {
        assert_eq!(
            self.check,
            key.inner().check,
            "Arena index {:?} used in arena which did not create it",
            key
        );
    }
}

impl<K: IndexType, T> Index<K> for Arena<K, T> {
    type Output = T;
    fn index(&self, index: K) -> &Self::Output {
        self.assert_owned(index);
        &self.values[index.inner().index]
    }
}

impl<K: IndexType, T> IndexMut<K> for Arena<K, T> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        self.assert_owned(index);
        &mut self.values[index.inner().index]
    }
}

impl<K: IndexType, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            values: vec![],
            check: rand::random(),
            ph: PhantomData,
        }
    }
}
