//! Total orders over stored keys.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// A total order over `T`, injected into a tree at construction
pub trait Comparer<T: ?Sized> {
    /// Compare two keys
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Check two keys for equality under this order
    fn equals(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// The natural `Ord` order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparer<T> for NaturalOrder {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// The reverse of the natural `Ord` order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReverseOrder;

impl<T: Ord + ?Sized> Comparer<T> for ReverseOrder {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        b.cmp(a)
    }
}

/// An order defined by a closure
pub struct FnComparer<T: ?Sized, F> {
    compare: F,
    _marker: PhantomData<fn(&T, &T)>,
}

impl<T: ?Sized, F> FnComparer<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Wrap a comparison closure
    pub fn new(compare: F) -> Self {
        Self {
            compare,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized, F> Comparer<T> for FnComparer<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }
}

impl<T: ?Sized, F: Clone> Clone for FnComparer<T, F> {
    fn clone(&self) -> Self {
        Self {
            compare: self.compare.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized, F> fmt::Debug for FnComparer<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComparer").finish_non_exhaustive()
    }
}
