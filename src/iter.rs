//! Iterators over a [`SegmentedDeque`].

use core::fmt;
use core::iter::{FusedIterator, Flatten};
use core::slice;

use crate::block::{Block, BlockIter};
use crate::deque::SegmentedDeque;

/// Borrowing iterator over the elements of a [`SegmentedDeque`], front to back.
///
/// Created by [`SegmentedDeque::iter`]. The iterator walks the occupied range of the block
/// directory one block at a time. It holds a shared borrow of the deque, so the deque cannot be
/// mutated until the iterator is dropped.
pub struct Iter<'a, T> {
    blocks: Flatten<slice::Iter<'a, Option<Block<T>>>>,
    front: Option<BlockIter<'a, T>>,
    back: Option<BlockIter<'a, T>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(directory: &'a [Option<Block<T>>], len: usize) -> Self {
        Self {
            blocks: directory.iter().flatten(),
            front: None,
            back: None,
            remaining: len,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks.clone(),
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(item) = self.front.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(item);
            }
            match self.blocks.next() {
                Some(block) => self.front = Some(block.iter()),
                None => break,
            }
        }
        // The back cursor may have already claimed the last block.
        let item = self.back.as_mut().and_then(Iterator::next);
        if item.is_some() {
            self.remaining -= 1;
        }
        item
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        loop {
            if let Some(item) = self.back.as_mut().and_then(DoubleEndedIterator::next_back) {
                self.remaining -= 1;
                return Some(item);
            }
            match self.blocks.next_back() {
                Some(block) => self.back = Some(block.iter()),
                None => break,
            }
        }
        let item = self.front.as_mut().and_then(DoubleEndedIterator::next_back);
        if item.is_some() {
            self.remaining -= 1;
        }
        item
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over the elements of a [`SegmentedDeque`], front to back.
///
/// Created by the [`IntoIterator`] impl. Elements not yet yielded are dropped with the iterator.
pub struct IntoIter<T> {
    inner: SegmentedDeque<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(inner: SegmentedDeque<T>) -> Self {
        Self { inner }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len();
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use crate::SegmentedDeque;

    fn sample(block_capacity: usize, n: i32) -> SegmentedDeque<i32> {
        let mut d = SegmentedDeque::with_block_capacity(block_capacity).unwrap();
        // mix both ends so the first block wraps
        for i in 0..n {
            if i % 2 == 0 {
                d.push_back(i);
            } else {
                d.push_front(-i);
            }
        }
        d
    }

    fn expected(n: i32) -> Vec<i32> {
        let mut model = std::collections::VecDeque::new();
        for i in 0..n {
            if i % 2 == 0 {
                model.push_back(i);
            } else {
                model.push_front(-i);
            }
        }
        model.into_iter().collect()
    }

    #[test]
    fn test_iter_forward_across_blocks() {
        let d = sample(4, 25);
        assert!(d.block_count() > 3);
        let got: Vec<i32> = d.iter().copied().collect();
        assert_eq!(got, expected(25));
        assert_eq!(d.iter().len(), 25);
    }

    #[test]
    fn test_iter_reverse_and_meet_in_middle() {
        let d = sample(3, 17);
        let want = expected(17);

        let rev: Vec<i32> = d.iter().rev().copied().collect();
        let mut want_rev = want.clone();
        want_rev.reverse();
        assert_eq!(rev, want_rev);

        let mut it = d.iter();
        let mut front = Vec::new();
        let mut back = Vec::new();
        loop {
            match it.next() {
                Some(x) => front.push(*x),
                None => break,
            }
            match it.next_back() {
                Some(x) => back.push(*x),
                None => break,
            }
        }
        back.reverse();
        front.extend(back);
        assert_eq!(front, want);
        assert_eq!(it.len(), 0);
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn test_iter_empty() {
        let d: SegmentedDeque<i32> = SegmentedDeque::with_block_capacity(2).unwrap();
        assert_eq!(d.iter().next(), None);
        assert_eq!(d.iter().next_back(), None);
        assert_eq!(d.iter().size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_iter_debug_and_clone() {
        let d = sample(4, 3);
        let it = d.iter();
        assert_eq!(format!("{:?}", it), format!("{:?}", expected(3)));
        assert_eq!(it.clone().count(), 3);
    }

    #[test]
    fn test_into_iter_both_ends() {
        let d = sample(4, 10);
        let want = expected(10);
        let mut it = d.into_iter();
        assert_eq!(it.len(), 10);
        assert_eq!(it.next(), Some(want[0]));
        assert_eq!(it.next_back(), Some(want[9]));
        let rest: Vec<i32> = it.collect();
        assert_eq!(rest, want[1..9]);
    }

    #[test]
    fn test_into_iter_drops_remaining() {
        use std::rc::Rc;
        let tracker = Rc::new(());
        let mut d = SegmentedDeque::with_block_capacity(2).unwrap();
        for _ in 0..5 {
            d.push_back(tracker.clone());
        }
        let mut it = d.into_iter();
        drop(it.next());
        assert_eq!(Rc::strong_count(&tracker), 5);
        drop(it);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }
}
