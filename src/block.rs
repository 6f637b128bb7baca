//! Fixed-capacity ring buffer used as one segment of a [`SegmentedDeque`](crate::SegmentedDeque).
//!
//! A block of capacity `N` stores at most `N - 1` elements: one slot always stays vacant so
//! that `head == tail` unambiguously means "empty" and `tail + 1 == head` means "full".

use core::iter::Chain;
use core::mem::MaybeUninit;
use core::slice;

use crate::error::Error;

/// Borrowing iterator over the live slots of one block, front to back.
pub(crate) type BlockIter<'a, T> = Chain<slice::Iter<'a, T>, slice::Iter<'a, T>>;

pub(crate) struct Block<T> {
    slots: Box<[MaybeUninit<T>]>,
    head: usize,
    tail: usize,
    map_position: usize,
}

/// `(idx + add) mod capacity` for `idx < capacity` and `add <= capacity`, without
/// overflowing when `capacity` is close to `usize::MAX`.
#[inline(always)]
fn wrap_add(capacity: usize, idx: usize, add: usize) -> usize {
    let room = capacity - idx;
    if add >= room {
        add - room
    } else {
        idx + add
    }
}

/// `(idx - sub) mod capacity` for `idx < capacity` and `sub <= capacity`.
#[inline(always)]
fn wrap_sub(capacity: usize, idx: usize, sub: usize) -> usize {
    if idx >= sub {
        idx - sub
    } else {
        capacity - (sub - idx)
    }
}

impl<T> Block<T> {
    /// Allocates an empty block. Nothing is touched if the allocation fails.
    pub(crate) fn try_new(capacity: usize, map_position: usize) -> Result<Self, Error> {
        debug_assert!(capacity >= 2, "block capacity below 2");
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(Error::out_of_memory("block"))?;
        slots.resize_with(capacity, MaybeUninit::uninit);
        Ok(Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            map_position,
        })
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub(crate) fn map_position(&self) -> usize {
        self.map_position
    }

    #[inline(always)]
    pub(crate) fn set_map_position(&mut self, position: usize) {
        self.map_position = position;
    }

    #[inline(always)]
    fn wrap_add(&self, idx: usize, add: usize) -> usize {
        wrap_add(self.capacity(), idx, add)
    }

    #[inline(always)]
    fn wrap_sub(&self, idx: usize, sub: usize) -> usize {
        wrap_sub(self.capacity(), idx, sub)
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.wrap_sub(self.tail, self.head)
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline(always)]
    pub(crate) fn is_full(&self) -> bool {
        self.wrap_add(self.tail, 1) == self.head
    }

    /// Rewinds the cursors of an empty block so it can be handed out again.
    pub(crate) fn reset(&mut self) {
        debug_assert!(self.is_empty(), "reset of a non-empty block");
        self.head = 0;
        self.tail = 0;
    }

    #[inline(always)]
    pub(crate) fn push_back(&mut self, value: T) {
        debug_assert!(!self.is_full(), "push_back on a full block");
        self.slots[self.tail].write(value);
        self.tail = self.wrap_add(self.tail, 1);
    }

    #[inline(always)]
    pub(crate) fn push_front(&mut self, value: T) {
        debug_assert!(!self.is_full(), "push_front on a full block");
        self.head = self.wrap_sub(self.head, 1);
        self.slots[self.head].write(value);
    }

    #[inline(always)]
    pub(crate) fn pop_back(&mut self) -> T {
        debug_assert!(!self.is_empty(), "pop_back on an empty block");
        self.tail = self.wrap_sub(self.tail, 1);
        // SAFETY: the slot at the old `tail - 1` lies inside `[head, tail)` and is initialized.
        // Moving `tail` past it first means it is never read or dropped again.
        unsafe { self.slots[self.tail].assume_init_read() }
    }

    #[inline(always)]
    pub(crate) fn pop_front(&mut self) -> T {
        debug_assert!(!self.is_empty(), "pop_front on an empty block");
        let head = self.head;
        self.head = self.wrap_add(head, 1);
        // SAFETY: `head` was inside `[head, tail)` and is no longer after the cursor moved.
        unsafe { self.slots[head].assume_init_read() }
    }

    /// Returns the element `index` places after `head`, or `None`.
    #[inline(always)]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        if index < self.len() {
            let real_idx = self.wrap_add(self.head, index);
            // SAFETY: every slot within `len` of `head` is initialized.
            Some(unsafe { self.slots[real_idx].assume_init_ref() })
        } else {
            None
        }
    }

    #[inline(always)]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len() {
            let real_idx = self.wrap_add(self.head, index);
            // SAFETY: every slot within `len` of `head` is initialized.
            Some(unsafe { self.slots[real_idx].assume_init_mut() })
        } else {
            None
        }
    }

    #[inline(always)]
    pub(crate) fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[inline(always)]
    pub(crate) fn back(&self) -> Option<&T> {
        match self.len() {
            0 => None,
            len => self.get(len - 1),
        }
    }

    /// Returns up to two contiguous slices covering the live slots in order.
    ///
    /// The second slice is empty unless the live run wraps past the end of the slot array.
    pub(crate) fn as_slices(&self) -> (&[T], &[T]) {
        let ptr = self.slots.as_ptr() as *const T;
        // SAFETY: `MaybeUninit<T>` has the layout of `T`, and both ranges below cover
        // exactly the initialized slots `[head, tail)` split at the wrap point.
        unsafe {
            if self.head <= self.tail {
                (
                    slice::from_raw_parts(ptr.add(self.head), self.tail - self.head),
                    &[],
                )
            } else {
                (
                    slice::from_raw_parts(ptr.add(self.head), self.capacity() - self.head),
                    slice::from_raw_parts(ptr, self.tail),
                )
            }
        }
    }

    pub(crate) fn iter(&self) -> BlockIter<'_, T> {
        let (a, b) = self.as_slices();
        a.iter().chain(b.iter())
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        for i in 0..self.len() {
            let real_idx = self.wrap_add(self.head, i);
            // SAFETY: slots within `len` of `head` are initialized and dropped exactly once here.
            unsafe { self.slots[real_idx].assume_init_drop() };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_block_empty_and_full() {
        let mut b: Block<i32> = Block::try_new(4, 7).unwrap();
        assert!(b.is_empty());
        assert!(!b.is_full());
        assert_eq!(b.map_position(), 7);
        b.push_back(1);
        b.push_back(2);
        b.push_back(3);
        // one slot is always kept vacant
        assert!(b.is_full());
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_block_push_front_wraps_head() {
        let mut b: Block<i32> = Block::try_new(4, 0).unwrap();
        b.push_front(2);
        b.push_front(1);
        b.push_back(3);
        assert!(b.is_full());
        assert_eq!(b.front(), Some(&1));
        assert_eq!(b.back(), Some(&3));
        let (s1, s2) = b.as_slices();
        assert_eq!(s1, &[1, 2]);
        assert_eq!(s2, &[3]);
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_block_pop_both_ends() {
        let mut b: Block<i32> = Block::try_new(3, 0).unwrap();
        b.push_back(10);
        b.push_back(20);
        assert!(b.is_full());
        assert_eq!(b.pop_back(), 20);
        assert_eq!(b.pop_front(), 10);
        assert!(b.is_empty());
        assert_eq!(b.front(), None);
        assert_eq!(b.back(), None);
    }

    #[test]
    fn test_block_ring_wrap_around() {
        let mut b: Block<i32> = Block::try_new(4, 0).unwrap();
        for round in 0..10 {
            b.push_back(round);
            b.push_back(round + 100);
            assert_eq!(b.pop_front(), round);
            assert_eq!(b.pop_front(), round + 100);
        }
        assert!(b.is_empty());
        b.reset();
        b.push_back(5);
        assert_eq!(b.as_slices(), (&[5][..], &[][..]));
    }

    #[test]
    fn test_block_get_mut() {
        let mut b: Block<i32> = Block::try_new(4, 0).unwrap();
        b.push_back(1);
        b.push_back(2);
        *b.get_mut(1).unwrap() = 20;
        assert_eq!(b.get(1), Some(&20));
        assert_eq!(b.get(2), None);
        assert!(b.get_mut(5).is_none());
    }

    #[test]
    fn test_block_drop_releases_live_elements_only() {
        let tracker = Rc::new(());
        {
            let mut b: Block<Rc<()>> = Block::try_new(4, 0).unwrap();
            b.push_back(tracker.clone());
            b.push_front(tracker.clone());
            b.push_back(tracker.clone());
            let popped = b.pop_front();
            drop(popped);
            assert_eq!(Rc::strong_count(&tracker), 3);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn test_block_wrap_arithmetic_near_usize_max() {
        let cap = usize::MAX;
        assert_eq!(wrap_add(cap, cap - 1, 1), 0);
        assert_eq!(wrap_add(cap, cap - 2, 1), cap - 1);
        assert_eq!(wrap_add(cap, cap / 2 + 1, cap / 2 + 1), 1);
        assert_eq!(wrap_add(cap, 0, cap), 0);
        assert_eq!(wrap_sub(cap, 0, 1), cap - 1);
        assert_eq!(wrap_sub(cap, 1, cap), 1);
        assert_eq!(wrap_sub(cap, 5, 3), 2);

        assert_eq!(wrap_add(4, 3, 1), 0);
        assert_eq!(wrap_add(4, 1, 2), 3);
        assert_eq!(wrap_sub(4, 0, 1), 3);
    }

    #[test]
    fn test_block_allocation_failure() {
        let err = Block::<u64>::try_new(usize::MAX, 0).err().unwrap();
        assert!(matches!(err, Error::OutOfMemory { what: "block", .. }));
    }
}
