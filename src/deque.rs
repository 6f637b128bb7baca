//! Segmented double-ended queue.
//!
//! # Layout
//! Elements live in fixed-capacity ring buffers ("blocks"). The blocks are owned by a
//! *directory*: a `Vec` of block slots in which the live blocks occupy one contiguous run
//! `[first, last]`. Every block records its own directory position, so neighbours are found by
//! index rather than by pointer.
//!
//! ```text
//!  directory:  [ -- | B0 | B1 | B2 | -- | -- ]
//!                     ^first     ^last
//!  B0: ring buffer, partially filled from the front
//!  B1: full
//!  B2: ring buffer, partially filled from the back
//! ```
//!
//! Blocks strictly between `first` and `last` are always full, which keeps indexing O(1).
//!
//! # Growth
//! Pushing onto a full boundary block attaches a new block next to it. When the directory has
//! no slot left on that side it is either recentered in place (when the live run fills at most
//! half of it) or replaced by a directory of twice the capacity with the live run copied into
//! its middle. Either way both ends keep headroom, so alternating `push_front`/`push_back`
//! workloads stay amortized O(1). Blocks are moved between slots, never copied element-wise.
//!
//! # Shrinking
//! A boundary block that empties leaves the directory. The deque keeps exactly one such block as
//! a spare for the next attach, so a workload oscillating across a block edge does not hit the
//! allocator on every step. At least one block always stays live, even when the deque is empty.

use core::fmt;
use core::marker::PhantomData;
use std::collections::VecDeque;

use log::{debug, trace};

use crate::block::Block;
use crate::error::{Error, PushError};
use crate::iter::{IntoIter, Iter};

/// Block capacity used by [`SegmentedDeque::new`].
pub const DEFAULT_BLOCK_CAPACITY: usize = 64;

// ─── AnyDeque ─────────────────────────────────────────────────────────────────

/// End operations shared by every deque layout in this crate's tests and benches.
///
/// `SegmentedDeque` and the contiguous `VecDeque` both implement it, which lets one driver
/// replay the same operation sequence against the segmented layout and a flat reference.
/// Pushes here are infallible; use the inherent `try_push_*` methods to observe allocation
/// failure.
pub trait AnyDeque<T> {
    /// Live element count.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn push_back(&mut self, item: T);
    fn push_front(&mut self, item: T);
    /// `None` is the normal outcome on an empty deque.
    fn pop_back(&mut self) -> Option<T>;
    /// `None` is the normal outcome on an empty deque.
    fn pop_front(&mut self) -> Option<T>;
    /// Drops every element. A segmented deque keeps one block allocated afterwards.
    fn clear(&mut self);
    /// Peeks the front end without removing.
    fn front(&self) -> Option<&T>;
    /// Peeks the back end without removing.
    fn back(&self) -> Option<&T>;
    fn front_mut(&mut self) -> Option<&mut T>;
    fn back_mut(&mut self) -> Option<&mut T>;
}

impl<T> AnyDeque<T> for VecDeque<T> {
    fn len(&self) -> usize {
        self.len()
    }
    fn push_back(&mut self, item: T) {
        self.push_back(item);
    }
    fn push_front(&mut self, item: T) {
        self.push_front(item);
    }
    fn pop_back(&mut self) -> Option<T> {
        self.pop_back()
    }
    fn pop_front(&mut self) -> Option<T> {
        self.pop_front()
    }
    fn clear(&mut self) {
        self.clear();
    }
    fn front(&self) -> Option<&T> {
        self.front()
    }
    fn back(&self) -> Option<&T> {
        self.back()
    }
    fn front_mut(&mut self) -> Option<&mut T> {
        self.front_mut()
    }
    fn back_mut(&mut self) -> Option<&mut T> {
        self.back_mut()
    }
}

impl<T> AnyDeque<T> for SegmentedDeque<T> {
    fn len(&self) -> usize {
        self.len
    }
    fn push_back(&mut self, item: T) {
        self.push_back(item);
    }
    fn push_front(&mut self, item: T) {
        self.push_front(item);
    }
    fn pop_back(&mut self) -> Option<T> {
        self.pop_back()
    }
    fn pop_front(&mut self) -> Option<T> {
        self.pop_front()
    }
    fn clear(&mut self) {
        self.clear();
    }
    fn front(&self) -> Option<&T> {
        self.front()
    }
    fn back(&self) -> Option<&T> {
        self.back()
    }
    fn front_mut(&mut self) -> Option<&mut T> {
        self.front_mut()
    }
    fn back_mut(&mut self) -> Option<&mut T> {
        self.back_mut()
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

/// Construction parameters for a [`SegmentedDeque`].
///
/// ```
/// use segmented_deque::SegmentedDeque;
///
/// let d: SegmentedDeque<u32> = SegmentedDeque::builder()
///     .block_capacity(16)
///     .map_capacity(8)
///     .build()
///     .unwrap();
/// assert_eq!(d.block_capacity(), 16);
/// assert_eq!(d.map_capacity(), 8);
/// ```
pub struct Builder<T> {
    block_capacity: usize,
    map_capacity: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Self {
            block_capacity: DEFAULT_BLOCK_CAPACITY,
            map_capacity: 1,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Builder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("block_capacity", &self.block_capacity)
            .field("map_capacity", &self.map_capacity)
            .finish()
    }
}

impl<T> Builder<T> {
    /// Slots per block. A block holds `block_capacity - 1` elements; must be at least 2.
    pub fn block_capacity(mut self, block_capacity: usize) -> Self {
        self.block_capacity = block_capacity;
        self
    }

    /// Initial number of directory slots. Values below 1 are raised to 1.
    pub fn map_capacity(mut self, map_capacity: usize) -> Self {
        self.map_capacity = map_capacity;
        self
    }

    /// Allocates the directory and the first block.
    ///
    /// # Errors
    /// [`Error::InvalidBlockCapacity`] if `block_capacity < 2`, [`Error::OutOfMemory`] if either
    /// allocation fails.
    pub fn build(self) -> Result<SegmentedDeque<T>, Error> {
        if self.block_capacity < 2 {
            return Err(Error::InvalidBlockCapacity(self.block_capacity));
        }
        let map_capacity = self.map_capacity.max(1);
        let mut directory = try_alloc_directory(map_capacity)?;
        let position = map_capacity / 2;
        directory[position] = Some(Block::try_new(self.block_capacity, position)?);
        trace!(
            "created segmented deque: block capacity {}, map capacity {}",
            self.block_capacity,
            map_capacity
        );
        Ok(SegmentedDeque {
            directory,
            first: position,
            last: position,
            block_capacity: self.block_capacity,
            len: 0,
            spare: None,
            #[cfg(test)]
            fail_allocations: None,
        })
    }
}

fn try_alloc_directory<T>(map_capacity: usize) -> Result<Vec<Option<Block<T>>>, Error> {
    let mut directory = Vec::new();
    directory
        .try_reserve_exact(map_capacity)
        .map_err(Error::out_of_memory("directory"))?;
    directory.resize_with(map_capacity, || None);
    Ok(directory)
}

#[cold]
#[track_caller]
fn allocation_panic(err: &Error) -> ! {
    panic!("segmented deque: {err}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

// ─── SegmentedDeque ───────────────────────────────────────────────────────────

/// A double-ended queue stored as a directory of fixed-capacity ring-buffer blocks.
///
/// Pushes and pops at either end are amortized O(1), and growth never moves elements: only
/// block handles are moved when the directory is resized.
///
/// | Operation | Cost |
/// |-----------|------|
/// | `push_*` / `pop_*` | amortized O(1) |
/// | `front` / `back` / `get` | O(1) |
/// | directory growth | O(live blocks), O(log n) times over n pushes |
///
/// The deque has no internal synchronization. Share it across threads behind a `Mutex` that
/// serializes every call.
///
/// ```
/// use segmented_deque::SegmentedDeque;
///
/// let mut d = SegmentedDeque::with_block_capacity(4).unwrap();
/// d.push_back(2);
/// d.push_back(3);
/// d.push_front(1);
/// assert_eq!(d.len(), 3);
/// assert_eq!(d.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// assert_eq!(d.pop_front(), Some(1));
/// assert_eq!(d.pop_back(), Some(3));
/// ```
pub struct SegmentedDeque<T> {
    directory: Vec<Option<Block<T>>>,
    first: usize,
    last: usize,
    block_capacity: usize,
    len: usize,
    spare: Option<Block<T>>,
    #[cfg(test)]
    fail_allocations: Option<&'static str>,
}

impl<T> SegmentedDeque<T> {
    /// Creates an empty deque with [`DEFAULT_BLOCK_CAPACITY`].
    ///
    /// # Panics
    /// Panics if the first block cannot be allocated.
    pub fn new() -> Self {
        match Self::with_block_capacity(DEFAULT_BLOCK_CAPACITY) {
            Ok(deque) => deque,
            Err(err) => allocation_panic(&err),
        }
    }

    /// Creates an empty deque whose blocks have `block_capacity` slots.
    ///
    /// # Errors
    /// [`Error::InvalidBlockCapacity`] if `block_capacity < 2`, [`Error::OutOfMemory`] if the
    /// first block or the directory cannot be allocated.
    pub fn with_block_capacity(block_capacity: usize) -> Result<Self, Error> {
        Builder::default().block_capacity(block_capacity).build()
    }

    /// Returns a [`Builder`] with default parameters.
    pub fn builder() -> Builder<T> {
        Builder::default()
    }

    /// Returns the number of elements in the deque.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the deque contains no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots per block, as configured at construction.
    #[inline(always)]
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Number of blocks currently linked into the directory. Never zero.
    #[inline(always)]
    pub fn block_count(&self) -> usize {
        self.last - self.first + 1
    }

    /// Number of slots in the block directory.
    #[inline(always)]
    pub fn map_capacity(&self) -> usize {
        self.directory.len()
    }

    #[inline(always)]
    fn block(&self, position: usize) -> &Block<T> {
        match &self.directory[position] {
            Some(block) => block,
            None => unreachable!("Logic Error: directory slot {position} inside the live range is vacant"),
        }
    }

    #[inline(always)]
    fn block_mut(&mut self, position: usize) -> &mut Block<T> {
        match &mut self.directory[position] {
            Some(block) => block,
            None => unreachable!("Logic Error: directory slot {position} inside the live range is vacant"),
        }
    }

    /// Locates the block position and in-block offset of logical `index`.
    ///
    /// Only the two boundary blocks may be partially filled, so everything after the first
    /// block is laid out in strides of `block_capacity - 1`.
    #[inline(always)]
    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len {
            return None;
        }
        let first_len = self.block(self.first).len();
        if index < first_len {
            Some((self.first, index))
        } else {
            let rest = index - first_len;
            let stride = self.block_capacity - 1;
            Some((self.first + 1 + rest / stride, rest % stride))
        }
    }

    /// Returns a shared reference to the element at logical `index`, or `None`.
    ///
    /// Logical index 0 is the front.
    pub fn get(&self, index: usize) -> Option<&T> {
        let (position, offset) = self.locate(index)?;
        self.block(position).get(offset)
    }

    /// Returns an exclusive reference to the element at logical `index`, or `None`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let (position, offset) = self.locate(index)?;
        self.block_mut(position).get_mut(offset)
    }

    /// Returns a shared reference to the front element, or `None` if empty.
    #[inline(always)]
    pub fn front(&self) -> Option<&T> {
        self.block(self.first).front()
    }

    /// Returns a shared reference to the back element, or `None` if empty.
    #[inline(always)]
    pub fn back(&self) -> Option<&T> {
        self.block(self.last).back()
    }

    /// Returns an exclusive reference to the front element, or `None` if empty.
    #[inline(always)]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.block_mut(self.first).get_mut(0)
    }

    /// Returns an exclusive reference to the back element, or `None` if empty.
    #[inline(always)]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let block = self.block_mut(self.last);
        match block.len() {
            0 => None,
            len => block.get_mut(len - 1),
        }
    }

    /// Appends `value` to the back of the deque.
    ///
    /// # Panics
    /// Panics if a new block or a larger directory cannot be allocated. Use
    /// [`try_push_back`](Self::try_push_back) to handle that case.
    #[inline]
    #[track_caller]
    pub fn push_back(&mut self, value: T) {
        if let Err(err) = self.try_push_back(value) {
            allocation_panic(err.error());
        }
    }

    /// Prepends `value` to the front of the deque.
    ///
    /// # Panics
    /// Panics if a new block or a larger directory cannot be allocated. Use
    /// [`try_push_front`](Self::try_push_front) to handle that case.
    #[inline]
    #[track_caller]
    pub fn push_front(&mut self, value: T) {
        if let Err(err) = self.try_push_front(value) {
            allocation_panic(err.error());
        }
    }

    /// Appends `value` to the back of the deque.
    ///
    /// # Errors
    /// Returns [`PushError`] carrying `value` back if an allocation fails. The deque is left
    /// exactly as it was before the call.
    pub fn try_push_back(&mut self, value: T) -> Result<(), PushError<T>> {
        if self.block(self.last).is_full() {
            if let Err(err) = self.attach_block(End::Back) {
                debug!("push_back failed: {err}");
                return Err(PushError::new(value, err));
            }
        }
        let last = self.last;
        self.block_mut(last).push_back(value);
        self.len += 1;
        Ok(())
    }

    /// Prepends `value` to the front of the deque.
    ///
    /// # Errors
    /// Returns [`PushError`] carrying `value` back if an allocation fails. The deque is left
    /// exactly as it was before the call.
    pub fn try_push_front(&mut self, value: T) -> Result<(), PushError<T>> {
        if self.block(self.first).is_full() {
            if let Err(err) = self.attach_block(End::Front) {
                debug!("push_front failed: {err}");
                return Err(PushError::new(value, err));
            }
        }
        let first = self.first;
        self.block_mut(first).push_front(value);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let last = self.last;
        let value = self.block_mut(last).pop_back();
        self.len -= 1;
        if self.first != last && self.block(last).is_empty() {
            self.detach_block(End::Back);
        }
        Some(value)
    }

    /// Removes and returns the first element, or `None` if empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let first = self.first;
        let value = self.block_mut(first).pop_front();
        self.len -= 1;
        if first != self.last && self.block(first).is_empty() {
            self.detach_block(End::Front);
        }
        Some(value)
    }

    /// Removes all elements, keeping one block alive.
    pub fn clear(&mut self) {
        while self.pop_back().is_some() {}
    }

    /// Returns a front-to-back iterator over shared references to the elements.
    ///
    /// The iterator borrows the deque, so it cannot be mutated while the iterator is alive.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.directory[self.first..=self.last], self.len)
    }

    /// Tears the deque down, handing every element to `cleanup` exactly once in front-to-back
    /// order before the blocks and the directory are released.
    ///
    /// Elements already removed with `pop_front`/`pop_back` belong to the caller and are never
    /// passed to `cleanup`. The deque is consumed, so it cannot be destroyed twice.
    ///
    /// ```
    /// use segmented_deque::SegmentedDeque;
    ///
    /// let mut d = SegmentedDeque::with_block_capacity(2).unwrap();
    /// d.extend(["a", "b", "c"]);
    /// let mut seen = Vec::new();
    /// d.destroy(|s| seen.push(s));
    /// assert_eq!(seen, ["a", "b", "c"]);
    /// ```
    pub fn destroy<F>(mut self, mut cleanup: F)
    where
        F: FnMut(T),
    {
        let count = self.len;
        while let Some(value) = self.pop_front() {
            cleanup(value);
        }
        trace!("destroyed segmented deque after cleaning up {count} elements");
    }

    /// Produces a block for a new boundary slot: the spare if one is cached, otherwise a fresh
    /// allocation.
    fn acquire_block(&mut self) -> Result<Block<T>, Error> {
        if let Some(block) = self.spare.take() {
            trace!("reusing spare block");
            return Ok(block);
        }
        Block::try_new(self.allocation_size("block", self.block_capacity), 0)
    }

    /// Links a new empty block next to the boundary block at `end`.
    ///
    /// All fallible allocation happens before the first mutation, so on error the deque is
    /// unchanged.
    fn attach_block(&mut self, end: End) -> Result<(), Error> {
        let at_edge = match end {
            End::Front => self.first == 0,
            End::Back => self.last + 1 == self.directory.len(),
        };
        let grown = if at_edge && self.block_count() * 2 > self.directory.len() {
            let map_capacity = self.directory.len().saturating_mul(2);
            Some(try_alloc_directory(self.allocation_size("directory", map_capacity))?)
        } else {
            None
        };
        let mut block = self.acquire_block()?;

        if at_edge {
            self.recenter(grown, end);
        }
        let position = match end {
            End::Front => self.first - 1,
            End::Back => self.last + 1,
        };
        block.set_map_position(position);
        self.directory[position] = Some(block);
        match end {
            End::Front => self.first = position,
            End::Back => self.last = position,
        }
        trace!(
            "attached block at directory position {position} ({} live, map capacity {})",
            self.block_count(),
            self.directory.len()
        );
        Ok(())
    }

    /// Unlinks the empty boundary block at `end` and keeps it as the spare if none is cached.
    fn detach_block(&mut self, end: End) {
        let position = match end {
            End::Front => self.first,
            End::Back => self.last,
        };
        debug_assert!(self.first != self.last, "the sole block cannot be detached");
        let Some(mut block) = self.directory[position].take() else {
            unreachable!("Logic Error: boundary slot {position} is vacant");
        };
        debug_assert_eq!(block.map_position(), position);
        match end {
            End::Front => self.first += 1,
            End::Back => self.last -= 1,
        }
        if self.spare.is_none() {
            block.reset();
            self.spare = Some(block);
            trace!("detached block at directory position {position}, kept as spare");
        } else {
            trace!("detached block at directory position {position}, released");
        }
    }

    /// Moves the live run of blocks so that both sides of it have free slots.
    ///
    /// With `grown` set, the blocks move into that (larger) directory, which then replaces the
    /// current one. Otherwise they are shifted inside the current directory. Odd slack goes to
    /// `end`, which is the side about to receive a block.
    fn recenter(&mut self, grown: Option<Vec<Option<Block<T>>>>, end: End) {
        let live = self.block_count();
        let old_first = self.first;
        let map_capacity = grown.as_ref().map_or(self.directory.len(), Vec::len);
        let slack = map_capacity - live;
        let new_first = match end {
            End::Front => slack - slack / 2,
            End::Back => slack / 2,
        };

        match grown {
            Some(mut directory) => {
                for (offset, slot) in self.directory[old_first..=self.last].iter_mut().enumerate() {
                    if let Some(mut block) = slot.take() {
                        block.set_map_position(new_first + offset);
                        directory[new_first + offset] = Some(block);
                    }
                }
                self.directory = directory;
                trace!("grew block directory to {map_capacity} slots, live run now starts at {new_first}");
            }
            None => {
                let mut relocate = |offset: usize| {
                    if let Some(mut block) = self.directory[old_first + offset].take() {
                        block.set_map_position(new_first + offset);
                        self.directory[new_first + offset] = Some(block);
                    }
                };
                // Walk in the direction of travel so no live slot is overwritten.
                if new_first < old_first {
                    (0..live).for_each(&mut relocate);
                } else {
                    (0..live).rev().for_each(&mut relocate);
                }
                trace!("recentered block directory in place, live run now starts at {new_first}");
            }
        }
        self.first = new_first;
        self.last = new_first + live - 1;
    }

    #[cfg(not(test))]
    #[inline(always)]
    fn allocation_size(&self, _what: &'static str, requested: usize) -> usize {
        requested
    }

    /// Requests an impossible size for the allocation named by `fail_allocations`, so the
    /// real `TryReserveError` path runs.
    #[cfg(test)]
    fn allocation_size(&self, what: &'static str, requested: usize) -> usize {
        if self.fail_allocations == Some(what) {
            usize::MAX
        } else {
            requested
        }
    }
}

impl<T> Default for SegmentedDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SegmentedDeque<T> {
    fn clone(&self) -> Self {
        let mut cloned = match Self::with_block_capacity(self.block_capacity) {
            Ok(deque) => deque,
            Err(err) => allocation_panic(&err),
        };
        cloned.extend(self.iter().cloned());
        cloned
    }
}

impl<T: fmt::Debug> fmt::Debug for SegmentedDeque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for SegmentedDeque<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}
impl<T: Eq> Eq for SegmentedDeque<T> {}

impl<T> Extend<T> for SegmentedDeque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<T> FromIterator<T> for SegmentedDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T> IntoIterator for SegmentedDeque<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a SegmentedDeque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
