//! The raw open-addressing table.
//!
//! [`HashTable`] stores values of type `T` and knows nothing about how they
//! are hashed or compared: every operation takes the hash and an equality
//! predicate, and operations that may grow the table take a `hasher` closure
//! used to rehash existing values.
//!
//! Each slot has a one-byte tag next to an uninitialized cell:
//!
//! - `0x00`: empty. Ends a probe sequence.
//! - `0x01`: tombstone. A value was removed here; probing continues past it.
//! - `0x80 | (hash & 0x7f)`: occupied. The low bits reject most non-matching
//!   slots without calling the equality predicate.
//!
//! References into the table never survive a mutation. Growth moves every
//! value, and inserting a key that is found behind a tombstone moves that
//! value forward into the tombstone's slot.

use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::allocator::Allocator;
use crate::allocator::Global;
use crate::cell::SlotCell;

/// Tag of a slot that has not held a value since the last clear or rehash.
///
/// Must stay zero so a fresh tag array can be produced with `write_bytes`.
const EMPTY: u8 = 0x00;

/// Tag of a slot whose value was removed.
const TOMBSTONE: u8 = 0x01;

/// Set on every occupied tag. Neither `EMPTY` nor `TOMBSTONE` has it.
const OCCUPIED: u8 = 0x80;

const HASH_MASK: u8 = 0x7f;

/// Smallest non-zero slot count.
const MIN_CAPACITY: usize = 8;

#[inline(always)]
fn hashtag(hash: u64) -> u8 {
    (hash as u8 & HASH_MASK) | OCCUPIED
}

#[inline(always)]
fn probe_start(hash: u64, mask: usize) -> usize {
    (hash >> 7) as usize & mask
}

#[inline(always)]
fn is_full(tag: u8) -> bool {
    tag & OCCUPIED != 0
}

/// Number of live values a table of `capacity` slots holds before growing
/// (75% load).
#[inline(always)]
fn max_size(capacity: usize) -> usize {
    (capacity >> 1) + (capacity >> 2)
}

/// Smallest slot count whose `max_size` is at least `len`.
fn capacity_for(len: usize) -> usize {
    let slots = len
        .checked_mul(4)
        .and_then(|n| n.checked_add(2))
        .unwrap_or_else(|| capacity_overflow())
        / 3;
    slots
        .checked_next_power_of_two()
        .unwrap_or_else(|| capacity_overflow())
        .max(MIN_CAPACITY)
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("hash table capacity overflow")
}

#[derive(Debug, Clone, Copy)]
struct DataLayout {
    layout: Layout,
    cells_offset: usize,
}

impl DataLayout {
    fn new<T>(capacity: usize) -> Self {
        let tags_layout = Layout::array::<u8>(capacity).unwrap_or_else(|_| capacity_overflow());
        let cells_layout =
            Layout::array::<SlotCell<T>>(capacity).unwrap_or_else(|_| capacity_overflow());

        let (layout, cells_offset) = tags_layout
            .extend(cells_layout)
            .unwrap_or_else(|_| capacity_overflow());

        DataLayout {
            layout,
            cells_offset,
        }
    }
}

/// Allocates the arrays for `capacity` slots with every tag set to `EMPTY`.
fn allocate_slots<T, A: Allocator>(alloc: &A, capacity: usize) -> (NonNull<u8>, DataLayout) {
    debug_assert!(capacity >= MIN_CAPACITY && capacity.is_power_of_two());

    let layout = DataLayout::new::<T>(capacity);
    let ptr = alloc.allocate(layout.layout);
    // SAFETY: The block is at least `capacity` bytes long; the tag array
    // occupies its first `capacity` bytes.
    unsafe {
        core::ptr::write_bytes(ptr.as_ptr(), EMPTY, capacity);
    }
    (ptr, layout)
}

/// Splits an allocation made by `allocate_slots` into its two arrays.
///
/// # Safety
///
/// `ptr` and `layout` must come from `allocate_slots::<T>` with the same
/// `capacity`, the block must still be live for `'a`, and no other reference
/// into it may exist for `'a`.
unsafe fn slots_mut<'a, T>(
    ptr: NonNull<u8>,
    layout: &DataLayout,
    capacity: usize,
) -> (&'a mut [u8], &'a mut [SlotCell<T>]) {
    // SAFETY: Guaranteed by the caller; the cell array starts at
    // `cells_offset`, suitably aligned by `Layout::extend`.
    unsafe {
        (
            core::slice::from_raw_parts_mut(ptr.as_ptr(), capacity),
            core::slice::from_raw_parts_mut(
                ptr.as_ptr().add(layout.cells_offset).cast::<SlotCell<T>>(),
                capacity,
            ),
        )
    }
}

/// Shared counterpart of `slots_mut`.
///
/// # Safety
///
/// Same as `slots_mut`, except that other shared references may exist.
unsafe fn slots_ref<'a, T>(
    ptr: NonNull<u8>,
    layout: &DataLayout,
    capacity: usize,
) -> (&'a [u8], &'a [SlotCell<T>]) {
    // SAFETY: Guaranteed by the caller.
    unsafe {
        (
            core::slice::from_raw_parts(ptr.as_ptr(), capacity),
            core::slice::from_raw_parts(
                ptr.as_ptr().add(layout.cells_offset).cast::<SlotCell<T>>(),
                capacity,
            ),
        )
    }
}

/// Outcome of the insert-position probe.
#[derive(Debug, Clone, Copy)]
struct InsertSlot {
    tag: u8,
    /// First slot in probe order that holds no value. If the key was found
    /// before any such slot, this is the key's own slot.
    first_available: usize,
    matched: Option<usize>,
}

/// Looks for a value matching `hash` and `eq`.
///
/// Stops at the first empty tag, or after visiting every slot once.
///
/// `tags` and `cells` must have the same power-of-two length.
#[inline]
fn probe_lookup<T>(
    tags: &[u8],
    cells: &[SlotCell<T>],
    hash: u64,
    eq: impl Fn(&T) -> bool,
) -> Option<usize> {
    debug_assert!(tags.len().is_power_of_two() && tags.len() == cells.len());

    let mask = tags.len() - 1;
    let tag = hashtag(hash);
    let start = probe_start(hash, mask);

    let mut index = start;
    loop {
        // SAFETY: `index` is masked to `tags.len() - 1`, and an occupied tag
        // means the cell holds a value.
        unsafe {
            let t = *tags.get_unchecked(index);
            if t == tag && eq(cells.get_unchecked(index).get()) {
                return Some(index);
            }
            if t == EMPTY {
                return None;
            }
        }

        index = (index + 1) & mask;
        if index == start {
            return None;
        }
    }
}

/// Finds where a value matching `hash` and `eq` is, and where it should be.
///
/// The table must have at least one slot without a value.
#[inline]
fn probe_insert<T>(
    tags: &[u8],
    cells: &[SlotCell<T>],
    hash: u64,
    eq: impl Fn(&T) -> bool,
) -> InsertSlot {
    debug_assert!(tags.len().is_power_of_two() && tags.len() == cells.len());

    let mask = tags.len() - 1;
    let tag = hashtag(hash);
    let start = probe_start(hash, mask);

    let mut first_available = None;
    let mut matched = None;
    let mut index = start;
    loop {
        // SAFETY: `index` is masked to `tags.len() - 1`, and an occupied tag
        // means the cell holds a value.
        let t = unsafe { *tags.get_unchecked(index) };
        if !is_full(t) && first_available.is_none() {
            first_available = Some(index);
        }

        if t == tag && eq(unsafe { cells.get_unchecked(index).get() }) {
            matched = Some(index);
            break;
        }

        if t == EMPTY {
            break;
        }

        index = (index + 1) & mask;
        if index == start {
            break;
        }
    }

    let first_available = match (first_available, matched) {
        (Some(index), _) | (None, Some(index)) => index,
        (None, None) => unreachable!("probe visited every slot without finding room"),
    };

    InsertSlot {
        tag,
        first_available,
        matched,
    }
}

/// Places a value known to be absent. Used when rebuilding into fresh arrays.
#[inline]
fn insert_unique<T>(tags: &mut [u8], cells: &mut [SlotCell<T>], hash: u64, value: T) {
    let slot = probe_insert(tags, cells, hash, |_| false);
    debug_assert!(!is_full(tags[slot.first_available]));

    // SAFETY: `first_available` is in bounds and its tag says it is vacant.
    unsafe {
        cells
            .get_unchecked_mut(slot.first_available)
            .construct(value);
        *tags.get_unchecked_mut(slot.first_available) = slot.tag;
    }
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live values
    pub len: usize,
    /// Number of slots
    pub capacity: usize,
    /// Number of live values allowed before the table grows
    pub max_size: usize,
    /// Slots holding a value
    pub occupied_slots: usize,
    /// Slots holding a tombstone
    pub tombstones: usize,
    /// Slots never used since the last clear or rehash
    pub empty_slots: usize,
    /// `len / capacity`
    pub load_factor: f64,
    /// Bytes in the table's allocation
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% load, grows at {})",
            self.len,
            self.capacity,
            self.load_factor * 100.0,
            self.max_size
        );
        println!(
            "Slots: {} occupied, {} tombstones, {} empty",
            self.occupied_slots, self.tombstones, self.empty_slots
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// An open-addressing hash table with linear probing and tombstones.
///
/// `HashTable<T, A>` stores values of type `T` in memory obtained from the
/// allocator `A`. Callers provide the hash and an equality predicate for
/// every operation, which lets one table serve sets, maps, and lookups by a
/// borrowed form of the key.
///
/// ## Performance Characteristics
///
/// - **Memory**: 1 byte per slot plus the size of `T`; the table grows at 75%
///   load.
/// - Removal leaves a tombstone. Tombstones are only reclaimed when the table
///   grows.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use probe_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
///
/// let alice = Person {
///     id: 123,
///     name: "Alice".to_string(),
/// };
/// assert!(table.insert(hash_id(123), alice, |a, b| a.id == b.id, |p| hash_id(p.id)));
///
/// let found = table.find(hash_id(123), |p| p.id == 123);
/// assert_eq!(found.map(|p| p.name.as_str()), Some("Alice"));
/// ```
pub struct HashTable<T, A: Allocator = Global> {
    alloc: NonNull<u8>,
    layout: DataLayout,

    capacity: usize,
    len: usize,

    allocator: A,
    _phantom: PhantomData<T>,
}

// SAFETY: The table owns its values and its allocation; sending it sends the
// values and the allocator.
unsafe impl<T: Send, A: Allocator + Send> Send for HashTable<T, A> {}

// SAFETY: Shared access only hands out `&T` and `&A`.
unsafe impl<T: Sync, A: Allocator + Sync> Sync for HashTable<T, A> {}

impl<T, A: Allocator> Debug for HashTable<T, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        if self.capacity == 0 {
            return f
                .debug_struct("HashTable")
                .field("tags", &"unallocated")
                .field("len", &self.len)
                .field("capacity", &self.capacity)
                .finish();
        }

        let rows = self
            .tags()
            .chunks(16)
            .map(|row| {
                row.iter()
                    .map(|&tag| match tag {
                        EMPTY => "..".to_string(),
                        TOMBSTONE => "xx".to_string(),
                        _ => format!("{:02x}", tag),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<String>>();

        f.debug_struct("HashTable")
            .field("tags", &rows)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T, A> Clone for HashTable<T, A>
where
    T: Clone,
    A: Allocator + Clone,
{
    fn clone(&self) -> Self {
        let mut new_table = Self::new_in(self.allocator.clone());
        if self.capacity == 0 {
            return new_table;
        }

        let (alloc, layout) = allocate_slots::<T, A>(&new_table.allocator, self.capacity);
        new_table.alloc = alloc;
        new_table.layout = layout;
        new_table.capacity = self.capacity;

        let (src_tags, src_cells) = self.slots();
        let (dst_tags, dst_cells) = new_table.slots_mut();
        let mut cloned = 0;
        for (index, &tag) in src_tags.iter().enumerate() {
            if is_full(tag) {
                // SAFETY: The source tag is occupied and the destination slot
                // is still vacant.
                unsafe {
                    let value = src_cells[index].get().clone();
                    dst_cells[index].construct(value);
                }
                cloned += 1;
            }
            dst_tags[index] = tag;
        }

        debug_assert_eq!(cloned, self.len);
        new_table.len = cloned;
        new_table
    }
}

impl<T, A: Allocator> Drop for HashTable<T, A> {
    fn drop(&mut self) {
        self.drop_values();
        self.free_slots();
    }
}

impl<T> HashTable<T, Global> {
    /// Creates an empty table. No memory is allocated until the first
    /// insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::new();
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a table able to hold at least `capacity` values without
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.max_size() >= 100);
    /// assert!(table.capacity().is_power_of_two());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T> Default for HashTable<T, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator> HashTable<T, A> {
    /// Creates an empty table that will allocate from `allocator`.
    pub const fn new_in(allocator: A) -> Self {
        Self {
            alloc: NonNull::dangling(),
            layout: DataLayout {
                layout: Layout::new::<()>(),
                cells_offset: 0,
            },
            capacity: 0,
            len: 0,
            allocator,
            _phantom: PhantomData,
        }
    }

    /// Creates a table that holds at least `capacity` values without growing,
    /// allocating from `allocator`.
    pub fn with_capacity_in(capacity: usize, allocator: A) -> Self {
        let mut table = Self::new_in(allocator);
        if capacity > 0 {
            table.resize(capacity_for(capacity), |_| 0);
        }
        table
    }

    fn slots(&self) -> (&[u8], &[SlotCell<T>]) {
        if self.capacity == 0 {
            return (&[], &[]);
        }

        // SAFETY: The allocation is live and sized for `capacity` slots; the
        // shared borrow of `self` rules out mutable aliases.
        unsafe { slots_ref::<T>(self.alloc, &self.layout, self.capacity) }
    }

    fn slots_mut(&mut self) -> (&mut [u8], &mut [SlotCell<T>]) {
        if self.capacity == 0 {
            return (&mut [], &mut []);
        }

        // SAFETY: The allocation is live and sized for `capacity` slots; the
        // exclusive borrow of `self` rules out other references.
        unsafe { slots_mut::<T>(self.alloc, &self.layout, self.capacity) }
    }

    fn tags(&self) -> &[u8] {
        self.slots().0
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots.
    ///
    /// This is zero or a power of two no smaller than 8.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of values the table holds before it grows, which is
    /// three quarters of [`capacity`](Self::capacity).
    pub fn max_size(&self) -> usize {
        max_size(self.capacity)
    }

    /// Returns the table's allocator.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    #[inline]
    fn find_index(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        let (tags, cells) = self.slots();
        probe_lookup(tags, cells, hash, eq)
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// The returned reference is invalidated by any mutating call on the
    /// table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert(42, 42u64, |a, b| a == b, |&n| n);
    ///
    /// assert_eq!(table.find(42, |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(99, |&n| n == 99), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<&T> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `probe_lookup` only returns occupied indexes.
        Some(unsafe { self.slots().1.get_unchecked(index).get() })
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    ///
    /// The part of the value that the hash is derived from must not be
    /// changed.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<&mut T> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `probe_lookup` only returns occupied indexes.
        Some(unsafe { self.slots_mut().1.get_unchecked_mut(index).get_mut() })
    }

    /// Returns `true` if a value matches `hash` and `eq`.
    #[inline]
    pub fn contains(&self, hash: u64, eq: impl Fn(&T) -> bool) -> bool {
        self.find_index(hash, eq).is_some()
    }

    #[inline]
    fn reserve_one(&mut self, hasher: impl Fn(&T) -> u64) {
        if self.len >= self.max_size() {
            self.grow(hasher);
        }
    }

    #[inline]
    fn find_insert_slot(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> InsertSlot {
        debug_assert!(self.len < self.max_size());
        let (tags, cells) = self.slots();
        probe_insert(tags, cells, hash, eq)
    }

    /// Moves the value at `from` into the vacant slot `to`.
    ///
    /// # Safety
    ///
    /// `from` must be occupied and `to` vacant, both in bounds.
    unsafe fn relocate(&mut self, from: usize, to: usize) {
        let (tags, cells) = self.slots_mut();
        debug_assert!(is_full(tags[from]) && !is_full(tags[to]));

        // SAFETY: Guaranteed by the caller.
        unsafe {
            let value = cells.get_unchecked_mut(from).take();
            cells.get_unchecked_mut(to).construct(value);
        }
        tags[to] = tags[from];
        tags[from] = TOMBSTONE;
    }

    /// Inserts a value unless an equal one is present.
    ///
    /// Returns `true` if the value was added. If an equal value is present,
    /// `value` is dropped and the stored one kept, except when the stored
    /// value sits behind a tombstone in its probe sequence: then the
    /// stored value is dropped and `value` takes the earlier slot.
    ///
    /// `eq` is called as `eq(stored, &value)`. `hasher` rehashes stored
    /// values if the table has to grow.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// assert!(table.insert(7, 7u64, |a, b| a == b, |&n| n));
    /// assert!(!table.insert(7, 7u64, |a, b| a == b, |&n| n));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(
        &mut self,
        hash: u64,
        value: T,
        eq: impl Fn(&T, &T) -> bool,
        hasher: impl Fn(&T) -> u64,
    ) -> bool {
        self.reserve_one(hasher);
        let slot = self.find_insert_slot(hash, |stored| eq(stored, &value));

        let (tags, cells) = self.slots_mut();
        match slot.matched {
            None => {
                // SAFETY: `first_available` is vacant.
                unsafe {
                    cells.get_unchecked_mut(slot.first_available).construct(value);
                }
                tags[slot.first_available] = slot.tag;
                self.len += 1;
                true
            }
            Some(index) if index == slot.first_available => false,
            Some(index) => {
                // SAFETY: `index` is occupied and `first_available` is vacant.
                unsafe {
                    cells.get_unchecked_mut(index).destroy();
                    tags[index] = TOMBSTONE;
                    cells.get_unchecked_mut(slot.first_available).construct(value);
                }
                tags[slot.first_available] = slot.tag;
                false
            }
        }
    }

    /// Inserts a value, replacing and returning an equal one if present.
    ///
    /// `eq` is called as `eq(stored, &value)`. `hasher` rehashes stored
    /// values if the table has to grow.
    pub fn replace(
        &mut self,
        hash: u64,
        value: T,
        eq: impl Fn(&T, &T) -> bool,
        hasher: impl Fn(&T) -> u64,
    ) -> Option<T> {
        match self.entry(hash, |stored| eq(stored, &value), hasher) {
            Entry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// If a matching value is found behind a tombstone in its probe
    /// sequence, it is moved into the tombstone's slot before the entry is returned.
    /// The table grows first if it is at its load limit, whether or not the
    /// value is present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::Entry;
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<(u64, &str)> = HashTable::new();
    ///
    /// match table.entry(5, |&(k, _)| k == 5, |&(k, _)| k) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert((5, "five"));
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// table
    ///     .entry(5, |&(k, _)| k == 5, |&(k, _)| k)
    ///     .and_modify(|(_, v)| *v = "FIVE");
    /// assert_eq!(table.find(5, |&(k, _)| k == 5), Some(&(5, "FIVE")));
    /// ```
    pub fn entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&T) -> bool,
        hasher: impl Fn(&T) -> u64,
    ) -> Entry<'_, T, A> {
        self.reserve_one(hasher);
        let slot = self.find_insert_slot(hash, eq);

        match slot.matched {
            Some(index) => {
                if index != slot.first_available {
                    // SAFETY: `index` matched an occupied tag and
                    // `first_available` is vacant since it differs from it.
                    unsafe { self.relocate(index, slot.first_available) };
                }
                Entry::Occupied(OccupiedEntry {
                    table: self,
                    index: slot.first_available,
                })
            }
            None => Entry::Vacant(VacantEntry {
                table: self,
                index: slot.first_available,
                tag: slot.tag,
            }),
        }
    }

    /// Removes and returns a value from the table.
    ///
    /// The slot becomes a tombstone; capacity is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert(42, 42u64, |a, b| a == b, |&n| n);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert_eq!(table.remove(42, |&n| n == 42), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<T> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `probe_lookup` only returns occupied indexes.
        Some(unsafe { self.take_at(index) })
    }

    /// # Safety
    ///
    /// `index` must be occupied.
    unsafe fn take_at(&mut self, index: usize) -> T {
        self.len -= 1;
        let (tags, cells) = self.slots_mut();
        tags[index] = TOMBSTONE;
        // SAFETY: Guaranteed by the caller.
        unsafe { cells.get_unchecked_mut(index).take() }
    }

    /// Keeps only the values for which `f` returns `true`.
    ///
    /// If `f` panics, the values it already rejected stay removed and the
    /// rest stay in the table.
    pub fn retain(&mut self, mut f: impl FnMut(&mut T) -> bool) {
        for index in 0..self.capacity {
            let (tags, cells) = self.slots_mut();
            if !is_full(tags[index]) {
                continue;
            }

            // SAFETY: The tag is occupied.
            if !f(unsafe { cells[index].get_mut() }) {
                // SAFETY: The tag is still occupied. `take_at` retires the
                // slot before the value is dropped.
                drop(unsafe { self.take_at(index) });
            }
        }
    }

    fn drop_values(&mut self) {
        if core::mem::needs_drop::<T>() && self.len > 0 {
            let (tags, cells) = self.slots_mut();
            for (tag, cell) in tags.iter().zip(cells.iter_mut()) {
                if is_full(*tag) {
                    // SAFETY: The tag is occupied.
                    unsafe { cell.destroy() };
                }
            }
        }
    }

    fn free_slots(&mut self) {
        if self.capacity != 0 {
            // SAFETY: The block was allocated by this allocator (or one equal
            // to it) with this layout.
            unsafe {
                self.allocator.deallocate(self.alloc, self.layout.layout);
            }
            self.alloc = NonNull::dangling();
            self.capacity = 0;
        }
    }

    /// Removes all values, keeping the allocated slots.
    ///
    /// Every tag is reset to empty, so tombstones are cleared as well.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert(1, 1u64, |a, b| a == b, |&n| n);
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.drop_values();
        self.len = 0;
        self.slots_mut().0.fill(EMPTY);
    }

    /// Removes all values and frees the slots, returning the table to its
    /// unallocated state.
    pub fn reset(&mut self) {
        self.drop_values();
        self.len = 0;
        self.free_slots();
    }

    /// Reserves room for at least `additional` more values.
    ///
    /// `hasher` rehashes stored values if the table has to grow.
    pub fn reserve(&mut self, additional: usize, hasher: impl Fn(&T) -> u64) {
        let required = self
            .len
            .checked_add(additional)
            .unwrap_or_else(|| capacity_overflow());
        if required > self.max_size() {
            self.resize(capacity_for(required), hasher);
        }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self, hasher: impl Fn(&T) -> u64) {
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .unwrap_or_else(|| capacity_overflow())
            .max(MIN_CAPACITY);
        self.resize(new_capacity, hasher);
    }

    /// Moves every value into fresh arrays of `new_capacity` slots, dropping
    /// all tombstones.
    ///
    /// If `hasher` panics, the values already moved are dropped with the new
    /// arrays and the rest stay in the table.
    fn resize(&mut self, new_capacity: usize, hasher: impl Fn(&T) -> u64) {
        debug_assert!(new_capacity > self.capacity && max_size(new_capacity) >= self.len);

        let (new_alloc, new_layout) = allocate_slots::<T, A>(&self.allocator, new_capacity);
        let mut fresh: HashTable<T, &A> = HashTable {
            alloc: new_alloc,
            layout: new_layout,
            capacity: new_capacity,
            len: 0,
            allocator: &self.allocator,
            _phantom: PhantomData,
        };

        let live = self.len;
        let mut tombstones = 0;
        for index in 0..self.capacity {
            // SAFETY: The block is live for `capacity` slots. Only `len` is
            // written through `self` while these slices exist.
            let (tags, cells) = unsafe { slots_mut::<T>(self.alloc, &self.layout, self.capacity) };
            let tag = tags[index];
            if tag == TOMBSTONE {
                tombstones += 1;
            }
            if !is_full(tag) {
                continue;
            }

            // SAFETY: The tag is occupied.
            let hash = hasher(unsafe { cells[index].get() });
            // SAFETY: The tag is occupied. The slot is retired and uncounted
            // before the value lands in `fresh`.
            let value = unsafe { cells[index].take() };
            tags[index] = TOMBSTONE;
            self.len -= 1;

            let (new_tags, new_cells) = fresh.slots_mut();
            insert_unique(new_tags, new_cells, hash, value);
            fresh.len += 1;
        }
        debug_assert_eq!(fresh.len, live);

        let fresh = core::mem::ManuallyDrop::new(fresh);
        let (new_alloc, new_layout) = (fresh.alloc, fresh.layout);

        let old_capacity = self.capacity;
        self.free_slots();

        self.alloc = new_alloc;
        self.layout = new_layout;
        self.capacity = new_capacity;
        self.len = live;

        trace!(
            "rehashed {} values from {} to {} slots, dropping {} tombstones",
            live, old_capacity, new_capacity, tombstones
        );
    }

    /// Moves the table to `allocator`.
    ///
    /// If `allocator` compares equal to the current one, the slots are
    /// adopted without copying. Otherwise every value is moved into slots
    /// allocated from `allocator` (rehashing with `hasher`) and the old slots
    /// are freed by the old allocator.
    pub fn move_to(mut self, allocator: A, hasher: impl Fn(&T) -> u64) -> Self {
        if self.allocator == allocator {
            trace!("adopting {} slots into an equal allocator", self.capacity);
            self.allocator = allocator;
            return self;
        }

        let mut moved = Self::new_in(allocator);
        if self.len > 0 {
            moved.resize(capacity_for(self.len), |_| 0);
            for index in 0..self.capacity {
                let (tags, cells) = self.slots_mut();
                if !is_full(tags[index]) {
                    continue;
                }

                // SAFETY: The tag is occupied.
                let hash = hasher(unsafe { cells[index].get() });
                // SAFETY: The tag is occupied; `take_at` retires the slot.
                let value = unsafe { self.take_at(index) };
                let (new_tags, new_cells) = moved.slots_mut();
                insert_unique(new_tags, new_cells, hash, value);
                moved.len += 1;
            }
        }

        trace!(
            "moved {} values into {} slots of a different allocator",
            moved.len, moved.capacity
        );
        moved
    }

    /// Returns an iterator over all values in arbitrary order.
    pub fn iter(&self) -> Iter<'_, T> {
        let (tags, cells) = self.slots();
        Iter {
            inner: tags.iter().zip(cells.iter()),
            remaining: self.len,
        }
    }

    /// Returns an iterator over mutable references to all values in
    /// arbitrary order.
    ///
    /// The part of each value that its hash is derived from must not be
    /// changed.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let remaining = self.len;
        let (tags, cells) = self.slots_mut();
        IterMut {
            inner: tags.iter().zip(cells.iter_mut()),
            remaining,
        }
    }

    /// Returns an iterator that removes and yields all values.
    ///
    /// When the iterator is dropped the table is empty, with its capacity
    /// kept and every tag reset to empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert(1, 1u64, |a, b| a == b, |&n| n);
    /// table.insert(2, 2u64, |a, b| a == b, |&n| n);
    ///
    /// let mut values: Vec<u64> = table.drain().collect();
    /// values.sort();
    /// assert_eq!(values, [1, 2]);
    /// assert!(table.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T, A> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Computes how far each value sits from the start of its probe sequence.
    ///
    /// Entry `d` of the result counts the values `d` slots past their start.
    /// The result is empty for an empty table.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self, hasher: impl Fn(&T) -> u64) -> Vec<usize> {
        let mut hist = Vec::new();
        if self.len == 0 {
            return hist;
        }

        let mask = self.capacity - 1;
        let (tags, cells) = self.slots();
        for (index, (&tag, cell)) in tags.iter().zip(cells.iter()).enumerate() {
            if !is_full(tag) {
                continue;
            }

            // SAFETY: The tag is occupied.
            let start = probe_start(hasher(unsafe { cell.get() }), mask);
            let distance = index.wrapping_sub(start) & mask;
            if hist.len() <= distance {
                hist.resize(distance + 1, 0);
            }
            hist[distance] += 1;
        }

        hist
    }

    /// Returns slot usage statistics.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let tags = self.tags();
        let occupied_slots = tags.iter().filter(|&&t| is_full(t)).count();
        let tombstones = tags.iter().filter(|&&t| t == TOMBSTONE).count();

        DebugStats {
            len: self.len,
            capacity: self.capacity,
            max_size: self.max_size(),
            occupied_slots,
            tombstones,
            empty_slots: self.capacity - occupied_slots - tombstones,
            load_factor: if self.capacity == 0 {
                0.0
            } else {
                self.len as f64 / self.capacity as f64
            },
            total_bytes: if self.capacity == 0 {
                0
            } else {
                self.layout.layout.size()
            },
        }
    }
}

impl<T, A: Allocator> IntoIterator for HashTable<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            index: 0,
        }
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a HashTable<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, T, A: Allocator = Global> {
    /// No matching value is present
    Vacant(VacantEntry<'a, T, A>),
    /// A matching value is present
    Occupied(OccupiedEntry<'a, T, A>),
}

impl<'a, T, A: Allocator> Entry<'a, T, A> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert_with(self, default: impl FnOnce() -> T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Calls `f` on the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut T)) -> Option<&'a mut T> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `T::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut T
    where
        T: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A vacant entry: the slot where a new value will be placed.
pub struct VacantEntry<'a, T, A: Allocator = Global> {
    table: &'a mut HashTable<T, A>,
    index: usize,
    tag: u8,
}

impl<'a, T, A: Allocator> VacantEntry<'a, T, A> {
    /// Inserts `value` and returns a mutable reference to it.
    ///
    /// The value must hash to the hash the entry was looked up with.
    pub fn insert(self, value: T) -> &'a mut T {
        self.table.len += 1;
        let (tags, cells) = self.table.slots_mut();
        tags[self.index] = self.tag;
        // SAFETY: The probe reported this slot as vacant and nothing has
        // touched the table since.
        unsafe { cells.get_unchecked_mut(self.index).construct(value) }
    }
}

/// An occupied entry: a stored value matching the lookup.
pub struct OccupiedEntry<'a, T, A: Allocator = Global> {
    table: &'a mut HashTable<T, A>,
    index: usize,
}

impl<'a, T, A: Allocator> OccupiedEntry<'a, T, A> {
    /// Gets a reference to the value.
    pub fn get(&self) -> &T {
        // SAFETY: The entry's slot is occupied for as long as the entry lives.
        unsafe { self.table.slots().1.get_unchecked(self.index).get() }
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: The entry's slot is occupied for as long as the entry lives.
        unsafe { self.table.slots_mut().1.get_unchecked_mut(self.index).get_mut() }
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut T {
        // SAFETY: The entry's slot is occupied.
        unsafe { self.table.slots_mut().1.get_unchecked_mut(self.index).get_mut() }
    }

    /// Removes the value, leaving a tombstone.
    pub fn remove(self) -> T {
        // SAFETY: The entry's slot is occupied.
        unsafe { self.table.take_at(self.index) }
    }
}

/// An iterator over the values of a [`HashTable`].
pub struct Iter<'a, T> {
    inner: core::iter::Zip<core::slice::Iter<'a, u8>, core::slice::Iter<'a, SlotCell<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for (&tag, cell) in self.inner.by_ref() {
            if is_full(tag) {
                self.remaining -= 1;
                // SAFETY: The tag is occupied.
                return Some(unsafe { cell.get() });
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

/// A mutable iterator over the values of a [`HashTable`].
pub struct IterMut<'a, T> {
    inner: core::iter::Zip<core::slice::Iter<'a, u8>, core::slice::IterMut<'a, SlotCell<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for (&tag, cell) in self.inner.by_ref() {
            if is_full(tag) {
                self.remaining -= 1;
                // SAFETY: The tag is occupied.
                return Some(unsafe { cell.get_mut() });
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Takes the next value at or after `*index`, leaving a tombstone.
fn take_next<T, A: Allocator>(table: &mut HashTable<T, A>, index: &mut usize) -> Option<T> {
    if table.len == 0 {
        return None;
    }

    while *index < table.capacity {
        let current = *index;
        *index += 1;
        if is_full(table.tags()[current]) {
            // SAFETY: The tag is occupied.
            return Some(unsafe { table.take_at(current) });
        }
    }

    None
}

/// A draining iterator over the values of a [`HashTable`].
pub struct Drain<'a, T, A: Allocator = Global> {
    table: &'a mut HashTable<T, A>,
    index: usize,
}

impl<T, A: Allocator> Iterator for Drain<'_, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        take_next(self.table, &mut self.index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl<T, A: Allocator> ExactSizeIterator for Drain<'_, T, A> {}

impl<T, A: Allocator> Drop for Drain<'_, T, A> {
    fn drop(&mut self) {
        for _ in &mut *self {}
        self.table.slots_mut().0.fill(EMPTY);
    }
}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<T, A: Allocator = Global> {
    table: HashTable<T, A>,
    index: usize,
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        take_next(&mut self.table, &mut self.index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}
