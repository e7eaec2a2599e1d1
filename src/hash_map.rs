use core::fmt::Debug;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::DefaultHashBuilder;
use crate::allocator::Allocator;
use crate::allocator::Global;
use crate::hash_set::HashSet;
use crate::hash_set::make_hash;
use crate::hash_set::make_hasher;
use crate::hash_table::Entry as TableEntry;
use crate::hasher::DefaultKeyComparator;
use crate::hasher::KeyComparator;
use crate::hasher::KeyHasher;

/// A key/value pair as stored in a [`HashMap`].
///
/// Only `key` takes part in hashing and comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<K, V> {
    /// The key. Never changed while the slot is stored.
    pub key: K,
    /// The mapped value.
    pub value: V,
}

/// Hashes a [`Slot`] by its key with the wrapped hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlotHasher<H>(H);

impl<H> SlotHasher<H> {
    /// Wraps a key hasher.
    pub fn new(hasher: H) -> Self {
        Self(hasher)
    }

    /// Returns the wrapped key hasher.
    pub fn get(&self) -> &H {
        &self.0
    }
}

impl<K, V, H: KeyHasher<K>> KeyHasher<Slot<K, V>> for SlotHasher<H> {
    #[inline]
    fn hash(&self, slot: &Slot<K, V>) -> u64 {
        self.0.hash(&slot.key)
    }
}

/// Compares [`Slot`]s by key with the wrapped comparator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlotComparator<C>(C);

impl<C> SlotComparator<C> {
    /// Wraps a key comparator.
    pub fn new(comparator: C) -> Self {
        Self(comparator)
    }

    /// Returns the wrapped key comparator.
    pub fn get(&self) -> &C {
        &self.0
    }
}

impl<K, V, C: KeyComparator<K>> KeyComparator<Slot<K, V>> for SlotComparator<C> {
    #[inline]
    fn eq(&self, stored: &Slot<K, V>, key: &Slot<K, V>) -> bool {
        self.0.eq(&stored.key, &key.key)
    }
}

#[inline(always)]
fn slot_key<'a, K, V, Q, C>(comparator: &'a C, key: &'a Q) -> impl Fn(&Slot<K, V>) -> bool + 'a
where
    Q: ?Sized,
    C: KeyComparator<K, Q>,
{
    move |slot| comparator.eq(&slot.key, key)
}

type SlotSet<K, V, H, C, A> = HashSet<Slot<K, V>, SlotHasher<H>, SlotComparator<C>, A>;

/// A hash map stored as a [`HashSet`] of key/value [`Slot`]s.
///
/// `HashMap<K, V, H, C, A>` hashes keys with the [`KeyHasher`] `H` and
/// compares them with the [`KeyComparator`] `C`. Lookups accept any type the
/// hasher and comparator support, so a `HashMap<String, _>` can be queried
/// with a `&str`.
///
/// # Performance Characteristics
///
/// - **Memory**: 1 byte per slot overhead, plus the size of `(K, V)`.
/// - Removal leaves a tombstone that is reclaimed when the map next grows.
///
/// References returned by lookups are invalidated by any mutation: growth
/// moves every entry, and inserting a key that is already present may move
/// its entry to an earlier slot.
#[derive(Clone)]
pub struct HashMap<K, V, H = DefaultHashBuilder, C = DefaultKeyComparator, A: Allocator = Global> {
    set: SlotSet<K, V, H, C, A>,
}

impl<K, V, H, C, A> Debug for HashMap<K, V, H, C, A>
where
    K: Debug,
    V: Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H, C, A> PartialEq for HashMap<K, V, H, C, A>
where
    V: PartialEq,
    H: KeyHasher<K>,
    C: KeyComparator<K>,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, H, C, A> Eq for HashMap<K, V, H, C, A>
where
    V: Eq,
    H: KeyHasher<K>,
    C: KeyComparator<K>,
    A: Allocator,
{
}

impl<K, V, H, C> HashMap<K, V, H, C, Global>
where
    H: Default,
    C: Default,
{
    /// Creates an empty map using the default hasher and comparator.
    ///
    /// No memory is allocated until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map able to hold at least `capacity` entries without
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert!(map.max_size() >= 100);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_strategies_in(capacity, H::default(), C::default(), Global)
    }
}

impl<K, V, H, C> HashMap<K, V, H, C, Global>
where
    C: Default,
{
    /// Creates an empty map with the given hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map: HashMap<i32, &str, _> = HashMap::with_hasher(SimpleHasher);
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    /// Creates an empty map with the given capacity and hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Self {
        Self::with_strategies_in(capacity, hasher, C::default(), Global)
    }
}

impl<K, V, H, C, A: Allocator> HashMap<K, V, H, C, A> {
    /// Creates an empty map from explicit hashing, comparison, and allocation
    /// strategies.
    pub fn with_strategies_in(capacity: usize, hasher: H, comparator: C, allocator: A) -> Self {
        Self {
            set: HashSet::with_strategies_in(
                capacity,
                SlotHasher(hasher),
                SlotComparator(comparator),
                allocator,
            ),
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Returns the number of slots in the map.
    pub fn capacity(&self) -> usize {
        self.set.capacity()
    }

    /// Returns the number of entries the map holds before it grows.
    pub fn max_size(&self) -> usize {
        self.set.max_size()
    }

    /// Returns the map's key hasher.
    pub fn hasher(&self) -> &H {
        self.set.hasher().get()
    }

    /// Returns the map's key comparator.
    pub fn comparator(&self) -> &C {
        self.set.comparator().get()
    }

    /// Returns the map's allocator.
    pub fn allocator(&self) -> &A {
        self.set.allocator()
    }

    /// Removes all entries, keeping the allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert!(map.capacity() > 0);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.set.clear();
    }

    /// Removes all entries and frees the map's memory.
    pub fn reset(&mut self) {
        self.set.reset();
    }

    /// Returns an iterator over the entries in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let mut pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    /// pairs.sort();
    /// assert_eq!(pairs, vec![(1, "a"), (2, "b")]);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.set.table.iter(),
        }
    }

    /// Returns an iterator over the entries with mutable access to the
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.set.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<&str, i32> = HashMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// for value in map.values_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map["a"], 10);
    /// assert_eq!(map["b"], 20);
    /// # }
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes and yields every entry, keeping the allocated capacity.
    pub fn drain(&mut self) -> Drain<'_, K, V, A> {
        Drain {
            inner: self.set.table.drain(),
        }
    }

    /// Retains only the entries for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, i32> = (0..8).map(|i| (i, i * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// # }
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.set
            .table
            .retain(|slot| f(&slot.key, &mut slot.value));
    }
}

impl<K, V, H, C, A> HashMap<K, V, H, C, A>
where
    H: KeyHasher<K>,
    C: KeyComparator<K>,
    A: Allocator,
{
    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.set.reserve(additional);
    }

    /// Inserts a key/value pair.
    ///
    /// If the key is present its value is replaced and the old value
    /// returned; the stored key is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let set = &mut self.set;
        let hash = make_hash(set.hasher.get(), &key);
        match set.table.entry(
            hash,
            slot_key(set.comparator.get(), &key),
            make_hasher(&set.hasher),
        ) {
            TableEntry::Occupied(mut entry) => {
                Some(core::mem::replace(&mut entry.get_mut().value, value))
            }
            TableEntry::Vacant(entry) => {
                entry.insert(Slot { key, value });
                None
            }
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<&Slot<K, V>>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<K, Q>,
    {
        let hash = make_hash(self.set.hasher.get(), key);
        self.set
            .table
            .find(hash, slot_key(self.set.comparator.get(), key))
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<String, u32> = HashMap::new();
    /// map.insert("apples".to_string(), 3);
    ///
    /// assert_eq!(map.get("apples"), Some(&3));
    /// assert_eq!(map.get("pears"), None);
    /// # }
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<K, Q>,
    {
        self.find(key).map(|slot| &slot.value)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<K, Q>,
    {
        self.find(key).map(|slot| (&slot.key, &slot.value))
    }

    /// Returns a mutable reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, i32> = HashMap::new();
    /// map.insert(1, 10);
    /// if let Some(v) = map.get_mut(&1) {
    ///     *v += 1;
    /// }
    /// assert_eq!(map.get(&1), Some(&11));
    /// # }
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<K, Q>,
    {
        let hash = make_hash(self.set.hasher.get(), key);
        self.set
            .table
            .find_mut(hash, slot_key(self.set.comparator.get(), key))
            .map(|slot| &mut slot.value)
    }

    /// Returns `true` if the map holds an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<K, Q>,
    {
        self.find(key).is_some()
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// # }
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<K, Q>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes the entry for `key`, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<K, Q>,
    {
        let hash = make_hash(self.set.hasher.get(), key);
        self.set
            .table
            .remove(hash, slot_key(self.set.comparator.get(), key))
            .map(|slot| (slot.key, slot.value))
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// If the key is present but sits behind a tombstone, its entry is
    /// moved into the tombstone's slot first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts.get("a"), Some(&2));
    /// assert_eq!(counts.get("b"), Some(&1));
    /// # }
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, A> {
        let set = &mut self.set;
        let hash = make_hash(set.hasher.get(), &key);
        match set.table.entry(
            hash,
            slot_key(set.comparator.get(), &key),
            make_hasher(&set.hasher),
        ) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Moves the map's storage to `allocator`.
    ///
    /// Storage is adopted as-is when `allocator` compares equal to the
    /// current allocator, and copied into a fresh allocation otherwise.
    pub fn move_to(self, allocator: A) -> Self {
        Self {
            set: self.set.move_to(allocator),
        }
    }

    /// Returns slot usage statistics for the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.set.debug_stats()
    }

    /// Returns how far each entry sits from its ideal slot. See
    /// [`HashTable::probe_histogram`](crate::HashTable::probe_histogram).
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.set.probe_histogram()
    }
}

impl<K, V, H, C> Default for HashMap<K, V, H, C, Global>
where
    H: Default,
    C: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, Q, V, H, C, A> Index<&Q> for HashMap<K, V, H, C, A>
where
    Q: ?Sized,
    H: KeyHasher<K> + KeyHasher<Q>,
    C: KeyComparator<K> + KeyComparator<K, Q>,
    A: Allocator,
{
    type Output = V;

    /// Returns the value stored for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in HashMap"),
        }
    }
}

impl<K, V, H, C> FromIterator<(K, V)> for HashMap<K, V, H, C, Global>
where
    H: KeyHasher<K> + Default,
    C: KeyComparator<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HashMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V, H, C, A> Extend<(K, V)> for HashMap<K, V, H, C, A>
where
    H: KeyHasher<K>,
    C: KeyComparator<K>,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, H, C, A> Extend<(&'a K, &'a V)> for HashMap<K, V, H, C, A>
where
    K: Copy + 'a,
    V: Copy + 'a,
    H: KeyHasher<K>,
    C: KeyComparator<K>,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, H, C, A: Allocator> IntoIterator for HashMap<K, V, H, C, A> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.set.into_iter(),
        }
    }
}

impl<'a, K, V, H, C, A: Allocator> IntoIterator for &'a HashMap<K, V, H, C, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, H, C, A: Allocator> IntoIterator for &'a mut HashMap<K, V, H, C, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in a map, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, A: Allocator = Global> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, A>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, A>),
}

impl<'a, K, V, A: Allocator> Entry<'a, K, V, A> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, A> Entry<'a, K, V, A>
where
    V: Default,
    A: Allocator,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, A: Allocator = Global> {
    entry: crate::hash_table::VacantEntry<'a, Slot<K, V>, A>,
    key: K,
}

impl<'a, K, V, A: Allocator> VacantEntry<'a, K, V, A> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self
            .entry
            .insert(Slot {
                key: self.key,
                value,
            })
            .value
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, A: Allocator = Global> {
    entry: crate::hash_table::OccupiedEntry<'a, Slot<K, V>, A>,
}

impl<'a, K, V, A: Allocator> OccupiedEntry<'a, K, V, A> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().key
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().value
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().value
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().value
    }

    /// Replaces the value and returns the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().value
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        let slot = self.entry.remove();
        (slot.key, slot.value)
    }
}

/// An iterator over the entries of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| (&slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| (&slot.key, &mut slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A draining iterator over the entries of a `HashMap`.
pub struct Drain<'a, K, V, A: Allocator = Global> {
    inner: crate::hash_table::Drain<'a, Slot<K, V>, A>,
}

impl<K, V, A: Allocator> Iterator for Drain<'_, K, V, A> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| (slot.key, slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A consuming iterator over the entries of a `HashMap`.
pub struct IntoIter<K, V, A: Allocator = Global> {
    inner: crate::hash_set::IntoIter<Slot<K, V>, A>,
}

impl<K, V, A: Allocator> Iterator for IntoIter<K, V, A> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| (slot.key, slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type SipMap<K, V> = HashMap<K, V, SipHashBuilder>;

    #[test]
    fn test_new_and_with_hasher() {
        let map: SipMap<i32, String> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);

        let map2: SipMap<i32, String> = HashMap::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
    }

    #[test]
    fn test_with_capacity() {
        let map: SipMap<i32, String> = HashMap::with_capacity(100);
        assert!(map.max_size() >= 100);

        let map2: SipMap<i32, String> =
            HashMap::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(map2.max_size() >= 200);
    }

    #[test]
    fn test_insert_and_get() {
        let mut map: SipMap<i32, String> = HashMap::new();

        assert_eq!(map.insert(1, "one".to_string()), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"one".to_string()));

        assert_eq!(
            map.insert(1, "ONE".to_string()),
            Some("one".to_string())
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"ONE".to_string()));
        assert_eq!(map.get(&2), None);
    }

    #[test]
    fn test_small_scenario() {
        let mut map: SipMap<i32, i32> = HashMap::new();
        map.insert(45, 5);
        map.insert(46, 6);

        assert_eq!(map.len(), 2);
        assert!(map.contains_key(&45));
        assert!(map.contains_key(&46));
        assert!(!map.contains_key(&47));
        assert_eq!(map.get(&45), Some(&5));

        assert!(map.remove(&45).is_some());
        assert!(map.remove(&45).is_none());
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&46), Some(&6));

        assert_eq!(map.insert(46, 460), Some(6));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&46), Some(&460));
    }

    #[test]
    fn test_get_mut_and_key_value() {
        let mut map: SipMap<String, i32> = HashMap::new();
        map.insert("k".to_string(), 1);

        *map.get_mut("k").unwrap() += 41;
        assert_eq!(map.get("k"), Some(&42));
        assert_eq!(
            map.get_key_value("k"),
            Some((&"k".to_string(), &42))
        );
        assert!(map.get_mut("missing").is_none());
    }

    #[test]
    fn test_remove_entry() {
        let mut map: SipMap<String, i32> = HashMap::new();
        map.insert("a".to_string(), 1);

        assert_eq!(map.remove_entry("a"), Some(("a".to_string(), 1)));
        assert_eq!(map.remove_entry("a"), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear_and_reset() {
        let mut map: SipMap<i32, i32> = HashMap::new();
        map.extend((0..10).map(|i| (i, i)));

        let capacity = map.capacity();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);

        map.insert(1, 1);
        map.reset();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 0);
        assert_eq!(map.get(&1), None);
    }

    #[test]
    fn test_reserve() {
        let mut map: SipMap<i32, i32> = HashMap::new();
        map.reserve(500);
        let capacity = map.capacity();
        for i in 0..500 {
            map.insert(i, i);
        }
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn test_entry_api() {
        let mut map: SipMap<String, i32> = HashMap::new();

        *map.entry("a".to_string()).or_insert(0) += 1;
        *map.entry("a".to_string()).or_insert(0) += 1;
        *map.entry("b".to_string()).or_insert_with(|| 10) += 1;
        assert_eq!(map.get("a"), Some(&2));
        assert_eq!(map.get("b"), Some(&11));

        map.entry("a".to_string()).and_modify(|v| *v *= 100);
        assert_eq!(map["a"], 200);

        let key = map.entry("c".to_string()).key().clone();
        assert_eq!(key, "c");
        assert!(!map.contains_key("c"));
    }

    #[test]
    fn test_entry_or_default() {
        let mut map: SipMap<i32, Vec<i32>> = HashMap::new();
        map.entry(1).or_default().push(5);
        map.entry(1).or_default().push(6);
        assert_eq!(map.get(&1), Some(&vec![5, 6]));
    }

    #[test]
    fn test_occupied_entry() {
        let mut map: SipMap<i32, &str> = HashMap::new();
        map.insert(1, "a");

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &"a");
                assert_eq!(entry.insert("b"), "a");
                *entry.get_mut() = "c";
                assert_eq!(entry.remove_entry(), (1, "c"));
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }
        assert!(map.is_empty());

        map.insert(2, "x");
        if let Entry::Occupied(entry) = map.entry(2) {
            assert_eq!(entry.remove(), "x");
        }
        assert!(map.is_empty());
    }

    #[test]
    fn test_vacant_entry() {
        let mut map: SipMap<i32, &str> = HashMap::new();

        match map.entry(3) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &3);
                *entry.insert("three") = "THREE";
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert_eq!(map.get(&3), Some(&"THREE"));

        match map.entry(4) {
            Entry::Vacant(entry) => assert_eq!(entry.into_key(), 4),
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_iterators() {
        let mut map: SipMap<i32, i32> = HashMap::new();
        for i in 0..10 {
            map.insert(i, i * 10);
        }

        let mut pairs: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
        pairs.sort();
        assert_eq!(pairs, (0..10).map(|i| (i, i * 10)).collect::<Vec<_>>());

        let mut keys: Vec<_> = map.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, (0..10).collect::<Vec<_>>());

        let sum: i32 = map.values().sum();
        assert_eq!(sum, 450);

        for (_, v) in map.iter_mut() {
            *v += 1;
        }
        for v in map.values_mut() {
            *v *= 2;
        }
        for (k, v) in &map {
            assert_eq!(*v, (k * 10 + 1) * 2);
        }
        assert_eq!(map.keys().len(), 10);

        let mut owned: Vec<_> = map.into_iter().collect();
        owned.sort();
        assert_eq!(owned[3], (3, 62));
    }

    #[test]
    fn test_drain() {
        let mut map: SipMap<i32, String> = HashMap::new();
        for i in 0..20 {
            map.insert(i, i.to_string());
        }

        let capacity = map.capacity();
        let mut drained: Vec<_> = map.drain().collect();
        drained.sort();
        assert_eq!(drained.len(), 20);
        assert_eq!(drained[7], (7, "7".to_string()));
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn test_retain() {
        let mut map: SipMap<i32, i32> = (0..50).map(|i| (i, i)).collect();
        map.retain(|&k, v| {
            *v += 1;
            k % 5 == 0
        });
        assert_eq!(map.len(), 10);
        assert_eq!(map.get(&10), Some(&11));
        assert_eq!(map.get(&11), None);
    }

    #[test]
    fn test_eq_clone_debug() {
        let a: SipMap<i32, i32> = [(1, 10), (2, 20)].into_iter().collect();
        let mut b = a.clone();
        assert_eq!(a, b);

        b.insert(2, 21);
        assert_ne!(a, b);
        b.remove(&2);
        assert_ne!(a, b);

        let single: SipMap<i32, i32> = [(1, 10)].into_iter().collect();
        assert_eq!(alloc::format!("{:?}", single), "{1: 10}");
    }

    #[test]
    fn test_extend_from_refs() {
        let source = [(1, 2), (3, 4)];
        let mut map: SipMap<i32, i32> = HashMap::new();
        map.extend(source.iter().map(|(k, v)| (k, v)));
        assert_eq!(map.len(), 2);
        assert_eq!(map[&3], 4);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_missing_key_panics() {
        let map: SipMap<i32, i32> = HashMap::new();
        let _ = map[&1];
    }

    #[test]
    fn test_many_entries() {
        let mut map: SipMap<u64, u64> = HashMap::new();
        for i in 0..5000u64 {
            map.insert(i, i * i);
        }
        for i in (0..5000u64).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * i));
        }
        assert_eq!(map.len(), 2500);
        for i in 0..5000u64 {
            assert_eq!(map.get(&i).copied(), (i % 2 == 1).then_some(i * i));
        }
    }

    /// Sends every key to the same probe start so that collisions are
    /// predictable.
    #[derive(Default, Clone)]
    struct Colliding;

    impl KeyHasher<u32> for Colliding {
        fn hash(&self, key: &u32) -> u64 {
            u64::from(*key) & 0x7f
        }
    }

    #[test]
    fn test_insert_relocates_behind_tombstone() {
        let mut map: HashMap<u32, &str, Colliding> = HashMap::new();
        map.insert(1, "one");
        map.insert(2, "two");
        assert_eq!(map.probe_histogram(), [1, 1]);

        map.remove(&1);
        assert_eq!(map.insert(2, "TWO"), Some("two"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&2), Some(&"TWO"));
        assert_eq!(map.probe_histogram(), [1]);

        let stats = map.debug_stats();
        assert_eq!(stats.occupied_slots, 1);
        assert_eq!(stats.tombstones, 1);
    }

    #[test]
    fn test_entry_relocates_behind_tombstone() {
        let mut map: HashMap<u32, i32, Colliding> = HashMap::new();
        for k in 1..=4 {
            map.insert(k, k as i32);
        }
        map.remove(&1);
        map.remove(&2);

        *map.entry(4).or_insert(0) += 100;
        assert_eq!(map.get(&4), Some(&104));
        assert_eq!(map.probe_histogram(), [1, 0, 1]);
    }

    #[test]
    fn test_move_to_same_allocator() {
        let map: SipMap<i32, i32> = (0..30).map(|i| (i, -i)).collect();
        let map = map.move_to(Global);
        assert_eq!(map.len(), 30);
        assert_eq!(map.get(&29), Some(&-29));
    }
}
