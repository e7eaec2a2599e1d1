use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::DefaultHashBuilder;
use crate::allocator::Allocator;
use crate::allocator::Global;
use crate::hash_table::HashTable;
use crate::hasher::DefaultKeyComparator;
use crate::hasher::KeyComparator;
use crate::hasher::KeyHasher;

#[inline(always)]
pub(crate) fn make_hash<Q: ?Sized, H: KeyHasher<Q>>(hasher: &H, key: &Q) -> u64 {
    hasher.hash(key)
}

#[inline(always)]
pub(crate) fn make_hasher<T, H: KeyHasher<T>>(hasher: &H) -> impl Fn(&T) -> u64 + '_ {
    move |value| hasher.hash(value)
}

#[inline(always)]
fn equivalent_key<'a, T, Q, C>(comparator: &'a C, key: &'a Q) -> impl Fn(&T) -> bool + 'a
where
    Q: ?Sized,
    C: KeyComparator<T, Q>,
{
    move |stored| comparator.eq(stored, key)
}

#[inline(always)]
fn equivalent<T, C: KeyComparator<T>>(comparator: &C) -> impl Fn(&T, &T) -> bool + '_ {
    move |stored, offered| comparator.eq(stored, offered)
}

/// A hash set stored in an open-addressing [`HashTable`].
///
/// `HashSet<T, H, C, A>` hashes values with the [`KeyHasher`] `H` and
/// compares them with the [`KeyComparator`] `C`. Any [`BuildHasher`] works
/// as `H`, and the default comparator goes through [`Borrow`], so a
/// `HashSet<String>` can be queried with a `&str`.
///
/// # Performance Characteristics
///
/// - **Memory**: 1 byte per slot overhead, plus the size of `T`.
/// - Removal leaves a tombstone that is reclaimed when the set next grows.
///
/// References returned by lookups are invalidated by any mutation: growth
/// moves every value, and inserting a value that is already present may move
/// it to an earlier slot.
///
/// [`BuildHasher`]: core::hash::BuildHasher
/// [`Borrow`]: core::borrow::Borrow
#[derive(Clone)]
pub struct HashSet<T, H = DefaultHashBuilder, C = DefaultKeyComparator, A: Allocator = Global> {
    pub(crate) table: HashTable<T, A>,
    pub(crate) hasher: H,
    pub(crate) comparator: C,
}

impl<T, H, C, A> PartialEq for HashSet<T, H, C, A>
where
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, H, C, A> Eq for HashSet<T, H, C, A>
where
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
}

impl<T, H, C, A> Debug for HashSet<T, H, C, A>
where
    T: Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, H, C> HashSet<T, H, C, Global>
where
    H: Default,
    C: Default,
{
    /// Creates an empty set using the default hasher and comparator.
    ///
    /// No memory is allocated until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 0);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty set able to hold at least `capacity` values without
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::with_capacity(100);
    /// assert!(set.max_size() >= 100);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_strategies_in(capacity, H::default(), C::default(), Global)
    }
}

impl<T, H, C> HashSet<T, H, C, Global>
where
    C: Default,
{
    /// Creates an empty set with the given hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32, _> = HashSet::with_hasher(RandomState::new());
    /// set.insert(7);
    /// assert!(set.contains(&7));
    /// # }
    /// ```
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    /// Creates an empty set with the given capacity and hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Self {
        Self::with_strategies_in(capacity, hasher, C::default(), Global)
    }
}

impl<T, H, C, A: Allocator> HashSet<T, H, C, A> {
    /// Creates an empty set from explicit hashing, comparison, and
    /// allocation strategies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use probe_hash::DefaultKeyComparator;
    /// use probe_hash::Global;
    /// use probe_hash::HashSet;
    ///
    /// let set: HashSet<u64, _, _, _> =
    ///     HashSet::with_strategies_in(16, RandomState::new(), DefaultKeyComparator, Global);
    /// assert_eq!(set.capacity(), 32);
    /// # }
    /// ```
    pub fn with_strategies_in(capacity: usize, hasher: H, comparator: C, allocator: A) -> Self {
        Self {
            table: HashTable::with_capacity_in(capacity, allocator),
            hasher,
            comparator,
        }
    }

    /// Returns the number of values in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the set.
    ///
    /// The set grows once it holds [`max_size`](Self::max_size) values, which
    /// is three quarters of this.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of values the set holds before it grows.
    pub fn max_size(&self) -> usize {
        self.table.max_size()
    }

    /// Returns the set's hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the set's comparator.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the set's allocator.
    pub fn allocator(&self) -> &A {
        self.table.allocator()
    }

    /// Removes all values from the set.
    ///
    /// This operation preserves the set's allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// let capacity = set.capacity();
    ///
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), capacity);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all values and frees the set's memory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    ///
    /// set.reset();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 0);
    /// # }
    /// ```
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Returns an iterator over the values of the set in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let mut values: Vec<_> = set.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, vec![1, 2]);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes and yields every value.
    ///
    /// The set keeps its capacity. If the iterator is dropped early, the
    /// remaining values are dropped with it.
    pub fn drain(&mut self) -> Drain<'_, T, A> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = (1..=4).collect();
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains(&2));
    /// assert!(set.contains(&4));
    /// # }
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.table.retain(|v| f(v));
    }
}

impl<T, H, C, A> HashSet<T, H, C, A>
where
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
    /// Reserves room for at least `additional` more values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.reserve(100);
    /// assert!(set.max_size() >= 100);
    /// # }
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional, make_hasher(&self.hasher));
    }

    /// Adds a value to the set.
    ///
    /// Returns `true` if the value was not already present. If it was, the
    /// set keeps one of the two equal values: the stored one, unless it sits
    /// behind a tombstone, in which case the offered value replaces it
    /// there.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert!(set.insert(1));
    /// assert!(!set.insert(1));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = make_hash(&self.hasher, &value);
        self.table.insert(
            hash,
            value,
            equivalent(&self.comparator),
            make_hasher(&self.hasher),
        )
    }

    /// Adds a value, replacing and returning an equal value if one is
    /// present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<String> = HashSet::new();
    /// assert_eq!(set.replace("a".to_string()), None);
    /// assert_eq!(set.replace("a".to_string()), Some("a".to_string()));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = make_hash(&self.hasher, &value);
        self.table.replace(
            hash,
            value,
            equivalent(&self.comparator),
            make_hasher(&self.hasher),
        )
    }

    /// Returns `true` if the set contains a value matching `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<String> = HashSet::new();
    /// set.insert("apple".to_string());
    ///
    /// assert!(set.contains("apple"));
    /// assert!(!set.contains("pear"));
    /// # }
    /// ```
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<T, Q>,
    {
        let hash = make_hash(&self.hasher, key);
        self.table
            .contains(hash, equivalent_key(&self.comparator, key))
    }

    /// Returns a reference to the stored value matching `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(42);
    ///
    /// assert_eq!(set.get(&42), Some(&42));
    /// assert_eq!(set.get(&1), None);
    /// # }
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<T, Q>,
    {
        let hash = make_hash(&self.hasher, key);
        self.table.find(hash, equivalent_key(&self.comparator, key))
    }

    /// Removes the value matching `key`. Returns `true` if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    ///
    /// assert!(set.remove(&1));
    /// assert!(!set.remove(&1));
    /// # }
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<T, Q>,
    {
        self.take(key).is_some()
    }

    /// Removes and returns the value matching `key`.
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
        C: KeyComparator<T, Q>,
    {
        let hash = make_hash(&self.hasher, key);
        self.table
            .remove(hash, equivalent_key(&self.comparator, key))
    }

    /// Moves the set's storage to `allocator`.
    ///
    /// Storage is adopted as-is when `allocator` compares equal to the
    /// current allocator, and copied into a fresh allocation otherwise.
    pub fn move_to(self, allocator: A) -> Self {
        let Self {
            table,
            hasher,
            comparator,
        } = self;
        let table = table.move_to(allocator, make_hasher(&hasher));
        Self {
            table,
            hasher,
            comparator,
        }
    }

    /// Returns `true` if `self` and `other` share no values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<i32> = [4, 5].into_iter().collect();
    /// let c: HashSet<i32> = [3, 4].into_iter().collect();
    ///
    /// assert!(a.is_disjoint(&b));
    /// assert!(!a.is_disjoint(&c));
    /// # }
    /// ```
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|v| !large.contains(v))
    }

    /// Returns `true` if every value of `self` is in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every value of `other` is in `self`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Visits the values in both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3, 4].into_iter().collect();
    ///
    /// let mut both: Vec<_> = a.intersection(&b).copied().collect();
    /// both.sort();
    /// assert_eq!(both, vec![2, 3]);
    /// # }
    /// ```
    pub fn intersection<'a>(&'a self, other: &'a Self) -> Intersection<'a, T, H, C, A> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Intersection {
            iter: small.iter(),
            other: large,
        }
    }

    /// Visits the values in `self` that are not in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3, 4].into_iter().collect();
    ///
    /// let only_a: Vec<_> = a.difference(&b).copied().collect();
    /// assert_eq!(only_a, vec![1]);
    /// # }
    /// ```
    pub fn difference<'a>(&'a self, other: &'a Self) -> Difference<'a, T, H, C, A> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Visits the values in `self` or `other`, each once.
    pub fn union<'a>(&'a self, other: &'a Self) -> Union<'a, T, H, C, A> {
        Union {
            iter: self.iter(),
            rest: other.difference(self),
        }
    }

    /// Visits the values in exactly one of `self` and `other`.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a Self,
    ) -> SymmetricDifference<'a, T, H, C, A> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }

    /// Returns slot usage statistics for the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Returns how far each value sits from its ideal slot. See
    /// [`HashTable::probe_histogram`].
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.probe_histogram(make_hasher(&self.hasher))
    }
}

impl<T, H, C> Default for HashSet<T, H, C, Global>
where
    H: Default,
    C: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T, A: Allocator = Global> {
    inner: crate::hash_table::Drain<'a, T, A>,
}

impl<T, A: Allocator> Iterator for Drain<'_, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, A: Allocator> ExactSizeIterator for Drain<'_, T, A> {}

/// A consuming iterator over the values of a `HashSet`.
pub struct IntoIter<T, A: Allocator = Global> {
    inner: crate::hash_table::IntoIter<T, A>,
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, H, C, A: Allocator> IntoIterator for HashSet<T, H, C, A> {
    type IntoIter = IntoIter<T, A>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, H, C, A: Allocator> IntoIterator for &'a HashSet<T, H, C, A> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, H, C> FromIterator<T> for HashSet<T, H, C, Global>
where
    H: KeyHasher<T> + Default,
    C: KeyComparator<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashSet::new();
        set.extend(iter);
        set
    }
}

impl<T, H, C, A> Extend<T> for HashSet<T, H, C, A>
where
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, H, C, A> Extend<&'a T> for HashSet<T, H, C, A>
where
    T: Copy + 'a,
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, H, C, A: Allocator = Global> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, H, C, A>,
}

impl<'a, T, H, C, A> Iterator for Intersection<'a, T, H, C, A>
where
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, H, C, A: Allocator = Global> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, H, C, A>,
}

impl<'a, T, H, C, A> Iterator for Difference<'a, T, H, C, A>
where
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, T, H, C, A: Allocator = Global> {
    iter: Iter<'a, T>,
    rest: Difference<'a, T, H, C, A>,
}

impl<'a, T, H, C, A> Iterator for Union<'a, T, H, C, A>
where
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().or_else(|| self.rest.next())
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, H, C, A: Allocator = Global> {
    iter: core::iter::Chain<Difference<'a, T, H, C, A>, Difference<'a, T, H, C, A>>,
}

impl<'a, T, H, C, A> Iterator for SymmetricDifference<'a, T, H, C, A>
where
    H: KeyHasher<T>,
    C: KeyComparator<T>,
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::cell::Cell;
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

    type SipSet<T> = HashSet<T, SipHashBuilder>;

    #[test]
    fn test_new_and_with_hasher() {
        let set: SipSet<i32> = HashSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.capacity(), 0);

        let set2: SipSet<i32> = HashSet::with_hasher(SipHashBuilder::default());
        assert!(set2.is_empty());
    }

    #[test]
    fn test_with_capacity() {
        let set: SipSet<i32> = HashSet::with_capacity(100);
        assert!(set.max_size() >= 100);
        assert!(set.is_empty());

        let set2: SipSet<i32> = HashSet::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(set2.max_size() >= 200);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set: SipSet<i32> = HashSet::new();

        assert!(set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&1));

        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);

        assert!(set.insert(2));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_empty_set() {
        let mut set: SipSet<String> = HashSet::new();
        assert!(!set.contains("anything"));
        assert_eq!(set.get("anything"), None);
        assert!(!set.remove("anything"));
        assert_eq!(set.iter().count(), 0);
        assert_eq!(set.capacity(), 0);
    }

    #[test]
    fn test_remove_and_take() {
        let mut set: SipSet<i32> = HashSet::new();
        set.insert(1);
        set.insert(2);
        set.insert(3);

        assert!(set.remove(&2));
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&2));
        assert!(!set.remove(&2));
        assert!(!set.remove(&4));

        assert_eq!(set.take(&1), Some(1));
        assert_eq!(set.take(&1), None);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&3));
    }

    #[test]
    fn test_string_values() {
        let mut set: SipSet<String> = HashSet::new();
        assert!(set.insert("hello".to_string()));
        assert!(set.insert("world".to_string()));
        assert!(!set.insert("hello".to_string()));

        assert!(set.contains("hello"));
        let world = String::from("world");
        assert!(set.contains(&world));
        assert_eq!(set.get("world").map(String::as_str), Some("world"));
        assert!(!set.contains("foo"));

        assert!(set.remove("hello"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_replace() {
        let mut set: SipSet<String> = HashSet::new();
        assert_eq!(set.replace("x".to_string()), None);
        assert_eq!(set.replace("x".to_string()), Some("x".to_string()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_three_thousand_ints() {
        let mut set: SipSet<i32> = HashSet::new();
        for i in 0..3000 {
            assert!(set.insert(i));
        }
        assert_eq!(set.len(), 3000);
        assert_eq!(set.capacity(), 4096);

        for i in -100..4000 {
            assert_eq!(set.contains(&i), (0..3000).contains(&i), "{}", i);
        }
    }

    #[test]
    fn test_clear_and_reset() {
        let mut set: SipSet<i32> = HashSet::new();
        set.extend([1, 2, 3]);

        let capacity = set.capacity();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), capacity);
        assert!(!set.contains(&1));

        set.insert(4);
        set.reset();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 0);

        set.insert(5);
        assert!(set.contains(&5));
    }

    #[test]
    fn test_reserve() {
        let mut set: SipSet<i32> = HashSet::new();
        set.reserve(1000);
        let capacity = set.capacity();
        assert!(set.max_size() >= 1000);

        for i in 0..1000 {
            set.insert(i);
        }
        assert_eq!(set.capacity(), capacity);
    }

    #[test]
    fn test_iter_and_into_iter() {
        let mut set: SipSet<i32> = HashSet::new();
        set.extend([1, 2, 3].iter());

        let mut values: Vec<_> = set.iter().copied().collect();
        values.sort();
        assert_eq!(values, [1, 2, 3]);
        assert_eq!(set.iter().len(), 3);

        let mut count = 0;
        for _ in &set {
            count += 1;
        }
        assert_eq!(count, 3);

        let mut owned: Vec<_> = set.into_iter().collect();
        owned.sort();
        assert_eq!(owned, [1, 2, 3]);
    }

    #[test]
    fn test_drain() {
        let mut set: SipSet<i32> = HashSet::new();
        set.extend(0..10);

        let mut drained: Vec<_> = set.drain().collect();
        drained.sort();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert!(set.is_empty());

        set.insert(11);
        assert!(set.contains(&11));
    }

    #[test]
    fn test_retain() {
        let mut set: SipSet<i32> = (0..100).collect();
        set.retain(|&x| x % 3 == 0);
        assert_eq!(set.len(), 34);
        for i in 0..100 {
            assert_eq!(set.contains(&i), i % 3 == 0);
        }
    }

    #[test]
    fn test_insert_remove_cycle() {
        let mut set: SipSet<i32> = HashSet::new();
        set.extend(0..6);
        let capacity = set.capacity();

        for round in 0..50 {
            for i in 0..6 {
                assert!(set.remove(&(round * 6 + i)));
            }
            for i in 0..6 {
                assert!(set.insert((round + 1) * 6 + i));
            }
        }

        // Churn below the load limit never inflates the table.
        assert_eq!(set.len(), 6);
        assert!(set.capacity() <= capacity * 2);
        for i in 300..306 {
            assert!(set.contains(&i));
        }
    }

    #[test]
    fn test_eq_and_debug() {
        let a: SipSet<i32> = [1, 2, 3].into_iter().collect();
        let mut b: SipSet<i32> = [3, 2].into_iter().collect();
        assert_ne!(a, b);
        b.insert(1);
        assert_eq!(a, b);

        let single: SipSet<i32> = [5].into_iter().collect();
        assert_eq!(alloc::format!("{:?}", single), "{5}");
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original: SipSet<String> = HashSet::new();
        original.insert("a".to_string());
        original.insert("b".to_string());

        let cloned = original.clone();
        original.remove("a");

        assert!(cloned.contains("a"));
        assert!(cloned.contains("b"));
        assert_eq!(cloned.len(), 2);
    }

    #[test]
    fn test_move_to_same_allocator() {
        let set: SipSet<i32> = (0..20).collect();
        let set = set.move_to(Global);
        assert_eq!(set.len(), 20);
        for i in 0..20 {
            assert!(set.contains(&i));
        }
    }

    #[test]
    fn test_is_disjoint() {
        let a: SipSet<i32> = [1, 2, 3].into_iter().collect();
        let b: SipSet<i32> = [4, 5, 6].into_iter().collect();
        let c: SipSet<i32> = [3, 4, 5].into_iter().collect();

        assert!(a.is_disjoint(&b));
        assert!(!a.is_disjoint(&c));
        assert!(a.is_disjoint(&SipSet::new()));
    }

    #[test]
    fn test_subset_superset() {
        let a: SipSet<i32> = [1, 2].into_iter().collect();
        let b: SipSet<i32> = [1, 2, 3].into_iter().collect();

        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(b.is_superset(&a));
        assert!(!a.is_superset(&b));
        assert!(a.is_subset(&a));
    }

    #[test]
    fn test_set_operations() {
        let a: SipSet<i32> = [1, 2, 3, 4].into_iter().collect();
        let b: SipSet<i32> = [3, 4, 5].into_iter().collect();

        let mut both: Vec<_> = a.intersection(&b).copied().collect();
        both.sort();
        assert_eq!(both, [3, 4]);

        let mut only_a: Vec<_> = a.difference(&b).copied().collect();
        only_a.sort();
        assert_eq!(only_a, [1, 2]);

        let mut all: Vec<_> = a.union(&b).copied().collect();
        all.sort();
        assert_eq!(all, [1, 2, 3, 4, 5]);

        let mut either: Vec<_> = a.symmetric_difference(&b).copied().collect();
        either.sort();
        assert_eq!(either, [1, 2, 5]);
    }

    /// A value that counts its drops and is looked up by `id` alone.
    struct Tracked {
        id: i32,
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn mix(id: i32) -> u64 {
        (id as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }

    #[derive(Default)]
    struct IdHasher;

    impl KeyHasher<Tracked> for IdHasher {
        fn hash(&self, key: &Tracked) -> u64 {
            mix(key.id)
        }
    }

    impl KeyHasher<i32> for IdHasher {
        fn hash(&self, key: &i32) -> u64 {
            mix(*key)
        }
    }

    #[derive(Default)]
    struct IdComparator;

    impl KeyComparator<Tracked> for IdComparator {
        fn eq(&self, stored: &Tracked, key: &Tracked) -> bool {
            stored.id == key.id
        }
    }

    impl KeyComparator<Tracked, i32> for IdComparator {
        fn eq(&self, stored: &Tracked, key: &i32) -> bool {
            stored.id == *key
        }
    }

    #[test]
    fn test_custom_strategies_and_drops() {
        let drops = Rc::new(Cell::new(0));
        let tracked = |id| Tracked {
            id,
            drops: drops.clone(),
        };

        {
            let mut set: HashSet<Tracked, IdHasher, IdComparator> = HashSet::new();
            for id in 0..100 {
                assert!(set.insert(tracked(id)));
            }
            assert_eq!(drops.get(), 0);

            // Rejected duplicates are dropped immediately.
            assert!(!set.insert(tracked(5)));
            assert_eq!(drops.get(), 1);
            assert_eq!(set.len(), 100);

            assert!(set.contains(&42));
            assert!(!set.contains(&100));
            assert_eq!(set.get(&7).map(|t| t.id), Some(7));

            assert!(set.remove(&42));
            assert_eq!(drops.get(), 2);
            assert!(!set.remove(&42));
            assert_eq!(drops.get(), 2);

            let taken = set.take(&8).expect("8 is present");
            assert_eq!(taken.id, 8);
            assert_eq!(drops.get(), 2);
            drop(taken);
            assert_eq!(drops.get(), 3);

            assert_eq!(set.len(), 98);
        }

        assert_eq!(drops.get(), 101);
    }

    #[test]
    fn test_growth_clears_tombstones() {
        let mut set: SipSet<i32> = HashSet::new();
        set.extend(0..20);
        for i in 0..10 {
            set.remove(&i);
        }
        assert_eq!(set.debug_stats().tombstones, 10);

        let capacity = set.capacity();
        let mut next = 100;
        while set.capacity() == capacity {
            set.insert(next);
            next += 1;
        }

        assert_eq!(set.debug_stats().tombstones, 0);
        assert_eq!(set.probe_histogram().iter().sum::<usize>(), set.len());
        for i in 10..20 {
            assert!(set.contains(&i));
        }
    }
}
