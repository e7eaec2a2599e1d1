use core::borrow::Borrow;
use core::hash::BuildHasher;
use core::hash::Hash;

/// Maps a key to the 64-bit hash that drives probing.
///
/// The type parameter is the type being hashed, which may be a borrowed form
/// of the stored key (`str` for a stored `String`). A key and a lookup value
/// that compare equal must produce the same hash.
///
/// Every [`BuildHasher`] is a `KeyHasher` for every [`Hash`] type.
pub trait KeyHasher<Q: ?Sized> {
    /// Hashes `key`. The result must not change while the key is stored.
    fn hash(&self, key: &Q) -> u64;
}

impl<S, Q> KeyHasher<Q> for S
where
    S: BuildHasher,
    Q: Hash + ?Sized,
{
    #[inline]
    fn hash(&self, key: &Q) -> u64 {
        self.hash_one(key)
    }
}

/// Decides whether a stored value matches a lookup key.
///
/// `T` is the stored type and `Q` the lookup type. Implementations must be
/// consistent with the [`KeyHasher`] used alongside them.
pub trait KeyComparator<T: ?Sized, Q: ?Sized = T> {
    /// Returns `true` if `stored` matches `key`.
    fn eq(&self, stored: &T, key: &Q) -> bool;
}

/// Compares through [`Borrow`], which is what makes `String` keys searchable
/// by `&str`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultKeyComparator;

impl<T, Q> KeyComparator<T, Q> for DefaultKeyComparator
where
    T: Borrow<Q> + ?Sized,
    Q: Eq + ?Sized,
{
    #[inline]
    fn eq(&self, stored: &T, key: &Q) -> bool {
        stored.borrow() == key
    }
}
