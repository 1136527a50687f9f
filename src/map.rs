//! An ordered map built on [`Tree`]. Entries are kept as `(key, value)` pairs ordered by key
//! alone.
//!
//! # Examples
//!
//! ```
//! use bstmap::Map;
//!
//! let mut counts: Map<&str, u32> = Map::new();
//!
//! for word in "the cat saw the dog".split_whitespace() {
//!     *counts.get_or_insert_default(word) += 1;
//! }
//!
//! assert_eq!(counts["the"], 2);
//! assert_eq!(counts.get("bird"), None);
//!
//! // Keys come out in ascending order.
//! let words: Vec<_> = counts.keys().copied().collect();
//! assert_eq!(words, ["cat", "dog", "saw", "the"]);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Index;

use crate::tree::{self, Search, Tree};

/// An ordered map from `K` to `V`. Each key is stored once; inserting a key that's already present
/// keeps the original value.
pub struct Map<K, V> {
    tree: Tree<(K, V)>,
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for Map<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<K, V> fmt::Debug for Map<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> PartialEq for Map<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K, V> Eq for Map<K, V>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V> Map<K, V> {
    /// Generate a new, empty `Map`.
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// The number of entries in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// A cursor at the entry with the smallest key, or the end cursor if the map is empty.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor(self.tree.begin())
    }

    /// The end cursor. It points at no entry and compares equal to every other end cursor.
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor(self.tree.end())
    }

    /// An iterator over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter(self.tree.iter())
    }

    /// An iterator over the entries in ascending key order with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut(self.tree.iter_mut())
    }

    /// An iterator over the keys in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// An iterator over the values in ascending key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.iter().map(|(_, value)| value)
    }
}

impl<K, V> Map<K, V>
where
    K: Ord,
{
    /// Inserts the entry unless its key is already present. Returns a cursor at the entry holding
    /// the key and whether the insert happened. An existing value is never replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Map;
    ///
    /// let mut map = Map::new();
    ///
    /// let (cursor, inserted) = map.insert("item", 1);
    /// assert!(inserted);
    /// assert_eq!(cursor.get(), Some((&"item", &1)));
    ///
    /// let (cursor, inserted) = map.insert("item", 2);
    /// assert!(!inserted);
    /// assert_eq!(cursor.get(), Some((&"item", &1)));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Cursor<'_, K, V>, bool) {
        match self.tree.search_by(|(candidate, _)| key.cmp(candidate)) {
            Search::Found(position) => (Cursor(self.tree.cursor_at(position)), false),
            Search::Vacant(vacancy) => {
                let position = self.tree.occupy(vacancy, (key, value));
                (Cursor(self.tree.cursor_at(position)), true)
            }
        }
    }

    /// A cursor at the entry for `key`, or the end cursor if there is none.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.tree.search_by(|(candidate, _)| key.cmp(candidate.borrow())) {
            Search::Found(position) => Cursor(self.tree.cursor_at(position)),
            Search::Vacant(_) => self.end(),
        }
    }

    /// The value stored for `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).get().map(|(_, value)| value)
    }

    /// A mutable reference to the value stored for `key`, if any.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.tree.search_by(|(candidate, _)| key.cmp(candidate.borrow())) {
            Search::Found(position) => Some(&mut self.tree.value_mut_at(position).1),
            Search::Vacant(_) => None,
        }
    }

    /// Whether the map has an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find(key).is_end()
    }

    /// A mutable reference to the value for `key`. When the key is missing, an entry holding
    /// `V::default()` is inserted first.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Map;
    ///
    /// let mut map: Map<String, i32> = Map::new();
    ///
    /// let value = map.get_or_insert_default("item".to_string());
    /// assert_eq!(*value, 0);
    ///
    /// *value = 1;
    /// assert_eq!(*map.get_or_insert_default("item".to_string()), 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let position = match self.tree.search_by(|(candidate, _)| key.cmp(candidate)) {
            Search::Found(position) => position,
            Search::Vacant(vacancy) => self.tree.occupy(vacancy, (key, V::default())),
        };
        &mut self.tree.value_mut_at(position).1
    }

    /// A cursor at the entry with the smallest key strictly greater than `key`, or the end cursor
    /// if there is none.
    pub fn min_greater_than<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor(
            self.tree
                .min_greater_than_by(|(candidate, _)| key.cmp(candidate.borrow())),
        )
    }

    /// Checks that the keys are in strictly ascending order. Values play no part.
    pub fn check_sorting_invariant(&self) -> bool {
        self.tree
            .check_sorting_invariant_by(|(left, _), (right, _)| left.cmp(right))
    }
}

/// Looks up the value for a key that must be present.
///
/// # Panics
///
/// When the key isn't in the map.
impl<K, Q, V> Index<&Q> for Map<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

/// Keeps the first value seen for each key.
impl<K, V> FromIterator<(K, V)> for Map<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// Keeps the value already in the map for keys that are present.
impl<K, V> Extend<(K, V)> for Map<K, V>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut Map<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A position in a [`Map`]: either one of its entries or the end. See [`tree::Cursor`] for how
/// it moves and compares.
pub struct Cursor<'a, K, V>(tree::Cursor<'a, (K, V)>);

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, K, V> Copy for Cursor<'a, K, V> {}

/// An end cursor that isn't attached to any map.
impl<'a, K, V> Default for Cursor<'a, K, V> {
    fn default() -> Self {
        Self(tree::Cursor::default())
    }
}

impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> fmt::Debug for Cursor<'a, K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// The entry under the cursor, or `None` at the end.
    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        self.0.get().map(|(key, value)| (key, value))
    }

    /// Whether the cursor is at the end.
    pub fn is_end(&self) -> bool {
        self.0.is_end()
    }

    /// Moves to the entry with the next larger key and returns it.
    pub fn move_next(&mut self) -> Option<(&'a K, &'a V)> {
        self.0.move_next();
        self.get()
    }

    /// Moves to the entry with the next smaller key and returns it.
    pub fn move_prev(&mut self) -> Option<(&'a K, &'a V)> {
        self.0.move_prev();
        self.get()
    }

    /// Moves to the entry with the next larger key and returns where the cursor was before
    /// moving.
    pub fn step(&mut self) -> Self {
        Self(self.0.step())
    }
}

/// An iterator over the entries of a [`Map`] in ascending key order.
pub struct Iter<'a, K, V>(tree::Iter<'a, (K, V)>);

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(key, value)| (key, value))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// An iterator over the entries of a [`Map`] in ascending key order with mutable values. Keys
/// stay read-only so the order can't be broken.
pub struct IterMut<'a, K, V>(tree::IterMut<'a, (K, V)>);

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, value)| (&*key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(key, value)| (&*key, value))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}
impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}
