use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::Index;

use smallvec::SmallVec;

use crate::raw::{Color, Handle, RawRBTreeMap, Side};

/// An ordered map based on a [red-black tree].
///
/// Given a key type with a [total order], an ordered map stores its entries
/// in key order. That means that keys must be of a type that implements the
/// [`Ord`] trait, such that two keys can always be compared to determine
/// their [`Ordering`]. Examples of keys with a total order are strings with
/// lexicographical order, and numbers with their natural order.
///
/// Lookup, insertion, and removal all take O(log n) time: the red-black
/// coloring rules keep the tree height within 2·log₂(n + 1) of optimal,
/// and every structural change is followed by a bounded fix-up pass of
/// recoloring plus at most a few single rotations.
///
/// Iterators obtained from [`RBTreeMap::iter`], [`RBTreeMap::keys`], and
/// [`RBTreeMap::values`] produce their items in ascending key order and take
/// worst-case logarithmic and amortized constant time per item returned.
/// Each call re-walks the tree from the root, so iteration is freely
/// restartable.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the map. The behavior resulting from such a logic
/// error may include panics or incorrect results but never undefined
/// behavior.
///
/// # Examples
///
/// ```
/// use rubra_tree::RBTreeMap;
///
/// // type inference lets us omit an explicit type signature (which
/// // would be `RBTreeMap<&str, &str>` in this example).
/// let mut movie_reviews = RBTreeMap::new();
///
/// // review some movies.
/// movie_reviews.insert("Office Space",       "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction",       "Masterpiece.");
/// movie_reviews.insert("The Godfather",      "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// // check for a specific one.
/// if !movie_reviews.contains_key("Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.",
///              movie_reviews.len());
/// }
///
/// // oops, this review has a lot of spelling mistakes, let's delete it.
/// movie_reviews.remove("The Blues Brothers");
///
/// // look up the values associated with some keys.
/// let to_find = ["Up!", "Office Space"];
/// for movie in &to_find {
///     match movie_reviews.get(movie) {
///        Some(review) => println!("{movie}: {review}"),
///        None => println!("{movie} is unreviewed.")
///     }
/// }
///
/// // Look up the value for a key (will panic if the key is not found).
/// println!("Movie review: {}", movie_reviews["Office Space"]);
///
/// // iterate over everything.
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// An `RBTreeMap` with a known list of items can be initialized from an
/// array:
///
/// ```
/// use rubra_tree::RBTreeMap;
///
/// let solar_distance = RBTreeMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// assert_eq!(solar_distance.first_key_value(), Some((&"Earth", &1.0)));
/// ```
///
/// # Background
///
/// A red-black tree is a binary search tree in which every node carries one
/// bit of balance bookkeeping: a color, red or black. Three local rules — the
/// root is black, a red node never has a red child, and every root-to-nil
/// path crosses the same number of black nodes — together force the longest
/// path to be at most twice the shortest one, which is all a logarithmic
/// height bound needs.
///
/// The appeal of the scheme is that the rules are cheap to restore. An
/// insertion attaches a red leaf, which can only ever violate the red-red
/// rule; a deletion removes at most one black node from some set of paths.
/// In both cases a single bottom-up pass of recoloring and O(1) rotations
/// repairs the tree, giving strict O(log n) worst-case bounds on every
/// mutation rather than amortized ones.
///
/// Nodes live in a slot arena and refer to each other by index: children are
/// owning links, and each node's parent index is a non-owning back-reference
/// used by the repair passes. This sidesteps the ownership cycle a
/// pointer-based parent link would create, with no reference counting and no
/// unsafe code.
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
pub struct RBTreeMap<K, V> {
    raw: RawRBTreeMap<K, V>,
}

/// A read-only view of one node of an [`RBTreeMap`].
///
/// Obtained from [`RBTreeMap::root`] and navigated with [`left`](Self::left)
/// and [`right`](Self::right). A `NodeRef` borrows the map, so the tree
/// cannot be mutated while any cursor is alive — which is also why a cursor
/// can never observe a node mid-rotation.
///
/// This is sufficient for an external consumer, such as a pretty-printer, to
/// render the entire tree without mutating it:
///
/// ```
/// use rubra_tree::{NodeRef, RBTreeMap};
///
/// fn render(node: NodeRef<'_, i32, &str>, depth: usize, out: &mut String) {
///     if let Some(right) = node.right() {
///         render(right, depth + 1, out);
///     }
///     out.push_str(&format!("{}{:?} {:?}\n", "  ".repeat(depth), node.key(), node.color()));
///     if let Some(left) = node.left() {
///         render(left, depth + 1, out);
///     }
/// }
///
/// let map = RBTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
/// let mut out = String::new();
/// render(map.root().unwrap(), 0, &mut out);
/// assert_eq!(out.lines().count(), 3);
/// ```
pub struct NodeRef<'a, K, V> {
    raw: &'a RawRBTreeMap<K, V>,
    handle: Handle,
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<'a, K, V> NodeRef<'a, K, V> {
    /// Returns the node's key.
    #[must_use]
    pub fn key(self) -> &'a K {
        self.raw.node(self.handle).key()
    }

    /// Returns the node's value.
    #[must_use]
    pub fn value(self) -> &'a V {
        self.raw.node(self.handle).value()
    }

    /// Returns the node's color.
    #[must_use]
    pub fn color(self) -> Color {
        self.raw.node(self.handle).color()
    }

    /// Returns the node's left child, whose keys all compare less than this
    /// node's key.
    #[must_use]
    pub fn left(self) -> Option<NodeRef<'a, K, V>> {
        self.raw.node(self.handle).child(Side::Left).map(|handle| NodeRef { raw: self.raw, handle })
    }

    /// Returns the node's right child, whose keys all compare greater than
    /// this node's key.
    #[must_use]
    pub fn right(self) -> Option<NodeRef<'a, K, V>> {
        self.raw.node(self.handle).child(Side::Right).map(|handle| NodeRef { raw: self.raw, handle })
    }
}

impl<K: fmt::Debug, V> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("color", &self.color())
            .finish_non_exhaustive()
    }
}

/// An iterator over the entries of a `RBTreeMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`RBTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use rubra_tree::RBTreeMap;
///
/// let map = RBTreeMap::from([(2, "b"), (1, "a")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: RBTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawRBTreeMap<K, V>,
    // The left spine of the subtrees still to visit; the next entry is on top.
    stack: SmallVec<[Handle; 16]>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(raw: &'a RawRBTreeMap<K, V>) -> Self {
        let mut iter = Iter {
            raw,
            stack: SmallVec::new(),
            remaining: raw.len(),
        };
        iter.descend(raw.root());
        iter
    }

    /// Pushes the left spine rooted at `from` onto the stack.
    fn descend(&mut self, from: Option<Handle>) {
        let mut current = from;
        while let Some(handle) = current {
            self.stack.push(handle);
            current = self.raw.node(handle).child(Side::Left);
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.stack.pop()?;
        self.remaining -= 1;
        self.descend(self.raw.node(handle).child(Side::Right));
        Some(self.raw.node(handle).entry())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An owning iterator over the entries of a `RBTreeMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`RBTreeMap`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> Default for IntoIter<K, V> {
    fn default() -> Self {
        IntoIter {
            inner: alloc::vec::Vec::new().into_iter(),
        }
    }
}

/// An iterator over the keys of a `RBTreeMap`, in ascending order.
///
/// This `struct` is created by the [`keys`] method on [`RBTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use rubra_tree::RBTreeMap;
///
/// let map = RBTreeMap::from([(2, "b"), (1, "a")]);
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, [1, 2]);
/// ```
///
/// [`keys`]: RBTreeMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
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

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `RBTreeMap`, in ascending key order.
///
/// This `struct` is created by the [`values`] method on [`RBTreeMap`]. See
/// its documentation for more.
///
/// # Examples
///
/// ```
/// use rubra_tree::RBTreeMap;
///
/// let map = RBTreeMap::from([(1, "a"), (2, "b")]);
/// let values: Vec<_> = map.values().copied().collect();
/// assert_eq!(values, ["a", "b"]);
/// ```
///
/// [`values`]: RBTreeMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
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

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> RBTreeMap<K, V> {
    /// Makes a new, empty `RBTreeMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        RBTreeMap {
            raw: RawRBTreeMap::new(),
        }
    }

    /// Creates an empty map with capacity for at least `capacity` elements.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let map: RBTreeMap<i32, i32> = RBTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RBTreeMap {
            raw: RawRBTreeMap::with_capacity(capacity),
        }
    }

    /// Returns the current capacity for the map.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let map: RBTreeMap<i32, i32> = RBTreeMap::with_capacity(32);
    /// assert_eq!(map.capacity(), 32);
    /// ```
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// assert!(a.is_empty());
    /// a.insert(1, "a");
    /// assert!(!a.is_empty());
    /// ```
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a read-only cursor at the root of the tree, or `None` if the
    /// map is empty.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    /// See [`NodeRef`] for navigating the tree shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::{Color, RBTreeMap};
    ///
    /// let map = RBTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
    ///
    /// let root = map.root().unwrap();
    /// assert_eq!(root.color(), Color::Black);
    /// assert_eq!(*root.key(), 2);
    /// assert_eq!(*root.left().unwrap().key(), 1);
    /// assert_eq!(*root.right().unwrap().key(), 3);
    /// ```
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.raw.root().map(|handle| NodeRef { raw: &self.raw, handle })
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(3, "c");
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<i32> = a.keys().copied().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut a = RBTreeMap::new();
    /// a.insert(1, "hello");
    /// a.insert(2, "goodbye");
    ///
    /// let values: Vec<&str> = a.values().copied().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> RBTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the
    /// ordering on the borrowed form *must* match the ordering on the key
    /// type.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get_key_value(&1), Some((&1, &"a")));
    /// assert_eq!(map.get_key_value(&2), None);
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Returns the first key-value pair in the map. The key in this pair is
    /// the minimum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the last key-value pair in the map. The key in this pair is
    /// the maximum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.last_key_value(), Some((&2, &"a")));
    /// ```
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }

    /// Removes and returns the first entry in the map. The key of this entry
    /// is the minimum key that was in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _val)) = map.pop_first() {
    ///     assert!(map.iter().all(|(k, _v)| *k > key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Removes and returns the last entry in the map. The key of this entry
    /// is the maximum key that was in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.pop_last(), Some((2, "b")));
    /// assert_eq!(map.pop_last(), Some((1, "a")));
    /// assert_eq!(map.pop_last(), None);
    /// ```
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    ///
    /// If the map did have this key present, the value is updated in place
    /// and the old value is returned. The key is not updated, and the tree
    /// structure — shape and colors — is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map. Removing a key that is not present is a
    /// no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove_entry(&1), Some((1, "a")));
    /// assert_eq!(map.remove_entry(&1), None);
    /// ```
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }
}

impl<K: Clone, V: Clone> Clone for RBTreeMap<K, V> {
    fn clone(&self) -> Self {
        RBTreeMap {
            raw: self.raw.clone(),
        }
    }
}

impl<K: Hash, V: Hash> Hash for RBTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RBTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for RBTreeMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for RBTreeMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for RBTreeMap<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RBTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for RBTreeMap<K, V> {
    fn default() -> Self {
        RBTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RBTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = RBTreeMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for RBTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for RBTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RBTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for RBTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rubra_tree::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(1, "a"), (2, "b")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        let entries = self.raw.drain_to_vec();
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

impl<K, Q, V> Index<&Q> for RBTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `RBTreeMap`.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for RBTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
