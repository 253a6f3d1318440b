use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;

use super::arena::{Arena, Handle};
use super::node::{Color, RBNode, Side};

/// The core red-black tree implementation backing `RBTreeMap`.
///
/// Structure lives entirely in the arena: children are owned handles, parent
/// links are non-owning back-references, and the tree itself holds only the
/// root handle. Both fix-up passes are iterative bottom-up walks, so no
/// operation recurses deeper than the audit used in tests.
#[derive(Clone)]
pub(crate) struct RawRBTreeMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<RBNode<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
}

impl<K, V> RawRBTreeMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Creates a new tree with the specified capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the capacity of the tree.
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the root handle, if any.
    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns a reference to a node by handle.
    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &RBNode<K, V> {
        self.nodes.get(handle)
    }

    /// Returns a mutable reference to a node by handle.
    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut RBNode<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Nil positions count as black.
    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.nodes.get(h).color() == Color::Red)
    }

    /// Returns which child slot of `parent` holds `child`.
    fn side_of(&self, parent: Handle, child: Handle) -> Side {
        if self.node(parent).child(Side::Left) == Some(child) {
            Side::Left
        } else {
            debug_assert_eq!(self.node(parent).child(Side::Right), Some(child));
            Side::Right
        }
    }

    /// Walks to the extreme (leftmost or rightmost) node of a subtree.
    fn extreme(&self, from: Handle, side: Side) -> Handle {
        let mut current = from;
        while let Some(next) = self.node(current).child(side) {
            current = next;
        }
        current
    }

    /// Rotates the subtree rooted at `node` in direction `dir`.
    ///
    /// The child opposite `dir` becomes the new subtree root and `node`
    /// descends to its `dir` side; the pivot's inner subtree crosses over to
    /// `node`. O(1): only the three involved nodes, the old parent's child
    /// slot, and possibly the root handle are touched. In-order key sequence
    /// is preserved exactly.
    fn rotate(&mut self, node: Handle, dir: Side) {
        let pivot = self
            .node(node)
            .child(dir.opposite())
            .expect("`rotate()` requires a child opposite the rotation direction");

        // Inner subtree crosses over.
        let inner = self.node(pivot).child(dir);
        self.node_mut(node).set_child(dir.opposite(), inner);
        if let Some(inner) = inner {
            self.node_mut(inner).set_parent(Some(node));
        }

        // The pivot takes over `node`'s slot in its parent, or the root.
        let parent = self.node(node).parent();
        self.node_mut(pivot).set_parent(parent);
        match parent {
            Some(parent) => {
                let side = self.side_of(parent, node);
                self.node_mut(parent).set_child(side, Some(pivot));
            }
            None => self.root = Some(pivot),
        }

        // `node` descends below the pivot.
        self.node_mut(pivot).set_child(dir, Some(node));
        self.node_mut(node).set_parent(Some(pivot));
    }

    /// Drains all key-value pairs in ascending key order, leaving the tree
    /// empty. O(n), no rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut result = Vec::with_capacity(self.len);
        let mut stack: Vec<Handle> = Vec::new();
        let mut current = self.root;

        // In-order walk, moving each payload out as its node is visited.
        while current.is_some() || !stack.is_empty() {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.node(handle).child(Side::Left);
            }
            let handle = stack.pop().expect("loop condition guarantees a frame");
            current = self.node(handle).child(Side::Right);
            result.push(self.nodes.take(handle).into_entry());
        }

        self.nodes.clear();
        self.root = None;
        self.len = 0;

        result
    }
}

impl<K: Ord, V> RawRBTreeMap<K, V> {
    /// Binary-search walk from the root. No side effects.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.node(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => current = node.child(Side::Left),
                Ordering::Greater => current = node.child(Side::Right),
            }
        }

        None
    }

    /// Returns a reference to the value corresponding to the key.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|handle| self.node(handle).value())
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.node_mut(handle).value_mut())
    }

    /// Returns the key-value pair corresponding to the key.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|handle| self.node(handle).entry())
    }

    /// Returns true if the tree contains the specified key.
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Returns the entry with the smallest key.
    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let root = self.root?;
        Some(self.node(self.extreme(root, Side::Left)).entry())
    }

    /// Returns the entry with the largest key.
    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let root = self.root?;
        Some(self.node(self.extreme(root, Side::Right)).entry())
    }

    /// Removes and returns the entry with the smallest key.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        // The minimum has no left child, so it can be excised directly.
        let target = self.extreme(root, Side::Left);
        let payload = self.excise(target);
        self.len -= 1;

        #[cfg(debug_assertions)]
        self.check_invariants();

        Some(payload)
    }

    /// Removes and returns the entry with the largest key.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        let target = self.extreme(root, Side::Right);
        let payload = self.excise(target);
        self.len -= 1;

        #[cfg(debug_assertions)]
        self.check_invariants();

        Some(payload)
    }

    /// Inserts a key-value pair into the tree.
    /// Returns the old value if the key was already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Some(root) = self.root else {
            // First insertion: a lone black root satisfies every invariant.
            let mut node = RBNode::new(key, value);
            node.set_color(Color::Black);
            self.root = Some(self.nodes.alloc(node));
            self.len = 1;
            return None;
        };

        // Binary-search walk to the insertion parent, or an equal key.
        let mut current = root;
        let (parent, side) = loop {
            match key.cmp(self.node(current).key()) {
                Ordering::Equal => {
                    // Duplicate key: overwrite in place, no structural change.
                    let old = core::mem::replace(self.node_mut(current).value_mut(), value);
                    return Some(old);
                }
                Ordering::Less => match self.node(current).child(Side::Left) {
                    Some(child) => current = child,
                    None => break (current, Side::Left),
                },
                Ordering::Greater => match self.node(current).child(Side::Right) {
                    Some(child) => current = child,
                    None => break (current, Side::Right),
                },
            }
        };

        let mut node = RBNode::new(key, value);
        node.set_parent(Some(parent));
        let handle = self.nodes.alloc(node);
        self.node_mut(parent).set_child(side, Some(handle));
        self.len += 1;

        self.insert_fixup(handle);

        #[cfg(debug_assertions)]
        self.check_invariants();

        None
    }

    /// Restores the red-black invariants after attaching the red leaf `node`.
    ///
    /// Iterative bottom-up walk. The only violation that can exist on entry
    /// is a red node with a red parent; each round either resolves it locally
    /// with at most two rotations or pushes it two levels up.
    fn insert_fixup(&mut self, mut node: Handle) {
        while let Some(parent) = self.node(node).parent() {
            if self.node(parent).color() == Color::Black {
                break;
            }

            // The root is black, so a red parent has a parent of its own.
            let grandparent = self.node(parent).parent().expect("a red node cannot be the root");
            let side = self.side_of(grandparent, parent);

            let uncle = self.node(grandparent).child(side.opposite());
            if self.is_red(uncle) {
                // Double red: pull the grandparent's blackness down onto
                // parent and uncle, then re-examine from the grandparent.
                let uncle = uncle.expect("red uncle is present");
                self.node_mut(parent).set_color(Color::Black);
                self.node_mut(uncle).set_color(Color::Black);
                self.node_mut(grandparent).set_color(Color::Red);
                node = grandparent;
                continue;
            }

            // Black or absent uncle. An inner grandchild first rotates out to
            // the straight-line configuration.
            let node = if self.side_of(parent, node) == side {
                node
            } else {
                self.rotate(parent, side);
                parent
            };

            // Straight line: recolor, rotate the grandparent, done.
            let parent = self.node(node).parent().expect("rotation preserved the parent link");
            self.node_mut(parent).set_color(Color::Black);
            self.node_mut(grandparent).set_color(Color::Red);
            self.rotate(grandparent, side.opposite());
            break;
        }

        let root = self.root.expect("`insert_fixup()` requires a non-empty tree");
        self.node_mut(root).set_color(Color::Black);
    }

    /// Removes a key from the tree and returns the value.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the tree and returns the key-value pair.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let found = self.search(key)?;

        // A node with two children trades payloads with its in-order
        // predecessor (rightmost of the left subtree), which has at most one
        // child and can be excised directly.
        let target = match self.node(found).child(Side::Left) {
            Some(left) if self.node(found).child(Side::Right).is_some() => self.extreme(left, Side::Right),
            _ => found,
        };

        let payload = self.excise(target);
        self.len -= 1;

        let removed = if target == found {
            payload
        } else {
            // The predecessor's entry moves into the retained node; the
            // retained node's own payload is what leaves the map.
            self.node_mut(found).replace_entry(payload.0, payload.1)
        };

        #[cfg(debug_assertions)]
        self.check_invariants();

        Some(removed)
    }

    /// Detaches a node with at most one child, restores the balance
    /// invariants, and returns the detached payload.
    fn excise(&mut self, target: Handle) -> (K, V) {
        if let Some((side, child)) = self.node(target).lone_child() {
            // A node with a lone child is black with a red leaf child; the
            // child's entry moves up and black heights are untouched.
            debug_assert_eq!(self.node(target).color(), Color::Black);
            debug_assert_eq!(self.node(child).color(), Color::Red);
            debug_assert!(self.node(child).is_leaf());

            self.node_mut(target).set_child(side, None);
            let (key, value) = self.nodes.take(child).into_entry();
            return self.node_mut(target).replace_entry(key, value);
        }

        let Some(parent) = self.node(target).parent() else {
            // Sole remaining node.
            self.root = None;
            return self.nodes.take(target).into_entry();
        };

        let side = self.side_of(parent, target);
        self.node_mut(parent).set_child(side, None);
        let node = self.nodes.take(target);

        if node.color() == Color::Black {
            // Unhooking a black leaf shortens every path through it.
            self.remove_fixup(parent, side);
        }

        node.into_entry()
    }

    /// Restores black-height balance after a black node vanished from the
    /// `side` child slot of `parent`.
    ///
    /// Iterative bottom-up walk over the vacated (parent, side) context. The
    /// red-far-nephew case is checked before the near-nephew case: it settles
    /// the deficit in one rotation, while the near case only manufactures a
    /// far-red configuration.
    fn remove_fixup(&mut self, mut parent: Handle, mut side: Side) {
        loop {
            let sibling = self
                .node(parent)
                .child(side.opposite())
                .expect("a black-height deficit implies a sibling");

            if self.node(sibling).color() == Color::Red {
                // Red sibling: rotate it above the parent, exposing a black
                // sibling for the next round. The deficit stays put.
                self.node_mut(parent).set_color(Color::Red);
                self.node_mut(sibling).set_color(Color::Black);
                self.rotate(parent, side);
                continue;
            }

            let far = self.node(sibling).child(side.opposite());
            if self.is_red(far) {
                // Red far nephew: one rotation settles the deficit. The
                // sibling inherits the parent's color; parent and nephew
                // turn black.
                let far = far.expect("far nephew is red");
                let parent_color = self.node(parent).color();
                self.node_mut(sibling).set_color(parent_color);
                self.node_mut(parent).set_color(Color::Black);
                self.node_mut(far).set_color(Color::Black);
                self.rotate(parent, side);
                return;
            }

            let near = self.node(sibling).child(side);
            if self.is_red(near) {
                // Red near nephew only: rotate it over the sibling to
                // manufacture a red far nephew.
                let near = near.expect("near nephew is red");
                self.node_mut(sibling).set_color(Color::Red);
                self.node_mut(near).set_color(Color::Black);
                self.rotate(sibling, side.opposite());
                continue;
            }

            // Both nephews black: give up one black level on the sibling
            // side, equalizing the subtrees below `parent`.
            self.node_mut(sibling).set_color(Color::Red);

            if self.node(parent).color() == Color::Red {
                // A red parent absorbs the deficit.
                self.node_mut(parent).set_color(Color::Black);
                return;
            }

            match self.node(parent).parent() {
                // At the root the deficit applies to every path uniformly;
                // the tree is balanced again (one level shorter in black).
                None => return,
                Some(grandparent) => {
                    side = self.side_of(grandparent, parent);
                    parent = grandparent;
                }
            }
        }
    }

    /// Asserts every structural invariant of the tree. Compiled only for
    /// tests and debug builds; a release build carries no audit cost.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn check_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "an empty tree must have len 0");
            return;
        };

        assert!(self.node(root).parent().is_none(), "the root must not have a parent");
        assert_eq!(self.node(root).color(), Color::Black, "the root must be black");

        let (count, _) = self.audit(root, None, None);
        assert_eq!(count, self.len, "reachable node count must match len");
    }

    /// Audits one subtree: link integrity, the red-red rule, key bounds, and
    /// uniform black height. Returns (node count, black height).
    #[cfg(any(test, debug_assertions))]
    fn audit(&self, handle: Handle, min: Option<&K>, max: Option<&K>) -> (usize, usize) {
        let node = self.node(handle);

        if let Some(min) = min {
            assert!(node.key() > min, "keys right of an ancestor must compare greater");
        }
        if let Some(max) = max {
            assert!(node.key() < max, "keys left of an ancestor must compare lesser");
        }

        let mut count = 1;
        let mut heights = [0usize; 2];

        for (i, side) in [Side::Left, Side::Right].into_iter().enumerate() {
            if let Some(child) = node.child(side) {
                assert_eq!(
                    self.node(child).parent(),
                    Some(handle),
                    "a child's parent link must point back at its parent"
                );
                if node.color() == Color::Red {
                    assert_eq!(self.node(child).color(), Color::Black, "a red node cannot have a red child");
                }

                let (child_min, child_max) = match side {
                    Side::Left => (min, Some(node.key())),
                    Side::Right => (Some(node.key()), max),
                };
                let (child_count, child_height) = self.audit(child, child_min, child_max);
                count += child_count;
                heights[i] = child_height;
            }
        }

        assert_eq!(heights[0], heights[1], "black heights must agree across both children");

        (count, heights[0] + usize::from(node.color() == Color::Black))
    }
}
