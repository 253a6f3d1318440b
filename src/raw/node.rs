use super::arena::Handle;

/// The color of a tree node.
///
/// Absent children (nil positions) count as [`Color::Black`] everywhere the
/// balancing rules consult a color.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// Which side of a parent a child hangs off.
///
/// Every mirror-image pair of fix-up cases is written once and parameterized
/// by side; `opposite()` selects the reflected link or rotation direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// One stored entry plus its tree structure.
///
/// Children are owned links: freeing a subtree frees every handle reachable
/// through `children`. The parent link is a non-owning back-reference used
/// only for upward walks during fix-up, and must always agree with the
/// parent's child slot.
#[derive(Clone)]
pub(crate) struct RBNode<K, V> {
    key: K,
    value: V,
    color: Color,
    parent: Option<Handle>,
    children: [Option<Handle>; 2],
}

impl<K, V> RBNode<K, V> {
    /// Creates a detached node. New nodes start red: attaching a red leaf
    /// never changes black heights, so only the red-red rule can need repair.
    pub(crate) const fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent: None,
            children: [None, None],
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) const fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) const fn entry(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    /// Consumes the node, yielding its payload.
    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Replaces the payload in place, returning the previous one. Used when a
    /// deletion moves a surviving entry into a structurally retained node.
    pub(crate) fn replace_entry(&mut self, key: K, value: V) -> (K, V) {
        let old_key = core::mem::replace(&mut self.key, key);
        let old_value = core::mem::replace(&mut self.value, value);
        (old_key, old_value)
    }

    #[inline]
    pub(crate) const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) const fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) const fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        self.children[side.index()]
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, side: Side, child: Option<Handle>) {
        self.children[side.index()] = child;
    }

    /// Returns the node's sole child link, if it has at most one.
    ///
    /// Returns `None` for a leaf; callers must not use this on a node with
    /// two children.
    pub(crate) const fn lone_child(&self) -> Option<(Side, Handle)> {
        match self.children {
            [Some(child), None] => Some((Side::Left, child)),
            [None, Some(child)] => Some((Side::Right, child)),
            _ => None,
        }
    }

    pub(crate) const fn is_leaf(&self) -> bool {
        self.children[0].is_none() && self.children[1].is_none()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn new_nodes_are_red_and_detached() {
        let node: RBNode<i32, &str> = RBNode::new(1, "one");
        assert_eq!(node.color(), Color::Red);
        assert!(node.parent().is_none());
        assert!(node.is_leaf());
        assert!(node.lone_child().is_none());
    }

    #[test]
    fn side_reflection() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
        assert_eq!(Side::Left.opposite().opposite(), Side::Left);
    }

    #[test]
    fn lone_child_identifies_side() {
        let mut node: RBNode<i32, ()> = RBNode::new(5, ());
        let child = Handle::from_index(7);

        node.set_child(Side::Right, Some(child));
        assert_eq!(node.lone_child(), Some((Side::Right, child)));

        node.set_child(Side::Left, Some(Handle::from_index(3)));
        assert_eq!(node.lone_child(), None);
    }

    #[test]
    fn replace_entry_returns_previous_payload() {
        let mut node = RBNode::new(1, "old");
        let (k, v) = node.replace_entry(1, "new");
        assert_eq!((k, v), (1, "old"));
        assert_eq!(*node.value(), "new");
    }
}
