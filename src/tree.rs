//! An unbalanced BST whose nodes keep a pointer to their parent. The parent pointer lets a cursor
//! walk the tree in order without carrying a stack around.
//!
//! # Examples
//!
//! ```
//! use bstmap::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.find(&1), tree.end());
//!
//! tree.insert(2);
//! tree.insert(1);
//! tree.insert(3);
//! assert_eq!(tree.find(&1).get(), Some(&1));
//!
//! // Inserting a value that's already present does nothing.
//! assert!(!tree.insert(3));
//! assert_eq!(tree.len(), 3);
//!
//! // Cursors walk the values in ascending order.
//! let mut cursor = tree.begin();
//! assert_eq!(cursor.get(), Some(&1));
//! assert_eq!(cursor.move_next(), Some(&2));
//! assert_eq!(cursor.move_next(), Some(&3));
//! assert_eq!(cursor.move_next(), None);
//! assert!(cursor.is_end());
//!
//! assert_eq!(tree.to_string(), "[ 1 2 3 ]");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// A Binary Search Tree holding unique values. It never rebalances so its shape depends entirely
/// on the order of insertion.
pub struct Tree<T> {
    // This is a `Link` instead of an `Option<Box<Node>>` so that it can be moved around with the
    // `Tree` without the children's parent pointers breaking.
    root: Link<T>,
    len: usize,
    marker: PhantomData<Box<Node<T>>>,
}

// SAFETY: A `Tree` owns its nodes exclusively and only hands out references to them through
// borrows of the `Tree` itself, just like a `Box<T>` would.
unsafe impl<T: Send> Send for Tree<T> {}
// SAFETY: See above. `&Tree` only gives out `&T`.
unsafe impl<T: Sync> Sync for Tree<T> {}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        let mut pending: Vec<NonNull<Node<T>>> = self.root.0.take().into_iter().collect();
        while let Some(node) = pending.pop() {
            // SAFETY: Every node was allocated with `Box::new` in `Node::new_leaked` and is owned
            // by exactly one link, which we are walking for the last time. The parent pointers
            // are never followed here so nothing is freed twice.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            pending.extend(node.left.0);
            pending.extend(node.right.0);
        }
    }
}

impl<T> Clone for Tree<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        let mut tree = Self::new();
        let Some(root) = self.root.0 else {
            return tree;
        };

        // SAFETY: `root` is alive for as long as `self` is borrowed.
        let new_root = Node::new_leaked(unsafe { (*root.as_ptr()).value.clone() }, Link(None));
        tree.root = Link(Some(new_root));

        // Pairs of (source node, its copy) whose children haven't been copied yet. Each copy is
        // linked into `tree` as soon as it's allocated so a panicking `T::clone` just drops the
        // partial tree.
        let mut pending = vec![(root, new_root)];
        while let Some((source, copy)) = pending.pop() {
            // SAFETY: `source` belongs to `self`, `copy` belongs to `tree`, and both are alive.
            // Only the fields are touched so no reference to a whole node is created.
            unsafe {
                if let Some(left) = (*source.as_ptr()).left.0 {
                    let new_left = Node::new_leaked((*left.as_ptr()).value.clone(), Link(Some(copy)));
                    (*copy.as_ptr()).left = Link(Some(new_left));
                    pending.push((left, new_left));
                }
                if let Some(right) = (*source.as_ptr()).right.0 {
                    let new_right =
                        Node::new_leaked((*right.as_ptr()).value.clone(), Link(Some(copy)));
                    (*copy.as_ptr()).right = Link(Some(new_right));
                    pending.push((right, new_right));
                }
            }
        }

        tree.len = self.len;
        tree
    }

    fn clone_from(&mut self, source: &Self) {
        // The old nodes are only released once the whole copy exists.
        *self = source.clone();
    }
}

impl<T> fmt::Debug for Tree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Writes the values in ascending order, e.g. `[ 1 2 3 ]`.
impl<T> fmt::Display for Tree<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[ ")?;
        for value in self {
            write!(f, "{} ", value)?;
        }
        f.write_str("]")
    }
}

impl<T> PartialEq for Tree<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T> Eq for Tree<T> where T: Eq {}

impl<T> Tree<T> {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: Link(None),
            len: 0,
            marker: PhantomData,
        }
    }

    /// The number of values in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of nodes on the longest path from the root to a leaf. An empty tree has a
    /// height of 0 and a lone root has a height of 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert_eq!(tree.height(), 0);
    ///
    /// tree.insert(1);
    /// tree.insert(2);
    /// assert_eq!(tree.height(), 2);
    /// ```
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending: Vec<_> = self.root.0.map(|root| (root, 1)).into_iter().collect();
        while let Some((node, depth)) = pending.pop() {
            height = height.max(depth);
            // SAFETY: `node` is alive for as long as `self` is borrowed.
            let (left, right) = unsafe { (Node::left(node), Node::right(node)) };
            pending.extend(left.0.map(|left| (left, depth + 1)));
            pending.extend(right.0.map(|right| (right, depth + 1)));
        }
        height
    }

    /// A cursor at the smallest value, or the end cursor if the tree is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        // SAFETY: The root and its descendants are alive for as long as `self` is borrowed.
        self.cursor(unsafe { self.root.leftmost() })
    }

    /// The end cursor. It points at no value and compares equal to every other end cursor.
    pub fn end(&self) -> Cursor<'_, T> {
        self.cursor(Link(None))
    }

    /// Like [`Tree::begin`] but allows the values to be changed through the cursor.
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        // SAFETY: The root and its descendants are alive for as long as `self` is borrowed.
        let current = unsafe { self.root.leftmost() };
        self.cursor_mut(current)
    }

    /// A cursor at the smallest value. On an empty tree this is the end cursor.
    pub fn min_element(&self) -> Cursor<'_, T> {
        self.begin()
    }

    /// A cursor at the largest value. On an empty tree this is the end cursor.
    pub fn max_element(&self) -> Cursor<'_, T> {
        // SAFETY: The root and its descendants are alive for as long as `self` is borrowed.
        self.cursor(unsafe { self.root.rightmost() })
    }

    /// An iterator over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        // SAFETY: The root and its descendants are alive for as long as `self` is borrowed.
        unsafe {
            Iter {
                front: self.root.leftmost(),
                back: self.root.rightmost(),
                remaining: self.len,
                marker: PhantomData,
            }
        }
    }

    /// An iterator over mutable references to the values in ascending order.
    ///
    /// Changing a value can break the ordering of the tree, see
    /// [`Tree::check_sorting_invariant`].
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        // SAFETY: The root and its descendants are alive for as long as `self` is borrowed.
        unsafe {
            IterMut {
                front: self.root.leftmost(),
                back: self.root.rightmost(),
                remaining: self.len,
                marker: PhantomData,
            }
        }
    }

    /// Writes every value in ascending order, each followed by a single space.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Tree;
    ///
    /// let tree: Tree<_> = [2, 1, 3].into_iter().collect();
    /// let mut output = Vec::new();
    /// tree.traverse_inorder(&mut output).unwrap();
    ///
    /// assert_eq!(output, b"1 2 3 ");
    /// ```
    pub fn traverse_inorder<W>(&self, out: &mut W) -> io::Result<()>
    where
        W: io::Write + ?Sized,
        T: fmt::Display,
    {
        for value in self {
            write!(out, "{} ", value)?;
        }
        Ok(())
    }

    /// Writes every value root first, then the left subtree, then the right subtree. Each value is
    /// followed by a single space.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Tree;
    ///
    /// let tree: Tree<_> = [2, 1, 3].into_iter().collect();
    /// let mut output = Vec::new();
    /// tree.traverse_preorder(&mut output).unwrap();
    ///
    /// assert_eq!(output, b"2 1 3 ");
    /// ```
    pub fn traverse_preorder<W>(&self, out: &mut W) -> io::Result<()>
    where
        W: io::Write + ?Sized,
        T: fmt::Display,
    {
        let mut pending: Vec<NonNull<Node<T>>> = self.root.0.into_iter().collect();
        while let Some(node) = pending.pop() {
            // SAFETY: `node` is alive for as long as `self` is borrowed.
            let (value, left, right) =
                unsafe { (&(*node.as_ptr()).value, Node::left(node), Node::right(node)) };
            write!(out, "{} ", value)?;
            // Right goes on first so the left subtree is written first.
            pending.extend(right.0);
            pending.extend(left.0);
        }
        Ok(())
    }

    /// Descends from the root using `f`, which returns how the target compares to the value it's
    /// given. Stops at the first equal value or at the empty slot where the target would go.
    pub(crate) fn search_by<F>(&self, mut f: F) -> Search<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let Some(mut node) = self.root.0 else {
            return Search::Vacant(Vacancy::Root);
        };
        loop {
            // SAFETY: `node` is alive for as long as `self` is borrowed and no mutable reference
            // into the tree can exist while we hold `&self`.
            let ordering = f(unsafe { &(*node.as_ptr()).value });
            let next = match ordering {
                Ordering::Less => unsafe { Node::left(node) },
                Ordering::Equal => return Search::Found(Position(node)),
                Ordering::Greater => unsafe { Node::right(node) },
            };
            node = match next.0 {
                Some(child) => child,
                None if ordering == Ordering::Less => return Search::Vacant(Vacancy::Left(node)),
                None => return Search::Vacant(Vacancy::Right(node)),
            };
        }
    }

    /// Puts a new node holding `value` into the empty slot found by [`Tree::search_by`].
    pub(crate) fn occupy(&mut self, vacancy: Vacancy<T>, value: T) -> Position<T> {
        // SAFETY: The parent came from searching this tree and nodes are never freed while the
        // tree is alive. We hold `&mut self` so nothing else is looking at it.
        let (parent, slot) = unsafe {
            match vacancy {
                Vacancy::Root => (Link(None), &mut self.root),
                Vacancy::Left(parent) => (Link(Some(parent)), &mut (*parent.as_ptr()).left),
                Vacancy::Right(parent) => (Link(Some(parent)), &mut (*parent.as_ptr()).right),
            }
        };
        debug_assert!(slot.0.is_none(), "occupied a slot that already holds a node");

        let node = Node::new_leaked(value, parent);
        *slot = Link(Some(node));
        self.len += 1;
        Position(node)
    }

    /// Finds the smallest value for which `f` (how the target compares to a value) says
    /// `Ordering::Less`, in a single descent.
    pub(crate) fn min_greater_than_by<F>(&self, mut f: F) -> Cursor<'_, T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut candidate = Link(None);
        let mut current = self.root;
        while let Some(node) = current.0 {
            // SAFETY: `node` is alive for as long as `self` is borrowed.
            current = if f(unsafe { &(*node.as_ptr()).value }) == Ordering::Less {
                candidate = current;
                unsafe { Node::left(node) }
            } else {
                unsafe { Node::right(node) }
            };
        }
        self.cursor(candidate)
    }

    /// Whether each value is strictly smaller than the next in an in-order walk, which holds
    /// exactly when every left subtree is smaller and every right subtree is larger than its
    /// parent.
    pub(crate) fn check_sorting_invariant_by<F>(&self, mut cmp: F) -> bool
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut values = self.iter();
        let Some(mut previous) = values.next() else {
            return true;
        };
        for value in values {
            if cmp(previous, value) != Ordering::Less {
                return false;
            }
            previous = value;
        }
        true
    }

    pub(crate) fn cursor_at(&self, position: Position<T>) -> Cursor<'_, T> {
        self.cursor(Link(Some(position.0)))
    }

    pub(crate) fn value_mut_at(&mut self, position: Position<T>) -> &mut T {
        // SAFETY: Positions only come from searching or growing this tree and nodes are never
        // freed while the tree is alive. We hold `&mut self` so the reference is unique.
        unsafe { &mut (*position.0.as_ptr()).value }
    }

    fn cursor(&self, current: Link<T>) -> Cursor<'_, T> {
        Cursor {
            current,
            root: self.root,
            marker: PhantomData,
        }
    }

    fn cursor_mut(&mut self, current: Link<T>) -> CursorMut<'_, T> {
        CursorMut {
            current,
            root: self.root,
            marker: PhantomData,
        }
    }
}

impl<T> Tree<T>
where
    T: Ord,
{
    /// Inserts the value into the tree. Returns `false` and leaves the tree untouched if an equal
    /// value is already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Tree;
    ///
    /// let mut tree = Tree::new();
    ///
    /// assert!(tree.insert(1));
    /// assert!(!tree.insert(1));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        match self.search_by(|candidate| value.cmp(candidate)) {
            Search::Found(_) => false,
            Search::Vacant(vacancy) => {
                self.occupy(vacancy, value);
                true
            }
        }
    }

    /// A cursor at the value equal to `value`, or the end cursor if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Tree;
    ///
    /// let tree: Tree<_> = [1, 2, 3, 4].into_iter().collect();
    ///
    /// assert_eq!(tree.find(&3).get(), Some(&3));
    /// assert_eq!(tree.find(&5), tree.end());
    /// ```
    pub fn find(&self, value: &T) -> Cursor<'_, T> {
        match self.search_by(|candidate| value.cmp(candidate)) {
            Search::Found(position) => self.cursor_at(position),
            Search::Vacant(_) => self.end(),
        }
    }

    /// Like [`Tree::find`] but allows the value to be changed through the cursor.
    pub fn find_mut(&mut self, value: &T) -> CursorMut<'_, T> {
        let current = match self.search_by(|candidate| value.cmp(candidate)) {
            Search::Found(position) => Link(Some(position.0)),
            Search::Vacant(_) => Link(None),
        };
        self.cursor_mut(current)
    }

    /// Whether a value equal to `value` is in the tree.
    pub fn contains(&self, value: &T) -> bool {
        !self.find(value).is_end()
    }

    /// A cursor at the smallest value strictly greater than `value`, or the end cursor if there
    /// is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Tree;
    ///
    /// let tree: Tree<_> = [4, 2, 3, 1, 5, 6, 7].into_iter().collect();
    ///
    /// assert_eq!(tree.min_greater_than(&0).get(), Some(&1));
    /// assert_eq!(tree.min_greater_than(&3).get(), Some(&4));
    /// assert_eq!(tree.min_greater_than(&7), tree.end());
    /// ```
    pub fn min_greater_than(&self, value: &T) -> Cursor<'_, T> {
        self.min_greater_than_by(|candidate| value.cmp(candidate))
    }

    /// Checks that every node is larger than everything in its left subtree and smaller than
    /// everything in its right subtree. The tree only breaks this when values are changed through
    /// a [`CursorMut`] or [`IterMut`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Tree;
    ///
    /// let mut tree: Tree<_> = [1, 2, 3].into_iter().collect();
    /// assert!(tree.check_sorting_invariant());
    ///
    /// *tree.begin_mut().get_mut().unwrap() = 4;
    /// assert!(!tree.check_sorting_invariant());
    /// ```
    pub fn check_sorting_invariant(&self) -> bool {
        self.check_sorting_invariant_by(T::cmp)
    }
}

impl<T> FromIterator<T> for Tree<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T> Extend<T> for Tree<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Tree<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// The node a search stopped at.
pub(crate) struct Position<T>(NonNull<Node<T>>);

/// The empty slot a search ended in.
pub(crate) enum Vacancy<T> {
    Root,
    Left(NonNull<Node<T>>),
    Right(NonNull<Node<T>>),
}

pub(crate) enum Search<T> {
    Found(Position<T>),
    Vacant(Vacancy<T>),
}

/// A possibly-empty pointer to a node. Whether it owns the node depends on where it's stored:
/// `left` and `right` own their nodes, `parent` never does.
struct Link<T>(Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Link<T> {}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for Link<T> {}

impl<T> Link<T> {
    /// The leftmost node below (and including) this one.
    ///
    /// # Safety
    ///
    /// Every node reachable from `self` must be alive.
    unsafe fn leftmost(self) -> Self {
        let Some(mut node) = self.0 else {
            return self;
        };
        while let Some(left) = Node::left(node).0 {
            node = left;
        }
        Link(Some(node))
    }

    /// # Safety
    ///
    /// Every node reachable from `self` must be alive.
    unsafe fn rightmost(self) -> Self {
        let Some(mut node) = self.0 else {
            return self;
        };
        while let Some(right) = Node::right(node).0 {
            node = right;
        }
        Link(Some(node))
    }

    /// The next node in order. The empty link sits between the largest and the smallest node,
    /// so moving on from it wraps around to the smallest node under `root`.
    ///
    /// # Safety
    ///
    /// `self` must be empty or a node of the tree rooted at `root`, and that tree must be alive.
    unsafe fn next(self, root: Self) -> Self {
        let Some(node) = self.0 else {
            return root.leftmost();
        };
        let right = Node::right(node);
        if right.0.is_some() {
            return right.leftmost();
        }

        // Climb until we come up out of a left subtree. That parent is the successor.
        let mut child = node;
        let mut parent = Node::parent(node);
        while let Some(ancestor) = parent.0 {
            if Node::left(ancestor).0 == Some(child) {
                return parent;
            }
            child = ancestor;
            parent = Node::parent(ancestor);
        }
        Link(None)
    }

    /// The mirror image of [`Link::next`].
    ///
    /// # Safety
    ///
    /// `self` must be empty or a node of the tree rooted at `root`, and that tree must be alive.
    unsafe fn prev(self, root: Self) -> Self {
        let Some(node) = self.0 else {
            return root.rightmost();
        };
        let left = Node::left(node);
        if left.0.is_some() {
            return left.rightmost();
        }

        let mut child = node;
        let mut parent = Node::parent(node);
        while let Some(ancestor) = parent.0 {
            if Node::right(ancestor).0 == Some(child) {
                return parent;
            }
            child = ancestor;
            parent = Node::parent(ancestor);
        }
        Link(None)
    }
}

pub(crate) struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    parent: Link<T>,
}

// The accessors below read single fields through the raw pointer. They never make a reference to
// the whole node because a `&mut T` to its value may be live in an `IterMut` or `CursorMut`.
impl<T> Node<T> {
    /// Allocates a childless node. The caller is responsible for linking it into a tree, which
    /// then owns it.
    fn new_leaked(value: T, parent: Link<T>) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Node {
            value,
            left: Link(None),
            right: Link(None),
            parent,
        })))
    }

    /// # Safety
    ///
    /// `node` must be alive.
    unsafe fn left(node: NonNull<Self>) -> Link<T> {
        (*node.as_ptr()).left
    }

    /// # Safety
    ///
    /// `node` must be alive.
    unsafe fn right(node: NonNull<Self>) -> Link<T> {
        (*node.as_ptr()).right
    }

    /// # Safety
    ///
    /// `node` must be alive.
    unsafe fn parent(node: NonNull<Self>) -> Link<T> {
        (*node.as_ptr()).parent
    }
}

/// A position in a [`Tree`]: either one of its values or the end.
///
/// The end sits between the largest and the smallest value, so [`Cursor::move_next`] from the end
/// goes to the smallest value and [`Cursor::move_prev`] goes to the largest.
///
/// Two cursors are equal when they point at the same node or are both at the end, even if they
/// come from different trees.
pub struct Cursor<'a, T> {
    current: Link<T>,
    root: Link<T>,
    marker: PhantomData<&'a Node<T>>,
}

impl<'a, T> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, T> Copy for Cursor<'a, T> {}

/// An end cursor that isn't attached to any tree.
impl<'a, T> Default for Cursor<'a, T> {
    fn default() -> Self {
        Self {
            current: Link(None),
            root: Link(None),
            marker: PhantomData,
        }
    }
}

impl<'a, T> PartialEq for Cursor<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}
impl<'a, T> Eq for Cursor<'a, T> {}

impl<'a, T> fmt::Debug for Cursor<'a, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

impl<'a, T> Cursor<'a, T> {
    /// The value under the cursor, or `None` at the end.
    pub fn get(&self) -> Option<&'a T> {
        // SAFETY: The node belongs to a tree borrowed for `'a`.
        self.current
            .0
            .map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Whether the cursor is at the end.
    pub fn is_end(&self) -> bool {
        self.current.0.is_none()
    }

    /// Moves to the next larger value and returns it. Returns `None` when this moves the cursor
    /// to the end.
    pub fn move_next(&mut self) -> Option<&'a T> {
        // SAFETY: `current` and `root` belong to a tree borrowed for `'a`.
        self.current = unsafe { self.current.next(self.root) };
        self.get()
    }

    /// Moves to the next smaller value and returns it. Returns `None` when this moves the cursor
    /// to the end.
    pub fn move_prev(&mut self) -> Option<&'a T> {
        // SAFETY: `current` and `root` belong to a tree borrowed for `'a`.
        self.current = unsafe { self.current.prev(self.root) };
        self.get()
    }

    /// Moves to the next larger value and returns where the cursor was before moving.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::Tree;
    ///
    /// let tree: Tree<_> = [1, 2].into_iter().collect();
    /// let mut cursor = tree.begin();
    ///
    /// assert_eq!(cursor.step().get(), Some(&1));
    /// assert_eq!(cursor.get(), Some(&2));
    /// ```
    pub fn step(&mut self) -> Self {
        let before = *self;
        self.move_next();
        before
    }
}

/// A position in a [`Tree`] that can change the value it points at.
///
/// Changing a value can break the ordering of the tree, see [`Tree::check_sorting_invariant`].
pub struct CursorMut<'a, T> {
    current: Link<T>,
    root: Link<T>,
    marker: PhantomData<&'a mut Node<T>>,
}

impl<'a, T> fmt::Debug for CursorMut<'a, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.get()).finish()
    }
}

impl<'a, T> CursorMut<'a, T> {
    /// The value under the cursor, or `None` at the end.
    pub fn get(&self) -> Option<&T> {
        // SAFETY: The node belongs to a tree mutably borrowed for `'a` and the returned reference
        // borrows `self`, so it can't overlap a mutable one.
        self.current
            .0
            .map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// The value under the cursor, or `None` at the end.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: As above, and `&mut self` makes the reference unique.
        self.current
            .0
            .map(|node| unsafe { &mut (*node.as_ptr()).value })
    }

    /// Gives up the cursor in exchange for the value under it, borrowed for as long as the tree.
    pub fn into_mut(self) -> Option<&'a mut T> {
        // SAFETY: The cursor is consumed so nothing else can reach the value through it.
        self.current
            .0
            .map(|node| unsafe { &mut (*node.as_ptr()).value })
    }

    /// Whether the cursor is at the end.
    pub fn is_end(&self) -> bool {
        self.current.0.is_none()
    }

    /// Moves to the next larger node and returns its value. Returns `None` when this moves the
    /// cursor to the end.
    pub fn move_next(&mut self) -> Option<&mut T> {
        // SAFETY: `current` and `root` belong to a tree borrowed for `'a`.
        self.current = unsafe { self.current.next(self.root) };
        self.get_mut()
    }

    /// Moves to the next smaller node and returns its value. Returns `None` when this moves the
    /// cursor to the end.
    pub fn move_prev(&mut self) -> Option<&mut T> {
        // SAFETY: `current` and `root` belong to a tree borrowed for `'a`.
        self.current = unsafe { self.current.prev(self.root) };
        self.get_mut()
    }

    /// A read-only cursor at the same position, borrowing this one.
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            current: self.current,
            root: self.root,
            marker: PhantomData,
        }
    }
}

/// An iterator over the values of a [`Tree`] in ascending order.
pub struct Iter<'a, T> {
    front: Link<T>,
    back: Link<T>,
    // `front` and `back` never cross because together they yield exactly `len` values.
    remaining: usize,
    marker: PhantomData<&'a Node<T>>,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.0?;
        self.remaining -= 1;
        // SAFETY: The node belongs to a tree borrowed for `'a`. The root is never needed because
        // `front` can't be empty while values remain.
        unsafe {
            self.front = self.front.next(Link(None));
            Some(&(*node.as_ptr()).value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.0?;
        self.remaining -= 1;
        // SAFETY: See `next`.
        unsafe {
            self.back = self.back.prev(Link(None));
            Some(&(*node.as_ptr()).value)
        }
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T> FusedIterator for Iter<'a, T> {}

/// An iterator over mutable references to the values of a [`Tree`] in ascending order.
pub struct IterMut<'a, T> {
    front: Link<T>,
    back: Link<T>,
    remaining: usize,
    marker: PhantomData<&'a mut Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.0?;
        self.remaining -= 1;
        // SAFETY: The node belongs to a tree mutably borrowed for `'a` and each node is yielded
        // at most once, so the references never alias. Walking on only reads the links.
        unsafe {
            self.front = self.front.next(Link(None));
            Some(&mut (*node.as_ptr()).value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.0?;
        self.remaining -= 1;
        // SAFETY: See `next`.
        unsafe {
            self.back = self.back.prev(Link(None));
            Some(&mut (*node.as_ptr()).value)
        }
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}
impl<'a, T> FusedIterator for IterMut<'a, T> {}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;
    use std::ops::Bound;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and a `BTreeSet`, checking that they agree after
    /// every step.
    fn do_ops<K, V>(ops: &[Op<K, V>], bst: &mut Tree<K>, set: &mut BTreeSet<K>)
    where
        K: Ord + Clone + fmt::Debug,
    {
        for op in ops {
            match op {
                Op::Insert(k, _) => {
                    assert_eq!(bst.insert(k.clone()), set.insert(k.clone()));
                }
                Op::Index(k) => {
                    assert_eq!(bst.find(k).get(), set.get(k));
                }
                Op::MinGreaterThan(k) => {
                    let expected = set.range((Bound::Excluded(k), Bound::Unbounded)).next();
                    assert_eq!(bst.min_greater_than(k).get(), expected);
                }
                Op::Iter => {
                    assert!(bst.iter().eq(set.iter()));
                    assert!(bst.iter().rev().eq(set.iter().rev()));
                }
            }
            assert_eq!(bst.len(), set.len());
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
            let mut tree = Tree::new();
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut set);
            tree.check_sorting_invariant() && tree.iter().eq(set.iter())
        }
    }

    quickcheck::quickcheck! {
        fn contains(xs: Vec<i8>) -> bool {
            let tree: Tree<_> = xs.iter().copied().collect();

            xs.iter().all(|x| tree.contains(x))
        }
    }

    quickcheck::quickcheck! {
        fn height_is_bounded_by_len(xs: Vec<i8>) -> bool {
            let tree: Tree<_> = xs.iter().copied().collect();
            let len = tree.len();
            let height = tree.height();

            // A tree with `height` levels holds at most 2^height - 1 nodes.
            height <= len && (len == 0 || len < 1usize << height.min(63))
        }
    }

    quickcheck::quickcheck! {
        fn walking_forward_matches_iter(xs: Vec<i8>) -> bool {
            let tree: Tree<_> = xs.iter().copied().collect();
            let mut cursor = tree.begin();
            let mut walked = Vec::new();
            while let Some(value) = cursor.get() {
                walked.push(value);
                cursor.step();
            }

            walked.into_iter().eq(tree.iter())
        }
    }

    quickcheck::quickcheck! {
        fn clone_keeps_shape(xs: Vec<i8>) -> bool {
            let tree: Tree<_> = xs.iter().copied().collect();
            let copy = tree.clone();

            let mut original = Vec::new();
            let mut copied = Vec::new();
            tree.traverse_preorder(&mut original).unwrap();
            copy.traverse_preorder(&mut copied).unwrap();

            original == copied && copy.height() == tree.height() && copy == tree
        }
    }
}
