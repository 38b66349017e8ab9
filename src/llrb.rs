use std::{
    cmp::Ordering,
    mem,
    ops::{Deref, DerefMut},
};

use rand::Rng;

use crate::depth::Depth;
use crate::error::Error;

/// Tree is the caller owned reference to a [left-leaning-red-black][llrb]
/// tree, `None` being the empty tree. Every node exclusively owns its
/// children, so whoever holds the `Tree` owns every node in it.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
pub type Tree<V> = Option<Box<Node<V>>>;

/// Floor search. Return the node whose key matches `key`, or else the node
/// with the highest key strictly less than `key`. Return None if every
/// key in the tree is greater than `key`.
///
/// When duplicate keys are present, the first match met by descending
/// from the root is returned.
pub fn search<V>(tree: &Tree<V>, key: u64) -> Option<&Node<V>> {
    let (mut node, mut best) = (tree.as_ref().map(Deref::deref), None);
    while let Some(nref) = node {
        node = match nref.key.cmp(&key) {
            Ordering::Equal => return Some(nref),
            Ordering::Greater => nref.left_deref(),
            Ordering::Less => {
                best = Some(nref);
                nref.right_deref()
            }
        };
    }
    best
}

/// Insert `(key, value)` into `tree` and return the new root, which the
/// caller must store back in place of `tree`. Existing entries are never
/// overwritten, an equal key is inserted into the right subtree, leaving
/// both nodes in the tree.
///
/// The returned root is not forced black, its color carries no link.
///
/// ```
/// use llrb_floor::{insert, search, Tree};
///
/// let mut root: Tree<&str> = None;
/// for (key, value) in vec![(10, "ten"), (20, "twenty"), (5, "five")] {
///     root = Some(insert(root, key, value));
/// }
/// assert_eq!(search(&root, 12).map(|n| n.key()), Some(10));
/// assert!(search(&root, 4).is_none());
/// ```
pub fn insert<V>(tree: Tree<V>, key: u64, value: V) -> Box<Node<V>> {
    let mut node = match tree {
        None => return Node::new(key, value, false /*black*/),
        Some(node) => node,
    };

    if is_red(node.left_deref()) && is_red(node.right_deref()) {
        flip(node.deref_mut())
    }

    if key < node.key {
        node.left = Some(insert(node.left.take(), key, value));
    } else {
        node.right = Some(insert(node.right.take(), key, value));
    }

    if is_red(node.right_deref()) {
        node = rotate_left(node);
    }
    let left = node.left_deref();
    if is_red(left) && is_red(left.and_then(Node::left_deref)) {
        node = rotate_right(node);
    }
    node
}

/// Destroy the tree, releasing every node exactly once, children before
/// their parent. Return the number of nodes released, destroying the
/// empty tree is a no-op returning zero.
pub fn destroy<V>(tree: Tree<V>) -> usize {
    match tree {
        None => 0,
        Some(mut node) => {
            let n = destroy(node.left.take()) + destroy(node.right.take());
            mem::drop(node);
            n + 1
        }
    }
}

/// Llrb manage a single named instance of in-memory index over `u64`
/// keys, using [left-leaning-red-black][llrb] tree. Keys need not be
/// unique, every insert adds a new node.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
#[derive(Clone)]
pub struct Llrb<V> {
    pub(crate) name: String,
    pub(crate) root: Tree<V>,
    pub(crate) n_count: usize, // number of nodes in the tree.
}

/// Different ways to construct a new Llrb instance.
impl<V> Llrb<V> {
    /// Create an empty instance of Llrb, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Llrb<V>
    where
        S: AsRef<str>,
    {
        Llrb {
            name: name.as_ref().to_string(),
            root: Default::default(),
            n_count: Default::default(),
        }
    }

    /// Create a new instance of Llrb tree and load it with entries
    /// from `iter`, in iteration order. Repeated keys are kept as
    /// separate nodes.
    pub fn load_from<S, I>(name: S, iter: I) -> Llrb<V>
    where
        S: AsRef<str>,
        I: Iterator<Item = (u64, V)>,
    {
        let mut llrb = Llrb::new(name);
        for (key, value) in iter {
            llrb.insert(key, value);
        }
        tracing::debug!(name = %llrb.name, entries = llrb.n_count, "loaded");
        llrb
    }
}

/// Maintenance API.
impl<V> Llrb<V> {
    /// Identify this instance. Applications can choose unique names while
    /// creating Llrb instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of nodes in this instance, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return quickly with basic statisics, only entries() and node_size()
    /// methods are valid with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<V>>())
    }

    /// Validate LLRB tree with following rules:
    ///
    /// * Left child key is less than or equal to its parent, right child
    ///   key is greater than or equal to its parent. Rotations can move an
    ///   equal key to the left.
    /// * No red link leans right alone, a red right child is allowed only
    ///   next to a red left child (4-node).
    /// * A red node never has a red left child.
    /// * Number of blacks should be same under left child and right child.
    ///
    /// Color of the root is ignored. Additionally return full statistics
    /// on the tree. Refer to [`Stats`] for more information.
    pub fn validate(&self) -> Result<Stats, Error> {
        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<V>>());
        let mut depths = Depth::new();
        match validate_tree(self.root_deref(), 0, 0, &mut depths) {
            Ok(blacks) => {
                stats.set_blacks(blacks);
                stats.set_depths(depths);
                Ok(stats)
            }
            Err(err) => {
                tracing::warn!(name = %self.name, error = %err, "invalid tree");
                Err(err)
            }
        }
    }

    /// Destroy this instance, releasing all its nodes. Return the number
    /// of nodes released.
    pub fn destroy(mut self) -> usize {
        let n = destroy(self.root.take());
        tracing::debug!(name = %self.name, nodes = n, "destroyed");
        self.n_count = 0;
        n
    }

    #[inline]
    pub(crate) fn root_deref(&self) -> Option<&Node<V>> {
        self.root.as_ref().map(Deref::deref)
    }
}

/// Write operations on Llrb instance.
impl<V> Llrb<V> {
    /// Insert a new {key, value} entry in the index. If key is already
    /// present, the old entry stays and a second node is added for key.
    pub fn insert(&mut self, key: u64, value: V) {
        let root = insert(self.root.take(), key, value);
        self.root = Some(root);
        self.n_count += 1;
    }
}

/// Read operations on Llrb instance.
impl<V> Llrb<V> {
    /// Return the node matching key, or the node with the highest key
    /// less than key. Refer to [`search`].
    pub fn search(&self, key: u64) -> Option<&Node<V>> {
        search(&self.root, key)
    }

    /// Get the value for key, exact match only.
    pub fn get(&self, key: u64) -> Option<&V> {
        let mut node = self.root_deref();
        while let Some(nref) = node {
            node = match nref.key.cmp(&key) {
                Ordering::Less => nref.right_deref(),
                Ordering::Greater => nref.left_deref(),
                Ordering::Equal => return Some(&nref.value),
            };
        }
        None
    }

    /// Return a random node from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<&Node<V>> {
        let mut nref = self.root_deref()?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let next = match rng.gen::<u8>() % 2 {
                0 => nref.left_deref(),
                _ => nref.right_deref(),
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    nref = next;
                }
                _ => break Some(nref),
            }
        }
    }
}

impl<V> Drop for Llrb<V> {
    fn drop(&mut self) {
        destroy(self.root.take());
    }
}

// Return the black height under `node`. Root is counted black whatever
// its color. A node with both children red is a 4-node, left as is by
// insert.
fn validate_tree<V>(
    node: Option<&Node<V>>,
    mut nb: usize,
    depth: usize,
    depths: &mut Depth,
) -> Result<usize, Error> {
    let node = match node {
        None => {
            depths.sample(depth);
            return Ok(nb);
        }
        Some(node) => node,
    };

    let red = depth > 0 && !node.is_black();
    if !red {
        nb += 1;
    }
    let (left, right) = (node.left_deref(), node.right_deref());
    if red && is_red(left) {
        return Err(Error::ConsecutiveReds);
    }
    if is_red(right) && !is_red(left) {
        return Err(Error::RightLeaningRed(node.key));
    }
    let lblacks = validate_tree(left, nb, depth + 1, depths)?;
    let rblacks = validate_tree(right, nb, depth + 1, depths)?;
    if lblacks != rblacks {
        let err = format!("left: {} right: {}", lblacks, rblacks);
        return Err(Error::UnbalancedBlacks(err));
    }
    if let Some(left) = left {
        if left.key > node.key {
            return Err(Error::SortError(left.key, node.key));
        }
    }
    if let Some(right) = right {
        if right.key < node.key {
            return Err(Error::SortError(right.key, node.key));
        }
    }
    Ok(lblacks)
}

//              (i)                       (i)
//               |                         |
//              node                       x
//              /  \                      / \
//             /    (r)                 (r)  \
//            /       \                 /     \
//          left       x             node      xr
//                    / \            /  \
//                  xl   xr       left   xl
//
fn rotate_left<V>(mut node: Box<Node<V>>) -> Box<Node<V>> {
    let mut x = match node.right.take() {
        Some(x) if !x.is_black() => x,
        _ => panic!("rotate_left(): rotating a black link ? Call the programmer"),
    };
    node.right = x.left.take();
    x.black = node.black;
    node.set_red();
    x.left = Some(node);
    x
}

//              (i)                       (i)
//               |                         |
//              node                       x
//              /  \                      / \
//            (r)   \                   (r)  \
//           /       \                 /      \
//          x       right             xl      node
//         / \                                / \
//       xl   xr                             xr  right
//
fn rotate_right<V>(mut node: Box<Node<V>>) -> Box<Node<V>> {
    let mut x = match node.left.take() {
        Some(x) if !x.is_black() => x,
        _ => panic!("rotate_right(): rotating a black link ? Call the programmer"),
    };
    node.left = x.right.take();
    x.black = node.black;
    node.set_red();
    x.right = Some(node);
    x
}

//        (x)                   (!x)
//         |                     |
//        node                  node
//        / \                   / \
//      (y) (z)              (!y) (!z)
//     /      \              /      \
//   left    right         left    right
//
fn flip<V>(node: &mut Node<V>) {
    if let Some(left) = node.left.as_mut() {
        left.toggle_link();
    }
    if let Some(right) = node.right.as_mut() {
        right.toggle_link();
    }
    node.toggle_link();
}

fn is_red<V>(node: Option<&Node<V>>) -> bool {
    node.map_or(false, |node| !node.is_black())
}

/// Node corresponds to a single entry in the tree.
#[derive(Clone)]
pub struct Node<V> {
    pub(crate) key: u64,
    pub(crate) value: V,
    pub(crate) black: bool,    // store: black or red
    pub(crate) left: Tree<V>,  // store: left child
    pub(crate) right: Tree<V>, // store: right child
}

// Primary operations on a single node.
impl<V> Node<V> {
    // CREATE operation
    pub(crate) fn new(key: u64, value: V, black: bool) -> Box<Node<V>> {
        Box::new(Node {
            key,
            value,
            black,
            left: None,
            right: None,
        })
    }

    /// Return the key of this entry.
    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Return a reference to the value of this entry.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn left_deref(&self) -> Option<&Node<V>> {
        self.left.as_ref().map(Deref::deref)
    }

    #[inline]
    pub(crate) fn right_deref(&self) -> Option<&Node<V>> {
        self.right.as_ref().map(Deref::deref)
    }

    #[inline]
    fn set_red(&mut self) {
        self.black = false
    }

    #[inline]
    fn toggle_link(&mut self) {
        self.black = !self.black
    }

    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.black
    }
}

/// Statistics on [`Llrb`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`Llrb::stats`] method.
/// * To get full statisics via [`Llrb::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of nodes in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`Llrb`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `Llrb<V>`. Although
    /// the node overhead is constant, the node size varies based on
    /// the value type. EG:
    ///
    /// ```
    /// use llrb_floor::Llrb;
    /// let llrb: Llrb<i128> = Llrb::new("myinstance");
    ///
    /// // size of key: 8 bytes
    /// // size of value: 16 bytes
    /// // overhead is 24 bytes
    /// assert_eq!(llrb.stats().node_size(), 48);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to leaf, on both left
    /// and right child.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        self.depths.as_ref().filter(|d| d.samples() > 0).cloned()
    }
}
