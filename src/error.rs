/// Error enumerates the ways a tree can fail [`validate`].
///
/// [`validate`]: crate::Llrb::validate
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// Fatal case, a red node with a red left child.
    #[error("consecutive red links")]
    ConsecutiveReds,
    /// Fatal case, red right child under the node with this key while
    /// its left child is black.
    #[error("right leaning red link under key {0}")]
    RightLeaningRed(u64),
    /// Fatal case, black height differs between left and right subtree.
    /// The String component of this variant can be used for debugging.
    #[error("unbalanced blacks, {0}")]
    UnbalancedBlacks(String),
    /// Fatal case, child key (first) not in sort-order with its parent.
    #[error("sort error, child {0} parent {1}")]
    SortError(u64, u64),
}
