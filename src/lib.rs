//! Left leaning red black tree keyed by `u64`, with floor search.

mod depth;
mod empty;
mod error;
mod llrb;

pub use crate::depth::Depth;
pub use crate::empty::Empty;
pub use crate::error::Error;
pub use crate::llrb::{destroy, insert, search, Llrb, Node, Stats, Tree};
