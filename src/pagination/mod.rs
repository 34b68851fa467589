//! Pagination module
//!
//! Page descriptors returned by paginated searches and the batched cursor.

mod cursor;
mod paginator;

pub use cursor::Cursor;
pub use paginator::{capped_total, keys_within_limit, LengthAwarePaginator, SimplePaginator};
