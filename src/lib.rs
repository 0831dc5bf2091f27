//! rankskip — упорядоченный пропускной список с доступом по рангу.
//!
//! ```
//! use rankskip::SkipList;
//!
//! let mut list: SkipList<i32> = [5, 3, 5, 1].into_iter().collect();
//!
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5, 5]);
//! assert_eq!(list.index_of(&5), Ok(2));
//! assert_eq!(list.get(-1), Ok(&5));
//!
//! list.preen();
//! assert_eq!(list.delete_at(0), Ok(1));
//! ```

/// Configuration loading (`RANKSKIP_*` environment variables).
pub mod config;
/// Logging setup on top of `tracing-subscriber`.
pub mod logging;
/// The order-statistics skip list, its validation and statistics.
pub mod skiplist;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings loaded from the environment.
pub use crate::config::Settings;
/// Operation errors and result types.
pub use rankskip_error::{ErrorExt, SkipListError, SkipListResult, StatusCode};
/// Skip list and its helpers.
pub use skiplist::{
    IntoIter, Iter, Layers, Promotion, SkipList, SkipListStatistics, ValidationError,
};
