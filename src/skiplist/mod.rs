//! SkipList с доступом по рангу.
//!
//! # Модули
//!
//! - `node`: арена узлов с индексной адресацией.
//! - `promotion`: автомат продвижения узлов между уровнями.
//! - `skiplist_base`: операции списка.
//! - `safety`: валидация инвариантов и статистика.

mod node;
pub mod promotion;
pub mod safety;
pub mod skiplist_base;

pub use promotion::*;
pub use safety::*;
pub use skiplist_base::*;
