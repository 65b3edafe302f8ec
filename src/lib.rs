#![deny(clippy::all)]

pub mod fill;
pub mod matcher;
pub mod order;

pub use fill::Fill;
pub use matcher::Matcher;
pub use order::book::tree_map::TreeMap;
pub use order::book::{Book, Depth, DepthItem, Error};
pub use order::{Order, OrderId, Price, Side, Size, Timestamp};
