//! Row normalization and rectangular table assembly

pub mod builder;
pub mod normalize;

pub use builder::{Table, TableBuilder};
pub use normalize::normalize;
