pub mod errors;
pub mod property;

pub use property::{Document, Property};
