//! Property listing operations on top of a [`DocumentStore`](crate::storage::DocumentStore).

pub mod service;

pub use service::PropertyService;
