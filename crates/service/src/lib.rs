//! Service layer for property listings.
//! - `storage` persists the whole listing document (file-backed or in memory).
//! - `property` runs list/get/create/update/delete against a store.
//! - Validation rules and the record type live in the `models` crate.

pub mod errors;
pub mod storage;
pub mod property;
