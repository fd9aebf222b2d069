//! Core module containing fundamental traits and types for the shop

pub mod entity;
pub mod error;
pub mod field;
pub mod store;

pub use entity::{EntityKind, Record, RecordId};
pub use error::{ErrorResponse, ShopError, StoreError};
pub use field::{FieldFormat, FieldValue};
pub use store::{RecordStore, RecordStoreExt, Tables, Transaction};
