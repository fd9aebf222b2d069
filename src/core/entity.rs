//! Record traits defining the core abstraction for every persisted type

use crate::core::field::FieldValue;
use crate::core::store::Tables;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;

/// Identifier of a record within its own collection.
///
/// Identifiers are assigned by the store as `max(existing) + 1`, so they are
/// only unique per [`EntityKind`].
pub type RecordId = u64;

/// The five collections managed by the shop.
///
/// Declaration order follows the ownership chain
/// Customer → Device → Ticket → {Service, Invoice}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Device,
    Ticket,
    Service,
    Invoice,
}

impl EntityKind {
    /// Every kind, parents before children
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Customer,
        EntityKind::Device,
        EntityKind::Ticket,
        EntityKind::Service,
        EntityKind::Invoice,
    ];

    /// Every kind, children before parents.
    ///
    /// Stores that cannot replace several collections atomically write in
    /// this order so an observer never sees a child without its parent.
    pub const LEAVES_FIRST: [EntityKind; 5] = [
        EntityKind::Service,
        EntityKind::Invoice,
        EntityKind::Ticket,
        EntityKind::Device,
        EntityKind::Customer,
    ];

    /// Singular name (e.g., "customer")
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Device => "device",
            EntityKind::Ticket => "ticket",
            EntityKind::Service => "service",
            EntityKind::Invoice => "invoice",
        }
    }

    /// Plural name used for routes and collection files (e.g., "customers")
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Device => "devices",
            EntityKind::Ticket => "tickets",
            EntityKind::Service => "services",
            EntityKind::Invoice => "invoices",
        }
    }

    /// The kind this kind references through its foreign key
    pub fn parent(&self) -> Option<EntityKind> {
        match self {
            EntityKind::Customer => None,
            EntityKind::Device => Some(EntityKind::Customer),
            EntityKind::Ticket => Some(EntityKind::Device),
            EntityKind::Service | EntityKind::Invoice => Some(EntityKind::Ticket),
        }
    }

    /// Parse either the singular or the plural name
    pub fn from_name(name: &str) -> Option<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name || kind.plural() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base trait for every record kept in a [`RecordStore`](crate::core::store::RecordStore).
///
/// A record knows:
/// - which collection it lives in (`KIND`, `collection`, `collection_mut`)
/// - its identifier, which the store assigns on insert
/// - the parent it references, if any
/// - how to expose its fields dynamically for search
///
/// Implementations are generated with [`impl_record!`](crate::impl_record).
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection this record belongs to
    const KIND: EntityKind;

    /// Field names accepted by [`field_value`](Record::field_value)
    const FIELDS: &'static [&'static str];

    /// Identifier of this record (0 until inserted)
    fn id(&self) -> RecordId;

    /// Set the identifier; called by the store on insert
    fn assign_id(&mut self, id: RecordId);

    /// The record this one references, as `(kind, id)`
    fn parent(&self) -> Option<(EntityKind, RecordId)>;

    /// Get the value of a field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Borrow this record's collection out of a table set
    fn collection(tables: &Tables) -> &Vec<Self>;

    /// Mutably borrow this record's collection out of a table set
    fn collection_mut(tables: &mut Tables) -> &mut Vec<Self>;
}
