//! Macros for reducing boilerplate when defining records
//!
//! Every persisted type needs the same [`Record`](crate::core::entity::Record)
//! plumbing: its kind, id accessors, parent reference, dynamic field access
//! and the two collection accessors into [`Tables`](crate::core::store::Tables).

/// Implement [`Record`](crate::core::entity::Record) for a struct with an
/// `id: RecordId` field.
///
/// The searchable fields are listed explicitly; each must convert into
/// [`FieldValue`](crate::core::field::FieldValue) via `From`.
///
/// # Example
/// ```rust,ignore
/// // Root record (no parent)
/// impl_record!(Customer, Customer, customers, [name, phone, email, address]);
///
/// // Child record: `customer_id` references a Customer
/// impl_record!(Device, Device, devices, customer_id => Customer, [brand, model]);
/// ```
#[macro_export]
macro_rules! impl_record {
    (@common $kind:ident, $table:ident, [$($field:ident),* $(,)?]) => {
        const KIND: $crate::core::entity::EntityKind = $crate::core::entity::EntityKind::$kind;

        const FIELDS: &'static [&'static str] = &["id", $(stringify!($field)),*];

        fn id(&self) -> $crate::core::entity::RecordId {
            self.id
        }

        fn assign_id(&mut self, id: $crate::core::entity::RecordId) {
            self.id = id;
        }

        fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
            match field {
                "id" => Some($crate::core::field::FieldValue::from(self.id)),
                $(
                    stringify!($field) => {
                        Some($crate::core::field::FieldValue::from(self.$field.clone()))
                    }
                )*
                _ => None,
            }
        }

        fn collection(tables: &$crate::core::store::Tables) -> &Vec<Self> {
            &tables.$table
        }

        fn collection_mut(tables: &mut $crate::core::store::Tables) -> &mut Vec<Self> {
            &mut tables.$table
        }
    };

    ($type:ident, $kind:ident, $table:ident, $parent_field:ident => $parent_kind:ident, [$($field:ident),* $(,)?]) => {
        impl $crate::core::entity::Record for $type {
            fn parent(
                &self,
            ) -> Option<($crate::core::entity::EntityKind, $crate::core::entity::RecordId)> {
                Some((
                    $crate::core::entity::EntityKind::$parent_kind,
                    self.$parent_field,
                ))
            }

            $crate::impl_record!(@common $kind, $table, [$parent_field, $($field),*]);
        }
    };

    ($type:ident, $kind:ident, $table:ident, [$($field:ident),* $(,)?]) => {
        impl $crate::core::entity::Record for $type {
            fn parent(
                &self,
            ) -> Option<($crate::core::entity::EntityKind, $crate::core::entity::RecordId)> {
                None
            }

            $crate::impl_record!(@common $kind, $table, [$($field),*]);
        }
    };
}
