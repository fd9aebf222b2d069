//! Typed error handling for fixdesk
//!
//! Callers match on [`ShopError`] instead of string-sniffing a generic error:
//!
//! - [`ShopError::InvalidInput`]: negative money, malformed numbers, missing
//!   required fields. Nothing was written.
//! - [`ShopError::NotFound`]: the target (or the parent it must reference)
//!   does not exist. Nothing was written.
//! - [`ShopError::AlreadyInvoiced`]: a ticket can carry at most one invoice.
//! - [`ShopError::Storage`]: the backing store failed. Multi-record operations
//!   have been rolled back before this is returned.
//! - [`ShopError::Render`]: a receipt could not be rendered; read-only.
//!
//! # Example
//!
//! ```rust,ignore
//! match shop.delete_customer(7) {
//!     Ok(report) => println!("removed {} records", report.total()),
//!     Err(ShopError::NotFound { kind, id }) => println!("{kind} #{id} is already gone"),
//!     Err(e) => eprintln!("delete failed: {e}"),
//! }
//! ```

use crate::core::entity::{EntityKind, RecordId};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for shop operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Input rejected before any computation or write
    #[error("invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    /// Record does not exist
    #[error("{kind} #{id} not found")]
    NotFound { kind: EntityKind, id: RecordId },

    /// The ticket already has its (single) invoice
    #[error("ticket #{ticket_id} already has invoice #{invoice_id}")]
    AlreadyInvoiced {
        ticket_id: RecordId,
        invoice_id: RecordId,
    },

    /// Backing store failure; the store is left as it was before the call
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Receipt template failed to render
    #[error("receipt rendering failed: {0}")]
    Render(#[from] tera::Error),
}

impl ShopError {
    /// Shorthand for [`ShopError::InvalidInput`]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ShopError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`ShopError::NotFound`]
    pub fn not_found(kind: EntityKind, id: RecordId) -> Self {
        ShopError::NotFound { kind, id }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShopError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ShopError::NotFound { .. } => StatusCode::NOT_FOUND,
            ShopError::AlreadyInvoiced { .. } => StatusCode::CONFLICT,
            ShopError::Storage(_) | ShopError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ShopError::InvalidInput { .. } => "INVALID_INPUT",
            ShopError::NotFound { .. } => "NOT_FOUND",
            ShopError::AlreadyInvoiced { .. } => "ALREADY_INVOICED",
            ShopError::Storage(_) => "STORAGE_ERROR",
            ShopError::Render(_) => "RENDER_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ShopError::InvalidInput { field, .. } => Some(serde_json::json!({ "field": field })),
            ShopError::NotFound { kind, id } => Some(serde_json::json!({
                "kind": kind,
                "id": id
            })),
            ShopError::AlreadyInvoiced {
                ticket_id,
                invoice_id,
            } => Some(serde_json::json!({
                "ticket_id": ticket_id,
                "invoice_id": invoice_id
            })),
            ShopError::Storage(_) | ShopError::Render(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        match &self {
            ShopError::Storage(err) => {
                tracing::error!(error = %err, "storage failure surfaced to client")
            }
            ShopError::Render(err) => tracing::error!(error = %err, "receipt rendering failed"),
            _ => {}
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by [`RecordStore`](crate::core::store::RecordStore) backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a collection file failed
    #[error("storage I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection could not be encoded or decoded
    #[error("corrupt {collection} collection: {source}")]
    Codec {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A thread panicked while holding a store lock
    #[error("store lock poisoned")]
    Poisoned,

    /// The backend refused the write
    #[error("write rejected: {0}")]
    Rejected(String),

    /// The blocking task running a store call panicked or was cancelled
    #[error("store task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ShopError::invalid("cost", "must not be negative").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShopError::not_found(EntityKind::Customer, 4).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShopError::AlreadyInvoiced {
                ticket_id: 1,
                invoice_id: 2
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ShopError::from(StoreError::Poisoned).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message_and_details() {
        let err = ShopError::not_found(EntityKind::Device, 12);
        assert_eq!(err.to_string(), "device #12 not found");

        let response = err.to_response();
        assert_eq!(response.code, "NOT_FOUND");
        let details = response.details.unwrap();
        assert_eq!(details["kind"], "device");
        assert_eq!(details["id"], 12);
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let err = ShopError::from(StoreError::io("data/tickets.json", io));
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.to_string().contains("data/tickets.json"));
        assert!(err.to_response().details.is_none());
    }

    #[test]
    fn test_into_response_status() {
        let response = ShopError::invalid("tax_rate", "not a number").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
