use crate::core::entity::RecordId;
use crate::core::error::ShopError;
use crate::core::field::FieldValue;
use crate::entities::required;
use crate::impl_record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repair progress of a ticket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    Received,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Received => "Received",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "received" => Ok(TicketStatus::Received),
            "in progress" | "in_progress" => Ok(TicketStatus::InProgress),
            "completed" => Ok(TicketStatus::Completed),
            other => Err(ShopError::invalid(
                "status",
                format!("'{}' is not one of Received, In Progress, Completed", other),
            )),
        }
    }
}

impl From<TicketStatus> for FieldValue {
    fn from(value: TicketStatus) -> Self {
        FieldValue::String(value.as_str().to_string())
    }
}

/// A repair job on one device; owns service lines and at most one invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: RecordId,
    pub device_id: RecordId,
    pub technician: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

impl_record!(Ticket, Ticket, tickets, device_id => Device, [technician, status, created_at]);

/// Form input for opening a ticket
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewTicket {
    pub device_id: RecordId,
    pub technician: String,
    #[serde(default)]
    pub status: TicketStatus,
}

impl NewTicket {
    pub fn new(device_id: RecordId, technician: impl Into<String>) -> Self {
        Self {
            device_id,
            technician: technician.into(),
            status: TicketStatus::Received,
        }
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> Result<Ticket, ShopError> {
        Ok(Ticket {
            id,
            device_id: self.device_id,
            technician: required("technician", &self.technician)?,
            status: self.status,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let parsed: TicketStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(parsed, TicketStatus::Completed);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("in progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert!("Shipped".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_status_defaults_to_received() {
        let ticket: NewTicket =
            serde_json::from_str(r#"{"device_id": 2, "technician": "Ravi"}"#).unwrap();
        assert_eq!(ticket.status, TicketStatus::Received);
    }
}
