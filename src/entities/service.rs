use crate::core::entity::RecordId;
use crate::core::error::ShopError;
use crate::entities::required;
use crate::impl_record;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A billable line of work on a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: RecordId,
    pub ticket_id: RecordId,
    pub description: String,
    pub cost: Decimal,
}

impl_record!(Service, Service, services, ticket_id => Ticket, [description, cost]);

/// Form input for adding a service line
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewService {
    pub ticket_id: RecordId,
    pub description: String,
    pub cost: Decimal,
}

impl NewService {
    pub fn new(ticket_id: RecordId, description: impl Into<String>, cost: Decimal) -> Self {
        Self {
            ticket_id,
            description: description.into(),
            cost,
        }
    }

    pub fn into_record(self, id: RecordId) -> Result<Service, ShopError> {
        if self.cost < Decimal::ZERO {
            return Err(ShopError::invalid("cost", "must not be negative"));
        }
        Ok(Service {
            id,
            ticket_id: self.ticket_id,
            description: required("description", &self.description)?,
            cost: self.cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_cost_rejected() {
        let err = NewService::new(1, "Screen", dec!(-1)).into_record(0).unwrap_err();
        assert!(matches!(err, ShopError::InvalidInput { ref field, .. } if field == "cost"));
    }

    #[test]
    fn test_free_service_allowed() {
        let service = NewService::new(1, "Diagnosis", dec!(0)).into_record(2).unwrap();
        assert_eq!(service.cost, Decimal::ZERO);
    }

    #[test]
    fn test_cost_serialises_as_string() {
        let service = NewService::new(1, "Battery", dec!(250.50)).into_record(1).unwrap();
        let json = serde_json::to_value(&service).unwrap();
        assert_eq!(json["cost"], "250.50");
    }
}
