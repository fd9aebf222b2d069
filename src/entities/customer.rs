use crate::core::entity::RecordId;
use crate::core::error::ShopError;
use crate::core::field::FieldFormat;
use crate::entities::required;
use crate::impl_record;
use serde::{Deserialize, Serialize};

/// A shop customer; owns zero or more devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

impl_record!(Customer, Customer, customers, [name, phone, email, address]);

/// Form input for adding or editing a customer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Validate and normalise into a record (id assigned later by the store)
    pub fn into_record(self, id: RecordId) -> Result<Customer, ShopError> {
        let name = required("name", &self.name)?;
        let phone = self.phone.trim().to_string();
        let email = self.email.trim().to_string();

        if !phone.is_empty() && !FieldFormat::Phone.validate(&phone) {
            return Err(ShopError::invalid("phone", format!("'{}' is not a phone number", phone)));
        }
        if !email.is_empty() && !FieldFormat::Email.validate(&email) {
            return Err(ShopError::invalid("email", format!("'{}' is not an e-mail address", email)));
        }

        Ok(Customer {
            id,
            name,
            phone,
            email,
            address: self.address.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Record;

    #[test]
    fn test_name_is_required() {
        let err = NewCustomer::new("   ").into_record(0).unwrap_err();
        assert!(matches!(err, ShopError::InvalidInput { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_blank_contact_details_are_allowed() {
        let customer = NewCustomer::new(" Asha Rao ").into_record(3).unwrap();
        assert_eq!(customer.name, "Asha Rao");
        assert_eq!(customer.id(), 3);
        assert!(customer.parent().is_none());
    }

    #[test]
    fn test_bad_email_rejected() {
        let err = NewCustomer::new("Asha")
            .with_email("asha-at-example")
            .into_record(0)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_field_value_lookup() {
        let customer = NewCustomer::new("Asha")
            .with_phone("98765 43210")
            .into_record(1)
            .unwrap();
        assert_eq!(
            customer.field_value("phone").unwrap().as_string(),
            Some("98765 43210")
        );
        assert_eq!(customer.field_value("id").unwrap().as_integer(), Some(1));
        assert!(customer.field_value("salary").is_none());
    }
}
