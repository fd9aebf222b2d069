use crate::core::entity::RecordId;
use crate::core::error::ShopError;
use crate::entities::required;
use crate::impl_record;
use serde::{Deserialize, Serialize};

/// A device brought in by a customer; owns zero or more tickets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: RecordId,
    pub customer_id: RecordId,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub issue: String,
}

impl_record!(Device, Device, devices, customer_id => Customer, [brand, model, serial, issue]);

impl Device {
    /// "Brand Model", as shown in listings
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// Form input for adding or editing a device
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewDevice {
    pub customer_id: RecordId,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub issue: String,
}

impl NewDevice {
    pub fn new(customer_id: RecordId, brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            customer_id,
            brand: brand.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = serial.into();
        self
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issue = issue.into();
        self
    }

    pub fn into_record(self, id: RecordId) -> Result<Device, ShopError> {
        Ok(Device {
            id,
            customer_id: self.customer_id,
            brand: required("brand", &self.brand)?,
            model: required("model", &self.model)?,
            serial: self.serial.trim().to_string(),
            issue: self.issue.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{EntityKind, Record};

    #[test]
    fn test_parent_is_customer() {
        let device = NewDevice::new(4, "Apple", "iPhone 12").into_record(9).unwrap();
        assert_eq!(device.parent(), Some((EntityKind::Customer, 4)));
        assert_eq!(device.label(), "Apple iPhone 12");
        assert_eq!(device.field_value("customer_id").unwrap().as_integer(), Some(4));
    }

    #[test]
    fn test_model_is_required() {
        let err = NewDevice::new(1, "Dell", "").into_record(0).unwrap_err();
        assert!(err.to_string().contains("model"));
    }
}
