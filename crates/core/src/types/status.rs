//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Orders are created as [`OrderStatus::OnProcess`]. Any status may be set
/// from any other status; there is no forward-only progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "On Process")]
    OnProcess,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl OrderStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::OnProcess, Self::Shipped, Self::Delivered];

    /// The stored label for this status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnProcess => "On Process",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    /// Accepts the stored label as well as kebab/snake-case spellings
    /// (`on-process`, `on_process`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "on process" => Ok(Self::OnProcess),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment method recorded on an order.
///
/// Payment processing is out of scope; every order carries the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CashOnDelivery => f.write_str("Cash on Delivery"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_to_stored_label() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OnProcess).unwrap(),
            "\"On Process\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"Delivered\"").unwrap();
        assert_eq!(parsed, OrderStatus::Delivered);
    }

    #[test]
    fn test_status_rejects_unknown_label() {
        assert!(serde_json::from_str::<OrderStatus>("\"Cancelled\"").is_err());
    }

    #[test]
    fn test_status_from_str_spellings() {
        assert_eq!("On Process".parse::<OrderStatus>().unwrap(), OrderStatus::OnProcess);
        assert_eq!("on-process".parse::<OrderStatus>().unwrap(), OrderStatus::OnProcess);
        assert_eq!("SHIPPED".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_default_status_is_on_process() {
        assert_eq!(OrderStatus::default(), OrderStatus::OnProcess);
    }

    #[test]
    fn test_payment_method_label() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"Cash on Delivery\""
        );
        assert_eq!(PaymentMethod::CashOnDelivery.to_string(), "Cash on Delivery");
    }
}
