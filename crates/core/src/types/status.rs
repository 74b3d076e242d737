//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The backend is not consistent about casing, so parsing is
/// case-insensitive and unrecognized values map to [`OrderStatus::Unknown`]
/// instead of failing the whole order payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    /// Wire value sent to the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Whether no further transitions are expected.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    fn parse_lenient(s: &str) -> Self {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "pending" => Self::Pending,
            "accepted" | "confirmed" => Self::Accepted,
            "preparing" => Self::Preparing,
            "ready" => Self::Ready,
            "out_for_delivery" | "outfordelivery" => Self::OutForDelivery,
            "delivered" | "completed" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse_lenient(s) {
            Self::Unknown => Err(format!("invalid order status: {s}")),
            status => Ok(status),
        }
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Role carried in the cached user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform operator with access to every vendor.
    Admin,
    /// Store owner limited to their own catalog and orders.
    Vendor,
    /// End customer.
    Customer,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Vendor => write!(f, "vendor"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "vendor" => Ok(Self::Vendor),
            "customer" | "user" => Ok(Self::Customer),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_lenient_parsing() {
        let status: OrderStatus = serde_json::from_str("\"OUT_FOR_DELIVERY\"").expect("status");
        assert_eq!(status, OrderStatus::OutForDelivery);

        let status: OrderStatus = serde_json::from_str("\"Canceled\"").expect("status");
        assert_eq!(status, OrderStatus::Cancelled);

        let status: OrderStatus = serde_json::from_str("\"on-hold\"").expect("status");
        assert_eq!(status, OrderStatus::Unknown);
    }

    #[test]
    fn test_order_status_round_trips_wire_value() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).expect("serialize");
        assert_eq!(json, "\"out_for_delivery\"");
    }

    #[test]
    fn test_order_status_from_str_rejects_unknown() {
        assert_eq!("ready".parse::<OrderStatus>(), Ok(OrderStatus::Ready));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Preparing.is_terminal());
    }

    #[test]
    fn test_user_role_parse() {
        assert_eq!("Vendor".parse::<UserRole>(), Ok(UserRole::Vendor));
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert!("root".parse::<UserRole>().is_err());
    }
}
