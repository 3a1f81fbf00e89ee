//! Delivery types and the cantons the shop delivers to.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Swiss canton served by home delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Canton {
    /// Vaud.
    VD,
    /// Geneva.
    GE,
}

impl Canton {
    /// Parse a canton code, case-insensitively. Unknown codes return `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "VD" => Some(Self::VD),
            "GE" => Some(Self::GE),
            _ => None,
        }
    }

    /// Two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::VD => "VD",
            Self::GE => "GE",
        }
    }
}

impl fmt::Display for Canton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    /// Collected by the customer at a pickup location.
    Pickup,
    /// Delivered to a street address.
    Address,
    /// Handed over at a railway station.
    RailwayStation,
}

impl DeliveryType {
    /// All delivery types, in display order.
    pub const ALL: [Self; 3] = [Self::Pickup, Self::Address, Self::RailwayStation];

    /// Parse the wire name (`PICKUP`, `ADDRESS`, `RAILWAY_STATION`).
    ///
    /// Anything else, including an empty string, is an unknown delivery type.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "PICKUP" => Some(Self::Pickup),
            "ADDRESS" => Some(Self::Address),
            "RAILWAY_STATION" => Some(Self::RailwayStation),
            _ => None,
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Pickup => "PICKUP",
            Self::Address => "ADDRESS",
            Self::RailwayStation => "RAILWAY_STATION",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_canton_from_code() {
        assert_eq!(Canton::from_code("vd"), Some(Canton::VD));
        assert_eq!(Canton::from_code(" GE "), Some(Canton::GE));
        assert_eq!(Canton::from_code("ZH"), None);
    }

    #[test]
    fn test_delivery_type_wire_names_match_serde() {
        for delivery_type in DeliveryType::ALL {
            let json = serde_json::to_string(&delivery_type).unwrap();
            assert_eq!(json, format!("\"{}\"", delivery_type.as_wire()));
            assert_eq!(DeliveryType::from_wire(delivery_type.as_wire()), Some(delivery_type));
        }
        assert_eq!(DeliveryType::from_wire("DRONE"), None);
        assert_eq!(DeliveryType::from_wire(""), None);
    }
}
