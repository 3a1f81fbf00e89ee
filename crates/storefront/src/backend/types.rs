//! Backend wire types.

use chrono::NaiveDate;
use lemanshop_core::{
    Canton, DeliveryType, Email, Language, OrderId, Phone, PostalCode, ProductId, StationId,
    StoreId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A railway station served by station delivery.
///
/// Fields the backend adds beyond the ones modelled here are passed through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RailwayStation {
    pub id: StationId,
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A store where orders can be picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupLocation {
    pub id: StoreId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `{ data: [...] }` envelope used by the station directory.
#[derive(Debug, Deserialize)]
pub(super) struct DataEnvelope<T> {
    pub data: Vec<T>,
}

/// Body of `POST /api/orders`.
///
/// Exactly one of `addressDelivery`, `stationDelivery` or `pickupDelivery` is
/// present, matching `deliveryType`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub customer: OrderCustomer,
    pub delivery_type: DeliveryType,
    #[serde(flatten)]
    pub delivery: OrderDelivery,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_cost: Decimal,
    pub delivery_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time_slot: Option<String>,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
}

/// Variant-specific delivery details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OrderDelivery {
    AddressDelivery {
        street: String,
        postal_code: PostalCode,
        city: String,
        canton: Canton,
    },
    StationDelivery {
        station_id: StationId,
    },
    PickupDelivery {
        store_id: StoreId,
    },
}

impl OrderDelivery {
    #[must_use]
    pub const fn delivery_type(&self) -> DeliveryType {
        match self {
            Self::AddressDelivery { .. } => DeliveryType::Address,
            Self::StationDelivery { .. } => DeliveryType::RailwayStation,
            Self::PickupDelivery { .. } => DeliveryType::Pickup,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

/// Payment methods accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Twint,
    Invoice,
    CashOnPickup,
}

impl PaymentMethod {
    /// Parse the wire name (`CARD`, `TWINT`, ...). Case-insensitive.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CARD" => Some(Self::Card),
            "TWINT" => Some(Self::Twint),
            "INVOICE" => Some(Self::Invoice),
            "CASH_ON_PICKUP" => Some(Self::CashOnPickup),
            _ => None,
        }
    }
}

/// Backend answer to `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_station_keeps_unknown_fields() {
        let json = serde_json::json!({
            "id": "lausanne",
            "name": "Lausanne",
            "platform": "Kiss & Ride",
        });
        let station: RailwayStation = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(station.id.as_str(), "lausanne");
        assert_eq!(serde_json::to_value(&station).unwrap(), json);
    }

    fn payload(delivery: OrderDelivery) -> OrderPayload {
        OrderPayload {
            customer: OrderCustomer {
                first_name: "Anna".to_string(),
                last_name: "Muller".to_string(),
                email: Email::parse("anna@example.ch").unwrap(),
                phone: Phone::parse("079 123 45 67").unwrap(),
            },
            delivery_type: delivery.delivery_type(),
            delivery,
            delivery_cost: Decimal::ZERO,
            delivery_date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            delivery_time_slot: None,
            payment_method: PaymentMethod::Twint,
            items: vec![OrderItem {
                product_id: ProductId::new("gruyere-aop"),
                name: None,
                quantity: 2,
                unit_price: Decimal::new(2450, 2),
            }],
            total_price: Decimal::new(4900, 2),
            language: Language::Fr,
        }
    }

    #[test]
    fn test_order_payload_has_single_variant() {
        let json = serde_json::to_value(payload(OrderDelivery::AddressDelivery {
            street: "Rue de Rive 3".to_string(),
            postal_code: PostalCode::parse("1260").unwrap(),
            city: "Nyon".to_string(),
            canton: Canton::VD,
        }))
        .unwrap();

        assert_eq!(json["deliveryType"], "ADDRESS");
        assert_eq!(json["addressDelivery"]["postalCode"], "1260");
        assert_eq!(json["addressDelivery"]["canton"], "VD");
        assert!(json.get("stationDelivery").is_none());
        assert!(json.get("pickupDelivery").is_none());
        assert_eq!(json["deliveryCost"], 0.0);
        assert_eq!(json["deliveryDate"], "2026-10-17");
        assert_eq!(json["paymentMethod"], "TWINT");
        assert_eq!(json["items"][0]["productId"], "gruyere-aop");
        assert_eq!(json["items"][0]["unitPrice"], 24.5);
        assert!(json.get("deliveryTimeSlot").is_none());
    }

    #[test]
    fn test_order_payload_station_variant() {
        let json = serde_json::to_value(payload(OrderDelivery::StationDelivery {
            station_id: StationId::new("morges"),
        }))
        .unwrap();
        assert_eq!(json["deliveryType"], "RAILWAY_STATION");
        assert_eq!(json["stationDelivery"]["stationId"], "morges");
        assert!(json.get("addressDelivery").is_none());
    }

    #[test]
    fn test_payment_method_from_wire() {
        assert_eq!(PaymentMethod::from_wire("twint"), Some(PaymentMethod::Twint));
        assert_eq!(
            PaymentMethod::from_wire("CASH_ON_PICKUP"),
            Some(PaymentMethod::CashOnPickup)
        );
        assert_eq!(PaymentMethod::from_wire("bitcoin"), None);
    }

    #[test]
    fn test_order_confirmation_number_optional() {
        let confirmation: OrderConfirmation =
            serde_json::from_value(serde_json::json!({ "id": "ord_42" })).unwrap();
        assert_eq!(confirmation.id.as_str(), "ord_42");
        assert!(confirmation.order_number.is_none());
    }
}
