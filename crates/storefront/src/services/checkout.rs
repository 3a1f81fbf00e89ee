//! Checkout submission.
//!
//! The client's delivery section already enforces the rules, but nothing it
//! sends is trusted: the order is validated field by field, the postal code
//! is resolved again and eligibility and the delivery date are re-checked
//! against today's schedule before anything reaches the backend.

use chrono::NaiveDate;
use lemanshop_core::{
    Canton, DeliveryType, Email, Language, OrderId, Phone, PostalCode, ProductId, StationId,
    StoreId,
};
use lemanshop_delivery::{CartSnapshot, DeliveryCheckout, EligibilityResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::backend::{
    BackendError, OrderCustomer, OrderDelivery, OrderItem, OrderPayload, PaymentMethod,
};
use crate::error::{AppError, FieldErrors, Result, add_breadcrumb};
use crate::i18n;
use crate::middleware::RequestId;
use crate::services::sendpulse::{ContactSource, CrmContact};
use crate::state::AppState;

// =============================================================================
// Request
// =============================================================================

/// Body of `POST /api/checkout`, as sent by the client.
///
/// Every field is optional here so that missing values are reported as field
/// errors rather than as a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutRequest {
    pub customer: CustomerInput,
    pub delivery: DeliveryInput,
    pub delivery_date: Option<String>,
    pub delivery_time_slot: Option<String>,
    pub payment_method: Option<String>,
    pub items: Vec<ItemInput>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryInput {
    #[serde(rename = "type")]
    pub delivery_type: Option<String>,
    pub canton: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub station_id: Option<String>,
    pub store_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemInput {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Decimal>,
}

/// A checkout whose fields are individually valid.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCheckout {
    pub customer: OrderCustomer,
    pub delivery: OrderDelivery,
    pub delivery_date: NaiveDate,
    pub delivery_time_slot: Option<String>,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    cart_total: Decimal,
    pub language: Language,
}

/// What the client gets back after a successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub delivery_date: NaiveDate,
    pub delivery_summary: String,
    pub eligibility: EligibilityResult,
    /// Quoted by customers when they contact support.
    pub request_id: String,
}

/// Trimmed, non-empty value of an optional field.
fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Sum of `unit_price * quantity`, or `None` if it does not fit a `Decimal`.
fn checked_total(items: &[OrderItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        item.unit_price
            .checked_mul(Decimal::from(item.quantity))
            .and_then(|line| total.checked_add(line))
    })
}

fn required<'a>(errors: &mut FieldErrors, field: &str, value: Option<&'a String>) -> Option<&'a str> {
    let value = present(value);
    if value.is_none() {
        errors.add(field, "This field is required");
    }
    value
}

impl CheckoutRequest {
    /// Check every field, collecting all errors.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors if any field is invalid.
    pub fn validate(&self) -> std::result::Result<ValidatedCheckout, FieldErrors> {
        let mut errors = FieldErrors::new();

        let customer = self.customer.validate(&mut errors);
        let delivery = self.delivery.validate(&mut errors);

        let delivery_date = required(&mut errors, "deliveryDate", self.delivery_date.as_ref())
            .and_then(|raw| match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("deliveryDate", "Expected a date formatted as YYYY-MM-DD");
                    None
                }
            });

        let payment_method = required(&mut errors, "paymentMethod", self.payment_method.as_ref())
            .and_then(|raw| {
                let method = PaymentMethod::from_wire(raw);
                if method.is_none() {
                    errors.add("paymentMethod", "Unknown payment method");
                }
                method
            });

        if self.items.is_empty() {
            errors.add("items", "The cart is empty");
        }
        let items: Vec<Option<OrderItem>> = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| item.validate(index, &mut errors))
            .collect();
        let items: Vec<OrderItem> = items.into_iter().flatten().collect();
        let cart_total = checked_total(&items);
        if cart_total.is_none() {
            errors.add("items", "Cart total is out of range");
        }

        let language = Language::from_tag_or_default(self.lang.as_deref());
        let delivery_time_slot = present(self.delivery_time_slot.as_ref()).map(str::to_owned);

        match (customer, delivery, delivery_date, payment_method, cart_total) {
            (
                Some(customer),
                Some(delivery),
                Some(delivery_date),
                Some(payment_method),
                Some(cart_total),
            ) if errors.is_empty() => Ok(ValidatedCheckout {
                customer,
                delivery,
                delivery_date,
                delivery_time_slot,
                payment_method,
                items,
                cart_total,
                language,
            }),
            _ => Err(errors),
        }
    }
}

impl CustomerInput {
    fn validate(&self, errors: &mut FieldErrors) -> Option<OrderCustomer> {
        let first_name = required(errors, "customer.firstName", self.first_name.as_ref());
        let last_name = required(errors, "customer.lastName", self.last_name.as_ref());

        let email = required(errors, "customer.email", self.email.as_ref()).and_then(|raw| {
            Email::parse(raw)
                .map_err(|e| errors.add("customer.email", e.to_string()))
                .ok()
        });

        let phone = required(errors, "customer.phone", self.phone.as_ref()).and_then(|raw| {
            match Phone::parse(raw) {
                Ok(phone) if phone.is_swiss() => Some(phone),
                Ok(_) => {
                    errors.add("customer.phone", "Please enter a Swiss phone number");
                    None
                }
                Err(e) => {
                    errors.add("customer.phone", e.to_string());
                    None
                }
            }
        });

        Some(OrderCustomer {
            first_name: first_name?.to_owned(),
            last_name: last_name?.to_owned(),
            email: email?,
            phone: phone?,
        })
    }
}

impl DeliveryInput {
    fn validate(&self, errors: &mut FieldErrors) -> Option<OrderDelivery> {
        let delivery_type = required(errors, "delivery.type", self.delivery_type.as_ref())
            .and_then(|raw| {
                let delivery_type = DeliveryType::from_wire(raw);
                if delivery_type.is_none() {
                    errors.add("delivery.type", "Unknown delivery type");
                }
                delivery_type
            })?;

        match delivery_type {
            DeliveryType::Address => {
                let street = required(errors, "delivery.street", self.street.as_ref());
                let postal_code = required(errors, "delivery.postalCode", self.postal_code.as_ref())
                    .and_then(|raw| {
                        PostalCode::parse(raw)
                            .map_err(|e| errors.add("delivery.postalCode", e.to_string()))
                            .ok()
                    });
                let city = required(errors, "delivery.city", self.city.as_ref());
                let canton = required(errors, "delivery.canton", self.canton.as_ref()).and_then(
                    |raw| {
                        let canton = Canton::from_code(raw);
                        if canton.is_none() {
                            errors.add("delivery.canton", "We only deliver to Geneva and Vaud");
                        }
                        canton
                    },
                );

                Some(OrderDelivery::AddressDelivery {
                    street: street?.to_owned(),
                    postal_code: postal_code?,
                    city: city?.to_owned(),
                    canton: canton?,
                })
            }
            DeliveryType::RailwayStation => {
                let station_id = required(errors, "delivery.stationId", self.station_id.as_ref())?;
                Some(OrderDelivery::StationDelivery {
                    station_id: StationId::new(station_id),
                })
            }
            DeliveryType::Pickup => {
                let store_id = required(errors, "delivery.storeId", self.store_id.as_ref())?;
                Some(OrderDelivery::PickupDelivery {
                    store_id: StoreId::new(store_id),
                })
            }
        }
    }
}

impl ItemInput {
    fn validate(&self, index: usize, errors: &mut FieldErrors) -> Option<OrderItem> {
        let field = |name: &str| format!("items[{index}].{name}");

        let product_id = required(errors, &field("productId"), self.product_id.as_ref());

        let quantity = match self.quantity {
            None => {
                errors.add(field("quantity"), "This field is required");
                None
            }
            Some(quantity) => match u32::try_from(quantity) {
                Ok(quantity) if quantity > 0 => Some(quantity),
                _ => {
                    errors.add(field("quantity"), "Quantity must be a positive number");
                    None
                }
            },
        };

        let unit_price = match self.unit_price {
            None => {
                errors.add(field("unitPrice"), "This field is required");
                None
            }
            Some(price) if price.is_sign_negative() && !price.is_zero() => {
                errors.add(field("unitPrice"), "Price cannot be negative");
                None
            }
            Some(price) => Some(price),
        };

        Some(OrderItem {
            product_id: ProductId::new(product_id?),
            name: present(self.name.as_ref()).map(str::to_owned),
            quantity: quantity?,
            unit_price: unit_price?,
        })
    }
}

impl ValidatedCheckout {
    #[must_use]
    pub const fn delivery_type(&self) -> DeliveryType {
        self.delivery.delivery_type()
    }

    /// Sum of `unit_price * quantity` over all items.
    #[must_use]
    pub const fn cart_total(&self) -> Decimal {
        self.cart_total
    }

    #[must_use]
    pub const fn canton(&self) -> Option<Canton> {
        match &self.delivery {
            OrderDelivery::AddressDelivery { canton, .. } => Some(*canton),
            OrderDelivery::StationDelivery { .. } | OrderDelivery::PickupDelivery { .. } => None,
        }
    }

    #[must_use]
    pub const fn postal_code(&self) -> Option<PostalCode> {
        match &self.delivery {
            OrderDelivery::AddressDelivery { postal_code, .. } => Some(*postal_code),
            OrderDelivery::StationDelivery { .. } | OrderDelivery::PickupDelivery { .. } => None,
        }
    }

    /// The customer as a CRM contact.
    #[must_use]
    pub fn crm_contact(&self) -> CrmContact {
        CrmContact {
            email: self.customer.email.clone(),
            first_name: Some(self.customer.first_name.clone()),
            last_name: Some(self.customer.last_name.clone()),
            phone: Some(self.customer.phone.clone()),
            language: self.language,
            source: ContactSource::Checkout,
        }
    }

    /// Build the backend order. Delivery is always free.
    #[must_use]
    pub fn into_order(self) -> OrderPayload {
        let total_price = self.cart_total;
        OrderPayload {
            customer: self.customer,
            delivery_type: self.delivery.delivery_type(),
            delivery: self.delivery,
            delivery_cost: Decimal::ZERO,
            delivery_date: self.delivery_date,
            delivery_time_slot: self.delivery_time_slot,
            payment_method: self.payment_method,
            items: self.items,
            total_price,
            language: self.language,
        }
    }

    /// Replay the delivery selection through the checkout model.
    ///
    /// `state` provides today's date, the rules and the city resolver.
    async fn delivery_state(&self, state: &AppState, cart: CartSnapshot) -> DeliveryCheckout {
        let mut checkout = DeliveryCheckout::new(state.rules().clone(), state.today(), self.language);
        checkout.set_delivery_type(Some(self.delivery_type()));
        checkout.set_canton(self.canton());
        checkout.set_cart(cart);

        match &self.delivery {
            OrderDelivery::AddressDelivery { postal_code, .. } => {
                if let Some(ticket) = checkout.set_postal_code(postal_code.as_str()) {
                    let outcome = state.resolver().resolve(ticket.postal_code()).await;
                    checkout.apply_lookup(ticket, &outcome);
                }
            }
            OrderDelivery::StationDelivery { station_id } => {
                checkout.set_station(Some(station_id.clone()));
            }
            OrderDelivery::PickupDelivery { store_id } => {
                checkout.set_store(Some(store_id.clone()));
            }
        }
        checkout
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Validate, re-check and submit an order.
///
/// # Errors
///
/// - `AppError::Validation` for invalid fields or an unavailable date
/// - `AppError::NotEligible` if the cart does not qualify for the delivery type
/// - `AppError::Backend` if the backend is missing or rejects the order
#[instrument(skip(state, request, request_id), fields(request_id = %request_id.0))]
pub async fn submit(
    state: &AppState,
    request: &CheckoutRequest,
    request_id: &RequestId,
) -> Result<CheckoutReceipt> {
    let checkout = request.validate().map_err(AppError::Validation)?;

    let cart = CartSnapshot::new(checkout.cart_total())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let mut delivery = checkout.delivery_state(state, cart).await;

    let eligibility = delivery.eligibility().clone();
    if !eligibility.is_valid {
        info!(
            delivery_type = %checkout.delivery_type(),
            cart_total = %cart.total_price(),
            "Checkout rejected: delivery minimum not reached"
        );
        return Err(AppError::NotEligible(eligibility.message));
    }

    if let Err(e) = delivery.select_date(checkout.delivery_date) {
        return Err(AppError::field("deliveryDate", e.to_string()));
    }
    if !delivery.is_submittable() {
        return Err(AppError::BadRequest(
            "Delivery selection is incomplete".to_string(),
        ));
    }

    let backend = state.backend().ok_or(BackendError::NotConfigured)?;

    let contact = checkout.crm_contact();
    let delivery_summary = i18n::delivery_summary(
        checkout.language,
        checkout.delivery_type(),
        checkout.delivery_date,
    );
    let delivery_date = checkout.delivery_date;
    let order = checkout.into_order();

    let confirmation = backend.submit_order(&order).await?;

    add_breadcrumb(
        "checkout",
        "Order submitted",
        Some(&[
            ("order_id", confirmation.id.as_str()),
            ("delivery_type", order.delivery_type.as_wire()),
            ("request_id", request_id.0.as_str()),
        ]),
    );
    info!(
        order_id = %confirmation.id,
        delivery_type = %order.delivery_type,
        delivery_date = %delivery_date,
        "Order submitted"
    );

    state.enqueue_contact(contact);

    Ok(CheckoutReceipt {
        order_id: confirmation.id,
        order_number: confirmation.order_number,
        delivery_date,
        delivery_summary,
        eligibility,
        request_id: request_id.0.clone(),
    })
}
