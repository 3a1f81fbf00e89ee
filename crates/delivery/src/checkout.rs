//! Framework-free model of the checkout delivery section.
//!
//! [`DeliveryCheckout`] holds what the customer has chosen so far and derives
//! eligibility and the date schedule from it. It never performs I/O: when a
//! postal code becomes resolvable it hands out a [`LookupTicket`], and the
//! caller reports the answer back with [`DeliveryCheckout::apply_lookup`].
//! Tickets carry a generation number, so an answer for a postal code the
//! customer has since changed is dropped instead of overwriting newer state.

use chrono::NaiveDate;
use lemanshop_core::{Canton, DeliveryType, Language, PostalCode, PostalCodeInput, StationId, StoreId};

use crate::city::{CityLookupResult, LookupOutcome};
use crate::eligibility::{CartSnapshot, EligibilityResult};
use crate::memo::{EligibilityKey, EligibilityMemo};
use crate::rules::DeliveryRules;
use crate::schedule::{DateOption, suggest_default};

/// A postal-code lookup the caller should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    postal_code: PostalCode,
}

impl LookupTicket {
    #[must_use]
    pub const fn postal_code(&self) -> PostalCode {
        self.postal_code
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// The chosen date is not among the offered options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("delivery date {0} is not available for this delivery option")]
pub struct DateNotOffered(pub NaiveDate);

/// Delivery state of one checkout.
#[derive(Debug)]
pub struct DeliveryCheckout {
    rules: DeliveryRules,
    today: NaiveDate,
    language: Language,

    delivery_type: Option<DeliveryType>,
    canton: Option<Canton>,
    postal_code: PostalCodeInput,
    city: Option<CityLookupResult>,
    station_id: Option<StationId>,
    store_id: Option<StoreId>,
    cart: CartSnapshot,
    selected_date: Option<NaiveDate>,

    schedule: Vec<DateOption>,
    schedule_key: Option<(DeliveryType, Option<Canton>)>,
    generation: u64,
    memo: EligibilityMemo,
}

impl DeliveryCheckout {
    #[must_use]
    pub fn new(rules: DeliveryRules, today: NaiveDate, language: Language) -> Self {
        Self {
            rules,
            today,
            language,
            delivery_type: None,
            canton: None,
            postal_code: PostalCodeInput::Empty,
            city: None,
            station_id: None,
            store_id: None,
            cart: CartSnapshot::empty(),
            selected_date: None,
            schedule: Vec::new(),
            schedule_key: None,
            generation: 0,
            memo: EligibilityMemo::new(),
        }
    }

    pub fn set_delivery_type(&mut self, delivery_type: Option<DeliveryType>) {
        self.delivery_type = delivery_type;
        self.refresh_schedule();
    }

    pub fn set_canton(&mut self, canton: Option<Canton>) {
        self.canton = canton;
        self.refresh_schedule();
    }

    /// Update the postal-code field with raw input.
    ///
    /// Returns a ticket when the input is a complete postal code different
    /// from the previous one. Any change invalidates outstanding tickets and
    /// the previously resolved city.
    pub fn set_postal_code(&mut self, raw: &str) -> Option<LookupTicket> {
        let input = PostalCodeInput::classify(raw);
        if input == self.postal_code {
            return None;
        }
        self.postal_code = input;
        self.city = None;
        self.generation += 1;

        input.complete().map(|postal_code| LookupTicket {
            generation: self.generation,
            postal_code,
        })
    }

    /// Report the outcome of a lookup. Returns `false` for stale tickets.
    pub fn apply_lookup(&mut self, ticket: LookupTicket, outcome: &LookupOutcome) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                postal_code = %ticket.postal_code,
                ticket = ticket.generation,
                current = self.generation,
                "Dropping stale postal code lookup"
            );
            return false;
        }
        self.city = outcome.city().cloned();
        self.memo.invalidate();
        true
    }

    pub fn set_cart(&mut self, cart: CartSnapshot) {
        self.cart = cart;
    }

    pub fn set_station(&mut self, station_id: Option<StationId>) {
        self.station_id = station_id;
    }

    pub fn set_store(&mut self, store_id: Option<StoreId>) {
        self.store_id = store_id;
    }

    /// Choose a delivery date.
    ///
    /// # Errors
    ///
    /// Returns [`DateNotOffered`] if the date is not in the current schedule.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), DateNotOffered> {
        if !self.schedule.iter().any(|option| option.date == date) {
            return Err(DateNotOffered(date));
        }
        self.selected_date = Some(date);
        Ok(())
    }

    /// Current eligibility, recomputed only when one of its inputs changed.
    pub fn eligibility(&mut self) -> &EligibilityResult {
        let key = EligibilityKey {
            delivery_type: self.delivery_type,
            postal_code: self.postal_code.complete(),
            canton: self.canton,
            cart_total: self.cart.total_price(),
        };
        self.memo.get_or_compute(key, || {
            self.rules.evaluate_in(
                self.delivery_type,
                self.canton,
                self.city.as_ref(),
                self.cart,
                self.language,
            )
        })
    }

    /// Whether the checkout may be submitted.
    pub fn is_submittable(&mut self) -> bool {
        let selection_complete = match self.delivery_type {
            None => false,
            Some(DeliveryType::Pickup) => self.store_id.as_ref().is_some_and(|id| !id.is_blank()),
            Some(DeliveryType::RailwayStation) => {
                self.station_id.as_ref().is_some_and(|id| !id.is_blank())
            }
            Some(DeliveryType::Address) => {
                self.canton.is_some() && self.postal_code.complete().is_some()
            }
        };
        selection_complete && self.selected_date.is_some() && self.eligibility().is_valid
    }

    #[must_use]
    pub fn schedule(&self) -> &[DateOption] {
        &self.schedule
    }

    #[must_use]
    pub const fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    #[must_use]
    pub const fn city(&self) -> Option<&CityLookupResult> {
        self.city.as_ref()
    }

    fn refresh_schedule(&mut self) {
        let Some(delivery_type) = self.delivery_type else {
            self.schedule.clear();
            self.schedule_key = None;
            self.selected_date = None;
            return;
        };

        let key = (delivery_type, self.canton);
        if self.schedule_key == Some(key) {
            return;
        }
        self.schedule_key = Some(key);
        self.schedule = self.rules.delivery_dates(delivery_type, self.canton, self.today);

        if let Some(suggested) = suggest_default(&self.schedule, self.selected_date) {
            self.selected_date = Some(suggested);
        } else if self.schedule.is_empty() {
            self.selected_date = None;
        }
    }
}
