//! Delivery date scheduler.
//!
//! Dates are offered from tomorrow (24h notice) to today + 14 days, filtered
//! to the weekdays the chosen delivery type runs on:
//!
//! - `RAILWAY_STATION`: Monday
//! - `ADDRESS` in Vaud: Saturday
//! - `ADDRESS` in Geneva, or no canton yet: Monday
//! - `PICKUP`: Saturday to Tuesday

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use lemanshop_core::{Canton, DeliveryType, Language};
use serde::Serialize;

use crate::messages;
use crate::rules::DeliveryRules;

/// One selectable delivery date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOption {
    /// Calendar date, serialised as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// 0 = Sunday ... 6 = Saturday.
    pub day_of_week: u8,
    /// Start of the delivery day, for clients that format timestamps.
    pub full_date: NaiveDateTime,
}

impl DateOption {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        let day_of_week = u8::try_from(date.weekday().num_days_from_sunday()).unwrap_or_default();
        Self {
            date,
            day_of_week,
            full_date: date.and_time(NaiveTime::MIN),
        }
    }

    /// Human-readable label such as `samedi 17 octobre`.
    #[must_use]
    pub fn label(&self, language: Language) -> String {
        messages::date_label(self.date, language)
    }
}

/// Generated dates plus the default the caller should apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSchedule {
    pub options: Vec<DateOption>,
    /// Date to select when the caller has no valid selection. The scheduler
    /// never changes the caller's state itself.
    pub suggested: Option<NaiveDate>,
}

impl DateSchedule {
    /// Whether `date` is one of the offered options.
    #[must_use]
    pub fn offers(&self, date: NaiveDate) -> bool {
        self.options.iter().any(|option| option.date == date)
    }
}

/// Weekdays a delivery type runs on.
#[must_use]
pub const fn allowed_weekdays(delivery_type: DeliveryType, canton: Option<Canton>) -> &'static [Weekday] {
    match (delivery_type, canton) {
        (DeliveryType::RailwayStation, _) | (DeliveryType::Address, Some(Canton::GE) | None) => {
            &[Weekday::Mon]
        }
        (DeliveryType::Address, Some(Canton::VD)) => &[Weekday::Sat],
        (DeliveryType::Pickup, _) => &[Weekday::Sat, Weekday::Sun, Weekday::Mon, Weekday::Tue],
    }
}

impl DeliveryRules {
    /// All offered dates for a delivery type, ascending.
    #[must_use]
    pub fn delivery_dates(
        &self,
        delivery_type: DeliveryType,
        canton: Option<Canton>,
        today: NaiveDate,
    ) -> Vec<DateOption> {
        let allowed = allowed_weekdays(delivery_type, canton);
        (self.notice_days..=self.window_days)
            .filter_map(|offset| today.checked_add_days(Days::new(u64::from(offset))))
            .filter(|date| allowed.contains(&date.weekday()))
            .map(DateOption::new)
            .collect()
    }

    /// Offered dates plus the default to apply given the current selection.
    #[must_use]
    pub fn schedule(
        &self,
        delivery_type: DeliveryType,
        canton: Option<Canton>,
        today: NaiveDate,
        selected: Option<NaiveDate>,
    ) -> DateSchedule {
        let options = self.delivery_dates(delivery_type, canton, today);
        let suggested = suggest_default(&options, selected);
        DateSchedule { options, suggested }
    }
}

/// Offered dates under the default rules.
#[must_use]
pub fn generate_dates(
    delivery_type: DeliveryType,
    canton: Option<Canton>,
    today: NaiveDate,
) -> Vec<DateOption> {
    DeliveryRules::default().delivery_dates(delivery_type, canton, today)
}

/// The first offered date, unless `selected` is already one of the options.
#[must_use]
pub fn suggest_default(options: &[DateOption], selected: Option<NaiveDate>) -> Option<NaiveDate> {
    if selected.is_some_and(|date| options.iter().any(|option| option.date == date)) {
        return None;
    }
    options.first().map(|option| option.date)
}
