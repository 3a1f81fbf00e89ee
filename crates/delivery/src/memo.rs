//! Memoised eligibility.
//!
//! Eligibility only depends on four inputs. Reactive callers re-ask on every
//! state change; recomputing (and re-publishing) an identical result can feed
//! back into another change notification, so the result is cached against
//! the exact inputs it was computed from.

use lemanshop_core::{Canton, DeliveryType, PostalCode};
use rust_decimal::Decimal;

use crate::eligibility::EligibilityResult;

/// The inputs eligibility depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityKey {
    pub delivery_type: Option<DeliveryType>,
    pub postal_code: Option<PostalCode>,
    pub canton: Option<Canton>,
    pub cart_total: Decimal,
}

/// Single-entry cache of the last eligibility result.
#[derive(Debug, Default)]
pub struct EligibilityMemo {
    last: Option<(EligibilityKey, EligibilityResult)>,
}

impl EligibilityMemo {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Return the cached result for `key`, computing it only if the key changed.
    pub fn get_or_compute(
        &mut self,
        key: EligibilityKey,
        compute: impl FnOnce() -> EligibilityResult,
    ) -> &EligibilityResult {
        let entry = match self.last.take() {
            Some((cached, result)) if cached == key => (cached, result),
            _ => {
                tracing::trace!(?key, "Recomputing delivery eligibility");
                (key, compute())
            }
        };
        &self.last.insert(entry).1
    }

    /// The cached result, if it was computed for `key`.
    #[cfg(test)]
    fn cached(&self, key: &EligibilityKey) -> Option<&EligibilityResult> {
        self.last
            .as_ref()
            .filter(|(cached, _)| cached == key)
            .map(|(_, result)| result)
    }

    /// Forget the cached result, e.g. when a postal-code lookup lands.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
