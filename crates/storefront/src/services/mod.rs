//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Order validation and submission
//! - `sendpulse` - `SendPulse` CRM client
//! - `crm_queue` - Background queue feeding the CRM client

pub mod checkout;
pub mod crm_queue;
pub mod sendpulse;

pub use checkout::{CheckoutReceipt, CheckoutRequest, ValidatedCheckout};
pub use crm_queue::{ContactSink, CrmQueueStats, CrmSyncQueue, CrmSyncWorker};
pub use sendpulse::{ContactSource, CrmContact, SendPulseClient, SendPulseError, SyncOutcome};
