//! Core types for store metrics reporting.
//!
//! This module provides type-safe wrappers and read-only records for the
//! order/subscription store.

pub mod billing;
pub mod contact;
pub mod email;
pub mod id;
pub mod order;
pub mod period;
pub mod status;
pub mod subscription;

pub use billing::{BillingPeriod, BillingSchedule};
pub use contact::{BillingContact, BillingDetails};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{LineItem, Order, product_names};
pub use period::Period;
pub use status::*;
pub use subscription::Subscription;
