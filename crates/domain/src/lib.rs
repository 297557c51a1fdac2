//! # schoolhub-domain
//!
//! Pure domain model for schoolhub's automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Tenants** (schools owning rules and a timezone)
//! - Define **Automation rules** (trigger → condition → action) and their validation
//! - Evaluate **Conditions** (JSON predicate trees) against event payloads
//! - Parse and match five-field **Cron** expressions
//! - Describe **Outbox** records written as side effects
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod condition;
pub mod cron;
pub mod outbox;
pub mod tenant;
