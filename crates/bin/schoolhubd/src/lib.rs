//! # schoolhubd — schoolhub automation daemon
//!
//! Composition root that wires all adapters together and runs the scheduler.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct the engine, scheduler and rule service, injecting adapters via port traits
//! - Run the scheduler until shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

pub mod config;
pub mod wiring;
