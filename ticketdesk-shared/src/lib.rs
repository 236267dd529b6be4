//! # TicketDesk Shared Library
//!
//! This crate contains the domain types, persistence and business logic used
//! by the TicketDesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Database entities (users, employees, tickets) and their queries
//! - `store`: The `EntityStore` contract with PostgreSQL and in-memory backends
//! - `services`: Ticket listing, ticket creation and lookup operations
//! - `dto`: Flattened representations returned over the API boundary
//! - `auth`: Shared-secret API key validation
//! - `db`: Connection pooling, migrations and seed data

pub mod auth;
pub mod db;
pub mod dto;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the TicketDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
