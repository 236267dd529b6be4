//! # TicketDesk API Server Library
//!
//! This library provides the HTTP layer of the TicketDesk support ticket
//! service.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Problem-details errors and HTTP response mapping
//! - `middleware`: API key gate
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
