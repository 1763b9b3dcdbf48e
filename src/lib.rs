// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Turbo Badges client library
//!
//! This library provides the client side of the Turbo Badges application:
//! the session manager that keeps a short-lived access credential alive,
//! role-based access decisions, profile mutations and the local badge roster.

pub mod config;
pub mod guard;
pub mod models;
pub mod roster;
pub mod session;
pub mod utility;

pub use session::{SessionError, SessionManager, SessionSnapshot};
