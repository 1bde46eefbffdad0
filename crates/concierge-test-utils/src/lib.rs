// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Concierge integration tests.
//!
//! Provides a seeded catalog and a test harness that wires a temp SQLite
//! store, the broadcast feed and the desk together, for fast, deterministic
//! tests without external services.
//!
//! # Components
//!
//! - [`TestHarness`] - Desk over a temp database with a live feed
//! - [`catalog`] - Reference categories and services used by the tests

pub mod catalog;
pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder};
