// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for wikictl integration tests.
//!
//! # Components
//!
//! - [`TestHarness`] - temp-dir credential store with fast KDF parameters
//! - [`MockLegacySource`] - in-memory legacy credentials, no process environment

pub mod harness;
pub mod mock_legacy;

pub use harness::TestHarness;
pub use mock_legacy::MockLegacySource;
