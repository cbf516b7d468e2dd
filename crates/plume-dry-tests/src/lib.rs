// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Plume crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`confirm`] - Confirm port whose calls the test resolves by hand
//! - [`observer`] - Observer that records every coordinator event

pub mod config;
pub mod confirm;
pub mod observer;

pub use config::InMemoryConfigStore;
pub use confirm::{ConfirmMode, ScriptedConfirm};
pub use observer::RecordingObserver;
