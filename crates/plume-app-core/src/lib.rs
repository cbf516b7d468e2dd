// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for Plume tools (settings, notices, formatting).
//! Keeps UI/runtime adapters thin and framework-agnostic.

pub mod config;
pub mod format;
pub mod notice;
pub mod settings;
