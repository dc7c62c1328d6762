// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Agent injection into running pods and the marker guarding it.

pub mod marker;
pub mod pipeline;

pub use marker::{is_processed, InjectionState};
pub use pipeline::{InjectionReport, Injector};
