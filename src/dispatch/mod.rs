// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Routing of cluster events to exporter and pod reconciliation.

pub mod dispatcher;
pub mod event;
pub mod reconciler;

pub use dispatcher::{EventDispatcher, EventDispatcherHandle};
pub use event::ClusterEvent;
pub use reconciler::Reconciler;
