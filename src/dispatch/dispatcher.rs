// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sequential event loop between the watchers and the reconciler.

use crate::dispatch::event::ClusterEvent;
use crate::dispatch::reconciler::Reconciler;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Receives events from the watchers and reconciles them one at a time
pub struct EventDispatcher {
    reconciler: Reconciler,
    event_rx: mpsc::Receiver<ClusterEvent>,
}

/// Handle to send events to the EventDispatcher
#[derive(Clone)]
pub struct EventDispatcherHandle {
    event_tx: mpsc::Sender<ClusterEvent>,
}

impl EventDispatcherHandle {
    pub async fn send(&self, event: ClusterEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            error!("Failed to send event to EventDispatcher: {}", e);
        }
    }
}

impl EventDispatcher {
    pub fn new(reconciler: Reconciler, queue_size: usize) -> (Self, EventDispatcherHandle) {
        let (event_tx, event_rx) = mpsc::channel(queue_size.max(1));

        let dispatcher = Self {
            reconciler,
            event_rx,
        };

        let handle = EventDispatcherHandle { event_tx };
        (dispatcher, handle)
    }

    /// Runs until every handle is dropped
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("EventDispatcher started, listening for events...");

        while let Some(event) = self.event_rx.recv().await {
            debug!("Handling event: {}", event);
            let description = event.to_string();
            if let Err(e) = self.reconciler.dispatch(event).await {
                error!("Handling {} failed: {}", description, e);
            }
        }

        info!("EventDispatcher stopped, all senders closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_utils::{make_exporter, make_pod, FakeExec, MockService};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_keeps_going_after_failed_event() {
        let mock = MockService::new();
        let exec = Arc::new(FakeExec::new());
        let reconciler = Reconciler::new(mock.clone().into_client(), exec, &Config::default());
        let (dispatcher, handle) = EventDispatcher::new(reconciler, 0);
        let running = tokio::spawn(dispatcher.run());

        // Listing exporters is answered with 404 so both pod events fail
        handle
            .send(ClusterEvent::pod(make_pod("app-0", &[], &[], "Running"), false))
            .await;
        handle
            .send(ClusterEvent::exporter(make_exporter("x", &[], 9404, None), true))
            .await;
        handle
            .send(ClusterEvent::pod(make_pod("app-1", &[], &[], "Running"), true))
            .await;
        drop(handle);

        running.await.unwrap().unwrap();

        let lists = mock.requests_with(
            "GET",
            "/apis/banzaicloud.com/v1alpha1/namespaces/default/prometheusjmxexporters",
        );
        assert_eq!(lists.len(), 2);
        assert!(mock.writes().is_empty());
    }
}
