// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch streams feeding the event dispatcher.

pub mod exporter;
pub mod pod;

pub use exporter::ExporterWatcher;
pub use pod::PodWatcher;

use crate::dispatch::{ClusterEvent, EventDispatcherHandle};
use futures::StreamExt;
use kube::{Api, Client, Resource};
use kube_runtime::{watcher, WatchStreamExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, warn};

/// Api scoped to `namespace`, or cluster-wide when unset
fn scoped_api<K>(client: Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

/// Translate a watch event; `Init` and `InitDone` carry no object and are dropped
fn to_cluster_event<K>(
    event: watcher::Event<K>,
    into_event: fn(K, bool) -> ClusterEvent,
) -> Option<ClusterEvent> {
    match event {
        watcher::Event::Apply(obj) | watcher::Event::InitApply(obj) => Some(into_event(obj, false)),
        watcher::Event::Delete(obj) => Some(into_event(obj, true)),
        watcher::Event::Init | watcher::Event::InitDone => None,
    }
}

/// Forward every watch event of `api` to the dispatcher until the stream ends
async fn forward<K>(
    api: Api<K>,
    kind: &str,
    handle: EventDispatcherHandle,
    into_event: fn(K, bool) -> ClusterEvent,
) -> anyhow::Result<()>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + 'static,
{
    let mut events = watcher(api, watcher::Config::default())
        .default_backoff()
        .boxed();

    while let Some(event) = events.next().await {
        match event {
            Ok(event) => {
                if let Some(event) = to_cluster_event(event, into_event) {
                    debug!("Watched {}", event);
                    handle.send(event).await;
                }
            }
            Err(e) => warn!("Watching {} failed: {}", kind, e),
        }
    }

    warn!("Watch stream for {} ended", kind);
    Ok(())
}
