use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use lineage_rs::context::{is_no_feeds, EntityOperation, ExecutionContext};
use lineage_rs::identity::feed_instance_key;

/// Per-key write serialization for lookup-or-create feed instances.
///
/// Two events that would both look up, miss, and create the same feed
/// instance must not run concurrently. Events that share no key never wait on
/// each other. Entries are dropped once nobody holds or waits on them.
#[derive(Default)]
pub struct KeyedLocks {
    entries: DashMap<String, Arc<Mutex<()>>>,
}

/// Held locks for one event; released on drop.
pub struct KeyGuards {
    guards: Vec<OwnedMutexGuard<()>>,
}

impl KeyGuards {
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every key, in sorted order so overlapping sets cannot deadlock.
    pub async fn acquire(&self, mut keys: Vec<String>) -> KeyGuards {
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let lock = self.entries.entry(key).or_default().clone();
            guards.push(lock.lock_owned().await);
        }
        KeyGuards { guards }
    }

    /// Drop entries no event holds or waits on.
    pub fn prune(&self) {
        self.entries.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identity keys of the feed instances an event may look up and create.
///
/// Process runs always create fresh nodes and need no key. A context whose
/// keys cannot be derived yields none; recording it fails on its own.
pub fn lock_keys(context: &ExecutionContext) -> Vec<String> {
    if !context.has_output_feeds() {
        return Vec::new();
    }
    let cluster = match context.operation {
        EntityOperation::Generate => return Vec::new(),
        EntityOperation::Replicate | EntityOperation::Delete => context.cluster_name.as_str(),
        EntityOperation::Import => context.src_cluster_or_cluster(),
    };
    if is_no_feeds(&context.output_feed_paths) {
        return Vec::new();
    }

    let feed = context.output_feed_names.as_str();
    context
        .output_feed_paths_list()
        .into_iter()
        .filter_map(|path| feed_instance_key(feed, cluster, path, &context.nominal_time).ok())
        .collect()
}
