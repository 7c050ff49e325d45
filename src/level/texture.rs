//! Texture references, the main-timeline texture cache, and the background
//! texture loader.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::Result;

/// Opaque renderer texture handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Texture currently bound to a batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureRef {
    /// Still loading (or failed); the renderer draws its own placeholder
    #[default]
    Placeholder,
    Resolved(TextureHandle),
}

impl TextureRef {
    pub fn handle(&self) -> Option<TextureHandle> {
        match self {
            TextureRef::Resolved(h) => Some(*h),
            TextureRef::Placeholder => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TextureRef::Resolved(_))
    }
}

/// Host-side texture source.
///
/// `cached` must not block. `load` may block and is only ever called from
/// the loader's worker threads.
pub trait TextureResolver: Send + Sync + 'static {
    fn cached(&self, name: &str) -> Option<TextureHandle>;
    fn load(&self, name: &str) -> Result<TextureHandle>;
}

/// Name to handle map owned by the main timeline
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<String, TextureHandle>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up locally, then ask the resolver for an already-loaded handle.
    pub fn resolve(&mut self, name: &str, resolver: &dyn TextureResolver) -> Option<TextureHandle> {
        if let Some(h) = self.entries.get(name) {
            return Some(*h);
        }
        let handle = resolver.cached(name)?;
        self.entries.insert(name.to_owned(), handle);
        Some(handle)
    }

    pub fn insert(&mut self, name: impl Into<String>, handle: TextureHandle) {
        self.entries.insert(name.into(), handle);
    }

    pub fn get(&self, name: &str) -> Option<TextureHandle> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of one background texture load
#[derive(Debug, Clone, PartialEq)]
pub enum TextureLoadResult {
    Loaded { name: String, handle: TextureHandle },
    Failed { name: String, error: String },
}

impl TextureLoadResult {
    pub fn name(&self) -> &str {
        match self {
            TextureLoadResult::Loaded { name, .. } => name,
            TextureLoadResult::Failed { name, .. } => name,
        }
    }
}

/// Resolves textures off the main timeline.
///
/// Each `request` call spawns one blocking task that loads its names in
/// order and streams results back. There is no cancellation, retry or
/// timeout; a load that never finishes never produces a result.
pub struct TextureLoader {
    resolver: Arc<dyn TextureResolver>,
    result_tx: mpsc::UnboundedSender<TextureLoadResult>,
    result_rx: mpsc::UnboundedReceiver<TextureLoadResult>,
    /// Names requested but not yet reported
    pending: HashSet<String>,
    /// Taken on drop so stalled loads do not block teardown
    runtime: Option<Runtime>,
}

impl TextureLoader {
    /// Create a loader with its own runtime of `threads` blocking workers.
    pub fn new(resolver: Arc<dyn TextureResolver>, threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(threads)
            .thread_name("bspview-textures")
            .build()?;
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        Ok(Self {
            resolver,
            result_tx,
            result_rx,
            pending: HashSet::new(),
            runtime: Some(runtime),
        })
    }

    pub fn resolver(&self) -> &dyn TextureResolver {
        self.resolver.as_ref()
    }

    /// Queue names for loading. Names already pending are skipped.
    ///
    /// Returns the number of names actually queued.
    pub fn request(&mut self, names: impl IntoIterator<Item = String>) -> usize {
        let batch: Vec<String> = names
            .into_iter()
            .filter(|n| self.pending.insert(n.clone()))
            .collect();
        let Some(runtime) = &self.runtime else {
            return 0;
        };
        if batch.is_empty() {
            return 0;
        }

        let count = batch.len();
        let resolver = Arc::clone(&self.resolver);
        let tx = self.result_tx.clone();
        log::debug!("Queued {} texture loads", count);

        // Detached: the join handle is dropped on purpose
        let _ = runtime.spawn_blocking(move || {
            for name in batch {
                let result = match resolver.load(&name) {
                    Ok(handle) => TextureLoadResult::Loaded { name, handle },
                    Err(e) => TextureLoadResult::Failed { name, error: e.to_string() },
                };
                if tx.send(result).is_err() {
                    break;
                }
            }
        });

        count
    }

    /// Drain finished loads without blocking.
    pub fn poll_results(&mut self) -> Vec<TextureLoadResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            self.finish(&result);
            results.push(result);
        }
        results
    }

    /// Block until the next load finishes. Must not be called from async code.
    pub fn recv_blocking(&mut self) -> Option<TextureLoadResult> {
        let result = self.result_rx.blocking_recv()?;
        self.finish(&result);
        Some(result)
    }

    fn finish(&mut self, result: &TextureLoadResult) {
        self.pending.remove(result.name());
        if let TextureLoadResult::Failed { name, error } = result {
            log::warn!("Texture '{}' failed to load, keeping placeholder: {}", name, error);
        }
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.contains(name)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
