//! Path-keyed asset cache
//!
//! The first request for a path dispatches a load and reports the asset as
//! absent until it lands; callers render nothing in the meantime. Resolved
//! assets are held weakly: once no placement keeps the handle, the asset is
//! released and a later request loads it again. Failed loads are logged once
//! and never retried.

use std::collections::HashMap;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use futures::channel::oneshot;

use super::data::{AssetData, AssetHandle};
use super::loader::{AssetError, AssetLoader};

type LoadResult = Result<AssetData, AssetError>;

/// Where loads run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// On a worker thread per load
    Background,
    /// Inside `request`; the result still only becomes visible at the next `poll`
    Inline,
}

enum Slot {
    Pending(oneshot::Receiver<LoadResult>),
    /// Loaded but not yet handed to anyone
    Landed(AssetHandle),
    Ready(Weak<AssetData>),
    Failed,
}

/// Lifecycle of one path in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Unrequested,
    Pending,
    Resident,
    Released,
    Failed,
}

pub struct AssetCache {
    loader: Arc<dyn AssetLoader>,
    dispatch: Dispatch,
    slots: HashMap<String, Slot>,
}

impl AssetCache {
    pub fn new(loader: Arc<dyn AssetLoader>, dispatch: Dispatch) -> Self {
        Self {
            loader,
            dispatch,
            slots: HashMap::new(),
        }
    }

    /// Returns the handle if the asset is available, starting a load on first use
    pub fn request(&mut self, path: &str) -> Option<AssetHandle> {
        let slot = match self.slots.get_mut(path) {
            Some(slot) => slot,
            None => {
                let slot = start_load(&self.loader, self.dispatch, path);
                self.slots.insert(path.to_string(), slot);
                return None;
            }
        };

        match slot {
            Slot::Pending(_) | Slot::Failed => None,
            Slot::Landed(handle) => {
                let handle = Rc::clone(handle);
                *slot = Slot::Ready(Rc::downgrade(&handle));
                Some(handle)
            }
            Slot::Ready(weak) => match weak.upgrade() {
                Some(handle) => Some(handle),
                None => {
                    log::debug!("reloading released asset {}", path);
                    *slot = start_load(&self.loader, self.dispatch, path);
                    None
                }
            },
        }
    }

    /// Collects finished loads without blocking. Call once per frame.
    pub fn poll(&mut self) {
        for (path, slot) in self.slots.iter_mut() {
            let Slot::Pending(receiver) = slot else {
                continue;
            };

            match receiver.try_recv() {
                Ok(None) => {}
                Ok(Some(Ok(data))) => {
                    log::info!("loaded asset {}", path);
                    *slot = Slot::Landed(Rc::new(data));
                }
                Ok(Some(Err(err))) => {
                    log::error!("{}", error_chain(&err));
                    *slot = Slot::Failed;
                }
                Err(oneshot::Canceled) => {
                    let err = AssetError::Abandoned(path.into());
                    log::error!("{}", err);
                    *slot = Slot::Failed;
                }
            }
        }
    }

    pub fn status(&self, path: &str) -> AssetStatus {
        match self.slots.get(path) {
            None => AssetStatus::Unrequested,
            Some(Slot::Pending(_)) => AssetStatus::Pending,
            Some(Slot::Landed(_)) => AssetStatus::Resident,
            Some(Slot::Ready(weak)) if weak.strong_count() > 0 => AssetStatus::Resident,
            Some(Slot::Ready(_)) => AssetStatus::Released,
            Some(Slot::Failed) => AssetStatus::Failed,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, Slot::Pending(_)))
            .count()
    }
}

fn start_load(loader: &Arc<dyn AssetLoader>, dispatch: Dispatch, path: &str) -> Slot {
    let (sender, receiver) = oneshot::channel();
    log::debug!("dispatching load for {} ({:?})", path, dispatch);

    match dispatch {
        Dispatch::Inline => {
            let _ = sender.send(loader.load(Path::new(path)));
        }
        Dispatch::Background => {
            let loader = Arc::clone(loader);
            let owned_path = path.to_string();
            let spawned = std::thread::Builder::new()
                .name(format!("load {}", path))
                .spawn(move || {
                    let _ = sender.send(loader.load(Path::new(&owned_path)));
                });
            if let Err(err) = spawned {
                log::error!("could not spawn loader thread for {}: {}", path, err);
                return Slot::Failed;
            }
        }
    }

    Slot::Pending(receiver)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetBuilder, MemoryLoader};

    fn cache_with(paths: &[&str]) -> (AssetCache, Arc<MemoryLoader>) {
        let mut loader = MemoryLoader::new();
        for path in paths {
            let mut builder = AssetBuilder::new(path);
            builder.mesh_node(None, "body");
            loader.insert(builder.build());
        }
        let loader = Arc::new(loader);
        (AssetCache::new(loader.clone(), Dispatch::Inline), loader)
    }

    #[test]
    fn first_request_is_empty_until_polled() {
        let (mut cache, _) = cache_with(&["statue.glb"]);

        assert!(cache.request("statue.glb").is_none());
        assert_eq!(cache.status("statue.glb"), AssetStatus::Pending);
        assert!(cache.request("statue.glb").is_none());

        cache.poll();
        let handle = cache.request("statue.glb").expect("resolved after poll");
        assert_eq!(handle.path, "statue.glb");
        assert_eq!(cache.status("statue.glb"), AssetStatus::Resident);
    }

    #[test]
    fn handles_are_shared_per_path() {
        let (mut cache, loader) = cache_with(&["statue.glb"]);
        cache.request("statue.glb");
        cache.poll();

        let a = cache.request("statue.glb").unwrap();
        let b = cache.request("statue.glb").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(loader.load_count(), 1);
    }

    #[test]
    fn asset_is_released_when_unreferenced_and_reloaded_on_demand() {
        let (mut cache, loader) = cache_with(&["statue.glb"]);
        cache.request("statue.glb");
        cache.poll();

        let handle = cache.request("statue.glb").unwrap();
        drop(handle);
        assert_eq!(cache.status("statue.glb"), AssetStatus::Released);

        assert!(cache.request("statue.glb").is_none());
        cache.poll();
        assert!(cache.request("statue.glb").is_some());
        assert_eq!(loader.load_count(), 2);
    }

    #[test]
    fn failed_load_is_never_retried() {
        let (mut cache, loader) = cache_with(&[]);
        assert!(cache.request("missing.glb").is_none());
        cache.poll();
        assert_eq!(cache.status("missing.glb"), AssetStatus::Failed);

        for _ in 0..3 {
            assert!(cache.request("missing.glb").is_none());
            cache.poll();
        }
        assert_eq!(loader.load_count(), 1);
    }

    #[test]
    fn background_dispatch_eventually_lands() {
        let mut loader = MemoryLoader::new();
        let mut builder = AssetBuilder::new("seraphim.glb");
        builder.mesh_node(None, "wing");
        loader.insert(builder.build());
        let mut cache = AssetCache::new(Arc::new(loader), Dispatch::Background);

        assert!(cache.request("seraphim.glb").is_none());
        let mut handle = None;
        for _ in 0..500 {
            cache.poll();
            handle = cache.request("seraphim.glb");
            if handle.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(handle.is_some());
        assert_eq!(cache.pending_count(), 0);
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = AssetError::Io {
            path: "a.glb".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(error_chain(&err), "failed to read asset a.glb: gone");
    }
}
