use std::sync::{Arc, Mutex, PoisonError};

use grasp::collab::{LobbyMetadata, MetadataStore, UserMetadata};
use grasp::LobbyId;
use tokio::runtime::Handle;

/// Runs every write of an inner store on a tokio runtime so the tick thread
/// never waits on persistence.
///
/// Writes are fire-and-forget: the inner store is shared behind a mutex and
/// a failed or slow write only affects that write.
pub struct DetachedStore<S> {
    inner: Arc<Mutex<S>>,
    runtime: Handle,
}

impl<S: MetadataStore + 'static> DetachedStore<S> {
    pub fn new(inner: S, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
            runtime,
        }
    }

    fn detach(&self, write: impl FnOnce(&mut S) + Send + 'static) {
        let inner = Arc::clone(&self.inner);
        self.runtime.spawn_blocking(move || {
            let mut store = inner.lock().unwrap_or_else(PoisonError::into_inner);
            write(&mut store);
        });
    }
}

impl<S: MetadataStore + 'static> MetadataStore for DetachedStore<S> {
    fn save_lobby_metadata(&mut self, metadata: LobbyMetadata) {
        self.detach(move |store| store.save_lobby_metadata(metadata));
    }

    fn save_user_metadata(&mut self, metadata: UserMetadata) {
        self.detach(move |store| store.save_user_metadata(metadata));
    }

    fn heartbeat(&mut self, lobby_id: LobbyId, tick: u32) {
        self.detach(move |store| store.heartbeat(lobby_id, tick));
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use grasp::collab::MemoryStore;

    use super::*;

    #[test]
    fn writes_land_in_the_inner_store() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let memory = MemoryStore::new();
        let mut store = DetachedStore::new(memory.clone(), runtime.handle().clone());

        store.heartbeat(1, 60);
        store.save_user_metadata(UserMetadata {
            user_id: 3,
            guid: [1; 16],
            display_name: String::from("cy"),
            lobby_id: 1,
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        while (memory.heartbeats() == 0 || memory.user(3).is_none()) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(memory.heartbeats(), 1);
        assert_eq!(memory.user(3).unwrap().display_name, "cy");
    }
}
