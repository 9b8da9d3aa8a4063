use std::{future::Future, io::ErrorKind, path::PathBuf, sync::Mutex};

use crate::types::Credential;

/// Durable persistence for the current credential.
///
/// The store holds no logic: callers decide freshness. Writes must be
/// visible to the next `get` in the same process.
pub trait TokenStore: Send + Sync + 'static {
    fn put(&self, credential: Credential) -> impl Future<Output = Result<(), String>> + Send;
    fn get(&self) -> impl Future<Output = Option<Credential>> + Send;
    fn clear(&self) -> impl Future<Output = Result<(), String>> + Send;
}

/// File-backed store keeping the credential as a JSON document in the
/// user's local data directory, surviving process restarts.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        FileTokenStore { path }
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("spoqcli/cache/credentials.json");
        FileTokenStore { path }
    }
}

impl TokenStore for FileTokenStore {
    fn put(&self, credential: Credential) -> impl Future<Output = Result<(), String>> + Send {
        async move {
            if let Some(parent) = self.path.parent() {
                async_fs::create_dir_all(parent)
                    .await
                    .map_err(|e| e.to_string())?;
            }
            let json = serde_json::to_string_pretty(&credential).map_err(|e| e.to_string())?;
            async_fs::write(&self.path, json)
                .await
                .map_err(|e| e.to_string())
        }
    }

    fn get(&self) -> impl Future<Output = Option<Credential>> + Send {
        async move {
            let content = async_fs::read_to_string(&self.path).await.ok()?;
            serde_json::from_str(&content).ok()
        }
    }

    fn clear(&self) -> impl Future<Output = Result<(), String>> + Send {
        async move {
            match async_fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.to_string()),
            }
        }
    }
}

/// In-memory store used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Credential>>,
}

impl TokenStore for MemoryTokenStore {
    fn put(&self, credential: Credential) -> impl Future<Output = Result<(), String>> + Send {
        async move {
            *self.slot.lock().map_err(|e| e.to_string())? = Some(credential);
            Ok(())
        }
    }

    fn get(&self) -> impl Future<Output = Option<Credential>> + Send {
        async move { self.slot.lock().ok()?.clone() }
    }

    fn clear(&self) -> impl Future<Output = Result<(), String>> + Send {
        async move {
            *self.slot.lock().map_err(|e| e.to_string())? = None;
            Ok(())
        }
    }
}
