//! Device connection cache and per-key job locks
//!
//! Handles are stored under the platform device id. A printer identity
//! (for example `bluetooth:Kitchen BT`) can be registered as an alias so a
//! config edit or delete can invalidate the handle it used.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

/// Connection cache shared by all adapters of one transport
#[derive(Debug, Clone)]
pub struct ConnectionRegistry<H> {
    inner: Arc<RwLock<ConnectionRegistryInner<H>>>,
}

/// Per-key async mutexes
///
/// Jobs for the same key queue in arrival order (tokio's mutex is fair).
/// Guards are owned so they can be held across awaits. Entries nobody
/// holds or waits on are dropped on the next `lock` call.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for `key`
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock().await;
            // Holders and waiters each keep a clone of the Arc
            locks.retain(|_, m| Arc::strong_count(m) > 1);
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }

    /// Keys currently tracked
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[derive(Debug)]
struct ConnectionRegistryInner<H> {
    /// device id -> connected handle
    handles: HashMap<String, H>,
    /// alias -> device id
    aliases: HashMap<String, String>,
}

impl<H> Default for ConnectionRegistryInner<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
            aliases: HashMap::new(),
        }
    }
}

impl<H: Clone> Default for ConnectionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> ConnectionRegistry<H> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ConnectionRegistryInner::default())),
        }
    }

    /// Look up a handle by device id or alias
    pub async fn get(&self, key: &str) -> Option<H> {
        let inner = self.inner.read().await;
        let device_id = inner.aliases.get(key).map(String::as_str).unwrap_or(key);
        inner.handles.get(device_id).cloned()
    }

    /// Cache a handle under its device id, optionally aliased
    pub async fn insert(&self, device_id: &str, handle: H, alias: Option<&str>) {
        let mut inner = self.inner.write().await;
        inner.handles.insert(device_id.to_string(), handle);
        if let Some(alias) = alias
            && alias != device_id
        {
            inner.aliases.insert(alias.to_string(), device_id.to_string());
        }
        debug!(device_id, alias, "connection cached");
    }

    /// Drop the handle reachable through `key` and every alias of it
    ///
    /// Returns true if a handle was removed.
    pub async fn invalidate(&self, key: &str) -> bool {
        let mut inner = self.inner.write().await;
        let device_id = inner
            .aliases
            .remove(key)
            .unwrap_or_else(|| key.to_string());
        inner.aliases.retain(|_, target| *target != device_id);
        let removed = inner.handles.remove(&device_id).is_some();
        if removed {
            debug!(key, device_id = %device_id, "connection invalidated");
        }
        removed
    }

    /// Forget every cached handle
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.handles.clear();
        inner.aliases.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.handles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_by_id_and_alias() {
        let registry = ConnectionRegistry::new();
        registry.insert("AA:BB", 7u32, Some("bluetooth:Kitchen BT")).await;

        assert_eq!(registry.get("AA:BB").await, Some(7));
        assert_eq!(registry.get("bluetooth:Kitchen BT").await, Some(7));
        assert_eq!(registry.get("bluetooth:Other").await, None);
    }

    #[tokio::test]
    async fn test_invalidate_by_alias_removes_device() {
        let registry = ConnectionRegistry::new();
        registry.insert("AA:BB", 1u32, Some("bluetooth:Kitchen BT")).await;
        registry.insert("CC:DD", 2u32, Some("bluetooth:Bar BT")).await;

        assert!(registry.invalidate("bluetooth:Kitchen BT").await);
        assert_eq!(registry.get("AA:BB").await, None);
        assert_eq!(registry.get("CC:DD").await, Some(2));
        assert!(!registry.invalidate("bluetooth:Kitchen BT").await);
    }

    #[tokio::test]
    async fn test_invalidate_by_id_drops_aliases() {
        let registry = ConnectionRegistry::new();
        registry.insert("AA:BB", 1u32, Some("bluetooth:Kitchen BT")).await;

        assert!(registry.invalidate("AA:BB").await);
        registry.insert("AA:BB", 3u32, None).await;
        // Old alias must not resolve to the new handle
        assert_eq!(registry.get("bluetooth:Kitchen BT").await, None);
    }

    #[tokio::test]
    async fn test_clear() {
        let registry = ConnectionRegistry::new();
        registry.insert("a", 1u32, None).await;
        registry.insert("b", 2u32, None).await;
        assert_eq!(registry.len().await, 2);
        registry.clear().await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_lock_serializes_same_key() {
        let locks = KeyedLocks::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let guard = locks.lock("usb:Billing").await;

        let waiter = {
            let locks = locks.clone();
            let order = order.clone();
            tokio::spawn(async move {
                let _g = locks.lock("usb:Billing").await;
                order.lock().unwrap().push("second");
            })
        };

        // A different key is not blocked
        let _other = locks.lock("usb:Kitchen").await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        order.lock().unwrap().push("first");
        drop(guard);

        waiter.await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_idle_lock_keys_are_dropped() {
        let locks = KeyedLocks::new();
        for i in 0..10 {
            let _g = locks.lock(&format!("network:10.0.0.{i}")).await;
        }
        assert_eq!(locks.len().await, 1);

        let held = locks.lock("bluetooth:dev-1").await;
        let other = locks.lock("bluetooth:dev-2").await;
        // A held key survives pruning
        assert_eq!(locks.len().await, 2);
        drop(held);
        drop(other);
        let _g = locks.lock("usb:Billing").await;
        assert_eq!(locks.len().await, 1);
    }
}
