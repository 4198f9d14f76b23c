//! Shared key collection.
//!
//! The store is the only shared mutable state in the engine: a
//! `RwLock<Vec<Key>>` safe to share across threads behind an `Arc`.
//! Readers take cheap cloned snapshots so attack construction and display
//! never hold the lock across an operation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;

use crate::error::{Error, Result};
use crate::jose::jwa::{self, JwsAlgorithm};
use crate::jose::jwk::{JwkSet, KeyType};
use crate::keys::{Key, KeyGenParams};

/// A threadsafe, ordered collection of keys with store-unique identifiers.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: RwLock<Vec<Key>>,
}

impl KeyStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, renaming it with a numeric suffix (`id-1`, `id-2`, …) if
    /// its identifier collides with an existing entry. Returns the final
    /// identifier.
    pub fn add(&self, mut key: Key) -> String {
        let mut keys = self.keys.write().expect("key store lock poisoned");
        let id = unique_id(&keys, key.id());
        key.set_id(id.clone());
        keys.push(key);
        id
    }

    /// Remove a key by identifier, returning it if present.
    pub fn remove(&self, id: &str) -> Option<Key> {
        let mut keys = self.keys.write().expect("key store lock poisoned");
        let index = keys.iter().position(|key| key.id() == id)?;
        Some(keys.remove(index))
    }

    /// Rename a key. The new identifier goes through the same collision
    /// policy as [`KeyStore::add`]; returns the final identifier, or `None`
    /// if no key has the old identifier.
    pub fn rename(&self, id: &str, new_id: &str) -> Option<String> {
        let mut keys = self.keys.write().expect("key store lock poisoned");
        let index = keys.iter().position(|key| key.id() == id)?;
        let others: Vec<Key> =
            keys.iter().enumerate().filter(|(i, _)| *i != index).map(|(_, k)| k.clone()).collect();
        let final_id = unique_id(&others, new_id);
        keys[index].set_id(final_id.clone());
        Some(final_id)
    }

    /// Look up a key by identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Key> {
        let keys = self.keys.read().expect("key store lock poisoned");
        keys.iter().find(|key| key.id() == id).cloned()
    }

    /// All keys of one JOSE key type.
    #[must_use]
    pub fn find_by_type(&self, kty: KeyType) -> Vec<Key> {
        let keys = self.keys.read().expect("key store lock poisoned");
        keys.iter().filter(|key| key.key_type() == kty).cloned().collect()
    }

    /// All keys whose type and curve satisfy a signing algorithm's registry
    /// requirement.
    #[must_use]
    pub fn find_compatible(&self, alg: JwsAlgorithm) -> Vec<Key> {
        let requirement = jwa::requirements_of(alg);
        let keys = self.keys.read().expect("key store lock poisoned");
        keys.iter().filter(|key| key.satisfies(&requirement)).cloned().collect()
    }

    /// A consistent point-in-time copy of the whole store.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Key> {
        self.keys.read().expect("key store lock poisoned").clone()
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.read().expect("key store lock poisoned").len()
    }

    /// True when the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Import every key of a JWK Set (`{"keys":[...]}`), returning the
    /// final identifiers in set order.
    ///
    /// # Errors
    ///
    /// Returns `MalformedKeyMaterial` or `UnsupportedKeyType` on the first
    /// key that fails to import; keys before it are already added.
    pub fn import_jwk_set(&self, json: &str) -> Result<Vec<String>> {
        let set: JwkSet = serde_json::from_str(json)
            .map_err(|e| Error::MalformedKeyMaterial(format!("invalid JWK Set: {e}")))?;

        let mut ids = Vec::with_capacity(set.keys.len());
        for jwk in &set.keys {
            ids.push(self.add(Key::from_jwk(jwk)?));
        }
        Ok(ids)
    }

    /// Export the store as a JWK Set. With `include_private = false` the
    /// private halves are stripped and symmetric keys, which have no public
    /// form, are omitted.
    ///
    /// # Errors
    ///
    /// Returns `MalformedKeyMaterial` if JWK encoding fails.
    pub fn export_jwk_set(&self, include_private: bool) -> Result<String> {
        let mut set = JwkSet::default();
        for key in self.snapshot() {
            if !include_private && !key.has_public() {
                continue;
            }
            set.keys.push(key.to_jwk(include_private)?);
        }
        serde_json::to_string(&set)
            .map_err(|e| Error::MalformedKeyMaterial(format!("JWK Set encoding failed: {e}")))
    }
}

/// Handle to an in-flight background key generation.
pub struct KeygenHandle {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<Option<String>>>,
}

impl KeygenHandle {
    /// Request cancellation. A cancellation observed before insertion
    /// leaves the store untouched; once the key is in the store the
    /// request has no effect.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// True once the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return the stored key's identifier, or
    /// `None` if the generation was cancelled.
    ///
    /// # Errors
    ///
    /// Propagates generation errors (`UnsupportedParameters`).
    pub fn join(self) -> Result<Option<String>> {
        self.handle
            .join()
            .map_err(|_| Error::UnsupportedParameters("key generation thread panicked".into()))?
    }
}

/// Generate a key on a dedicated thread and add it to the store. RSA
/// generation at large sizes is slow enough that callers should never
/// block a UI thread on it.
#[must_use]
pub fn spawn_generate(
    store: Arc<KeyStore>, params: KeyGenParams, alg: Option<JwsAlgorithm>,
) -> KeygenHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let observed = Arc::clone(&cancel);

    let handle = std::thread::spawn(move || {
        let key = Key::generate(&params, alg)?;
        if observed.load(Ordering::Relaxed) {
            tracing::debug!("key generation cancelled, discarding result");
            return Ok(None);
        }
        Ok(Some(store.add(key)))
    });

    KeygenHandle { cancel, handle }
}

fn unique_id(keys: &[Key], wanted: &str) -> String {
    let taken = |id: &str| keys.iter().any(|key| key.id() == id);
    if !taken(wanted) {
        return wanted.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{wanted}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jose::jwk::Curve;

    fn oct_key(id: &str) -> Key {
        let mut key = Key::generate(&KeyGenParams::Oct { bits: 256 }, None)
            .expect("should generate");
        key.set_id(id);
        key
    }

    #[test]
    fn add_renames_on_collision() {
        let store = KeyStore::new();
        assert_eq!(store.add(oct_key("attack")), "attack");
        assert_eq!(store.add(oct_key("attack")), "attack-1");
        assert_eq!(store.add(oct_key("attack")), "attack-2");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn remove_and_find() {
        let store = KeyStore::new();
        let id = store.add(oct_key("hmac"));
        assert!(store.find(&id).is_some());
        assert!(store.remove(&id).is_some());
        assert!(store.find(&id).is_none());
        assert!(store.remove(&id).is_none());
    }

    #[test]
    fn rename_applies_collision_policy() {
        let store = KeyStore::new();
        store.add(oct_key("a"));
        store.add(oct_key("b"));
        assert_eq!(store.rename("b", "a").as_deref(), Some("a-1"));
        assert_eq!(store.rename("missing", "c"), None);
    }

    #[test]
    fn find_compatible_filters_by_curve() {
        let store = KeyStore::new();
        store.add(
            Key::generate(&KeyGenParams::Ec { curve: Curve::P256 }, None)
                .expect("should generate"),
        );
        store.add(oct_key("hmac"));

        let es256 = store.find_compatible(JwsAlgorithm::ES256);
        assert_eq!(es256.len(), 1);
        assert!(store.find_compatible(JwsAlgorithm::ES384).is_empty());
        assert_eq!(store.find_compatible(JwsAlgorithm::HS256).len(), 1);
    }

    #[test]
    fn jwk_set_round_trip_skips_oct_in_public_export() {
        let store = KeyStore::new();
        store.add(oct_key("secret"));
        store.add(
            Key::generate(&KeyGenParams::Ec { curve: Curve::P256 }, None)
                .expect("should generate"),
        );

        let public = store.export_jwk_set(false).expect("should export");
        let restored = KeyStore::new();
        let ids = restored.import_jwk_set(&public).expect("should import");
        assert_eq!(ids.len(), 1);

        let full = store.export_jwk_set(true).expect("should export");
        let restored = KeyStore::new();
        assert_eq!(restored.import_jwk_set(&full).expect("should import").len(), 2);
    }

    #[test]
    fn background_generation_adds_to_store() {
        let store = Arc::new(KeyStore::new());
        let handle =
            spawn_generate(Arc::clone(&store), KeyGenParams::Oct { bits: 256 }, None);
        let id = handle.join().expect("should generate").expect("not cancelled");
        assert!(store.find(&id).is_some());
    }

    #[test]
    fn cancelled_generation_leaves_store_untouched() {
        let store = Arc::new(KeyStore::new());
        // 2048-bit RSA generation cannot complete before the flag is set.
        let handle =
            spawn_generate(Arc::clone(&store), KeyGenParams::Rsa { bits: 2048 }, None);
        handle.cancel();
        assert_eq!(handle.join().expect("should generate"), None);
        assert!(store.is_empty());
    }
}
