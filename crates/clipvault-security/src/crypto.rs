//! Payload encryption under a rotating master key
//!
//! AES-256-GCM with a fresh random nonce per call. The master key is
//! generated once and persisted; rotation keeps one previous generation so
//! items sealed before the last rotation remain readable.

use std::sync::{Arc, Mutex};

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use clipvault_storage::{keys, LocalStore, LocalStoreExt};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{Result, SecurityError};

/// An encrypted payload: base64 ciphertext plus the hex nonce it was
/// sealed with.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: String,
    pub nonce: String,
}

#[derive(Debug)]
struct KeyRing {
    current: [u8; 32],
    previous: Option<[u8; 32]>,
    last_rotation: DateTime<Utc>,
}

/// Symmetric encryption engine for clipboard payloads.
pub struct CryptoEngine {
    store: Arc<dyn LocalStore>,
    ring: Mutex<KeyRing>,
}

impl CryptoEngine {
    /// Load key material from the store, generating a fresh master key on
    /// first use.
    pub fn new(store: Arc<dyn LocalStore>) -> Result<Self> {
        let current = match store.get_json::<String>(keys::MASTER_KEY)? {
            Some(encoded) => decode_key(&encoded)?,
            None => {
                let key = generate_key();
                store.set_json(keys::MASTER_KEY, &hex::encode(key))?;
                key
            }
        };

        let previous = match store.get_json::<String>(keys::PREVIOUS_KEY)? {
            Some(encoded) => Some(decode_key(&encoded)?),
            None => None,
        };

        let last_rotation = match store.get_json::<DateTime<Utc>>(keys::LAST_KEY_ROTATION)? {
            Some(ts) => ts,
            None => {
                let now = Utc::now();
                store.set_json(keys::LAST_KEY_ROTATION, &now)?;
                now
            }
        };

        Ok(Self {
            store,
            ring: Mutex::new(KeyRing {
                current,
                previous,
                last_rotation,
            }),
        })
    }

    /// Seal `plaintext` under the current key with a fresh nonce.
    pub fn encrypt(&self, plaintext: &str) -> Result<Sealed> {
        let ring = self.ring.lock().unwrap();
        let nonce_bytes: [u8; 12] = {
            let mut bytes = [0u8; 12];
            rand::thread_rng().fill(&mut bytes);
            bytes
        };

        let cipher = Aes256Gcm::new(&ring.current.into());
        let nonce = aes_gcm::Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| SecurityError::Encryption {
                message: e.to_string(),
            })?;

        Ok(Sealed {
            ciphertext: general_purpose::STANDARD.encode(ciphertext),
            nonce: hex::encode(nonce_bytes),
        })
    }

    /// Open a sealed payload. The current key is tried first, then the
    /// retained previous key. Tampered input fails authentication and
    /// surfaces as a decryption error.
    pub fn decrypt(&self, ciphertext: &str, nonce: &str) -> Result<String> {
        let ring = self.ring.lock().unwrap();
        let raw = general_purpose::STANDARD.decode(ciphertext)?;
        let nonce_bytes = hex::decode(nonce)?;
        if nonce_bytes.len() != 12 {
            return Err(SecurityError::Decryption {
                message: format!("invalid nonce length {}", nonce_bytes.len()),
            });
        }
        let nonce = aes_gcm::Nonce::from_slice(&nonce_bytes);

        let mut candidates = vec![ring.current];
        if let Some(previous) = ring.previous {
            candidates.push(previous);
        }

        for key in candidates {
            let cipher = Aes256Gcm::new(&key.into());
            if let Ok(plaintext) = cipher.decrypt(nonce, raw.as_ref()) {
                return Ok(String::from_utf8(plaintext)?);
            }
        }

        Err(SecurityError::Decryption {
            message: "no key opens this payload".to_string(),
        })
    }

    /// Hex SHA-256 digest of `plaintext`, kept as an integrity reference.
    pub fn hash(&self, plaintext: &str) -> String {
        hex::encode(Sha256::digest(plaintext.as_bytes()))
    }

    /// When the last rotation is at least `interval_days` old, rotate and
    /// report `true`.
    pub fn rotate_if_due(&self, interval_days: u32) -> Result<bool> {
        self.rotate_if_due_at(interval_days, Utc::now())
    }

    pub fn rotate_if_due_at(&self, interval_days: u32, now: DateTime<Utc>) -> Result<bool> {
        let due = {
            let ring = self.ring.lock().unwrap();
            now.signed_duration_since(ring.last_rotation)
                >= Duration::days(i64::from(interval_days))
        };
        if due {
            self.rotate_at(now)?;
        }
        Ok(due)
    }

    /// Replace the master key, retaining the old one for one generation of
    /// backward decryption.
    pub fn rotate(&self) -> Result<()> {
        self.rotate_at(Utc::now())
    }

    fn rotate_at(&self, now: DateTime<Utc>) -> Result<()> {
        let mut ring = self.ring.lock().unwrap();
        let fresh = generate_key();
        let retired = ring.current;

        self.store.set_json(keys::MASTER_KEY, &hex::encode(fresh))?;
        self.store
            .set_json(keys::PREVIOUS_KEY, &hex::encode(retired))?;
        self.store.set_json(keys::LAST_KEY_ROTATION, &now)?;

        ring.previous = Some(retired);
        ring.current = fresh;
        ring.last_rotation = now;
        info!("master key rotated");
        Ok(())
    }

    /// Timestamp of the last key rotation.
    pub fn last_rotation(&self) -> DateTime<Utc> {
        self.ring.lock().unwrap().last_rotation
    }
}

fn generate_key() -> [u8; 32] {
    rand::thread_rng().gen()
}

fn decode_key(encoded: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(encoded)?;
    bytes
        .try_into()
        .map_err(|_| SecurityError::KeyMaterial {
            message: "stored master key has wrong length".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipvault_storage::MemoryStore;
    use proptest::prelude::*;

    fn engine() -> CryptoEngine {
        CryptoEngine::new(Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let crypto = engine();
        let sealed = crypto.encrypt("hello world").unwrap();
        assert_ne!(sealed.ciphertext, "hello world");
        let plaintext = crypto.decrypt(&sealed.ciphertext, &sealed.nonce).unwrap();
        assert_eq!(plaintext, "hello world");
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let crypto = engine();
        let sealed = crypto.encrypt("sensitive").unwrap();
        let mut raw = general_purpose::STANDARD.decode(&sealed.ciphertext).unwrap();
        raw[0] ^= 0xff;
        let tampered = general_purpose::STANDARD.encode(raw);
        assert!(crypto.decrypt(&tampered, &sealed.nonce).is_err());
    }

    #[test]
    fn tampered_nonce_fails() {
        let crypto = engine();
        let sealed = crypto.encrypt("sensitive").unwrap();
        let mut nonce = hex::decode(&sealed.nonce).unwrap();
        nonce[0] ^= 0xff;
        assert!(crypto
            .decrypt(&sealed.ciphertext, &hex::encode(nonce))
            .is_err());
    }

    #[test]
    fn nonces_are_fresh_per_call() {
        let crypto = engine();
        let a = crypto.encrypt("same input").unwrap();
        let b = crypto.encrypt("same input").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn key_persists_across_instances() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let sealed = {
            let crypto = CryptoEngine::new(Arc::clone(&store)).unwrap();
            crypto.encrypt("durable").unwrap()
        };
        let crypto = CryptoEngine::new(store).unwrap();
        assert_eq!(
            crypto.decrypt(&sealed.ciphertext, &sealed.nonce).unwrap(),
            "durable"
        );
    }

    #[test]
    fn rotation_keeps_old_items_readable() {
        let crypto = engine();
        let sealed = crypto.encrypt("pre-rotation").unwrap();
        crypto.rotate().unwrap();
        assert_eq!(
            crypto.decrypt(&sealed.ciphertext, &sealed.nonce).unwrap(),
            "pre-rotation"
        );

        // two rotations retire the original key for good
        crypto.rotate().unwrap();
        assert!(crypto.decrypt(&sealed.ciphertext, &sealed.nonce).is_err());
    }

    #[test]
    fn rotate_if_due_respects_interval() {
        let crypto = engine();
        let before = crypto.last_rotation();

        assert!(!crypto.rotate_if_due(7).unwrap());
        assert_eq!(crypto.last_rotation(), before);

        let later = before + Duration::days(8);
        assert!(crypto.rotate_if_due_at(7, later).unwrap());
        assert_eq!(crypto.last_rotation(), later);
    }

    #[test]
    fn hash_is_stable_sha256() {
        let crypto = engine();
        assert_eq!(
            crypto.hash("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    proptest! {
        #[test]
        fn round_trip_any_string(plaintext in ".*") {
            let crypto = engine();
            let sealed = crypto.encrypt(&plaintext).unwrap();
            let opened = crypto.decrypt(&sealed.ciphertext, &sealed.nonce).unwrap();
            prop_assert_eq!(opened, plaintext);
        }
    }
}
