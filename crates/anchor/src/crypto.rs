//! Tenant-scoped credential decryption at the adapter boundary (spec
//! §4.2.1, §4.2.4, §6.3): passwords arrive AEAD-sealed and are decrypted
//! with a data key released per tenant. Uses `aes-siv` for sealing
//! sensitive config.

use crate::error::{AdapterError, Result};
use crate::ids::TenantId;
use aes_siv::aead::{Aead, KeyInit, Payload};
use aes_siv::Aes256SivAead;
use async_trait::async_trait;

/// The boundary contract through which the anchor kernel asks the
/// metadata store (an external collaborator, spec §4.3) to release the
/// data key for one tenant. Implemented outside this crate.
#[async_trait]
pub trait KeyRelease: Send + Sync {
    async fn release_key(&self, tenant_id: &TenantId) -> Result<[u8; 64]>;
}

/// Decrypts a sealed password, skipping decryption entirely when the
/// ciphertext is empty (spec §4.2.1: "if the configured password is
/// empty, decryption is skipped").
pub async fn decrypt_password(
    keys: &dyn KeyRelease,
    tenant_id: &TenantId,
    sealed: &[u8],
) -> Result<String> {
    if sealed.is_empty() {
        return Ok(String::new());
    }

    let key = keys.release_key(tenant_id).await?;
    let cipher = Aes256SivAead::new(key.as_slice().into());

    // Nonce is the leading 16 bytes of the sealed blob; SIV mode tolerates
    // a fixed-width prefix nonce without a dedicated counter.
    if sealed.len() < 16 {
        return Err(AdapterError::DecryptionFailed {
            tenant_id: tenant_id.clone(),
        });
    }
    let (nonce, ciphertext) = sealed.split_at(16);

    let plaintext = cipher
        .decrypt(
            nonce.into(),
            Payload {
                msg: ciphertext,
                aad: tenant_id.as_str().as_bytes(),
            },
        )
        .map_err(|_| AdapterError::DecryptionFailed {
            tenant_id: tenant_id.clone(),
        })?;

    String::from_utf8(plaintext).map_err(|_| AdapterError::DecryptionFailed {
        tenant_id: tenant_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticKey([u8; 64]);

    #[async_trait]
    impl KeyRelease for StaticKey {
        async fn release_key(&self, _tenant_id: &TenantId) -> Result<[u8; 64]> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn empty_ciphertext_skips_decryption() {
        let keys = StaticKey([7u8; 64]);
        let tenant_id = TenantId::from("tenant-a");
        let password = decrypt_password(&keys, &tenant_id, &[]).await.unwrap();
        assert_eq!(password, "");
    }

    #[tokio::test]
    async fn roundtrip_seal_and_open() {
        let key = [9u8; 64];
        let keys = StaticKey(key);
        let tenant_id = TenantId::from("tenant-a");
        let cipher = Aes256SivAead::new(key.as_slice().into());
        let nonce = [0u8; 16];
        let ciphertext = cipher
            .encrypt(
                (&nonce).into(),
                Payload {
                    msg: b"hunter2",
                    aad: tenant_id.as_str().as_bytes(),
                },
            )
            .unwrap();
        let mut sealed = nonce.to_vec();
        sealed.extend(ciphertext);

        let password = decrypt_password(&keys, &tenant_id, &sealed).await.unwrap();
        assert_eq!(password, "hunter2");
    }
}
