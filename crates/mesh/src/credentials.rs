//! Mesh credential management (spec §4.4.2): a self-signed mesh CA signs
//! every node's certificate for mutual TLS between peers, and each tenant
//! gets an independently rotatable JWT signing secret used to mint and
//! validate session tokens. JWT handling mirrors the bearer-token
//! encode/decode/validate shape the control plane's own task-authorization
//! handler uses; certificate authority generation is built directly on
//! rcgen's documented self-signed/signed-by flow.

use crate::error::{MeshError, Result};
use crate::ids::{MeshId, NodeId, TenantId};
use crate::storage::Store;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::RwLock;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair, KeyUsagePurpose,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Storage keys for mesh credentials (spec §4.4.2), each scoped under the
/// owning mesh or tenant so multiple meshes/tenants can share one `Store`.
fn ca_certificate_key(mesh_id: &MeshId) -> String {
    format!("mesh.{mesh_id}.ca_certificate")
}

fn node_certificate_key(mesh_id: &MeshId, node_id: &NodeId) -> String {
    format!("mesh.{mesh_id}.node.{node_id}.certificate")
}

fn node_private_key_key(mesh_id: &MeshId, node_id: &NodeId) -> String {
    format!("mesh.{mesh_id}.node.{node_id}.private_key")
}

fn tenant_jwt_secret_key(tenant_id: &TenantId) -> String {
    format!("redb-security/tenant-jwt-secret-{tenant_id}")
}

/// An issued, PEM-encoded (cert, private key) pair.
#[derive(Clone)]
pub struct PemIdentity {
    pub cert_pem: String,
    pub key_pem: Zeroizing<String>,
}

/// The mesh's own certificate authority: signs every node certificate so
/// peers can verify each other without a third-party CA (spec §4.4.2
/// "mesh membership implies mutual trust").
pub struct MeshCertificateAuthority {
    ca_cert: rcgen::Certificate,
    ca_key: KeyPair,
}

impl MeshCertificateAuthority {
    /// Generates a fresh, self-signed mesh CA. Called once per mesh at
    /// seed time; joining nodes receive [`Self::cert_pem`] out of band and
    /// request a signed node certificate through [`Self::sign_node_cert`].
    pub fn generate(mesh_common_name: &str) -> Result<Self> {
        let mut params = CertificateParams::new(Vec::<String>::new())
            .map_err(|err| MeshError::Certificate(err.to_string()))?;
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, mesh_common_name);
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];

        let ca_key = KeyPair::generate().map_err(|err| MeshError::Certificate(err.to_string()))?;
        let ca_cert = params
            .self_signed(&ca_key)
            .map_err(|err| MeshError::Certificate(err.to_string()))?;

        Ok(Self { ca_cert, ca_key })
    }

    pub fn cert_pem(&self) -> String {
        self.ca_cert.pem()
    }

    /// Issues a node certificate bound to `node_id`, signed by this CA, with
    /// DNS SANs `{nodeID, nodeID.meshID}` (spec §4.4.2) so peers can address
    /// the node by its bare id or disambiguate it across meshes.
    pub fn sign_node_cert(&self, mesh_id: &MeshId, node_id: &NodeId) -> Result<PemIdentity> {
        let sans = vec![node_id.as_str().to_string(), format!("{node_id}.{mesh_id}")];
        let mut params = CertificateParams::new(sans).map_err(|err| MeshError::Certificate(err.to_string()))?;
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, node_id.as_str());
        params.distinguished_name = dn;
        params.key_usages = vec![KeyUsagePurpose::DigitalSignature, KeyUsagePurpose::KeyEncipherment];

        let node_key = KeyPair::generate().map_err(|err| MeshError::Certificate(err.to_string()))?;
        let node_cert = params
            .signed_by(&node_key, &self.ca_cert, &self.ca_key)
            .map_err(|err| MeshError::Certificate(err.to_string()))?;

        Ok(PemIdentity {
            cert_pem: node_cert.pem(),
            key_pem: Zeroizing::new(node_key.serialize_pem()),
        })
    }

    /// Seed path (spec §4.4.2): a fresh mesh is created by generating the CA,
    /// minting the seeding node's own certificate, and persisting all three
    /// (CA cert, node cert, node key) under the mesh's storage keys.
    pub fn seed(store: &Store, mesh_id: &MeshId, node_id: &NodeId) -> Result<(Self, PemIdentity)> {
        let ca = Self::generate(mesh_id.as_str())?;
        let identity = ca.sign_node_cert(mesh_id, node_id)?;
        store.kv_put(&ca_certificate_key(mesh_id), ca.cert_pem().as_bytes())?;
        store.kv_put(&node_certificate_key(mesh_id, node_id), identity.cert_pem.as_bytes())?;
        store.kv_put(&node_private_key_key(mesh_id, node_id), identity.key_pem.as_bytes())?;
        Ok((ca, identity))
    }

    /// Join path (spec §4.4.2): a node that already holds the mesh CA (cert
    /// and key, retrieved out of band via a join token verified by the
    /// seeded node) mints and persists a certificate for the joining node.
    pub fn join(&self, store: &Store, mesh_id: &MeshId, node_id: &NodeId) -> Result<PemIdentity> {
        let identity = self.sign_node_cert(mesh_id, node_id)?;
        store.kv_put(&ca_certificate_key(mesh_id), self.cert_pem().as_bytes())?;
        store.kv_put(&node_certificate_key(mesh_id, node_id), identity.cert_pem.as_bytes())?;
        store.kv_put(&node_private_key_key(mesh_id, node_id), identity.key_pem.as_bytes())?;
        Ok(identity)
    }
}

/// Builds a mutual-TLS `rustls::ServerConfig` that trusts only certificates
/// signed by `ca_pem`, and presents `identity`.
pub fn server_tls_config(ca_pem: &str, identity: &PemIdentity) -> Result<rustls::ServerConfig> {
    let roots = trust_roots(ca_pem)?;
    let verifier = rustls::server::WebPkiClientVerifier::builder(Arc::new(roots))
        .build()
        .map_err(|err| MeshError::Certificate(err.to_string()))?;

    let cert_chain = parse_certs(&identity.cert_pem)?;
    let key = parse_key(&identity.key_pem)?;

    rustls::ServerConfig::builder()
        .with_client_cert_verifier(verifier)
        .with_single_cert(cert_chain, key)
        .map_err(|err| MeshError::Certificate(err.to_string()))
}

/// Builds a mutual-TLS `rustls::ClientConfig` used when a node dials a
/// peer over the mesh's control channel.
pub fn client_tls_config(ca_pem: &str, identity: &PemIdentity) -> Result<rustls::ClientConfig> {
    let roots = trust_roots(ca_pem)?;
    let cert_chain = parse_certs(&identity.cert_pem)?;
    let key = parse_key(&identity.key_pem)?;

    rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_client_auth_cert(cert_chain, key)
        .map_err(|err| MeshError::Certificate(err.to_string()))
}

fn trust_roots(ca_pem: &str) -> Result<rustls::RootCertStore> {
    let mut roots = rustls::RootCertStore::empty();
    for cert in parse_certs(ca_pem)? {
        roots
            .add(cert)
            .map_err(|err| MeshError::Certificate(err.to_string()))?;
    }
    Ok(roots)
}

fn parse_certs(pem: &str) -> Result<Vec<rustls::pki_types::CertificateDer<'static>>> {
    rustls_pemfile::certs(&mut pem.as_bytes())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| MeshError::Certificate(err.to_string()))
}

fn parse_key(pem: &str) -> Result<rustls::pki_types::PrivateKeyDer<'static>> {
    rustls_pemfile::private_key(&mut pem.as_bytes())
        .map_err(|err| MeshError::Certificate(err.to_string()))?
        .ok_or_else(|| MeshError::Certificate("no private key found in PEM".to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub tenant_id: TenantId,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
struct TenantSecret {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    rotated_at: DateTime<Utc>,
}

/// Per-tenant JWT signing secrets with explicit rotation (spec §4.4.2,
/// scenario S6: "rotating a tenant's secret invalidates all outstanding
/// sessions for that tenant"). Rotation swaps the in-memory
/// signing/verification key and overwrites the tenant's keyring entry;
/// invalidating already-issued session *rows* in the metadata store is the
/// caller's job (mesh has no dependency on `metadata`).
#[derive(Clone, Default)]
pub struct TenantSecretCache {
    secrets: Arc<RwLock<HashMap<TenantId, TenantSecret>>>,
}

impl TenantSecretCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a fresh random secret for `tenant_id`, discarding whatever
    /// key was previously used to sign tokens for it. Any token signed
    /// with the old key fails [`Self::validate`] from this point on. The
    /// secret is base64-encoded and written to the tenant's keyring entry
    /// (spec §4.4.2) so a later process can recover it via [`Self::load`].
    pub fn rotate(&self, store: &Store, tenant_id: &TenantId) -> Result<()> {
        let raw = rand_secret();
        let secret = TenantSecret {
            encoding: Arc::new(EncodingKey::from_secret(&raw)),
            decoding: Arc::new(DecodingKey::from_secret(&raw)),
            rotated_at: Utc::now(),
        };
        store.kv_put(&tenant_jwt_secret_key(tenant_id), base64::encode(raw).as_bytes())?;
        self.secrets.write().insert(tenant_id.clone(), secret);
        Ok(())
    }

    /// Hydrates the in-memory cache for `tenant_id` from its persisted
    /// keyring entry, if one exists. Returns `false` when no secret has
    /// ever been rotated in for this tenant.
    pub fn load(&self, store: &Store, tenant_id: &TenantId) -> Result<bool> {
        let Some(encoded) = store.kv_get(&tenant_jwt_secret_key(tenant_id))? else {
            return Ok(false);
        };
        let raw = base64::decode(encoded)
            .map_err(|err| MeshError::Internal(format!("corrupt tenant jwt secret: {err}")))?;
        let secret = TenantSecret {
            encoding: Arc::new(EncodingKey::from_secret(&raw)),
            decoding: Arc::new(DecodingKey::from_secret(&raw)),
            rotated_at: Utc::now(),
        };
        self.secrets.write().insert(tenant_id.clone(), secret);
        Ok(true)
    }

    pub fn rotated_at(&self, tenant_id: &TenantId) -> Option<DateTime<Utc>> {
        self.secrets.read().get(tenant_id).map(|s| s.rotated_at)
    }

    pub fn issue(&self, tenant_id: &TenantId, subject: &str, ttl: ChronoDuration) -> Result<String> {
        let secrets = self.secrets.read();
        let secret = secrets
            .get(tenant_id)
            .ok_or_else(|| MeshError::NoTenantSecret(tenant_id.clone()))?;
        let now = Utc::now();
        let claims = SessionClaims {
            sub: subject.to_string(),
            tenant_id: tenant_id.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &secret.encoding)
            .map_err(|_| MeshError::InvalidToken)
    }

    pub fn validate(&self, tenant_id: &TenantId, token: &str) -> Result<SessionClaims> {
        let secrets = self.secrets.read();
        let secret = secrets
            .get(tenant_id)
            .ok_or_else(|| MeshError::NoTenantSecret(tenant_id.clone()))?;
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<SessionClaims>(token, &secret.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| MeshError::InvalidToken)
    }
}

fn rand_secret() -> [u8; 64] {
    use rand::RngCore;
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ca_signs_a_node_cert_that_carries_both_sans() {
        let mesh_id = MeshId::from("mesh-1");
        let node_id = NodeId::from("node-a");
        let ca = MeshCertificateAuthority::generate("test-mesh").unwrap();
        let identity = ca.sign_node_cert(&mesh_id, &node_id).unwrap();
        assert!(identity.cert_pem.contains("BEGIN CERTIFICATE"));
        assert!(identity.key_pem.contains("PRIVATE KEY"));
    }

    #[test]
    fn seeding_persists_ca_and_node_credentials_under_their_storage_keys() {
        let store = Store::new();
        let mesh_id = MeshId::from("mesh-1");
        let node_id = NodeId::from("node-a");

        let (ca, identity) = MeshCertificateAuthority::seed(&store, &mesh_id, &node_id).unwrap();

        assert_eq!(
            store.kv_get(&ca_certificate_key(&mesh_id)).unwrap().unwrap(),
            ca.cert_pem().into_bytes()
        );
        assert_eq!(
            store.kv_get(&node_certificate_key(&mesh_id, &node_id)).unwrap().unwrap(),
            identity.cert_pem.into_bytes()
        );
        assert_eq!(
            store.kv_get(&node_private_key_key(&mesh_id, &node_id)).unwrap().unwrap(),
            identity.key_pem.as_bytes().to_vec()
        );
    }

    #[test]
    fn joining_persists_this_nodes_own_certificate_and_key() {
        let store = Store::new();
        let mesh_id = MeshId::from("mesh-1");
        let seed_node = NodeId::from("node-a");
        let joining_node = NodeId::from("node-b");

        let (ca, _) = MeshCertificateAuthority::seed(&store, &mesh_id, &seed_node).unwrap();
        let identity = ca.join(&store, &mesh_id, &joining_node).unwrap();

        assert_eq!(
            store.kv_get(&node_certificate_key(&mesh_id, &joining_node)).unwrap().unwrap(),
            identity.cert_pem.into_bytes()
        );
        assert!(store.kv_get(&node_private_key_key(&mesh_id, &joining_node)).unwrap().is_some());
    }

    #[test]
    fn issuing_without_a_rotated_secret_fails_with_no_tenant_secret() {
        let cache = TenantSecretCache::new();
        let tenant = TenantId::from("tenant-a");
        let err = cache.issue(&tenant, "user-1", ChronoDuration::hours(1)).unwrap_err();
        assert!(matches!(err, MeshError::NoTenantSecret(_)));
    }

    #[test]
    fn rotation_invalidates_tokens_signed_with_the_old_secret() {
        let store = Store::new();
        let cache = TenantSecretCache::new();
        let tenant = TenantId::from("tenant-a");
        cache.rotate(&store, &tenant).unwrap();
        let token = cache.issue(&tenant, "user-1", ChronoDuration::hours(1)).unwrap();
        assert!(cache.validate(&tenant, &token).is_ok());

        cache.rotate(&store, &tenant).unwrap();
        assert!(matches!(cache.validate(&tenant, &token), Err(MeshError::InvalidToken)));
    }

    #[test]
    fn rotation_writes_a_64_byte_secret_to_the_tenant_keyring() {
        let store = Store::new();
        let cache = TenantSecretCache::new();
        let tenant = TenantId::from("tenant-a");
        cache.rotate(&store, &tenant).unwrap();

        let encoded = store.kv_get(&tenant_jwt_secret_key(&tenant)).unwrap().unwrap();
        let raw = base64::decode(encoded).unwrap();
        assert_eq!(raw.len(), 64);
    }

    #[test]
    fn load_hydrates_the_cache_from_a_previously_rotated_keyring_entry() {
        let store = Store::new();
        let tenant = TenantId::from("tenant-a");

        let writer = TenantSecretCache::new();
        writer.rotate(&store, &tenant).unwrap();
        let token = writer.issue(&tenant, "user-1", ChronoDuration::hours(1)).unwrap();

        let reader = TenantSecretCache::new();
        assert!(reader.validate(&tenant, &token).is_err());
        assert!(reader.load(&store, &tenant).unwrap());
        assert!(reader.validate(&tenant, &token).is_ok());
    }
}
