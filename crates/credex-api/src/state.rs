//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! The identity registry (companies, verifiers, issuers, users, holder
//! apps) and the request ledger (presentation requests, shared
//! credentials) are plain records behind explicit per-entity repositories
//! exposing get-by-id / get-by-DID / create / patch. Persistence mapping
//! is the repository's concern, never the record's — the records carry no
//! storage annotations. The repositories here are in-memory; a durable
//! engine would slot in behind the same operations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use credex_authority_client::AuthorityClient;
use credex_core::{Credential, Did, Proof};

use crate::notify::ChannelHub;
use crate::tokens::TokenCustodian;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// Return the first record matching the predicate.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| predicate(v)).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Registry Record Types ----------------------------------------------------

/// A customer company owning verifiers, issuers, users, and holder apps.
#[derive(Debug, Clone)]
pub struct CompanyRecord {
    pub id: Uuid,
    pub name: String,
    /// The company's account identifier at the external authority.
    pub authority_customer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered relying-party verifier.
///
/// `auth_token` is the rotating authentication credential owned by the
/// [`TokenCustodian`]; every other field is immutable after the
/// out-of-band registration call that creates the record.
///
/// Custom `Debug` redacts key material and the auth token to prevent
/// credential leakage in logs.
#[derive(Clone)]
pub struct VerifierRecord {
    pub id: Uuid,
    pub name: String,
    /// The verifier's decentralized identifier (stored without fragment).
    pub did: Did,
    pub signing_key: String,
    /// Private key the authority uses to open envelopes encrypted to this
    /// verifier. Forwarded opaquely, never used locally.
    pub encryption_key: String,
    /// Rotating authentication credential for authority calls.
    pub auth_token: String,
    pub company_id: Uuid,
    /// URL the holder app posts presentations back to.
    pub callback_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for VerifierRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("did", &self.did)
            .field("signing_key", &"[REDACTED]")
            .field("encryption_key", &"[REDACTED]")
            .field("auth_token", &"[REDACTED]")
            .field("company_id", &self.company_id)
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

/// A registered credential issuer.
///
/// Carries the same rotating `auth_token` rule as [`VerifierRecord`].
#[derive(Clone)]
pub struct IssuerRecord {
    pub id: Uuid,
    pub name: String,
    /// The issuer's decentralized identifier (stored without fragment).
    pub did: Did,
    pub signing_key: String,
    pub auth_token: String,
    /// Deep-link scheme of the issuer's holder-facing app.
    pub uri_scheme: String,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("did", &self.did)
            .field("signing_key", &"[REDACTED]")
            .field("auth_token", &"[REDACTED]")
            .field("uri_scheme", &self.uri_scheme)
            .field("company_id", &self.company_id)
            .finish()
    }
}

/// A registered holder application.
#[derive(Clone)]
pub struct HolderAppRecord {
    pub id: Uuid,
    pub name: String,
    pub uri_scheme: String,
    pub api_key: String,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for HolderAppRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolderAppRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("uri_scheme", &self.uri_scheme)
            .field("api_key", &"[REDACTED]")
            .field("company_id", &self.company_id)
            .finish()
    }
}

/// A subject user.
///
/// The DID is the join key resolving presentations back to local
/// subjects; it stays unset until the holder establishes its identity.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: Option<String>,
    pub did: Option<Did>,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One credential ask inside a presentation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    /// The credential type being requested.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// DIDs of issuers whose credentials satisfy this ask.
    pub required_issuer_ids: Vec<Did>,
    /// Whether the response must fulfill this ask.
    #[serde(default)]
    pub required: bool,
}

/// Correlation metadata attached to a presentation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    /// The user who should receive the verification result.
    pub correlated_user_id: Option<Uuid>,
    /// Caller-supplied opaque fields, carried verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Issuer summary embedded in requests and receipts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuerInfo {
    /// The issuer's decentralized identifier.
    #[schema(value_type = String)]
    pub did: Did,
    /// The issuer's display name.
    pub name: String,
}

/// An outstanding challenge a verifier sent to a holder.
///
/// Immutable after creation; the pipeline reads it to recover the
/// verifier context and the correlated user.
#[derive(Debug, Clone)]
pub struct PresentationRequestRecord {
    pub id: Uuid,
    pub verifier_id: Uuid,
    pub credential_requests: Vec<CredentialRequest>,
    pub proof: Option<Proof>,
    pub metadata: RequestMetadata,
    pub holder_app_id: Uuid,
    /// Issuers acceptable for this request, keyed by bare DID.
    pub issuer_info: HashMap<String, IssuerInfo>,
    pub deeplink: String,
    pub qr_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A durable disclosure record: one credential shared with one verifier.
///
/// Append-only; created exactly once per disclosed credential per
/// successful verification and never updated.
#[derive(Debug, Clone)]
pub struct SharedCredentialRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub issuer_id: Uuid,
    pub verifier_id: Uuid,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
}

// -- Repositories -------------------------------------------------------------

/// Repository over the company registry.
#[derive(Debug, Clone, Default)]
pub struct CompanyRepository {
    store: Store<CompanyRecord>,
}

impl CompanyRepository {
    pub fn create(&self, record: CompanyRecord) -> CompanyRecord {
        self.store.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<CompanyRecord> {
        self.store.get(id)
    }
}

/// Repository over the verifier registry.
#[derive(Debug, Clone, Default)]
pub struct VerifierRepository {
    pub(crate) store: Store<VerifierRecord>,
}

impl VerifierRepository {
    pub fn create(&self, record: VerifierRecord) -> VerifierRecord {
        self.store.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<VerifierRecord> {
        self.store.get(id)
    }

    pub fn get_by_did(&self, did: &str) -> Option<VerifierRecord> {
        self.store.find(|v| v.did.as_str() == did)
    }

    /// Patch the rotating auth token. All other fields are immutable.
    pub fn patch_auth_token(&self, id: &Uuid, auth_token: &str) -> Option<VerifierRecord> {
        self.store.update(id, |v| {
            v.auth_token = auth_token.to_string();
            v.updated_at = Utc::now();
        })
    }
}

/// Repository over the issuer registry.
#[derive(Debug, Clone, Default)]
pub struct IssuerRepository {
    store: Store<IssuerRecord>,
}

impl IssuerRepository {
    pub fn create(&self, record: IssuerRecord) -> IssuerRecord {
        self.store.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<IssuerRecord> {
        self.store.get(id)
    }

    pub fn get_by_did(&self, did: &str) -> Option<IssuerRecord> {
        self.store.find(|i| i.did.as_str() == did)
    }
}

/// Repository over the user registry.
#[derive(Debug, Clone, Default)]
pub struct UserRepository {
    store: Store<UserRecord>,
}

impl UserRepository {
    pub fn create(&self, record: UserRecord) -> UserRecord {
        self.store.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<UserRecord> {
        self.store.get(id)
    }

    pub fn get_by_did(&self, did: &str) -> Option<UserRecord> {
        self.store
            .find(|u| u.did.as_ref().is_some_and(|d| d.as_str() == did))
    }
}

/// Repository over the holder-app registry.
#[derive(Debug, Clone, Default)]
pub struct HolderAppRepository {
    store: Store<HolderAppRecord>,
}

impl HolderAppRepository {
    pub fn create(&self, record: HolderAppRecord) -> HolderAppRecord {
        self.store.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<HolderAppRecord> {
        self.store.get(id)
    }
}

/// Repository over the presentation-request ledger.
#[derive(Debug, Clone, Default)]
pub struct PresentationRequestRepository {
    store: Store<PresentationRequestRecord>,
}

impl PresentationRequestRepository {
    pub fn create(&self, record: PresentationRequestRecord) -> PresentationRequestRecord {
        self.store.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<PresentationRequestRecord> {
        self.store.get(id)
    }
}

/// Append-only repository over disclosed credentials.
#[derive(Debug, Clone, Default)]
pub struct SharedCredentialRepository {
    store: Store<SharedCredentialRecord>,
}

impl SharedCredentialRepository {
    /// Persist one disclosure.
    pub fn create(
        &self,
        user_id: Uuid,
        issuer_id: Uuid,
        verifier_id: Uuid,
        credential: Credential,
    ) -> SharedCredentialRecord {
        let record = SharedCredentialRecord {
            id: Uuid::new_v4(),
            user_id,
            issuer_id,
            verifier_id,
            credential,
            created_at: Utc::now(),
        };
        self.store.insert(record.id, record.clone());
        record
    }

    pub fn list(&self) -> Vec<SharedCredentialRecord> {
        self.store.list()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

// -- Application State --------------------------------------------------------

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: 3031 }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each repository; all clones
/// share the same data.
#[derive(Debug, Clone)]
pub struct AppState {
    // -- Identity registry --
    pub companies: CompanyRepository,
    pub verifiers: VerifierRepository,
    pub issuers: IssuerRepository,
    pub users: UserRepository,
    pub holder_apps: HolderAppRepository,

    // -- Request ledger --
    pub presentation_requests: PresentationRequestRepository,
    pub shared_credentials: SharedCredentialRepository,

    // -- Token custody --
    /// Owner of the rotating per-verifier auth token.
    pub tokens: TokenCustodian,

    // -- Realtime verdict channels --
    pub channels: ChannelHub,

    // -- External verification authority --
    pub authority: AuthorityClient,

    // -- Configuration --
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with empty registries.
    pub fn new(config: AppConfig, authority: AuthorityClient) -> Self {
        let verifiers = VerifierRepository::default();
        Self {
            companies: CompanyRepository::default(),
            tokens: TokenCustodian::new(verifiers.clone()),
            verifiers,
            issuers: IssuerRepository::default(),
            users: UserRepository::default(),
            holder_apps: HolderAppRepository::default(),
            presentation_requests: PresentationRequestRepository::default(),
            shared_credentials: SharedCredentialRepository::default(),
            channels: ChannelHub::new(),
            authority,
            config,
        }
    }
}
