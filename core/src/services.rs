//! Backend service bootstrap
//!
//! Turns a [`ServiceConfig`] into the three platform handles the rest of the
//! application talks to: identity ([`AuthHandle`]), document database
//! ([`DocumentStore`]) and blob storage ([`BlobStore`]).
//!
//! Bootstrap performs no validation and no network I/O. A wrong API key or
//! project id is only discovered when a handle is first used against the
//! platform. The bundle is built at most once per [`ServiceRegistry`] and
//! handed out as a shared [`Arc<Services>`].

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

use crate::{Error, Result};

const USER_AGENT: &str = concat!("ratt/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Configuration
// ============================================================================

/// Identifiers of the backend project to connect to
///
/// Field names also accept the platform's camelCase spelling, so a web app
/// config object can be pasted as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    #[serde(alias = "apiKey")]
    pub api_key: String,

    #[serde(alias = "authDomain")]
    pub auth_domain: String,

    #[serde(alias = "projectId")]
    pub project_id: String,

    #[serde(alias = "storageBucket")]
    pub storage_bucket: String,

    #[serde(alias = "messagingSenderId")]
    pub messaging_sender_id: String,

    #[serde(alias = "appId")]
    pub app_id: String,

    /// Analytics id, optional
    #[serde(alias = "measurementId")]
    pub measurement_id: Option<String>,

    /// API base URLs, overridable for local emulators
    pub endpoints: ServiceEndpoints,
}

/// Base URLs of the platform REST APIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    pub auth: String,
    pub firestore: String,
    pub storage: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            auth: "https://identitytoolkit.googleapis.com/v1".to_string(),
            firestore: "https://firestore.googleapis.com/v1".to_string(),
            storage: "https://firebasestorage.googleapis.com/v0".to_string(),
        }
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Identity service handle
#[derive(Debug, Clone)]
pub struct AuthHandle {
    client: Client,
    endpoint: String,
    api_key: String,
    auth_domain: String,
}

impl AuthHandle {
    pub fn auth_domain(&self) -> &str {
        &self.auth_domain
    }

    /// URL of an `accounts:{method}` call, e.g. `signInWithPassword`
    pub fn endpoint(&self, method: &str) -> Result<Url> {
        let mut url = parse_base(&self.endpoint, "auth")?;
        url.path_segments_mut()
            .map_err(|_| invalid_base("auth", &self.endpoint))?
            .pop_if_empty()
            .push(&format!("accounts:{}", method));
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    pub fn request(&self, method: &str) -> Result<RequestBuilder> {
        Ok(self.client.post(self.endpoint(method)?))
    }
}

/// Document database handle
#[derive(Debug, Clone)]
pub struct DocumentStore {
    client: Client,
    endpoint: String,
    project_id: String,
}

impl DocumentStore {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// URL of a document or collection, `path` being slash separated
    /// (`events/abc123`)
    pub fn document_url(&self, path: &str) -> Result<Url> {
        let mut url = parse_base(&self.endpoint, "firestore")?;
        url.path_segments_mut()
            .map_err(|_| invalid_base("firestore", &self.endpoint))?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
            ])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.client.request(method, self.document_url(path)?))
    }
}

/// Blob storage handle
#[derive(Debug, Clone)]
pub struct BlobStore {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl BlobStore {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// URL of an object; the whole name is one encoded segment
    pub fn object_url(&self, name: &str) -> Result<Url> {
        let mut url = parse_base(&self.endpoint, "storage")?;
        url.path_segments_mut()
            .map_err(|_| invalid_base("storage", &self.endpoint))?
            .pop_if_empty()
            .extend(["b", self.bucket.as_str(), "o", name]);
        Ok(url)
    }

    pub fn request(&self, method: Method, name: &str) -> Result<RequestBuilder> {
        Ok(self.client.request(method, self.object_url(name)?))
    }
}

fn parse_base(endpoint: &str, service: &str) -> Result<Url> {
    Url::parse(endpoint)
        .map_err(|e| Error::ConfigError(format!("Invalid {} endpoint '{}': {}", service, endpoint, e)))
}

fn invalid_base(service: &str, endpoint: &str) -> Error {
    Error::ConfigError(format!("Invalid {} endpoint '{}': not a base URL", service, endpoint))
}

// ============================================================================
// Bundle
// ============================================================================

/// The three service handles plus the configuration they came from
#[derive(Debug)]
pub struct Services {
    config: ServiceConfig,
    auth: AuthHandle,
    store: DocumentStore,
    blobs: BlobStore,
}

impl Services {
    fn connect(config: ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::ServiceInitError(format!("Failed to build HTTP client: {}", e)))?;

        let auth = AuthHandle {
            client: client.clone(),
            endpoint: config.endpoints.auth.clone(),
            api_key: config.api_key.clone(),
            auth_domain: config.auth_domain.clone(),
        };
        let store = DocumentStore {
            client: client.clone(),
            endpoint: config.endpoints.firestore.clone(),
            project_id: config.project_id.clone(),
        };
        let blobs = BlobStore {
            client,
            endpoint: config.endpoints.storage.clone(),
            bucket: config.storage_bucket.clone(),
        };

        info!(project_id = %config.project_id, "Backend services initialized");

        Ok(Self {
            config,
            auth,
            store,
            blobs,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthHandle {
        &self.auth
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }
}

// ============================================================================
// Registry
// ============================================================================

static GLOBAL_REGISTRY: ServiceRegistry = ServiceRegistry::new();

/// Holds the one service bundle of a process (or of a test)
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: OnceLock<Arc<Services>>,
}

impl ServiceRegistry {
    pub const fn new() -> Self {
        Self {
            services: OnceLock::new(),
        }
    }

    /// Process-wide registry used by [`initialize`]
    pub fn global() -> &'static ServiceRegistry {
        &GLOBAL_REGISTRY
    }

    /// Build the bundle on first call; later calls with the same config
    /// return the same bundle, a different config is an error
    pub fn initialize(&self, config: ServiceConfig) -> Result<Arc<Services>> {
        if let Some(existing) = self.services.get() {
            return reuse(existing, &config);
        }

        let candidate = Arc::new(Services::connect(config.clone())?);
        let winner = self.services.get_or_init(|| candidate);
        reuse(winner, &config)
    }

    /// Bundle built by an earlier `initialize`, if any
    pub fn get(&self) -> Option<Arc<Services>> {
        self.services.get().cloned()
    }
}

fn reuse(existing: &Arc<Services>, config: &ServiceConfig) -> Result<Arc<Services>> {
    if existing.config() == config {
        debug!(project_id = %config.project_id, "Reusing backend services");
        Ok(Arc::clone(existing))
    } else {
        Err(Error::DuplicateServices {
            existing: existing.config().project_id.clone(),
            requested: config.project_id.clone(),
        })
    }
}

/// Initialize the process-wide service bundle
pub fn initialize(config: ServiceConfig) -> Result<Arc<Services>> {
    ServiceRegistry::global().initialize(config)
}
