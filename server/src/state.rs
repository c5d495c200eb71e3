//! Application state

use ratt_core::{build_routes, Result, Router, ServiceRegistry, Services};
use std::sync::Arc;

use crate::config::Config;
use crate::shell::{self, HostDocument, MountedApp, RootComponent};

/// Shared application state
///
/// Everything here is read-only after startup, so cloning only bumps the
/// reference counts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
    pub app: Arc<MountedApp>,
}

impl AppState {
    /// Bootstrap services, build the route table and mount the shell
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, ServiceRegistry::global())
    }

    /// Same as [`AppState::new`] with an explicit service registry
    pub fn with_registry(config: Config, registry: &ServiceRegistry) -> Result<Self> {
        let services = registry.initialize(config.services.clone())?;

        let table = Arc::new(build_routes(config.root_behavior)?);
        let host = HostDocument::load(config.index_html.as_deref(), &config.mount_target)?;
        let app = shell::mount(
            RootComponent::new(Arc::clone(&services)),
            Router::new(table),
            &host,
            &config.mount_target,
        )?;

        Ok(Self {
            config: Arc::new(config),
            services,
            app: Arc::new(app),
        })
    }
}
