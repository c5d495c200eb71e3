//! Application shell
//!
//! The host document carries a single empty element (`<div id="app">`) that
//! the root component is mounted into. Once mounted, page changes are router
//! transitions: a full request gets the whole document with the active page
//! inside the mount point, an in-app navigation request gets only the root
//! component, which the client swaps into the mount point.

use ratt_core::{Error, Navigation, Page, Result, RouteTable, Router, Services};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::templates::{
    render, AddItemTemplate, AppTemplate, DashboardTemplate, HomeTemplate, IndexTemplate, LoginTemplate,
    NavLink, NotFoundTemplate, SignUpTemplate,
};

const DOCUMENT_TITLE: &str = "ratt";

// ============================================================================
// Host document
// ============================================================================

/// HTML document hosting the application
#[derive(Debug, Clone)]
pub struct HostDocument {
    html: String,
}

impl HostDocument {
    /// Built-in index page with an insertion point named `mount_target`
    pub fn builtin(mount_target: &str) -> Result<Self> {
        let html = render(&IndexTemplate {
            title: DOCUMENT_TITLE,
            mount_target,
        })?;
        Ok(Self { html })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let html = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read host document {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self { html })
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Custom document if a path is configured, otherwise the built-in one
    pub fn load(index_html: Option<&str>, mount_target: &str) -> Result<Self> {
        match index_html {
            Some(path) => Self::from_file(path),
            None => Self::builtin(mount_target),
        }
    }

    /// Byte offset just inside the opening tag of the element with id `target`
    fn insertion_point(&self, target: &str) -> Option<usize> {
        let attr = self
            .html
            .match_indices("id")
            .find_map(|(at, _)| self.id_value_end(at, target))?;

        let close = self.html[attr..].find('>')? + attr;
        if self.html[..close].ends_with('/') {
            // Self-closing element cannot hold content
            return None;
        }
        Some(close + 1)
    }

    /// End of an `id` attribute starting at `at` whose value is exactly `target`
    fn id_value_end(&self, at: usize, target: &str) -> Option<usize> {
        let html = self.html.as_bytes();

        // Whole attribute name inside an open tag, not `data-id` or text
        if at == 0 || !html[at - 1].is_ascii_whitespace() {
            return None;
        }
        let tag_open = self.html[..at].rfind('<')?;
        if self.html[..at].rfind('>').is_some_and(|gt| gt > tag_open) {
            return None;
        }

        let rest = self.html[at + 2..].trim_start();
        let rest = rest.strip_prefix('=')?.trim_start();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &rest[1..];
        let len = value.find(quote)?;
        if &value[..len] != target {
            return None;
        }

        let value_start = self.html.len() - value.len();
        Some(value_start + len + 1)
    }
}

// ============================================================================
// Root component
// ============================================================================

/// The root UI component: navigation bar plus the page of the active route
#[derive(Debug, Clone)]
pub struct RootComponent {
    services: Arc<Services>,
}

impl RootComponent {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    fn render(&self, table: &RouteTable, navigation: &Navigation, mount_target: &str) -> Result<String> {
        let active = navigation.active();

        let links = table
            .pages()
            .map(|(entry, page)| NavLink {
                path: entry.path.clone(),
                title: page.title(),
                active: active.is_some_and(|a| a.name == entry.name),
            })
            .collect();

        let content = match active {
            Some(route) => self.render_page(table, route.page)?,
            None => render(&NotFoundTemplate {
                path: navigation.location(),
                home_path: "/",
            })?,
        };

        render(&AppTemplate {
            mount_target,
            links,
            content,
        })
    }

    fn render_page(&self, table: &RouteTable, page: Page) -> Result<String> {
        let path = |page: Page| table.path_for(page).unwrap_or("/");

        match page {
            Page::Home => render(&HomeTemplate {
                login_path: path(Page::Login),
            }),
            Page::Login => render(&LoginTemplate {
                signup_path: path(Page::SignUp),
            }),
            Page::SignUp => render(&SignUpTemplate {
                login_path: path(Page::Login),
            }),
            Page::Dashboard => render(&DashboardTemplate {
                project_id: self.services.store().project_id(),
                create_path: path(Page::AddItem),
            }),
            Page::AddItem => render(&AddItemTemplate {
                bucket: self.services.blobs().bucket(),
                dashboard_path: path(Page::Dashboard),
            }),
        }
    }
}

// ============================================================================
// Mounting
// ============================================================================

/// Root component attached to a host document with its router
#[derive(Debug)]
pub struct MountedApp {
    root: RootComponent,
    router: Router,
    target: String,
    head: String,
    tail: String,
}

/// Mount `root` into the element with id `target` of `host`
///
/// Fails with [`Error::MountError`] when the document has no such element.
pub fn mount(root: RootComponent, router: Router, host: &HostDocument, target: &str) -> Result<MountedApp> {
    let at = host
        .insertion_point(target)
        .ok_or_else(|| Error::MountError(target.to_string()))?;

    info!(mount_target = target, routes = router.table().len(), "Application mounted");

    Ok(MountedApp {
        root,
        router,
        target: target.to_string(),
        head: host.html[..at].to_string(),
        tail: host.html[at..].to_string(),
    })
}

impl MountedApp {
    pub fn table(&self) -> &RouteTable {
        self.router.table()
    }

    pub fn mount_target(&self) -> &str {
        &self.target
    }

    /// Run a navigation to `path` from the mounted router's initial state
    pub fn navigate(&self, path: &str) -> Navigation {
        let mut router = self.router.clone();
        router.push(path)
    }

    /// Render the outcome of a navigation
    ///
    /// `partial` renders only the root component for in-app navigation;
    /// otherwise the full host document is produced.
    pub fn render(&self, navigation: &Navigation, partial: bool) -> Result<String> {
        let component = self.root.render(self.table(), navigation, &self.target)?;
        debug!(location = navigation.location(), partial, "Rendered root component");

        if partial {
            Ok(component)
        } else {
            Ok(format!("{}{}{}", self.head, component, self.tail))
        }
    }
}
