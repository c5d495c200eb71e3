//! Client-side router
//!
//! A [`Router`] owns a shared [`RouteTable`] and a navigation history. Its
//! state is either "no route active" or "route X active" for one of the
//! declared routes. Navigation events (`push`, `replace`, `back`, `forward`)
//! move between those states and report what happened as a [`Navigation`].

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::routes::{normalize_path, Page, Resolution, RouteTable};

/// The route currently rendered by the router
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveRoute {
    pub name: String,
    pub path: String,
    pub page: Page,
}

/// Result of a navigation event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The requested path is a page route and is now active
    Activated(ActiveRoute),
    /// The requested path redirected; `active` is the route it landed on
    Redirected { from: String, active: ActiveRoute },
    /// Nothing matched; no route is active
    Unmatched { path: String },
}

impl Navigation {
    /// Route active after the navigation, if any
    pub fn active(&self) -> Option<&ActiveRoute> {
        match self {
            Navigation::Activated(active) => Some(active),
            Navigation::Redirected { active, .. } => Some(active),
            Navigation::Unmatched { .. } => None,
        }
    }

    /// Path the browser should display after the navigation
    pub fn location(&self) -> &str {
        match self {
            Navigation::Activated(active) => &active.path,
            Navigation::Redirected { active, .. } => &active.path,
            Navigation::Unmatched { path } => path,
        }
    }
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    path: String,
    active: Option<ActiveRoute>,
}

/// Path-based router with browser-style history
#[derive(Debug, Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    history: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl Router {
    /// Router with no active route
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            history: Vec::new(),
            cursor: None,
        }
    }

    /// Router whose initial state is whatever `path` resolves to
    pub fn start(table: Arc<RouteTable>, path: &str) -> (Self, Navigation) {
        let mut router = Self::new(table);
        let navigation = router.push(path);
        (router, navigation)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Active route, `None` before the first navigation or after an
    /// unmatched one
    pub fn current(&self) -> Option<&ActiveRoute> {
        self.cursor
            .and_then(|i| self.history.get(i))
            .and_then(|entry| entry.active.as_ref())
    }

    /// Path of the current history entry, matched or not
    pub fn current_path(&self) -> Option<&str> {
        self.cursor
            .and_then(|i| self.history.get(i))
            .map(|entry| entry.path.as_str())
    }

    /// Navigate to `path`, adding a history entry and dropping any forward
    /// entries
    pub fn push(&mut self, path: &str) -> Navigation {
        let (entry, navigation) = self.resolve(path);
        let next = self.cursor.map_or(0, |i| i + 1);
        self.history.truncate(next);
        self.history.push(entry);
        self.cursor = Some(next);
        debug!(path, location = navigation.location(), "router push");
        navigation
    }

    /// Navigate to `path`, replacing the current history entry
    pub fn replace(&mut self, path: &str) -> Navigation {
        let (entry, navigation) = self.resolve(path);
        match self.cursor {
            Some(i) => self.history[i] = entry,
            None => {
                self.history.push(entry);
                self.cursor = Some(0);
            }
        }
        debug!(path, location = navigation.location(), "router replace");
        navigation
    }

    /// Move `delta` entries through history; `None` if out of range
    pub fn go(&mut self, delta: isize) -> Option<Navigation> {
        let current = self.cursor? as isize;
        let target = current.checked_add(delta)?;
        if target < 0 || target as usize >= self.history.len() {
            return None;
        }

        let target = target as usize;
        let path = self.history[target].path.clone();
        let (entry, navigation) = self.resolve(&path);
        self.history[target] = entry;
        self.cursor = Some(target);
        debug!(delta, location = navigation.location(), "router history move");
        Some(navigation)
    }

    pub fn back(&mut self) -> Option<Navigation> {
        self.go(-1)
    }

    pub fn forward(&mut self) -> Option<Navigation> {
        self.go(1)
    }

    /// Number of history entries
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn resolve(&self, path: &str) -> (HistoryEntry, Navigation) {
        let (from, entry) = match self.table.resolve(path) {
            Resolution::Matched(entry) => (None, entry),
            Resolution::Redirected { from, to } => (Some(from.path.clone()), to),
            Resolution::NoMatch { path } => return unmatched(path),
        };
        let Some(page) = entry.page_target() else {
            return unmatched(normalize_path(path));
        };

        let active = ActiveRoute {
            name: entry.name.clone(),
            path: entry.path.clone(),
            page,
        };
        // A redirect target takes the history slot; the redirecting path is
        // never active.
        let history = HistoryEntry {
            path: active.path.clone(),
            active: Some(active.clone()),
        };
        let navigation = match from {
            Some(from) => Navigation::Redirected { from, active },
            None => Navigation::Activated(active),
        };

        (history, navigation)
    }
}

fn unmatched(path: String) -> (HistoryEntry, Navigation) {
    (
        HistoryEntry {
            path: path.clone(),
            active: None,
        },
        Navigation::Unmatched { path },
    )
}
