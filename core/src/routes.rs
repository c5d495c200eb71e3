//! Declarative route table
//!
//! The table is an ordered list of [`RouteEntry`] values mapping a path
//! pattern and a symbolic name to either a page component or a redirect.
//! Resolution is a pure function of the requested path: see
//! [`RouteTable::resolve`].

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Path of the login page, target of the root redirect
pub const LOGIN_PATH: &str = "/login";

// ============================================================================
// Pages
// ============================================================================

/// Page-level UI components a route can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Home,
    Login,
    SignUp,
    Dashboard,
    AddItem,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Login,
        Page::SignUp,
        Page::Dashboard,
        Page::AddItem,
    ];

    /// Component name of the page
    pub fn component_name(&self) -> &'static str {
        match self {
            Page::Home => "HomePage",
            Page::Login => "LoginPage",
            Page::SignUp => "SignUpPage",
            Page::Dashboard => "DashboardPage",
            Page::AddItem => "AddItem",
        }
    }

    /// Label shown in the navigation bar
    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Login => "Log in",
            Page::SignUp => "Sign up",
            Page::Dashboard => "Dashboard",
            Page::AddItem => "Create event",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component_name())
    }
}

// ============================================================================
// Root behavior
// ============================================================================

/// What the root path `/` does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootBehavior {
    /// Redirect `/` to the login page
    #[default]
    Redirect,
    /// Render a dedicated home page at `/`
    Home,
}

impl RootBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootBehavior::Redirect => "redirect",
            RootBehavior::Home => "home",
        }
    }
}

impl FromStr for RootBehavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redirect" => Ok(RootBehavior::Redirect),
            "home" => Ok(RootBehavior::Home),
            other => Err(Error::ConfigError(format!(
                "Invalid root behavior '{}' (expected 'redirect' or 'home')",
                other
            ))),
        }
    }
}

// Config files and the environment accept the same spellings
impl<'de> Deserialize<'de> for RootBehavior {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for RootBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Route entries
// ============================================================================

/// What a route does once matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RouteTarget {
    Page(Page),
    Redirect(String),
}

/// A single row of the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub path: String,
    pub name: String,
    pub target: RouteTarget,
}

impl RouteEntry {
    /// Route rendering a page component
    pub fn page(path: impl Into<String>, name: impl Into<String>, page: Page) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            target: RouteTarget::Page(page),
        }
    }

    /// Route redirecting to another declared path
    pub fn redirect(path: impl Into<String>, name: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            target: RouteTarget::Redirect(to.into()),
        }
    }

    /// Page rendered by this route, `None` for redirects
    pub fn page_target(&self) -> Option<Page> {
        match self.target {
            RouteTarget::Page(page) => Some(page),
            RouteTarget::Redirect(_) => None,
        }
    }

    fn matches(&self, normalized: &str) -> bool {
        normalize_path(&self.path).eq_ignore_ascii_case(normalized)
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            RouteTarget::Page(page) => write!(f, "{:<14} {:<10} {}", self.path, self.name, page),
            RouteTarget::Redirect(to) => write!(f, "{:<14} {:<10} -> {}", self.path, self.name, to),
        }
    }
}

// ============================================================================
// Route table
// ============================================================================

/// Outcome of resolving a path against the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The path names a page route directly
    Matched(&'a RouteEntry),
    /// The path names a redirect; `to` is the page route it ends at
    Redirected {
        from: &'a RouteEntry,
        to: &'a RouteEntry,
    },
    /// No declared route matches
    NoMatch { path: String },
}

/// Ordered, validated set of routes
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate paths or names and redirects that
    /// do not end at a page
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self> {
        let mut paths = HashSet::new();
        let mut names = HashSet::new();

        for entry in &entries {
            if !entry.path.starts_with('/') {
                return Err(Error::RouteError(format!(
                    "Route '{}' has a relative path '{}'",
                    entry.name, entry.path
                )));
            }
            if !paths.insert(normalize_path(&entry.path).to_ascii_lowercase()) {
                return Err(Error::RouteError(format!("Duplicate route path: {}", entry.path)));
            }
            if !names.insert(entry.name.clone()) {
                return Err(Error::RouteError(format!("Duplicate route name: {}", entry.name)));
            }
        }

        let table = Self { entries };
        for entry in &table.entries {
            if let RouteTarget::Redirect(_) = entry.target {
                table.follow_redirects(entry)?;
            }
        }

        Ok(table)
    }

    /// Resolve a request path to a route
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let normalized = normalize_path(path);

        let Some(entry) = self.entries.iter().find(|e| e.matches(&normalized)) else {
            return Resolution::NoMatch { path: normalized };
        };

        match entry.target {
            RouteTarget::Page(_) => Resolution::Matched(entry),
            // Redirect chains are checked in `new`, so this cannot fail for a
            // constructed table.
            RouteTarget::Redirect(_) => match self.follow_redirects(entry) {
                Ok(to) => Resolution::Redirected { from: entry, to },
                Err(_) => Resolution::NoMatch { path: normalized },
            },
        }
    }

    /// Look up a route by symbolic name
    pub fn by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Path of the first route rendering `page`
    pub fn path_for(&self, page: Page) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.page_target() == Some(page))
            .map(|e| e.path.as_str())
    }

    /// Pages reachable through the table, in declaration order
    pub fn pages(&self) -> impl Iterator<Item = (&RouteEntry, Page)> {
        self.entries
            .iter()
            .filter_map(|e| e.page_target().map(|page| (e, page)))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn follow_redirects<'a>(&'a self, start: &'a RouteEntry) -> Result<&'a RouteEntry> {
        let mut visited = HashSet::new();
        let mut current = start;

        while let RouteTarget::Redirect(to) = &current.target {
            if !visited.insert(current.name.as_str()) {
                return Err(Error::RouteError(format!(
                    "Redirect cycle through route '{}'",
                    start.name
                )));
            }
            let normalized = normalize_path(to);
            current = self
                .entries
                .iter()
                .find(|e| e.matches(&normalized))
                .ok_or_else(|| {
                    Error::RouteError(format!(
                        "Route '{}' redirects to undeclared path {}",
                        current.name, to
                    ))
                })?;
        }

        Ok(current)
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteEntry;
    type IntoIter = std::slice::Iter<'a, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Build the application route table
pub fn build_routes(root: RootBehavior) -> Result<RouteTable> {
    let root_entry = match root {
        RootBehavior::Redirect => RouteEntry::redirect("/", "root", LOGIN_PATH),
        RootBehavior::Home => RouteEntry::page("/", "home", Page::Home),
    };

    RouteTable::new(vec![
        root_entry,
        RouteEntry::page(LOGIN_PATH, "Login", Page::Login),
        RouteEntry::page("/signup", "SignUp", Page::SignUp),
        RouteEntry::page("/dashboard", "dashboard", Page::Dashboard),
        RouteEntry::page("/create-event", "additem", Page::AddItem),
    ])
}

/// Reduce a request path to the form routes are matched against
///
/// Query string and fragment are dropped, the rest is percent-decoded, a
/// trailing slash is ignored and a missing leading slash is added.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let decoded = percent_decode_str(&path[..end]).decode_utf8_lossy();
    let trimmed = decoded.trim_end_matches('/');

    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_page(table: &RouteTable, path: &str) -> (String, Page) {
        match table.resolve(path) {
            Resolution::Matched(entry) => (entry.name.clone(), entry.page_target().unwrap()),
            other => panic!("expected {} to match, got {:?}", path, other),
        }
    }

    #[test]
    fn test_declared_paths_resolve_to_their_names() {
        let table = build_routes(RootBehavior::Redirect).unwrap();

        assert_eq!(expect_page(&table, "/login"), ("Login".to_string(), Page::Login));
        assert_eq!(expect_page(&table, "/signup"), ("SignUp".to_string(), Page::SignUp));
        assert_eq!(
            expect_page(&table, "/dashboard"),
            ("dashboard".to_string(), Page::Dashboard)
        );
        assert_eq!(
            expect_page(&table, "/create-event"),
            ("additem".to_string(), Page::AddItem)
        );
    }

    #[test]
    fn test_names_and_paths_unique() {
        for root in [RootBehavior::Redirect, RootBehavior::Home] {
            let table = build_routes(root).unwrap();
            let names: HashSet<_> = table.iter().map(|e| e.name.as_str()).collect();
            let paths: HashSet<_> = table.iter().map(|e| e.path.as_str()).collect();
            assert_eq!(names.len(), table.len());
            assert_eq!(paths.len(), table.len());
            assert_eq!(table.len(), 5);
        }
    }

    #[test]
    fn test_root_redirects_to_login() {
        let table = build_routes(RootBehavior::Redirect).unwrap();
        match table.resolve("/") {
            Resolution::Redirected { from, to } => {
                assert_eq!(from.path, "/");
                assert_eq!(to.name, "Login");
                assert_eq!(to.page_target(), Some(Page::Login));
            }
            other => panic!("expected redirect, got {:?}", other),
        }
        assert_eq!(table.path_for(Page::Home), None);
    }

    #[test]
    fn test_root_renders_home() {
        let table = build_routes(RootBehavior::Home).unwrap();
        assert_eq!(expect_page(&table, "/"), ("home".to_string(), Page::Home));
        assert_eq!(table.path_for(Page::Home), Some("/"));
    }

    #[test]
    fn test_unknown_path_has_no_match() {
        let table = build_routes(RootBehavior::Redirect).unwrap();
        assert_eq!(
            table.resolve("/unknown"),
            Resolution::NoMatch {
                path: "/unknown".to_string()
            }
        );
        assert!(matches!(table.resolve("/dashboard/extra"), Resolution::NoMatch { .. }));
    }

    #[test]
    fn test_path_matching_is_lenient() {
        let table = build_routes(RootBehavior::Redirect).unwrap();
        assert_eq!(expect_page(&table, "/dashboard/").1, Page::Dashboard);
        assert_eq!(expect_page(&table, "/Dashboard").1, Page::Dashboard);
        assert_eq!(expect_page(&table, "/login?next=/dashboard").1, Page::Login);
        assert_eq!(expect_page(&table, "/signup#form").1, Page::SignUp);
        assert!(matches!(table.resolve(""), Resolution::Redirected { .. }));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
        assert_eq!(normalize_path("login"), "/login");
        assert_eq!(normalize_path("/a/b/?x=1"), "/a/b");
        assert_eq!(normalize_path("/create%2Devent"), "/create-event");
        assert_eq!(normalize_path("/caf%C3%A9"), "/café");
        // An encoded `?` is part of the path, not a query
        assert_eq!(normalize_path("/a%3Fb?c"), "/a?b");
    }

    #[test]
    fn test_percent_encoded_path_matches() {
        let table = build_routes(RootBehavior::Redirect).unwrap();
        assert_eq!(
            expect_page(&table, "/create%2Devent"),
            ("additem".to_string(), Page::AddItem)
        );
        assert_eq!(expect_page(&table, "/%64ashboard").1, Page::Dashboard);
        assert!(matches!(table.resolve("%2F"), Resolution::Redirected { .. }));
    }

    #[test]
    fn test_rejects_duplicates() {
        let dup_path = RouteTable::new(vec![
            RouteEntry::page("/login", "Login", Page::Login),
            RouteEntry::page("/Login/", "Other", Page::SignUp),
        ]);
        assert!(matches!(dup_path, Err(Error::RouteError(_))));

        let dup_name = RouteTable::new(vec![
            RouteEntry::page("/login", "Login", Page::Login),
            RouteEntry::page("/signup", "Login", Page::SignUp),
        ]);
        assert!(matches!(dup_name, Err(Error::RouteError(_))));
    }

    #[test]
    fn test_rejects_bad_redirects() {
        let dangling = RouteTable::new(vec![RouteEntry::redirect("/", "root", "/nowhere")]);
        assert!(matches!(dangling, Err(Error::RouteError(_))));

        let cycle = RouteTable::new(vec![
            RouteEntry::redirect("/a", "a", "/b"),
            RouteEntry::redirect("/b", "b", "/a"),
        ]);
        assert!(matches!(cycle, Err(Error::RouteError(_))));

        let relative = RouteTable::new(vec![RouteEntry::page("login", "Login", Page::Login)]);
        assert!(relative.is_err());
    }

    #[test]
    fn test_redirect_chain_ends_at_page() {
        let table = RouteTable::new(vec![
            RouteEntry::redirect("/", "root", "/start"),
            RouteEntry::redirect("/start", "start", "/login"),
            RouteEntry::page("/login", "Login", Page::Login),
        ])
        .unwrap();

        match table.resolve("/") {
            Resolution::Redirected { from, to } => {
                assert_eq!(from.name, "root");
                assert_eq!(to.name, "Login");
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_root_behavior_parse() {
        assert_eq!("redirect".parse::<RootBehavior>().unwrap(), RootBehavior::Redirect);
        assert_eq!(" HOME ".parse::<RootBehavior>().unwrap(), RootBehavior::Home);
        assert!("landing".parse::<RootBehavior>().is_err());
        assert_eq!(RootBehavior::default(), RootBehavior::Redirect);
    }

    #[test]
    fn test_root_behavior_deserialize_matches_parse() {
        #[derive(Deserialize)]
        struct Wrapper {
            root: RootBehavior,
        }

        for (raw, expected) in [
            ("home", RootBehavior::Home),
            ("Home", RootBehavior::Home),
            (" REDIRECT ", RootBehavior::Redirect),
        ] {
            let json = format!(r#"{{"root": "{}"}}"#, raw);
            let wrapper: Wrapper = serde_json::from_str(&json).unwrap();
            assert_eq!(wrapper.root, expected);
            assert_eq!(raw.parse::<RootBehavior>().unwrap(), expected);
        }
        assert!(serde_json::from_str::<Wrapper>(r#"{"root": "landing"}"#).is_err());
        assert_eq!(serde_json::to_string(&RootBehavior::Home).unwrap(), r#""home""#);
    }

    #[test]
    fn test_lookup_by_name() {
        let table = build_routes(RootBehavior::Home).unwrap();
        assert_eq!(table.by_name("additem").map(|e| e.path.as_str()), Some("/create-event"));
        assert!(table.by_name("missing").is_none());
        assert_eq!(table.pages().count(), 5);
        assert!(Page::ALL.iter().all(|page| table.path_for(*page).is_some()));
    }
}
