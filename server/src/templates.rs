//! Askama templates for the application shell and its pages

use askama::Template;
use ratt_core::{Error, Result};

/// Render a template, mapping failures into the core error type
pub fn render<T: Template>(template: &T) -> Result<String> {
    template
        .render()
        .map_err(|e| Error::TemplateError(e.to_string()))
}

// ============================================================================
// Shell
// ============================================================================

/// Built-in host document
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub mount_target: &'a str,
}

/// Root component: navigation plus the active page
#[derive(Template)]
#[template(path = "app.html")]
pub struct AppTemplate<'a> {
    pub mount_target: &'a str,
    pub links: Vec<NavLink>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub path: String,
    pub title: &'static str,
    pub active: bool,
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate<'a> {
    pub login_path: &'a str,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate<'a> {
    pub signup_path: &'a str,
}

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignUpTemplate<'a> {
    pub login_path: &'a str,
}

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub project_id: &'a str,
    pub create_path: &'a str,
}

#[derive(Template)]
#[template(path = "pages/add_item.html")]
pub struct AddItemTemplate<'a> {
    pub bucket: &'a str,
    pub dashboard_path: &'a str,
}

#[derive(Template)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub path: &'a str,
    pub home_path: &'a str,
}
