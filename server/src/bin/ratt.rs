//! ratt CLI - inspect the route table and service configuration
//!
//! Everything runs locally: the route table and router are the same ones the
//! server mounts, and `check` bootstraps the backend handles without talking
//! to the platform.

use clap::{Parser, Subcommand};
use ratt_core::{build_routes, Navigation, RootBehavior, Router};
use ratt_server::{
    config::Config,
    shell::{self, HostDocument, RootComponent},
};
use std::process;
use std::sync::Arc;
use tracing::error;

/// ratt CLI - route table and bootstrap inspection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the route table
    Routes {
        /// What `/` does: redirect or home
        #[arg(long, default_value = "redirect", env = "RATT_ROOT_BEHAVIOR")]
        root: RootBehavior,
    },

    /// Drive the router through a sequence of navigation steps
    Resolve {
        /// What `/` does: redirect or home
        #[arg(long, default_value = "redirect", env = "RATT_ROOT_BEHAVIOR")]
        root: RootBehavior,

        /// Paths to visit, or `back` / `forward`
        #[arg(required = true)]
        steps: Vec<String>,
    },

    /// Load configuration, bootstrap services and mount the shell
    Check {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Routes { root } => handle_routes(root),
        Commands::Resolve { root, steps } => handle_resolve(root, &steps),
        Commands::Check { config } => handle_check(config.as_deref()),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn handle_routes(root: RootBehavior) -> anyhow::Result<()> {
    let table = build_routes(root)?;
    for entry in &table {
        println!("{}", entry);
    }
    Ok(())
}

fn handle_resolve(root: RootBehavior, steps: &[String]) -> anyhow::Result<()> {
    let table = Arc::new(build_routes(root)?);
    for line in run_steps(Router::new(table), steps) {
        println!("{}", line);
    }
    Ok(())
}

fn handle_check(path: Option<&str>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load(path)?;
    let services = ratt_core::initialize(config.services.clone())?;

    println!("project:      {}", services.config().project_id);
    println!("auth:         {}", services.auth().endpoint("signInWithPassword")?);
    println!("documents:    {}", services.store().document_url("")?);
    println!("blobs:        {}", services.blobs().object_url("")?);

    let table = Arc::new(build_routes(config.root_behavior)?);
    let host = HostDocument::load(config.index_html.as_deref(), &config.mount_target)?;
    let app = shell::mount(
        RootComponent::new(services),
        Router::new(table),
        &host,
        &config.mount_target,
    )?;
    println!(
        "mount:        #{} ({} routes, root {})",
        app.mount_target(),
        app.table().len(),
        config.root_behavior
    );

    Ok(())
}

/// Apply each step to the router and describe the resulting state
fn run_steps(mut router: Router, steps: &[String]) -> Vec<String> {
    steps
        .iter()
        .map(|step| {
            let navigation = match step.as_str() {
                "back" => router.back(),
                "forward" => router.forward(),
                path => Some(router.push(path)),
            };
            match navigation {
                Some(navigation) => format!("{:<14} {}", step, describe(&navigation)),
                None => format!("{:<14} (no history entry)", step),
            }
        })
        .collect()
}

fn describe(navigation: &Navigation) -> String {
    match navigation {
        Navigation::Activated(active) => {
            format!("{} ({}) {}", active.name, active.path, active.page)
        }
        Navigation::Redirected { from, active } => format!(
            "{} ({}) {} [redirected from {}]",
            active.name, active.path, active.page, from
        ),
        Navigation::Unmatched { path } => format!("no route ({})", path),
    }
}
