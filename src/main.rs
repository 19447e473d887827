//! CLI entry point for blogfreeze

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blogfreeze")]
#[command(version)]
#[command(about = "A small markdown blog that serves posts or freezes them into a static site", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the blog over HTTP
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "127.0.0.1")]
        ip: String,
    },

    /// Freeze the blog into static files
    #[command(alias = "freeze")]
    Build,

    /// Remove the build directory
    Clean,

    /// List posts, newest first
    List {
        /// Include unpublished posts
        #[arg(short, long)]
        drafts: bool,
    },

    /// Create a new unpublished post
    New {
        /// Title of the new post
        title: String,

        /// Path of the post relative to the posts directory, without extension
        #[arg(short, long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogfreeze=debug,tower_http=debug,info"
    } else {
        "blogfreeze=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };

    let blog = blogfreeze::Blog::new(&base_dir)?;

    match cli.command.unwrap_or(Commands::Serve {
        port: 8000,
        ip: "127.0.0.1".to_string(),
    }) {
        Commands::Serve { port, ip } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blogfreeze::server::start(&blog, &ip, port).await?;
        }

        Commands::Build => {
            tracing::info!("Freezing site into {:?}", blog.build_dir);
            let report = blogfreeze::commands::build::run(&blog)?;
            println!(
                "Built {} pages ({} static files) into {}",
                report.files.len(),
                report.assets,
                blog.build_dir.display()
            );
        }

        Commands::Clean => {
            if blogfreeze::commands::clean::run(&blog)? {
                println!("Cleaned successfully!");
            } else {
                println!("Nothing to clean.");
            }
        }

        Commands::List { drafts } => {
            blogfreeze::commands::list::run(&blog, drafts)?;
        }

        Commands::New { title, path } => {
            let file = blogfreeze::commands::new::create_post(&blog, &title, path.as_deref())?;
            println!("Created: {}", file.display());
        }
    }

    Ok(())
}
