use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use app_router::application::{
    ApplicationContext, ApplicationRegistry, ApplicationResolver, DirectorySource,
};

#[derive(Parser)]
#[command(name = "app-router-cli")]
#[command(about = "Inspect application resolution and reverse routing", long_about = None)]
struct Cli {
    /// Directory holding one sub-directory per application
    #[arg(short, long, default_value = "applications")]
    applications: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which application owns a request
    Detect {
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "/")]
        uri: String,
    },
    /// Rewrite internal links for the application owning a request
    Rewrite {
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "/")]
        uri: String,
        #[arg(long)]
        language: Option<String>,
        /// Links to rewrite
        #[arg(required = true)]
        links: Vec<String>,
    },
    /// List configured applications
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let registry = Arc::new(ApplicationRegistry::load(DirectorySource::new(&cli.applications))?);
    let resolver = ApplicationResolver::new(registry.clone());

    let output = match cli.command {
        Commands::Detect { host, uri } => {
            let mut context = ApplicationContext::new();
            let resolved = resolver.detect(&mut context, &host, &uri)?;
            let route = resolved
                .application
                .routes
                .match_path(&resolved.request_relative_uri)
                .map(|m| json!({
                    "handler": m.handler.to_string(),
                    "pattern": m.pattern.to_string(),
                    "params": m.params,
                }));
            json!({
                "application": resolved.name(),
                "hostname": resolved.hostname,
                "matched_host_pattern": resolved.matched_host_pattern,
                "base_path": resolved.application.base_path(),
                "request_relative_uri": resolved.request_relative_uri,
                "route": route,
            })
        }
        Commands::Rewrite { host, uri, language, links } => {
            let mut context = ApplicationContext::new();
            context.set_language(language);
            let resolved = resolver.detect(&mut context, &host, &uri)?;
            let rewritten: serde_json::Map<String, Value> = links
                .into_iter()
                .map(|link| {
                    let url = context.rewrite_reverse(&link);
                    (link, Value::String(url))
                })
                .collect();
            json!({
                "application": resolved.name(),
                "links": rewritten,
            })
        }
        Commands::List => {
            let applications: Vec<Value> = registry
                .applications()
                .iter()
                .map(|app| json!({
                    "name": app.name,
                    "hostnames": app.host_patterns,
                    "base_path": app.base_path(),
                    "default_language": app.default_language,
                    "routes": app.routes.len(),
                    "path": app.path.display().to_string(),
                }))
                .collect();
            Value::Array(applications)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
