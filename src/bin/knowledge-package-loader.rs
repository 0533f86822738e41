//! Knowledge Package Loader CLI
//!
//! Uploads a knowledge package and its resources, links them and publishes
//! the package.

use anyhow::Result;
use clap::{Parser, Subcommand};
use knowledge_package_loader::{
    DEFAULT_TIMEOUT_SECS, LoadReport, LoaderConfig, LoaderError, PackageLoader, TokenStore,
};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Knowledge package loader
#[derive(Parser)]
#[command(name = "knowledge-package-loader")]
#[command(version)]
#[command(about = "Load the metadata and resources of knowledge packages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the metadata and resources of a Knowledge Package
    Load {
        /// Show the configuration and debug logs
        #[arg(short, long)]
        verbose: bool,

        /// Publish the package after its resources are associated
        #[arg(long)]
        publish: bool,

        /// Package REST API base URL
        #[arg(short = 'p', long, env = "KNOWLEDGE_HUB_PACKAGES_API")]
        packages_api: String,

        /// Record REST API base URL
        #[arg(short = 'r', long, env = "KNOWLEDGE_HUB_RECORDS_API")]
        records_api: String,

        /// User personal access token
        #[arg(short = 't', long, env = "KNOWLEDGE_HUB_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// Directory where the knowledge-package.json file is defined
        #[arg(short = 'k', long, value_name = "DIR")]
        knowledge_package_repository: PathBuf,

        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Accept invalid TLS certificates (development servers)
        #[arg(long)]
        insecure: bool,
    },
}

fn main() {
    let result = run();

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            verbose,
            publish,
            packages_api,
            records_api,
            access_token,
            knowledge_package_repository,
            timeout,
            insecure,
        } => {
            init_tracing(verbose);

            let config = LoaderConfig::new(packages_api, records_api)
                .with_access_token(access_token)
                .with_timeout(Duration::from_secs(timeout))
                .with_accept_invalid_certs(insecure);

            load_command(config, knowledge_package_repository, publish, verbose)
        }
    }
}

/// `RUST_LOG` wins; otherwise info (debug when verbose) for this crate
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("knowledge_package_loader={},warn", level).into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_command(
    config: LoaderConfig,
    repository: PathBuf,
    publish: bool,
    verbose: bool,
) -> Result<i32> {
    println!("\n📦 knowledge-package-loader\n");

    if verbose {
        let masked = config
            .access_token
            .as_ref()
            .map(|t| TokenStore::mask_token(t.expose_secret()))
            .unwrap_or_else(|| "<unset>".to_string());

        println!("Packages API....................: {}", config.package_api);
        println!("Records API.....................: {}", config.record_api);
        println!("Personal Access Token...........: {}", masked);
        println!("Knowledge Package repository....: {}", repository.display());
        println!();
    }

    println!("⚙️  Configuring the client...");
    let loader = match PackageLoader::new(config) {
        Ok(loader) => loader,
        Err(e) => return Ok(report_error(&e)),
    };
    println!("  ✅ Done\n");

    println!("🚀 Creating the package and its resources...");
    match loader.service().load_package_report(&repository, publish) {
        Ok(report) => {
            print_summary(&report);
            println!("\n✅ Finished!");
            Ok(0)
        }
        Err(e) => Ok(report_error(&e)),
    }
}

fn print_summary(report: &LoadReport) {
    println!("  Package.....: {}", report.package.id().unwrap_or("-"));
    println!("  Resources...: {}", report.resources.len());
    for resource in &report.resources {
        println!("    - {}", resource.id().unwrap_or("-"));
    }
    println!(
        "  Status......: {}",
        if report.published { "published" } else { "draft" }
    );
    println!("  Started.....: {}", report.started_at.to_rfc3339());
    println!("  Duration....: {} ms", report.duration);
}

fn report_error(error: &LoaderError) -> i32 {
    eprintln!("\n❌ Error to load the package! [{}]", error.code());
    eprintln!("{}", error);

    let actions = error.suggested_actions();
    if !actions.is_empty() {
        eprintln!("\nSuggested actions:");
        for action in actions {
            eprintln!("  - {}", action);
        }
    }

    tracing::error!(code = error.code(), error = %error, "Loading failed");
    1
}
