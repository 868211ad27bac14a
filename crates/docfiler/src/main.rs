//! `docfile` - CLI for docfiler
//!
//! This binary provides the command-line interface for filing, finding and
//! serving documents.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use docfiler::cli::{render, Cli, Command, ConfigCommand, ServeCommand, TypesCommand};
use docfiler::storage::open_backend;
use docfiler::{http, init_logging, registry, Config, DocumentService};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    if !cli.command.needs_store() {
        return match cli.command {
            Command::Types(cmd) => handle_types(&cmd),
            Command::Config(cmd) => handle_config(&config, cmd),
            _ => Ok(()),
        };
    }

    let mut service = open_service(&config)?;

    match cli.command {
        Command::List(cmd) => print(&render::records(service.list(), cmd.format)?),
        Command::Show(cmd) => print(&render::record(service.read(&cmd.id)?, cmd.format)?),
        Command::Create(cmd) => {
            let record = service.create(&cmd.payload())?;
            print(&render::record(&record, cmd.format)?);
        }
        Command::Update(cmd) => {
            let record = service.update(&cmd.id, &cmd.payload())?;
            print(&render::record(&record, cmd.format)?);
        }
        Command::Delete(cmd) => {
            let removed = service.delete(&cmd.id)?;
            println!("Deleted {} ({})", removed.doc_id, removed.id);
        }
        Command::Search(cmd) => {
            let results = service.search(&cmd.criteria());
            if results.is_no_match() {
                println!("No documents match your search.");
            } else {
                print(&render::records(&results.documents, cmd.format)?);
            }
        }
        Command::Stats(cmd) => print(&render::stats(&service.stats(), cmd.format)?),
        Command::Seed => {
            let added = service.seed_samples()?;
            if added == 0 {
                println!("Store already has documents; nothing seeded.");
            } else {
                println!("Added {added} sample documents.");
            }
        }
        Command::Serve(cmd) => handle_serve(&config, service, &cmd)?,
        Command::Types(_) | Command::Config(_) => {}
    }
    Ok(())
}

fn print(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}

fn open_service(config: &Config) -> anyhow::Result<DocumentService> {
    debug!(
        "Opening {} storage at {}",
        config.storage.backend,
        config.database_path().display()
    );
    let mut service = DocumentService::open(open_backend(config));

    if config.storage.seed_samples {
        let added = service.seed_samples()?;
        debug!("Seeded {} sample documents", added);
    }
    Ok(service)
}

fn handle_serve(config: &Config, service: DocumentService, cmd: &ServeCommand) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(host) = &cmd.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;
    let addr = config.bind_address();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime
        .block_on(http::serve(service, &addr))
        .with_context(|| format!("server on {addr} failed"))
}

fn handle_types(cmd: &TypesCommand) -> anyhow::Result<()> {
    match &cmd.key {
        Some(key) => {
            let descriptor = registry::describe(key)
                .with_context(|| format!("unknown document type: {key}"))?;
            print(&render::type_detail(descriptor, cmd.format)?);
        }
        None => print(&render::types(registry::all(), cmd.format)?),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!("  Seed samples:       {}", config.storage.seed_samples);
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
