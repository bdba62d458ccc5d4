use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use khanaval_edge::{
    DocumentOptions, PrintService, PrinterRegistry, TransportSet, print_banner, setup_environment,
};
use shared::models::{PaperWidth, PrintOutcome, PrinterLocation};

#[derive(Parser, Debug)]
#[command(author, version, about = "Restaurant receipt printing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe every enabled printer and list the registry (default)
    Status,
    /// Send a test page to a registered printer
    Test {
        /// Printer name as saved in the registry
        name: String,
    },
    /// Print a plain-text file on the default printer of a location
    Print {
        /// kitchen, billing or inventory
        location: PrinterLocation,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 1. Environment (dotenv, work dir, logging)
    let config = setup_environment()?;
    print_banner();
    tracing::info!("Khanaval print edge starting...");

    // 2. Registry and transports
    let registry = Arc::new(PrinterRegistry::open(config.printers_path())?);
    let transports = TransportSet::from_config(&config).await;
    let service = PrintService::new(registry, transports)
        .with_document_options(DocumentOptions::from_config(&config, PaperWidth::default()));

    // 3. Command
    match cli.command.unwrap_or(Command::Status) {
        Command::Status => {
            service.refresh_statuses().await;
            let printers = service.registry().list();
            if printers.is_empty() {
                println!("No printers configured ({})", config.printers_file);
            }
            for p in printers {
                println!(
                    "{:<20} {:<10} {:<10} {:<20} {:?}{}{}",
                    p.name,
                    p.connection_type.as_str(),
                    p.location.as_str(),
                    p.address_label(),
                    p.status,
                    if p.is_default { " default" } else { "" },
                    if p.enabled { "" } else { " disabled" },
                );
            }
            Ok(())
        }
        Command::Test { name } => finish(service.test_printer(&name).await),
        Command::Print { location, file } => {
            let content = std::fs::read_to_string(&file)?;
            finish(service.print_document(&content, location, None).await)
        }
    }
}

fn finish(outcome: PrintOutcome) -> Result<(), Box<dyn std::error::Error>> {
    if outcome.success || outcome.is_cancelled() {
        println!("{}", outcome.message);
        Ok(())
    } else {
        Err(outcome.message.into())
    }
}
