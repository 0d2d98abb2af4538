//! Command-line client for recording field-service visits.

use anyhow::Context;
use clap::{Parser, Subcommand};
use fieldvisit::replay;
use fieldvisit_config::FieldVisitConfig;
use fieldvisit_core::{CloseFields, DirectoryLookup, OpenVisit, SignatureCapture, VisitLifecycle};
use fieldvisit_protocol::{
    Notification, NotificationKind, NotificationSink, SessionInfo, VisitId, VisitRecord,
};
use fieldvisit_store::JsonlRecordStore;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the visit client.
#[derive(Parser)]
#[command(name = "fieldvisit", version)]
struct Cli {
    /// Optional path to a fieldvisit.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the record store directory
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a visit, resolving missing client details by business name
    Open {
        business_name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        distance_km: Option<f64>,
    },
    /// Start timing work on a visit
    Start { id: VisitId },
    /// Stop timing work on a visit
    End { id: VisitId },
    /// Sign off a visit
    Close {
        id: VisitId,
        #[arg(long)]
        scope_of_work: String,
        #[arg(long)]
        work_completed: String,
        #[arg(long)]
        order_number: String,
        #[arg(long)]
        service_request_number: String,
        /// JSON file of pen strokes to replay as the signature
        #[arg(long)]
        signature: Option<PathBuf>,
        /// Scheduled date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Scheduled time (HH:MM); defaults to now
        #[arg(long)]
        time: Option<String>,
        /// Kilometres travelled; defaults to the client distance
        #[arg(long)]
        kilometers: Option<f64>,
    },
    /// Print one visit
    Show { id: VisitId },
    /// List visits in creation order
    List {
        /// Filter by business name, address, or order number
        #[arg(long)]
        search: Option<String>,
    },
    /// Count visits by status and those opened today
    Stats,
}

/// Prints notifications to stderr.
struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.kind {
            NotificationKind::Info => "ok",
            NotificationKind::Error => "error",
        };
        eprintln!(
            "[{marker}] {}: {}",
            notification.title, notification.message
        );
    }
}

/// Entry point for the fieldvisit CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let config = if let Some(path) = cli.config.as_ref() {
        info!("loading config from path: {}", path.display());
        FieldVisitConfig::load_from_path(path).context("failed to load config")?
    } else {
        let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
        info!("loading layered config from cwd: {}", cwd.display());
        let layered =
            FieldVisitConfig::load_layered(&cwd).context("failed to load layered config")?;
        debug!(
            "layered config loaded (layers={}, workspace={:?})",
            layered.layers.len(),
            layered.workspace
        );
        layered.config
    };

    let store_root = cli
        .store
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.store.path_or_default()));
    let store = Arc::new(
        JsonlRecordStore::new(&store_root).context("failed to open record store")?,
    );
    let session = config
        .session
        .user
        .clone()
        .map(SessionInfo::for_user)
        .unwrap_or_default();
    let directory = Arc::new(DirectoryLookup::from_config(&config.directory));
    let lifecycle = VisitLifecycle::new(store, directory)
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_session(session);

    match cli.command {
        Command::Open {
            business_name,
            address,
            contact,
            distance_km,
        } => {
            let record = lifecycle
                .open(OpenVisit {
                    business_name,
                    address,
                    contact,
                    distance_km,
                })
                .await?;
            print_record(&record)?;
        }
        Command::Start { id } => print_record(&lifecycle.start_work(id)?)?,
        Command::End { id } => print_record(&lifecycle.end_work(id)?)?,
        Command::Close {
            id,
            scope_of_work,
            work_completed,
            order_number,
            service_request_number,
            signature,
            date,
            time,
            kilometers,
        } => {
            let mut capture = SignatureCapture::from_config(&config.signature);
            if let Some(path) = signature.as_ref() {
                let strokes = replay::load_strokes(path)
                    .with_context(|| format!("failed to load strokes from {}", path.display()))?;
                replay::replay(&mut capture, &strokes).context("failed to replay signature")?;
            }
            let fields = CloseFields {
                scope_of_work,
                work_completed,
                order_number,
                service_request_number,
                scheduled_date: date,
                scheduled_time: time,
                kilometers,
            };
            print_record(&lifecycle.close(id, fields, capture.signature())?)?;
        }
        Command::Show { id } => print_record(&lifecycle.find(id)?)?,
        Command::List { search } => {
            let records = lifecycle.history(search.as_deref().unwrap_or(""))?;
            if records.is_empty() {
                println!("no visits found");
            }
            for record in records {
                println!(
                    "{}  {:<6}  {}  {}",
                    record.id,
                    record.status.as_str(),
                    record.business_name,
                    record.address
                );
            }
        }
        Command::Stats => {
            let summary = lifecycle.summary()?;
            println!("total   {}", summary.total);
            println!("open    {}", summary.open);
            println!("closed  {}", summary.closed);
            println!("today   {}", summary.today);
        }
    }
    Ok(())
}

fn print_record(record: &VisitRecord) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(record).context("failed to encode record")?;
    println!("{json}");
    Ok(())
}
