//! `busadmin` command line client.
//!
//! ```bash
//! busadmin requests list --category pickup --status pending
//! busadmin requests approve req-12 "Đồng ý cho nghỉ"
//! busadmin requests auto-process-all
//! busadmin students export --search nguyen
//! busadmin checkpoints search "Cầu Giấy"
//! busadmin routes show route-1
//! ```

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use shared::{LatLng, RequestCategory, RequestStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use busadmin_frontend::controllers::{
    BusesController, CheckpointsController, RequestsController, RoutesController,
    StudentsController,
};
use busadmin_frontend::filters::ListFilter;
use busadmin_frontend::services::export::ExportOutcome;
use busadmin_frontend::services::geocoding::GeocodingClient;
use busadmin_frontend::services::notifications::{NotificationCenter, NotificationLevel};
use busadmin_frontend::services::routing::RoutingClient;
use busadmin_frontend::state::{PageView, TableState};
use busadmin_frontend::{AdminConfig, ApiClient};

#[derive(Parser)]
#[command(name = "busadmin")]
#[command(version)]
#[command(about = "School-bus transport administration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML settings file
    #[arg(long, short, global = true, env = "BUSADMIN_CONFIG")]
    config: Option<PathBuf>,

    /// Backend root, overrides the settings file
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parent requests and their review
    #[command(subcommand)]
    Requests(RequestCommand),

    /// Student records
    #[command(subcommand)]
    Students(StudentCommand),

    /// Pickup checkpoints
    #[command(subcommand)]
    Checkpoints(CheckpointCommand),

    /// Bus routes
    #[command(subcommand)]
    Routes(RouteCommand),

    /// Buses and seat counts
    #[command(subcommand)]
    Buses(BusCommand),
}

#[derive(clap::Args, Clone)]
struct ListArgs {
    /// Case-insensitive text search
    #[arg(long, short)]
    search: Option<String>,

    /// Only records on this day (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// One-based page number
    #[arg(long, default_value_t = 1)]
    page: usize,
}

impl ListArgs {
    fn filter(&self) -> ListFilter {
        let filter = ListFilter::search(self.search.clone().unwrap_or_default());
        match self.date {
            Some(date) => filter.with_date(date),
            None => filter,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Leave,
    Pickup,
    Other,
    Report,
}

impl From<CategoryArg> for RequestCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Leave => RequestCategory::Leave,
            CategoryArg::Pickup => RequestCategory::Pickup,
            CategoryArg::Other => RequestCategory::Other,
            CategoryArg::Report => RequestCategory::Report,
        }
    }
}

#[derive(Subcommand)]
enum RequestCommand {
    /// Show requests grouped by category
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only this tab
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        /// PENDING, APPROVED, REJECTED or READ
        #[arg(long)]
        status: Option<RequestStatus>,
    },

    /// Approve a pending request with a reply
    Approve { id: String, reply: String },

    /// Reject a pending request with a reply
    Reject { id: String, reply: String },

    /// Mark a pending request as read
    Read { id: String },

    /// Apply a pending pickup change
    AutoProcess { id: String },

    /// Apply every pending pickup change in the list
    AutoProcessAll,

    /// Write the filtered requests to CSV
    Export {
        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Subcommand)]
enum StudentCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Write the filtered students to CSV
    Export {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Put a student on a bus and pickup checkpoint
    Assign {
        id: String,

        #[arg(long)]
        bus: Option<String>,

        #[arg(long)]
        checkpoint: Option<String>,
    },
}

#[derive(Subcommand)]
enum CheckpointCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Look up an address
    Search { query: String },

    /// Create a checkpoint at a position
    Create {
        name: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum RouteCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Show a route's stops and road distance
    Show { id: String },
}

#[derive(Subcommand)]
enum BusCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = AdminConfig::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    let gateway = Arc::new(ApiClient::new(&config)?);

    match cli.command {
        Commands::Requests(command) => run_requests(gateway, &config, command).await,
        Commands::Students(command) => run_students(gateway, &config, command).await,
        Commands::Checkpoints(command) => run_checkpoints(gateway, &config, command).await,
        Commands::Routes(command) => run_routes(gateway, &config, command).await,
        Commands::Buses(command) => run_buses(gateway, &config, command).await,
    }
}

async fn run_requests(gateway: Arc<ApiClient>, config: &AdminConfig, command: RequestCommand) -> Result<()> {
    let mut controller = RequestsController::new(gateway, config);
    let loaded = controller.load().await;
    flush(controller.notifications_mut());
    loaded?;

    let outcome = match command {
        RequestCommand::List { list, category, status } => {
            controller.filter = list.filter();
            controller.status_filter = status;
            let buckets = controller.buckets();
            let categories = match category {
                Some(category) => vec![RequestCategory::from(category)],
                None => RequestCategory::ALL.to_vec(),
            };
            for category in categories {
                let rows = buckets.get(category);
                println!("== {} ({}) ==", category.label(), rows.len());
                print_page(config, &list, rows, |r| {
                    format!(
                        "{:<12} {:<9} {:<24} {}",
                        r.request_id,
                        r.status.to_string(),
                        r.student_name.as_deref().unwrap_or("-"),
                        r.reason
                    )
                });
            }
            Ok(())
        }
        RequestCommand::Approve { id, reply } => {
            controller.open(&id)?;
            controller.approve(&reply).await.map(|_| ())
        }
        RequestCommand::Reject { id, reply } => {
            controller.open(&id)?;
            controller.reject(&reply).await.map(|_| ())
        }
        RequestCommand::Read { id } => {
            controller.open(&id)?;
            controller.mark_read().await.map(|_| ())
        }
        RequestCommand::AutoProcess { id } => {
            controller.open(&id)?;
            controller.auto_process().await.map(|_| ())
        }
        RequestCommand::AutoProcessAll => controller.auto_process_all().await.map(|report| {
            for (id, reason) in report.failed() {
                println!("✗ {}: {}", id, reason);
            }
        }),
        RequestCommand::Export { list } => {
            controller.filter = list.filter();
            controller.export().map(print_export)
        }
    };
    flush(controller.notifications_mut());
    Ok(outcome?)
}

async fn run_students(gateway: Arc<ApiClient>, config: &AdminConfig, command: StudentCommand) -> Result<()> {
    let mut controller = StudentsController::new(gateway, config);
    let loaded = controller.refresh().await;
    flush(controller.notifications_mut());
    loaded?;

    let outcome = match command {
        StudentCommand::List { list } => {
            controller.filter = list.filter();
            print_page(config, &list, &controller.visible(), |s| {
                format!(
                    "{:<10} {:<8} {:<24} {:<10} {}",
                    s.id,
                    s.roll_number,
                    s.name,
                    s.bus_name.as_deref().unwrap_or("-"),
                    s.checkpoint_name.as_deref().unwrap_or("-")
                )
            });
            Ok(())
        }
        StudentCommand::Export { list } => {
            controller.filter = list.filter();
            controller.export().map(print_export)
        }
        StudentCommand::Assign { id, bus, checkpoint } => {
            if bus.is_none() && checkpoint.is_none() {
                bail!("Pass --bus and/or --checkpoint");
            }
            controller.assign(&id, bus, checkpoint).await.map(|_| ())
        }
    };
    flush(controller.notifications_mut());
    Ok(outcome?)
}

async fn run_checkpoints(
    gateway: Arc<ApiClient>,
    config: &AdminConfig,
    command: CheckpointCommand,
) -> Result<()> {
    let geocoder = Arc::new(GeocodingClient::new(config)?);
    let mut controller = CheckpointsController::new(gateway, geocoder, config);

    let outcome = match command {
        CheckpointCommand::List { list } => {
            let loaded = controller.refresh().await;
            flush(controller.notifications_mut());
            loaded?;
            controller.filter = list.filter();
            print_page(config, &list, &controller.visible(), |c| {
                format!("{:<10} {:<28} {}, {}", c.id, c.name, c.latitude, c.longitude)
            });
            Ok(())
        }
        CheckpointCommand::Search { query } => controller.search_address(&query).await.map(|results| {
            for (index, result) in results.iter().enumerate() {
                println!(
                    "{:>2}. {} ({:.6}, {:.6})",
                    index + 1,
                    result.display_name,
                    result.position.lat,
                    result.position.lng
                );
            }
        }),
        CheckpointCommand::Create { name, lat, lng, description } => {
            controller.place_marker(LatLng::new(lat, lng)).await;
            controller
                .create_at_marker(&name, description.as_deref())
                .await
                .map(|c| println!("{} {}", c.id, c.name))
        }
    };
    flush(controller.notifications_mut());
    Ok(outcome?)
}

async fn run_routes(gateway: Arc<ApiClient>, config: &AdminConfig, command: RouteCommand) -> Result<()> {
    let directions = Arc::new(RoutingClient::new(config)?);
    let mut controller = RoutesController::new(gateway, directions, config);
    let loaded = controller.refresh().await;
    flush(controller.notifications_mut());
    loaded?;

    let outcome = match command {
        RouteCommand::List { list } => {
            controller.filter = list.filter();
            print_page(config, &list, &controller.visible(), |r| {
                format!("{:<10} {:<10} {}", r.id, r.code, r.path)
            });
            Ok(())
        }
        RouteCommand::Show { id } => {
            let Some(resolved) = controller.resolve(&id) else {
                bail!("Unknown route {}", id);
            };
            println!("{} {}", resolved.route.code, resolved.route.description);
            for (index, stop) in resolved.stops.iter().enumerate() {
                println!("{:>3}. {} ({})", index + 1, stop.name, stop.id);
            }
            for missing in &resolved.missing {
                println!("  ?  {} (unknown checkpoint)", missing);
            }
            controller.geometry(&id).await.map(|geometry| {
                println!(
                    "{:.1} km, about {} min",
                    geometry.distance_m / 1000.0,
                    (geometry.duration_s / 60.0).round()
                );
            })
        }
    };
    flush(controller.notifications_mut());
    Ok(outcome?)
}

async fn run_buses(gateway: Arc<ApiClient>, config: &AdminConfig, command: BusCommand) -> Result<()> {
    let mut controller = BusesController::new(gateway, config);
    let loaded = controller.refresh().await;
    flush(controller.notifications_mut());
    loaded?;

    match command {
        BusCommand::List { list } => {
            controller.filter = list.filter();
            print_page(config, &list, &controller.visible(), |b| {
                format!(
                    "{:<10} {:<12} {:<16} {:>3}/{:<3} {:?}",
                    b.id, b.license_plate, b.name, b.registered_count, b.max_capacity, b.bus_status
                )
            });
        }
    }
    flush(controller.notifications_mut());
    Ok(())
}

fn print_page<T>(config: &AdminConfig, list: &ListArgs, rows: &[T], line: impl Fn(&T) -> String) {
    let mut table = TableState::new(config.page_size);
    table.go_to(list.page.saturating_sub(1), rows.len());
    let view: PageView<'_, T> = table.view(rows);
    if view.rows.is_empty() {
        println!("(no records)");
        return;
    }
    for row in view.rows {
        println!("{}", line(row));
    }
    println!("{} ({} records)", view.label(), view.total_rows);
}

fn print_export(outcome: ExportOutcome) {
    if let ExportOutcome::Written { path, rows } = outcome {
        println!("{} rows -> {}", rows, path.display());
    }
}

fn flush(notifications: &mut NotificationCenter) {
    for notification in notifications.drain() {
        let marker = match notification.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Info => "i",
            NotificationLevel::Warning => "!",
            NotificationLevel::Error => "✗",
        };
        eprintln!("{} {}", marker, notification.message);
    }
}
