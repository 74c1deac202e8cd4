use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

use attendance::config::ServiceConfig;
use attendance::rpc::AttendanceServiceServer;
use attendance::server::AttendanceServer;
use attendance::AttendanceBook;

mod client;
mod server_admin;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the attendance server
    Server {
        /// Listen address (e.g., 127.0.0.1:7077)
        #[arg(short, long)]
        addr: Option<String>,
        /// Number of slots in the hash table
        #[arg(short, long)]
        capacity: Option<usize>,
        /// Path to the JSON database file
        #[arg(short, long)]
        db_path: Option<PathBuf>,
        /// Reject inserts into a full table instead of overwriting
        #[arg(long)]
        strict: bool,
    },
    /// Upload a .csv or .json file of attendance rows
    Upload {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
        /// Path to the input file
        #[arg(short, long, required = true)]
        file: PathBuf,
    },
    /// Print every stored record in slot order
    View {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
    },
    /// Print the raw slot layout
    HashView {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
    },
    /// Look up an employee id and show the probe trace
    FindId {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
        #[arg(long, allow_hyphen_values = true)]
        id: i64,
    },
    /// Substring search on names
    FindName {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
        #[arg(short, long)]
        name: String,
    },
    /// Filter on any combination of id, name and department
    Search {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        department: Option<String>,
    },
    /// Sort by attendance percentage (asc or desc)
    Sort {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
        #[arg(short, long, default_value = "asc")]
        order: String,
    },
    /// Records with attendance percentage at or above a threshold
    Above {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
        #[arg(short, long)]
        percent: f64,
    },
    /// Download the threshold report as CSV
    Report {
        #[arg(short, long, default_value = attendance::config::DEFAULT_LISTEN_ADDR)]
        server: String,
        #[arg(short, long)]
        percent: f64,
        /// Output path; defaults to the server-suggested file name
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

async fn run_server(config: ServiceConfig) -> Result<()> {
    let addr = config.listen_addr.parse()?;
    let book = AttendanceBook::open(&config)?;
    let service = AttendanceServer::new(book);
    info!("Server listening on {}", addr);
    Server::builder()
        .add_service(AttendanceServiceServer::new(service))
        .serve(addr)
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { addr, capacity, db_path, strict } => {
            let mut config = ServiceConfig::from_env()?;
            if let Some(addr) = addr {
                config.listen_addr = addr;
            }
            if let Some(capacity) = capacity {
                config.table_capacity = capacity;
            }
            if let Some(db_path) = db_path {
                config.db_path = db_path;
            }
            config.strict_capacity |= strict;
            config.validate()?;
            run_server(config).await?;
        }
        Commands::Upload { server, file } => {
            server_admin::run_upload(&server, &file).await?;
        }
        Commands::View { server } => client::view_all(&server).await?,
        Commands::HashView { server } => client::hash_view(&server).await?,
        Commands::FindId { server, id } => client::find_id(&server, id).await?,
        Commands::FindName { server, name } => client::find_name(&server, &name).await?,
        Commands::Search { server, id, name, department } => {
            client::dynamic_search(&server, id, name, department).await?
        }
        Commands::Sort { server, order } => client::sort(&server, &order).await?,
        Commands::Above { server, percent } => client::above(&server, percent).await?,
        Commands::Report { server, percent, out } => {
            client::report(&server, percent, out).await?
        }
    }
    Ok(())
}
