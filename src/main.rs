use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use undangan::{AppConfig, Month, RemoteStore, StatsFilter, Workspace};

#[derive(Parser)]
#[command(name = "undangan")]
#[command(about = "Local order book and one-way migration to the remote backend")]
struct Cli {
    /// JSON config file; `UNDANGAN_*` variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write default reference data and empty month shards
    Seed,
    /// List orders, optionally of one month
    Orders {
        #[arg(long)]
        month: Option<String>,
    },
    /// Dashboard statistics
    Stats {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<String>,
    },
    LoginDemo {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long)]
        password: String,
    },
    LoginRemote {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Keep the session on disk
        #[arg(long)]
        remember: bool,
    },
    Logout,
    Status,
    /// Copy local data into the remote backend
    Migrate {
        /// Remove local data (except sessions) after a fully successful run
        #[arg(long)]
        clear_local: bool,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let mut config = config.from_env()?;
    if let Some(dir) = &cli.data_dir {
        config = config.data_dir(dir);
    }
    Ok(config)
}

fn parse_month(raw: Option<&str>) -> Result<Option<Month>> {
    raw.map(|m| m.parse::<Month>().map_err(|e| anyhow!("{}", e)))
        .transpose()
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let workspace = Workspace::open(config).context("Failed to open local store")?;

    let result = run(&workspace, cli.command).await;
    for notice in workspace.notices().pending() {
        eprintln!("[{:?}] {}", notice.level, notice.message);
    }
    result
}

async fn run(workspace: &Workspace, command: Command) -> Result<()> {
    match command {
        Command::Seed => {
            let report = workspace.initialize()?;
            if report.is_noop() {
                println!("Already seeded");
            } else {
                println!("Seeded: {}", report.seeded.join(", "));
                if report.normalized_themes > 0 {
                    println!("Normalized {} legacy themes", report.normalized_themes);
                }
            }
            Ok(())
        }
        Command::Orders { month } => {
            let orders = match parse_month(month.as_deref())? {
                Some(month) => workspace.orders().list_month(month)?,
                None => workspace.orders().list_all()?,
            };
            for order in &orders {
                println!(
                    "{:<38} {:<10} {:<10} {:>14.0} {}",
                    order.id,
                    order.effective_month().map_or("-", Month::name),
                    order.event_date.as_deref().unwrap_or("-"),
                    order.amount.value(),
                    order.customer_name
                );
            }
            println!("{} orders", orders.len());
            Ok(())
        }
        Command::Stats { year, month } => {
            let year = year.unwrap_or(workspace.config().active_year);
            let mut filter = StatsFilter::year(year);
            if let Some(month) = parse_month(month.as_deref())? {
                filter = filter.month(month);
            }
            let stats = serde_json::json!({
                "orders": workspace.order_stats(&filter)?,
                "transactions": workspace.transaction_stats(&filter)?,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Command::LoginDemo { username, password } => {
            workspace.auth().login_demo(&username, &password)?;
            println!("Logged in as {}", username);
            Ok(())
        }
        Command::LoginRemote {
            email,
            password,
            remember,
        } => {
            let remote = workspace.rest_remote()?;
            let session = remote.sign_in(&email, &password).await?;
            workspace.auth().start_remote_session(&session, remember)?;
            if !remember {
                eprintln!("Session not remembered: it ends with this process");
            }
            println!("Signed in as {}", session.email.as_deref().unwrap_or(&session.user_id));
            Ok(())
        }
        Command::Logout => {
            workspace.auth().logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Status => {
            let status = workspace.auth().status()?;
            println!("local session:  {}", status.local);
            println!("remote session: {}", status.remote);
            println!("authorized:     {}", status.is_authorized());
            Ok(())
        }
        Command::Migrate { clear_local } => {
            let remote: Arc<dyn RemoteStore> = Arc::new(workspace.rest_remote()?);
            let migrator = workspace.migrator(remote);
            let report = migrator
                .migrate(clear_local, |progress| {
                    eprint!(
                        "\r[{}/{}] {} ({} failed)   ",
                        progress.processed(),
                        progress.total,
                        progress.phase,
                        progress.failed
                    );
                    let _ = std::io::stderr().flush();
                })
                .await?;
            eprintln!();

            println!("outcome:   {:?}", report.outcome);
            println!("completed: {}/{}", report.completed, report.total);
            println!("failed:    {}", report.failed);
            for (table, count) in report.failures_by_table() {
                println!("  {}: {}", table, count);
            }
            if report.local_cleared() {
                println!("cleared {} local keys", report.cleared_keys.len());
            }
            for key in &report.kept_keys {
                println!("kept {} (outside the migrated year range)", key);
            }
            if let Some(err) = &report.clear_error {
                println!("local data kept: {}", err);
            }
            if report.outcome == undangan::MigrationOutcome::NotAuthenticated {
                return Err(anyhow!("Sign in with `login-remote` before migrating"));
            }
            Ok(())
        }
    }
}
