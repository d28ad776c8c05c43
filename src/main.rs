use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use esrec::{Backend, Config, Operation, ReadOutcome, ReconcileClient, ResourceDocument};
use esrec::state::StateStore;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Reconcile Kibana and Elasticsearch resources
#[derive(Parser, Debug)]
#[command(name = "esrec", version, about, long_about = None)]
struct Args {
    /// Config file (defaults to <config dir>/esrec/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// State file holding assigned identifiers
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Override the endpoint of the backend the resource lives on
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the resource and record its identifier
    Create { file: PathBuf },
    /// Update a previously created resource
    Update {
        file: PathBuf,
        /// Identifier to update (defaults to the recorded one)
        #[arg(long)]
        id: Option<String>,
    },
    /// Create the resource if it has no recorded identifier, update it otherwise
    Apply { file: PathBuf },
    /// Print the resource as the backend currently has it
    Read {
        file: PathBuf,
        #[arg(long)]
        id: Option<String>,
    },
    /// Delete the resource and forget its identifier
    Delete {
        file: PathBuf,
        #[arg(long)]
        id: Option<String>,
    },
    /// Print the request body without contacting the backend
    Render {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "create")]
        operation: RenderOperation,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RenderOperation {
    Create,
    Update,
}

impl From<RenderOperation> for Operation {
    fn from(op: RenderOperation) -> Self {
        match op {
            RenderOperation::Create => Operation::Create,
            RenderOperation::Update => Operation::Update,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel, to_stderr: bool) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let (non_blocking, guard) = if to_stderr {
        tracing_appender::non_blocking(std::io::stderr())
    } else {
        let log_path = get_log_path();
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        tracing_appender::non_blocking(file)
    };

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("esrec started with log level: {:?}", level);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("esrec").join("esrec.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".esrec").join("esrec.log");
    }
    PathBuf::from("esrec.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_stderr)?;

    match &args.command {
        Command::Render { file, operation } => {
            let document = ResourceDocument::load(file)?;
            let payload = document.encode((*operation).into())?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Command::Create { file } => {
            let (mut document, client, mut state) = prepare(&args, file)?;
            document.create_and_record(&client, &mut state).await?;
            println!("{}", document.id());
            Ok(())
        }
        Command::Update { file, id } => {
            let (mut document, client, _) = prepare(&args, file)?;
            if let Some(id) = id {
                document.set_id(id.clone());
            }
            document.update(&client).await?;
            println!("{}", document.id());
            Ok(())
        }
        Command::Apply { file } => {
            let (mut document, client, mut state) = prepare(&args, file)?;
            let applied = document.apply(&client, &mut state).await?;
            tracing::info!("{} {:?}", document.state_key(), applied);
            println!("{}", document.id());
            Ok(())
        }
        Command::Read { file, id } => {
            let (mut document, client, mut state) = prepare(&args, file)?;
            if let Some(id) = id {
                document.set_id(id.clone());
            }
            match document.read(&client).await? {
                ReadOutcome::Present => print!("{}", document.to_yaml()?),
                ReadOutcome::Gone => {
                    state.forget(&document.state_key())?;
                    anyhow::bail!("{} no longer exists", document.state_key());
                }
            }
            Ok(())
        }
        Command::Delete { file, id } => {
            let (mut document, client, mut state) = prepare(&args, file)?;
            if let Some(id) = id {
                document.set_id(id.clone());
            }
            document.delete(&client).await?;
            state.forget(&document.state_key())?;
            Ok(())
        }
    }
}

/// Load the document, fill in its recorded identifier, and build a client
/// for the backend it lives on
fn prepare(args: &Args, file: &Path) -> Result<(ResourceDocument, ReconcileClient, StateStore)> {
    let mut document = ResourceDocument::load(file)?;

    let state_path = args.state.clone().unwrap_or_else(StateStore::default_path);
    let state = StateStore::load(&state_path)?;
    document.restore_id(&state);

    let config = Config::load(args.config.as_deref())?;
    let mut connection = match document.backend() {
        Backend::Kibana => config.kibana,
        Backend::Elasticsearch => config.elasticsearch,
    };
    if let Some(endpoint) = &args.endpoint {
        connection.endpoint = Some(endpoint.clone());
    }
    if let Some(timeout) = args.timeout {
        connection.timeout_secs = Some(timeout);
    }

    tracing::info!(
        "{} -> {:?} at {}",
        document.state_key(),
        document.backend(),
        connection.endpoint.as_deref().unwrap_or("-")
    );

    let client = ReconcileClient::new(&connection)
        .with_context(|| format!("Cannot connect to {:?}", document.backend()))?;

    Ok((document, client, state))
}
