//! Run one tag transaction against a tag whose payload lives in a local file.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
#![expect(
    clippy::print_stdout,
    reason = "the binary reports transaction outcomes on stdout"
)]

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use account_record::{AccountRecord, ReloadAmount};
use cap_std::{ambient_authority, fs::Dir};
use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig;
use rust_decimal::Decimal;
use tag_engine::config::EngineSettings;
use tag_engine::domain::ports::TagStatus;
use tag_engine::domain::{
    AccountCoordinator, CoordinatorError, StartError, TransactionEngine, TransactionEnginePorts,
    TransactionOutcome, TransactionReport, TransactionRequest,
};
use tag_engine::outbound::{SimulatedTag, SimulatedTagField, TracingNotifier};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `tag-engine` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tag-engine",
    about = "Create, read, or reload the account stored on a simulated tag",
    version
)]
struct CliArgs {
    /// File holding the tag's record payload. A missing file is a blank tag.
    #[arg(long = "tag-file", value_name = "path")]
    tag_file: PathBuf,
    /// Present the tag as read only.
    #[arg(long = "read-only")]
    read_only: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Write a new account to the tag.
    Create {
        /// Holder's first name.
        #[arg(long = "first-name", default_value = "Amanda")]
        first_name: String,
        /// Holder's last name.
        #[arg(long = "last-name", default_value = "Gonzalez")]
        last_name: String,
        /// Account identifier.
        #[arg(long, default_value_t = 1)]
        id: i64,
        /// Opening balance.
        #[arg(long, default_value = "0")]
        balance: Decimal,
    },
    /// Read the account stored on the tag.
    Read,
    /// Credit an amount to the account stored on the tag.
    Reload {
        /// Amount to add to the balance.
        #[arg(long)]
        amount: ReloadAmount,
        /// Account identifier the tag must hold. Read from the tag when omitted.
        #[arg(long)]
        id: Option<i64>,
    },
}

fn main() -> io::Result<ExitCode> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = EngineSettings::load_from_iter([OsString::from("tag-engine")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    init_tracing(settings.json_logs);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main(args, &settings))
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let initialised = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = initialised {
        warn!(error = %e, "tracing init failed");
    }
}

async fn async_main(args: CliArgs, settings: &EngineSettings) -> io::Result<ExitCode> {
    let stored = load_tag(&args.tag_file)?;
    let presented = if args.read_only {
        stored.with_status(TagStatus::ReadOnly)
    } else {
        stored
    };

    let field = SimulatedTagField::new();
    let handle = field.place(presented);
    let engine = Arc::new(TransactionEngine::new(
        TransactionEnginePorts::new(Arc::new(field.clone()), Arc::new(TracingNotifier)),
        settings.engine_config(),
    ));

    let report = match args.command {
        Command::Create {
            first_name,
            last_name,
            id,
            balance,
        } => {
            let record = AccountRecord::new(first_name, last_name, balance, id);
            engine
                .execute(&TransactionRequest::CreateUser { record })
                .await
                .map_err(|error| start_failed(&error))?
        }
        Command::Read => coordinator(&engine)
            .read_user()
            .await
            .map_err(|error| coordination_failed(&error))?,
        Command::Reload {
            amount,
            id: Some(id),
        } => {
            let record = AccountRecord::new("", "", Decimal::ZERO, id);
            engine
                .execute(&TransactionRequest::ReloadUser { record, amount })
                .await
                .map_err(|error| start_failed(&error))?
        }
        Command::Reload { amount, id: None } => reload_current(&engine, amount).await?,
    };

    if let Some(tag) = field.tag(handle) {
        store_tag(&args.tag_file, &tag)?;
    }
    print_report(&report);
    Ok(if report.success().is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn coordinator(engine: &Arc<TransactionEngine>) -> AccountCoordinator {
    AccountCoordinator::new(Arc::clone(engine), Arc::new(TracingNotifier))
}

/// Read the account first, then credit it, the way a holder would.
async fn reload_current(
    engine: &Arc<TransactionEngine>,
    amount: ReloadAmount,
) -> io::Result<TransactionReport> {
    let accounts = coordinator(engine);
    let read = accounts.read_user().await.map_err(|error| coordination_failed(&error))?;
    if read.success().is_none() {
        return Ok(read);
    }
    accounts
        .select_amount(Some(amount))
        .map_err(|error| coordination_failed(&error))?;
    accounts.reload().await.map_err(|error| coordination_failed(&error))
}

fn start_failed(error: &StartError) -> io::Error {
    io::Error::other(format!("start transaction: {error}"))
}

fn coordination_failed(error: &CoordinatorError) -> io::Error {
    io::Error::other(format!("coordinate transaction: {error}"))
}

fn open_parent(path: &Path) -> io::Result<(Dir, &Path)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "tag path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open tag directory '{}': {error}",
            parent.display()
        ))
    })?;
    Ok((directory, Path::new(file_name)))
}

fn load_tag(path: &Path) -> io::Result<SimulatedTag> {
    let (directory, file_name) = open_parent(path)?;
    match directory.read(file_name) {
        Ok(payload) if payload.is_empty() => Ok(SimulatedTag::blank()),
        Ok(payload) => Ok(SimulatedTag::with_payload(payload)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(SimulatedTag::blank()),
        Err(error) => Err(io::Error::other(format!(
            "read tag file '{}': {error}",
            path.display()
        ))),
    }
}

fn store_tag(path: &Path, tag: &SimulatedTag) -> io::Result<()> {
    let Some(payload) = tag.payload() else {
        return Ok(());
    };
    let (directory, file_name) = open_parent(path)?;
    directory.write(file_name, payload).map_err(|error| {
        io::Error::other(format!("write tag file '{}': {error}", path.display()))
    })
}

fn print_report(report: &TransactionReport) {
    match &report.outcome {
        TransactionOutcome::Succeeded(success) => {
            println!("outcome=succeeded");
            println!("message={}", success.message);
            println!("account_id={}", success.record.id);
            println!("holder={}", success.record.display_name());
            println!("funds={}", success.record.funds_available());
        }
        TransactionOutcome::Failed(error) => {
            println!("outcome=failed");
            println!("code={}", error.code().as_str());
            println!("message={}", error.message());
        }
        TransactionOutcome::Cancelled => println!("outcome=cancelled"),
    }
    let trail = report
        .trail
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    println!("trail={trail}");
}
