//! wswd: assigns working directories to i3/sway workspaces.
//!
//! Bind your terminal launcher to `wswd alacritty` (or `wswd exec alacritty`)
//! and run `wswd set` from a shell to make the current directory the starting
//! point for new programs on the focused workspace.
//!
//! ## Subcommands
//!
//! - `set` / `unset`: record or forget the directory of the focused workspace
//! - `clean`: drop records of workspaces that no longer exist
//! - `show` / `list`: inspect records
//! - `exec <program> [args...]`: start a program in the recorded directory;
//!   any unknown subcommand is treated as the program name

mod logging;
mod workspaces;

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;
use wswd_core::{Context, DispatchPlan, StorageConfig, WswdError};
use wswd_ipc::IpcError;

#[derive(Parser)]
#[command(name = "wswd")]
#[command(about = "Assigns working directories to i3/sway workspaces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remember the current directory for the focused workspace
    Set,

    /// Forget the focused workspace's directory
    Unset,

    /// Remove records of workspaces that no longer exist
    Clean,

    /// Print the focused workspace's directory, if any
    Show,

    /// List all records and whether their workspace is still open
    List,

    /// Run a program in the focused workspace's directory
    Exec {
        /// Program to run, looked up on $PATH
        #[arg(value_name = "PROGRAM")]
        program: OsString,

        /// Arguments passed to the program unchanged
        #[arg(
            value_name = "ARGS",
            trailing_var_arg = true,
            allow_hyphen_values = true,
            num_args = 0..
        )]
        args: Vec<OsString>,
    },

    /// Shorthand for `exec <program> [args...]`
    #[command(external_subcommand)]
    External(Vec<OsString>),
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Core(#[from] WswdError),

    #[error("could not get workspaces: {0}")]
    Ipc(#[from] IpcError),

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    let storage = StorageConfig::from_env()?;
    let workspaces = workspaces::snapshot()?;
    let ctx = Context::new(&storage, &workspaces)?;
    tracing::debug!(
        workspace = %ctx.focused(),
        live = ctx.live().len(),
        store = %storage.store_dir().display(),
        "Context resolved"
    );

    match command {
        Commands::Set => {
            let dir = working_dir()?;
            ctx.set(&dir)?;
            tracing::info!(workspace = %ctx.focused(), path = %dir.display(), "Directory set");
            Ok(())
        }
        Commands::Unset => Ok(ctx.unset()?),
        Commands::Clean => {
            ctx.clean()?;
            Ok(())
        }
        Commands::Show => show(&ctx),
        Commands::List => list(&ctx),
        Commands::Exec { program, args } => dispatch(&ctx, program, args),
        Commands::External(argv) => {
            let mut argv = argv.into_iter();
            let Some(program) = argv.next() else {
                return Err(WswdError::ProgramNotFound(String::new()).into());
            };
            dispatch(&ctx, program, argv.collect())
        }
    }
}

fn dispatch(ctx: &Context, program: OsString, args: Vec<OsString>) -> Result<(), CliError> {
    let plan = DispatchPlan::prepare(ctx, program, args)?;
    tracing::debug!(program = %plan.executable().display(), "Replacing process");
    Err(plan.exec().into())
}

/// Current directory, preferring `$PWD` when it names the same directory so
/// symlinked paths are recorded the way the user typed them.
fn working_dir() -> Result<PathBuf, CliError> {
    let cwd = env::current_dir().map_err(|source| WswdError::Io {
        context: "get working directory".to_string(),
        source,
    })?;

    if let Some(pwd) = env::var_os("PWD").map(PathBuf::from) {
        if pwd.is_absolute() && same_file(&pwd, &cwd) {
            return Ok(pwd);
        }
    }
    Ok(cwd)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

fn show(ctx: &Context) -> Result<(), CliError> {
    let Some(dir) = ctx.show()? else {
        return Ok(());
    };
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(dir.as_os_str().as_bytes())
        .and_then(|()| stdout.write_all(b"\n"))
        .map_err(CliError::Output)
}

fn list(ctx: &Context) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    for (entry, state) in ctx.list()? {
        let recorded = match entry.workspace {
            Some(id) if !entry.is_dir => ctx.store().read(id)?,
            _ => None,
        };
        let recorded = recorded
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        writeln!(stdout, "{}\t{}\t{}", entry.name, state, recorded).map_err(CliError::Output)?;
    }
    Ok(())
}
