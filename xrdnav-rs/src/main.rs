mod cli;
mod prompt;
mod render;

use clap::Parser;
use cli::{Cli, Command};
use prompt::Prompt;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use xrdnav_core::{
    file_list_name, CancelToken, ConfirmPolicy, ConfirmState, CoreError, DeleteReport, EntryKind,
    ErrorKind, LocalStore, SessionConfig, Walker,
};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("unable to write {0}")]
    Io(PathBuf, #[source] io::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Core(err) => match err.kind() {
                ErrorKind::RemoteFailure => 1,
                ErrorKind::InvalidPath => 2,
                ErrorKind::NotFound => 3,
                ErrorKind::PermissionDenied => 4,
                ErrorKind::Cancelled => 130,
            },
            Self::Io(..) => 1,
        }
    }
}

fn init_logging(cli: &Cli) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.loglevel))
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("xrdnav: unable to install logger: {err}");
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn report_deletion(report: &DeleteReport) {
    if report.files_deleted.is_empty() && report.directories_removed.is_empty() {
        info!("Nothing deleted.");
        return;
    }
    info!(
        "{} files and {} directories removed",
        report.files_deleted.len(),
        report.directories_removed.len()
    );
    for kept in &report.declined {
        warn!("kept: {kept}");
    }
}

/// Runs a deletion with stdin prompts unless the operator passed `--yes`.
fn with_confirmation<T>(
    yes: bool,
    policy: ConfirmPolicy,
    run: impl FnOnce(&mut ConfirmState<'_>) -> xrdnav_core::Result<T>,
) -> xrdnav_core::Result<T> {
    if yes {
        return run(&mut ConfirmState::unattended());
    }
    let mut prompt = Prompt::stdio();
    let mut state = ConfirmState::new(policy, &mut prompt);
    run(&mut state)
}

fn execute(command: Command, walker: &Walker<'_>, config: &SessionConfig) -> Result<(), CliError> {
    let owner = config.owner.as_str();
    match command {
        Command::Ping => {
            walker.ping()?;
            println!("ok");
        }
        Command::Ls { path } => {
            let path = config.resolve(&path);
            let (_, kind) = walker.stat(&path)?;
            if kind == EntryKind::File {
                println!("{path}");
            } else {
                print_lines(render::ls_lines(&walker.list(&path)?));
            }
        }
        Command::Stat { path } => {
            let path = config.resolve(&path);
            let (metadata, kind) = walker.stat(&path)?;
            print_lines(render::stat_lines(&path, &metadata, kind));
            for line in render::flag_lines(metadata.flags) {
                debug!("{line}");
            }
        }
        Command::StatDir { path } => {
            let listing = walker.list(&config.resolve(&path))?;
            print_lines(render::stat_dir_lines(&listing));
        }
        Command::Size { path } => {
            let size = walker.size_of(&config.resolve(&path))?;
            println!("{}", render::size_line(size));
        }
        Command::Content { path } => {
            let entries = walker.dir_content(&config.resolve(&path))?;
            print_lines(render::content_lines(&entries));
        }
        Command::Rm { path, yes } => {
            let path = config.resolve(&path);
            let report = with_confirmation(yes, ConfirmPolicy::Always, |state| {
                walker.delete_file(&path, owner, state)
            })?;
            report_deletion(&report);
        }
        Command::RmDir { path, yes } => {
            let path = config.resolve(&path);
            let report = with_confirmation(yes, ConfirmPolicy::UntilAll, |state| {
                walker.delete_subtree(&path, owner, state)
            })?;
            report_deletion(&report);
        }
        Command::Purge { paths, yes } => {
            let report = with_confirmation(yes, ConfirmPolicy::UntilAll, |state| {
                let mut report = DeleteReport::default();
                for path in &paths {
                    let path = config.resolve(path);
                    info!("Deleting {path}");
                    report.merge(walker.delete_path(&path, owner, state)?);
                }
                Ok(report)
            })?;
            report_deletion(&report);
        }
        Command::Mv { source, dest } => {
            walker.move_path(&config.resolve(&source), &config.resolve(&dest), owner)?;
        }
        Command::Mkdir { path } => {
            walker.make_directory_tree(&config.resolve(&path), owner)?;
        }
        Command::CopyTo { local, dest } => {
            walker.copy_in(&local, &config.resolve(&dest), owner)?;
        }
        Command::CopyFrom { source, local } => {
            walker.copy_out(&config.resolve(&source), &local)?;
        }
        Command::FileList {
            path,
            exclude,
            output_dir,
        } => {
            let path = config.resolve(&path);
            let list = walker.file_list(&path, &exclude)?;
            let target = output_dir.join(file_list_name(&path));
            let mut content = list.paths.join("\n");
            content.push('\n');
            fs::write(&target, content).map_err(|err| CliError::Io(target.clone(), err))?;
            if list.includes_directories {
                warn!("+++ Warning +++ There are directories listed in your filelist");
            }
            info!("{} created.", target.display());
        }
    }
    Ok(())
}

fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = SessionConfig::new(cli.user.clone())
        .with_base_path(cli.basepath.clone())
        .with_max_depth(cli.max_depth);
    if let Err(err) = config.validate() {
        error!("{err}");
        return CliError::from(err).exit_code();
    }
    debug!(
        "All inputs: {}, {}, {}, {:?}",
        config.owner,
        config.base_path,
        cli.root.display(),
        cli.loglevel
    );

    let cancel = CancelToken::new();
    {
        let handle = cancel.clone();
        // A pending prompt still waits for its line; the reply is then discarded.
        let on_interrupt = move || {
            handle.cancel();
            eprintln!("\nxrdnav: interrupted, stopping before the next remote call");
        };
        if let Err(err) = ctrlc::set_handler(on_interrupt) {
            warn!("unable to install Ctrl-C handler: {err}");
        }
    }

    let store = LocalStore::new(&cli.root);
    let walker = Walker::from_config(&store, &config).with_cancel(cancel);
    match execute(cli.command, &walker, &config) {
        Ok(()) => 0,
        Err(err) => {
            error!("{err}");
            err.exit_code()
        }
    }
}

fn main() {
    std::process::exit(run());
}
