//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::FileReport;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::sink::JsonLinesSink;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `pmcollect --help`".into(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            completion(*shell);
            Ok(())
        }
        Commands::Config { command } => config_command(cli.config_dir.as_deref(), command),
        Commands::Parse { inputs, strict } => parse(&container(cli, *strict)?, inputs),
        Commands::Ingest {
            inputs,
            output,
            strict,
        } => ingest(&container(cli, *strict)?, inputs, output),
        Commands::Show { file, index, tree } => show(&container(cli, false)?, file, *index, *tree),
        Commands::Fetch {
            sources,
            dest,
            concurrency,
        } => fetch(&container(cli, false)?, sources, dest.as_deref(), *concurrency),
        Commands::Urls { from, to } => urls(&container(cli, false)?, *from, *to),
    }
}

fn container(cli: &Cli, strict: bool) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(cli.config_dir.as_deref())?;
    settings.fail_fast |= strict;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

fn completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(skip(container))]
fn parse(container: &ServiceContainer, inputs: &[PathBuf]) -> CliResult<()> {
    let summary = container.collection().parse_all(inputs)?;

    let (mut records, mut failed) = (0, 0);
    for FileReport { path, report } in &summary.reports {
        output::header(&path.display());
        output::success_detail(&format!("{} records mapped", report.records.len()));
        for failure in &report.failures {
            output::record_failure(failure);
        }
        records += report.records.len();
        failed += report.failures.len();
    }
    for (path, error) in &summary.file_failures {
        output::file_failure(path, error);
    }
    output::action(
        "Parsed",
        &format!(
            "{} files, {} records, {} failed, {} files skipped",
            summary.reports.len(),
            records,
            failed,
            summary.file_failures.len()
        ),
    );
    Ok(())
}

#[instrument(skip(container))]
fn ingest(container: &ServiceContainer, inputs: &[PathBuf], out: &Path) -> CliResult<()> {
    let sink = JsonLinesSink::open(out)
        .map_err(|e| InfraError::io(format!("open output: {}", out.display()), e))?;
    let summary = container.collection().ingest_all(inputs, &sink)?;

    for (path, failure) in &summary.failures {
        output::header(&path.display());
        output::record_failure(failure);
    }
    for (path, error) in &summary.file_failures {
        output::file_failure(path, error);
    }
    output::action(
        "Ingested",
        &format!(
            "{} files: {} written, {} without abstract, {} failed, {} files skipped -> {}",
            summary.files,
            summary.written,
            summary.excluded,
            summary.failures.len(),
            summary.file_failures.len(),
            sink.path().display()
        ),
    );
    Ok(())
}

#[instrument(skip(container))]
fn show(container: &ServiceContainer, file: &Path, index: usize, tree: bool) -> CliResult<()> {
    let collection = container.collection();
    if tree {
        let doc = collection.load_document(file)?;
        let nodes = collection.batch().record_nodes(&doc);
        let node = nodes.get(index).ok_or_else(|| {
            CliError::InvalidArgs(format!(
                "index {} out of range, document holds {} records",
                index,
                nodes.len()
            ))
        })?;
        output::info(&node.to_tree_string());
        return Ok(());
    }

    let record = collection.record_at(file, index)?;
    let json = serde_json::to_string_pretty(&record).map_err(|e| InfraError::Serialize {
        context: format!("record {} of {}", index, file.display()),
        source: e,
    })?;
    output::info(&json);
    Ok(())
}

#[instrument(skip(container, sources))]
fn fetch(
    container: &ServiceContainer,
    sources: &[String],
    dest: Option<&Path>,
    concurrency: Option<usize>,
) -> CliResult<()> {
    let outcomes = container.fetch().fetch(sources, dest, concurrency);
    for outcome in &outcomes {
        output::fetch_outcome(outcome);
    }
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        return Err(CliError::FetchFailed {
            failed,
            total: outcomes.len(),
        });
    }
    output::action("Fetched", &format!("{} sources", outcomes.len()));
    Ok(())
}

fn urls(container: &ServiceContainer, from: u32, to: u32) -> CliResult<()> {
    for url in container.fetch().baseline_urls(from, to)? {
        output::info(&url);
    }
    Ok(())
}

fn config_command(config_dir: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config_dir)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let local = local_config_path(&current_dir(config_dir)?);
            match global_config_path() {
                Some(global) => print_config_path("global", &global),
                None => output::warning("no global config directory on this platform"),
            }
            print_config_path("local", &local);
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("no global config directory on this platform".into())
                })?
            } else {
                local_config_path(&current_dir(config_dir)?)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .and_then(|()| fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}

fn print_config_path(label: &str, path: &Path) {
    let state = if path.exists() { "" } else { " (not found)" };
    output::detail(&format!("{}: {}{}", label, path.display(), state));
}

fn current_dir(config_dir: Option<&Path>) -> CliResult<PathBuf> {
    match config_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("current directory", e))),
    }
}
