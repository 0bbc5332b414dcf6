//! contentmap - keeps content collection types in sync with the content tree.

mod cli;
mod config;
mod content;
mod logger;
mod watch;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands};
use config::{ConfigObserver, ConfigState, Settings};
use content::{
    BatchReport, ContentContext, ContentTypesGenerator, EventQueue, FrontmatterSlugResolver,
    InitOutcome, MemoryModuleGraph, VIRTUAL_MODULE_ID, VirtualModule,
};
use logger::{LogLevel, Severity};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;

    match &cli.command {
        Commands::Sync => sync(&settings, cli.log_level).map(|_| ()),
        Commands::Watch { .. } => watch_content(&settings, cli.log_level),
        Commands::Lookup => lookup(&settings),
    }
}

/// Run the initial scan. Returns the generator when the content root exists.
fn sync(settings: &Settings, level: LogLevel) -> Result<Option<ContentTypesGenerator>> {
    let observer = ConfigObserver::new();
    let mut generator = ContentTypesGenerator::new(
        ContentContext::from_settings(settings),
        observer.clone(),
        Arc::new(MemoryModuleGraph::new()),
    )?;

    match generator.init()? {
        InitOutcome::TypesGenerated(report) => {
            log_config_state(&observer, level);
            if level.allows(Severity::Info) {
                let count = generator.collections().collections().count();
                log!("content"; "types generated ({count} collections, {} files scanned)", report.events);
            }
            Ok(Some(generator))
        }
        InitOutcome::NoContentDir => {
            if level.allows(Severity::Warn) {
                warning!("content";
                    "no content directory found at {}",
                    settings.build.content.display());
            }
            Ok(None)
        }
    }
}

/// Initial scan, then live updates until Ctrl+C.
fn watch_content(settings: &Settings, level: LogLevel) -> Result<()> {
    let Some(generator) = sync(settings, level)? else {
        return Ok(());
    };

    let queue = EventQueue::spawn_with(generator, settings.watch.debounce(), move |report| {
        log_batch(report, level);
    })?;

    let result = watch::watch_for_changes_blocking(settings, &queue.sender(), level);
    queue.close()?;
    result
}

/// Print the virtual module as a bundler would load it.
fn lookup(settings: &Settings) -> Result<()> {
    let module = VirtualModule::new(
        ContentContext::from_settings(settings),
        Arc::new(FrontmatterSlugResolver),
    )?;
    let graph = MemoryModuleGraph::new();

    match graph.import(&module, VIRTUAL_MODULE_ID)? {
        Some(code) => {
            println!("{code}");
            Ok(())
        }
        None => bail!("`{VIRTUAL_MODULE_ID}` could not be loaded"),
    }
}

/// Failed batches were already logged by the generator.
fn log_batch(report: &BatchReport, level: LogLevel) {
    if report.error.is_some() || !report.types_generated || !level.allows(Severity::Info) {
        return;
    }
    let skipped = report.unsupported.len() + report.unnested.len();
    log!("content"; "types updated ({} events, {skipped} skipped)", report.events);
}

/// Surface a broken collection config; the pipeline keeps running without it.
fn log_config_state(observer: &ConfigObserver, level: LogLevel) {
    match observer.get().as_ref() {
        ConfigState::Error(err) if level.allows(Severity::Warn) => {
            warning!("content"; "content config could not be loaded: {err:#}");
        }
        state if level.allows(Severity::Info) => {
            log!("content"; "content config: {}", state.name());
        }
        _ => {}
    }
}
