use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};
use reelnoteapp::cancel::CancelFlag;
use reelnoteapp::config::AppConfig;
use reelnoteapp::content::MarkdownRenderer;
use reelnoteapp::store::FsBackend;
use reelnoteapp::ReelnoteApi;

use super::print;
use super::select::TerminalSelector;
use super::setup::Cli;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    debug!("config: {:?}", AppConfig { api_key: None, ..config.clone() });

    let cancel = CancelFlag::new();
    let catalog = config.tmdb_client(cancel.clone())?;
    let api = ReelnoteApi::new(
        catalog,
        TerminalSelector::new(),
        MarkdownRenderer,
        FsBackend::new(),
    )
    .with_config(&config)
    .with_cancel_flag(cancel);

    let options = cli.run_options();
    let discovery = api.discover(&options.path)?;
    print::print_messages(&[discovery.intro()]);

    let batch = api.process_notes(&discovery.root, &discovery.files, &options, print::print_note)?;
    print::print_summary(&batch);
    Ok(())
}
