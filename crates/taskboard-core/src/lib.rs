pub mod book_panel;
pub mod error;
pub mod memory;
pub mod rest;
pub mod table;
pub mod task_panel;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod commands;
#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "cli")]
pub mod render;

#[cfg(feature = "cli")]
#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<std::ffi::OsString>) -> anyhow::Result<()> {
    use anyhow::Context;
    use clap::Parser;
    use tracing::{debug, info};

    let pre = cli::preprocess_args(&raw_args)?;
    let cli = cli::GlobalCli::parse_from(pre.cleaned_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting taskboard CLI"
    );
    debug!(count = pre.rc_overrides.len(), "preprocessed rc overrides");

    let mut cfg = config::Config::load(cli.taskboardrc.as_deref())?;
    cfg.apply_overrides(
        pre.rc_overrides
            .into_iter()
            .chain(cli.rc_overrides.into_iter().map(|kv| (kv.key, kv.value))),
    );

    let renderer = render::Renderer::new(&cfg);

    match cli.command {
        cli::Command::Tasks(command) => {
            let settings = cfg.remote_settings()?;
            let table =
                rest::RestTable::new(&settings).context("failed to set up remote table")?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;

            let panel = runtime.block_on(commands::run_tasks(
                &table,
                cfg.flight_policy(),
                command,
            ))?;
            renderer.print_tasks(panel.tasks())?;
        }
        cli::Command::Books(command) => {
            let books = commands::run_books(command)?;
            renderer.print_books(&books)?;
        }
    }

    info!("done");
    Ok(())
}
