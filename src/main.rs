use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
use reqwest::Client;
use tokio::runtime::Runtime;
use tokio::signal;
use tracing::info;

use derpi_dl::api::BatchGetter;
use derpi_dl::cli::{Cli, Parser};
use derpi_dl::config::Config;
use derpi_dl::fetcher::Fetcher;
use derpi_dl::logging;

const SPINNER_FINISH_MODE: ProgressFinish = ProgressFinish::AndClear;
const SPINNER_TICK_SECS: f32 = 0.1;

// Booru APIs tend to block the default agents of http libraries,
// so always identify ourselves.
const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[inline]
fn build_spinner() -> ProgressBar {
    ProgressBar::new_spinner()
        .with_finish(SPINNER_FINISH_MODE)
        .with_style(
            ProgressStyle::with_template("{spinner:.blue} {msg}")
                .unwrap()
                // For more spinners check out the cli-spinners project:
                // https://github.com/sindresorhus/cli-spinners/blob/master/spinners.json
                // NOTE: use `ascii` only, because cmd/powershell maybe not support unicode.
                .tick_strings(&[".  ", ".. ", "...", " ..", "  .", "   "]),
        )
}

#[inline]
fn build_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(APP_USER_AGENT).build()
}

#[inline]
async fn async_main(config: Config) -> anyhow::Result<()> {
    let client = build_client().context("failed to build reqwest client")?;

    let Config {
        destdir, search, ..
    } = config;

    // the directory must exist before any record is fetched,
    // even when the search turns out to match nothing
    let fetcher = Fetcher::build(client.clone(), destdir)
        .await
        .context("unable to ensure the existence of the destination directory")?;

    let spinner = build_spinner();
    spinner.set_message("Fetching image metadata from the Derpibooru API...");
    spinner.enable_steady_tick(Duration::from_secs_f32(SPINNER_TICK_SECS));
    let images = BatchGetter::new(&client, &search)
        .run()
        .await
        .context("failed to get data from API")?;
    spinner.finish_with_message("Image metadata fetched successfully!");

    // HACK: This is not considered an error, so we just return Ok(()).
    if images.is_empty() {
        info!(
            "there is no image found with the given query: {}",
            search.query
        );
        return Ok(());
    }

    let status = fetcher.run(images).await;
    info!(
        written = status.written,
        skipped = status.skipped,
        failed = status.failed,
        "all records processed"
    );

    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    // here, if parse fails, the program will be `abort`ed, and no `Drop` will be called,
    // but it's okay, because we don't need to clean up anything.
    let cli = Cli::parse();

    logging::init();
    let config = cli.into_config();

    let runtime = Runtime::new().context("failed to build tokio runtime")?;
    runtime.block_on(async {
        tokio::select! {
            result = async_main(config) => {result},
            result = signal::ctrl_c() => {
                result.expect("failed to listen for ctrl-c signal");
                println!("Ctrl-C received, exiting...");
                Ok(())
            },
        }
    })?;

    Ok(ExitCode::SUCCESS)
}
