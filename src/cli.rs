//! A core module for command line interface.
//!
//! See [`Cli`] for more information.

use std::path::PathBuf;

pub use clap::Parser;

use crate::config::{Config, SearchQuery};

/// [`clap`] command line interface.
///
/// Flags mirror the knobs of one run: where files go, what to search for,
/// how many results to request, and the API key (with an environment
/// fallback, see [`Cli::into_config`]).
///
/// # Example
///
/// ```no_run
/// use derpi_dl::cli::{Cli, Parser as _};
///
/// let config = Cli::parse().into_config();
/// ```
#[non_exhaustive]
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Location where downloaded images will be dropped off.
    #[arg(short, long, value_name = "DIR")]
    pub destdir: PathBuf,

    /// The Derpibooru query you wish to execute.
    #[arg(short, long, default_value = "", value_name = "QUERY")]
    pub query: String,

    /// The count of images you wish to download.
    #[arg(short, long, default_value_t = 100, value_name = "N")]
    pub count: u64,

    /// The API key (normally present as the DERPIBOORUAPIKEY env variable).
    #[arg(short, long, value_name = "KEY")]
    pub key: Option<String>,
}

impl Cli {
    /// Turn the parsed flags into a [`Config`], reading
    /// [`API_KEY_ENV`](crate::config::API_KEY_ENV) when `--key` was not given.
    pub fn into_config(self) -> Config {
        let Self {
            destdir,
            query,
            count,
            key,
        } = self;

        Config {
            destdir,
            search: SearchQuery::resolve(key, query, count),
        }
    }
}
