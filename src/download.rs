//! Fetching raw image bytes over HTTP.

use bytes::Bytes;
use reqwest::{Client, IntoUrl, StatusCode};
use thiserror::Error;

/// What can go wrong while fetching one image.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport-level failure, including errors while reading the body.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    /// The server answered, but not with `200 OK`.
    #[error("unexpected response status: {0}")]
    UnexpectedStatus(StatusCode),
}

/// GET `url` and return the whole response body.
///
/// The body is kept in memory on purpose: it must be hashed before anything
/// touches the disk.
///
/// # Errors
///
/// Any status other than `200 OK` is an error, as is a transport failure
/// at any point.
pub async fn fetch_bytes(client: &Client, url: impl IntoUrl) -> Result<Bytes, DownloadError> {
    let response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        return Err(DownloadError::UnexpectedStatus(response.status()));
    }
    Ok(response.bytes().await?)
}
