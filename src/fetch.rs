use image::DynamicImage;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },

    #[error("{url} body exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    #[error("cannot decode image from {url}: {source}")]
    Decode { url: String, source: image::ImageError },
}

// Largest profile photo body we are willing to buffer
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

// Download the profile photo. Anything but a decodable image behind a 2xx is a failure.
pub async fn fetch_image(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<DynamicImage, FetchError> {
    fetch_image_capped(client, url, timeout, MAX_PHOTO_BYTES).await
}

async fn fetch_image_capped(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    max_bytes: usize,
) -> Result<DynamicImage, FetchError> {
    let request_err = |source: reqwest::Error| {
        if source.is_timeout() {
            FetchError::Timeout { url: url.to_string(), timeout }
        } else {
            FetchError::Request { url: url.to_string(), source }
        }
    };

    let mut res = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(request_err)?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status { url: url.to_string(), status });
    }

    let too_large = || FetchError::TooLarge { url: url.to_string(), limit: max_bytes };
    if res.content_length().is_some_and(|len| len > max_bytes as u64) {
        return Err(too_large());
    }

    // chunked bodies carry no length, so the cap is enforced while reading too
    let mut bytes = Vec::new();
    while let Some(chunk) = res.chunk().await.map_err(request_err)? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    debug!(url, size = bytes.len(), "Profile image downloaded");

    image::load_from_memory(&bytes).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}
