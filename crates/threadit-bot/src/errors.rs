//! Discord-specific error handling for the bot.
//!
//! Converts serenity and attachment-download errors into the
//! [`PlatformError`] kinds the relay branches on.

use serenity::http::HttpError;
use threadit_types::PlatformError;
use tracing::debug;

/// Classify a serenity `Error`.
pub fn classify(err: &serenity::Error) -> PlatformError {
    match err {
        serenity::Error::Http(http_err) => classify_http(http_err),
        serenity::Error::Io(_) | serenity::Error::Gateway(_) => {
            PlatformError::Network(err.to_string())
        }
        _ => {
            debug!("Non-HTTP serenity error: {}", err);
            PlatformError::Unexpected(err.to_string())
        }
    }
}

fn classify_http(http_err: &HttpError) -> PlatformError {
    match http_err {
        HttpError::UnsuccessfulRequest(resp) => {
            let status = resp.status_code.as_u16();
            let raw_code = resp.error.code as u32;
            debug!(
                "Discord error (HTTP {} / code {}): {}",
                status, raw_code, resp.error.message
            );
            PlatformError::from_discord(status, raw_code, resp.error.message.clone())
        }

        // Network / request-level failures (not Discord API errors)
        HttpError::Request(_) => PlatformError::Network(http_err.to_string()),

        _ => PlatformError::Unexpected(http_err.to_string()),
    }
}

/// Classify a failed attachment download.
pub fn classify_download(err: &reqwest::Error) -> PlatformError {
    match err.status() {
        Some(status) => download_status(status.as_u16(), err.to_string()),
        None => PlatformError::Network(err.to_string()),
    }
}

/// CDN responses carry no Discord JSON code, so the status alone decides.
fn download_status(status: u16, message: String) -> PlatformError {
    PlatformError::from_discord(status, 0, message)
}
