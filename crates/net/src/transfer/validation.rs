//! Source URL and HTTP response validation

use bgdl_errors::{Error, NetworkError};
use bgdl_events::ResponseInfo;
use std::collections::BTreeMap;
use url::Url;

/// Validate a source URL and check for supported protocols
pub(crate) fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(NetworkError::UnsupportedProtocol {
            protocol: scheme.to_string(),
        }
        .into()),
    }
}

/// Validate the HTTP response status
pub(super) fn validate_response(response: &reqwest::Response) -> Result<(), Error> {
    let status = response.status();

    if !status.is_success() {
        return Err(NetworkError::HttpError {
            status: status.as_u16(),
            message: status.to_string(),
        }
        .into());
    }

    Ok(())
}

/// Capture the diagnostic view of a response
pub(super) fn response_info(response: &reqwest::Response) -> ResponseInfo {
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    ResponseInfo {
        status_code: Some(response.status().as_u16()),
        actual_uri: Some(response.url().to_string()),
        headers,
    }
}
