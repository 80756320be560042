use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("registration request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Body of the one-shot registration call.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub company_name: String,
    pub owner_name: String,
    pub roll_no: String,
    pub owner_email: String,
    pub access_code: String,
}

/// POSTs the payload as JSON and returns the response status.
///
/// Only the status line is inspected; the body is dropped unread.
pub async fn submit(
    http: &reqwest::Client,
    url: &str,
    payload: &Registration,
) -> Result<StatusCode, RegisterError> {
    tracing::debug!(url, company = %payload.company_name, "sending registration");
    let response = http.post(url).json(payload).send().await?;
    Ok(response.status())
}
