//! Shared JSON-over-HTTP plumbing for provider adapters.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::payment::ProviderKind;
use crate::ports::PaymentError;

/// Sends a prepared request and returns the JSON body of a 2xx response.
///
/// Non-2xx responses are handed to `on_error` with the status code and the
/// body text so each provider can decode its own error envelope.
pub(crate) async fn execute(
    provider: ProviderKind,
    operation: &'static str,
    request: reqwest::RequestBuilder,
    on_error: impl FnOnce(u16, &str) -> PaymentError,
) -> Result<Value, PaymentError> {
    let response = request.send().await.map_err(|e| {
        tracing::error!(%provider, operation, error = %e, "Provider request failed");
        PaymentError::network(e.to_string())
    })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PaymentError::network(e.to_string()))?;

    if !status.is_success() {
        let err = on_error(status.as_u16(), &body);
        tracing::error!(
            %provider,
            operation,
            status = status.as_u16(),
            code = %err.code,
            provider_code = err.provider_code.as_deref().unwrap_or(""),
            "Provider rejected request"
        );
        return Err(err);
    }

    serde_json::from_str(&body).map_err(|e| {
        PaymentError::provider(format!("Failed to parse {} response: {}", provider, e))
    })
}

/// Decodes a raw JSON body into a typed response.
pub(crate) fn decode<T: DeserializeOwned>(
    provider: ProviderKind,
    raw: &Value,
) -> Result<T, PaymentError> {
    T::deserialize(raw).map_err(|e| {
        PaymentError::provider(format!("Unexpected {} response shape: {}", provider, e))
    })
}

/// Rejects ids that would escape their URL path segment.
pub(crate) fn path_id<'a>(resource: &str, id: &'a str) -> Result<&'a str, PaymentError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(id)
    } else {
        Err(PaymentError::invalid_request(format!(
            "Invalid {} id '{}'",
            resource, id
        )))
    }
}
