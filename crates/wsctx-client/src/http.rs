//! reqwest binding of the workspace endpoints
//!
//! - `GET  {base}/workspaces`
//! - `GET  {base}/workspaces/current` (`204`, `404` or `null` mean personal)
//! - `POST {base}/workspaces/switch` with `{"workspace_id": ...}`
//! - `POST {base}/workspaces`

use crate::config::ClientConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wsctx_model::{NewWorkspace, Workspace, WorkspaceId};
use wsctx_store::{RemoteError, RemoteWorkspaceService};

#[derive(Debug, Serialize)]
struct SwitchRequest<'a> {
    workspace_id: Option<&'a str>,
}

/// Backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpWorkspaceService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpWorkspaceService {
    /// Build a client from configuration
    ///
    /// # Errors
    /// - `ClientError::InvalidBaseUrl` if `base_url` is not an http(s) URL
    /// - `ClientError::Build` if the underlying client can not be built
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(format!(
                "{}: unsupported scheme {}",
                config.base_url,
                url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/workspaces{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(transport_error)?;
        tracing::trace!(
            status = %response.status(),
            url = %response.url(),
            "workspace api response"
        );
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteWorkspaceService for HttpWorkspaceService {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, RemoteError> {
        let response = self.send(self.client.get(self.url(""))).await?;
        Self::decode(response).await
    }

    async fn current_workspace(&self) -> Result<Option<Workspace>, RemoteError> {
        let response = self.send(self.client.get(self.url("/current"))).await?;
        if matches!(
            response.status(),
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND
        ) {
            return Ok(None);
        }

        let body = check_status(response)
            .await?
            .text()
            .await
            .map_err(transport_error)?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<Workspace>>(&body)
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn switch_workspace(&self, id: Option<&WorkspaceId>) -> Result<(), RemoteError> {
        let body = SwitchRequest {
            workspace_id: id.map(WorkspaceId::as_str),
        };
        let response = self
            .send(self.client.post(self.url("/switch")).json(&body))
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn create_workspace(&self, data: &NewWorkspace) -> Result<Workspace, RemoteError> {
        let response = self.send(self.client.post(self.url("")).json(data)).await?;
        Self::decode(response).await
    }
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_decode() {
        RemoteError::Decode(e.to_string())
    } else {
        RemoteError::Transport(e.to_string())
    }
}

/// Pass successful responses through, turn the rest into `RemoteError`
async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(RemoteError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// `detail` or `message` field of a JSON error body, else the body, else the reason phrase
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["detail", "message", "error"] {
            if let Some(text) = value.get(field).and_then(serde_json::Value::as_str) {
                return text.to_string();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"detail": "name taken"}"#),
            "name taken"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message": "nope"}"#),
            "nope"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "  "), "Bad Gateway");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream"), "upstream");
    }

    #[test]
    fn switch_request_serializes_null_for_personal() {
        let body = serde_json::to_value(SwitchRequest { workspace_id: None }).unwrap();
        assert_eq!(body, serde_json::json!({ "workspace_id": null }));
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            HttpWorkspaceService::new(&ClientConfig::new("not a url")),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpWorkspaceService::new(&ClientConfig::new("ftp://example.com")),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let service =
            HttpWorkspaceService::new(&ClientConfig::new("http://localhost:8000/api/v1/")).unwrap();
        assert_eq!(
            service.url("/current"),
            "http://localhost:8000/api/v1/workspaces/current"
        );
    }
}
