use std::time::Duration;

use forward_core::{JobStatus, MailboxRef};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use run_logging::run_trace;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{
    ApiError, ApiFailureKind, ComplianceApi, Credentials, Session, SessionService, StatusReport,
};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl HttpSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// JSON-over-HTTP binding of the platform's session and compliance APIs.
#[derive(Debug, Clone)]
pub struct HttpPlatform {
    base: Url,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ConnectBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ConnectResponse {
    session_id: String,
    access_token: String,
}

#[derive(Serialize)]
struct CreateSearchBody<'a> {
    scope: &'a str,
    query: &'a str,
}

#[derive(Serialize)]
struct TargetBody<'a> {
    mailbox: &'a str,
    folder: &'a str,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
    #[serde(default)]
    item_count: Option<u64>,
    #[serde(default)]
    total_bytes: Option<u64>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct ItemsResponse {
    items: Vec<String>,
}

impl HttpPlatform {
    pub fn new(settings: HttpSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.endpoint).map_err(|err| {
            ApiError::new(
                ApiFailureKind::InvalidResponse,
                format!("invalid endpoint {}: {}", settings.endpoint, err),
            )
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                ApiFailureKind::InvalidResponse,
                format!("endpoint {} cannot carry a path", settings.endpoint),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(ApiFailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    /// Appends percent-encoded path segments to the endpoint.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        run_trace!("{} {}", status.as_u16(), response.url());
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let kind = if status == StatusCode::UNAUTHORIZED {
            ApiFailureKind::Unauthorized
        } else {
            ApiFailureKind::HttpStatus(status.as_u16())
        };
        Err(ApiError::new(kind, body.trim().to_string()))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| ApiError::new(ApiFailureKind::InvalidResponse, err.to_string()))
    }

    async fn status_at(&self, session: &Session, url: Url) -> Result<StatusReport, ApiError> {
        let body: StatusBody = self
            .send_json(self.client.get(url).bearer_auth(&session.access_token))
            .await?;
        Ok(StatusReport {
            status: parse_status(&body.status)?,
            item_count: body.item_count,
            total_bytes: body.total_bytes,
            detail: body.detail,
        })
    }
}

#[async_trait::async_trait]
impl SessionService for HttpPlatform {
    async fn connect(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let body = ConnectBody {
            username: &credentials.username,
            password: &credentials.password,
        };
        let response: ConnectResponse = self
            .send_json(self.client.post(self.url(&["sessions"])).json(&body))
            .await?;
        Ok(Session {
            id: response.session_id,
            access_token: response.access_token,
        })
    }

    async fn disconnect(&self, session: &Session) -> Result<(), ApiError> {
        self.send(
            self.client
                .delete(self.url(&["sessions", &session.id]))
                .bearer_auth(&session.access_token),
        )
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ComplianceApi for HttpPlatform {
    async fn create_job(
        &self,
        session: &Session,
        scope: &str,
        query: &str,
    ) -> Result<String, ApiError> {
        let response: IdResponse = self
            .send_json(
                self.client
                    .post(self.url(&["searches"]))
                    .bearer_auth(&session.access_token)
                    .json(&CreateSearchBody { scope, query }),
            )
            .await?;
        Ok(response.id)
    }

    async fn start(&self, session: &Session, job_id: &str) -> Result<(), ApiError> {
        self.send(
            self.client
                .post(self.url(&["searches", job_id, "start"]))
                .bearer_auth(&session.access_token),
        )
        .await?;
        Ok(())
    }

    async fn get_status(&self, session: &Session, job_id: &str) -> Result<StatusReport, ApiError> {
        self.status_at(session, self.url(&["searches", job_id])).await
    }

    async fn create_export_action(
        &self,
        session: &Session,
        job_id: &str,
        target: &MailboxRef,
    ) -> Result<String, ApiError> {
        let response: IdResponse = self
            .send_json(
                self.client
                    .post(self.url(&["searches", job_id, "exports"]))
                    .bearer_auth(&session.access_token)
                    .json(&TargetBody {
                        mailbox: &target.address,
                        folder: &target.folder,
                    }),
            )
            .await?;
        Ok(response.id)
    }

    async fn get_action_status(
        &self,
        session: &Session,
        action_id: &str,
    ) -> Result<StatusReport, ApiError> {
        self.status_at(session, self.url(&["exports", action_id])).await
    }

    async fn list_result_item_ids(
        &self,
        session: &Session,
        job_id: &str,
    ) -> Result<Vec<String>, ApiError> {
        let response: ItemsResponse = self
            .send_json(
                self.client
                    .get(self.url(&["searches", job_id, "items"]))
                    .bearer_auth(&session.access_token),
            )
            .await?;
        Ok(response.items)
    }

    async fn forward_item(
        &self,
        session: &Session,
        source_scope: &str,
        item_id: &str,
        target: &MailboxRef,
    ) -> Result<(), ApiError> {
        self.send(
            self.client
                .post(self.url(&["mailboxes", source_scope, "items", item_id, "forward"]))
                .bearer_auth(&session.access_token)
                .json(&TargetBody {
                    mailbox: &target.address,
                    folder: &target.folder,
                }),
        )
        .await?;
        Ok(())
    }
}

fn parse_status(raw: &str) -> Result<JobStatus, ApiError> {
    let normalized: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "notstarted" | "starting" | "queued" => Ok(JobStatus::NotStarted),
        "running" | "inprogress" => Ok(JobStatus::Running),
        "completed" | "succeeded" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        _ => Err(ApiError::new(
            ApiFailureKind::InvalidResponse,
            format!("unknown job status {raw:?}"),
        )),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiFailureKind::Timeout, err.to_string());
    }
    ApiError::new(ApiFailureKind::Network, err.to_string())
}
