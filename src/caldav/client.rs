//! HTTP client for CalDAV operations.
//!
//! Thin wrapper over reqwest that knows the WebDAV verbs (PROPFIND, REPORT,
//! MKCALENDAR) next to plain GET/PUT/DELETE, applies basic auth and the
//! configured per-request timeout, and maps response statuses onto the
//! engine's error kinds.

use reqwest::{Method, Response, StatusCode};
use std::time::Duration;
use tracing::trace;

use farmhouse_core::{SyncError, SyncResult};

use crate::config::SyncConfig;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

pub struct DavClient {
    http: reqwest::Client,
    username: String,
    password: String,
}

impl DavClient {
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| SyncError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(DavClient {
            http,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// PROPFIND: property discovery on a URL.
    pub async fn propfind(&self, url: &str, body: &str, depth: u8) -> SyncResult<String> {
        let response = self
            .send(dav_method("PROPFIND"), url, Some(body), Some(depth))
            .await?;
        read_success_body(response).await
    }

    /// REPORT: calendar-query against a collection.
    pub async fn report(&self, url: &str, body: &str) -> SyncResult<String> {
        let response = self
            .send(dav_method("REPORT"), url, Some(body), Some(1))
            .await?;
        read_success_body(response).await
    }

    /// MKCALENDAR: create a calendar collection.
    pub async fn mkcalendar(&self, url: &str, body: &str) -> SyncResult<()> {
        let response = self
            .send(dav_method("MKCALENDAR"), url, Some(body), None)
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status, response).await)
        }
    }

    /// GET a single resource. `None` when the resource does not exist.
    pub async fn get(&self, url: &str) -> SyncResult<Option<String>> {
        let response = self.send(Method::GET, url, None, None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_success_body(response).await.map(Some)
    }

    /// PUT a calendar object, creating or overwriting it.
    pub async fn put(&self, url: &str, body: &str) -> SyncResult<()> {
        let request = self
            .http
            .request(Method::PUT, url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", CALENDAR_CONTENT_TYPE)
            .body(body.to_string());

        trace!(url, "PUT");
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status, response).await)
        }
    }

    /// DELETE a resource. A 404 is success: the object is already gone.
    pub async fn delete(&self, url: &str) -> SyncResult<()> {
        let response = self.send(Method::DELETE, url, None, None).await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(status_error(status, response).await)
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        depth: Option<u8>,
    ) -> SyncResult<Response> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .basic_auth(&self.username, Some(&self.password));

        if let Some(d) = depth {
            request = request.header("Depth", d.to_string());
        }
        if let Some(b) = body {
            request = request
                .header("Content-Type", XML_CONTENT_TYPE)
                .body(b.to_string());
        }

        trace!(%method, url, "sending request");
        request.send().await.map_err(transport_error)
    }
}

fn dav_method(name: &str) -> Method {
    // The verb names are static and valid; from_bytes cannot fail on them.
    Method::from_bytes(name.as_bytes()).unwrap_or(Method::GET)
}

async fn read_success_body(response: Response) -> SyncResult<String> {
    let status = response.status();
    if status.is_success() {
        response
            .text()
            .await
            .map_err(|e| SyncError::Transient(format!("failed to read response body: {e}")))
    } else {
        Err(status_error(status, response).await)
    }
}

/// Map a transport-level failure onto the engine's error kinds.
fn transport_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Transient(format!("request timed out: {err}"))
    } else if err.is_connect() {
        SyncError::Connection(format!("could not reach server: {err}"))
    } else {
        SyncError::Transient(err.to_string())
    }
}

/// Map a non-success HTTP status onto the engine's error kinds.
async fn status_error(status: StatusCode, response: Response) -> SyncError {
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SyncError::Connection(format!("authentication rejected ({status})"))
        }
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            SyncError::Transient(format!("server error ({s}): {body}"))
        }
        s => SyncError::Transient(format!("unexpected status {s}: {body}")),
    }
}
