use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::catalog::{FileType, Service};
use crate::config::ConsoleConfig;
use crate::envelope::{Envelope, Success};
use crate::error::{ConsoleError, ConsoleResult};
use crate::preview::{PdfItem, StagedFile};
use crate::session::SessionContext;
use crate::transport::{ApiRequest, HttpReply, Method, MultipartForm, Transport, UreqTransport};
use crate::values::{js_like_value_string, value_ref_string};

/// Characters escaped in a stored file name used as a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Body of `userAccount/pageRedirection`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRedirect {
    pub user_name: String,
    pub token: String,
}

/// Typed access to the CIMS gateway. Every authenticated call is built from a
/// [`SessionContext`]; nothing reads ambient state.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ConsoleConfig>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(config: ConsoleConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn with_ureq(config: ConsoleConfig) -> Self {
        let transport = Arc::new(UreqTransport::new(&config));
        Self::new(config, transport)
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    pub fn service_path(&self, service: Service, rest: &str) -> String {
        self.config.service_path(service, rest)
    }

    fn execute(&self, request: &ApiRequest) -> ConsoleResult<HttpReply> {
        debug!(method = request.method.as_str(), url = %request.url, "request");
        let reply = self.transport.execute(request).map_err(|err| {
            warn!(url = %request.url, error = %err, "request failed");
            err
        })?;
        debug!(url = %request.url, status = reply.status, "response");
        Ok(reply)
    }

    fn authorized(&self, session: &SessionContext, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, self.url(path)).bearer(session.token())
    }

    fn envelope(&self, request: &ApiRequest) -> ConsoleResult<Success> {
        let reply = self.execute(request)?;
        if !reply.is_ok() {
            return Err(status_error(&reply));
        }
        Envelope::parse(&reply.body)?.into_result()
    }

    pub fn get(&self, session: &SessionContext, path: &str) -> ConsoleResult<Success> {
        self.envelope(&self.authorized(session, Method::Get, path))
    }

    pub fn post(&self, session: &SessionContext, path: &str, payload: Value) -> ConsoleResult<Success> {
        self.envelope(&self.authorized(session, Method::Post, path).json(payload))
    }

    pub fn delete(&self, session: &SessionContext, path: &str) -> ConsoleResult<Success> {
        self.envelope(&self.authorized(session, Method::Delete, path))
    }

    /// Uploads `file` and returns the name the server stored it under.
    pub fn upload(
        &self,
        session: &SessionContext,
        file: &StagedFile,
        file_type: FileType,
    ) -> ConsoleResult<String> {
        let form = MultipartForm::new()
            .file("file", &file.name, file.content_type(), &file.bytes)
            .text("fileType", file_type.as_str());
        let path = self.service_path(Service::User, "file/upload");
        let request = self.authorized(session, Method::Post, &path).multipart(form);
        let success = self.envelope(&request)?;
        let stored = value_ref_string(Some(&success.content));
        if stored.trim().is_empty() {
            return Err(ConsoleError::Decode(
                "upload response did not name the stored file".to_string(),
            ));
        }
        Ok(stored)
    }

    /// Fetches a raw `[{byteArray, type, fileName}]` document list.
    pub fn pdf_items(&self, session: &SessionContext, path: &str) -> ConsoleResult<Vec<PdfItem>> {
        let reply = self.execute(&self.authorized(session, Method::Get, path))?;
        if !reply.is_ok() {
            return Err(status_error(&reply));
        }
        let body = reply.body.trim();
        if body.is_empty() || body == "\"\"" {
            return Ok(Vec::new());
        }
        serde_json::from_str(body).map_err(|err| ConsoleError::Decode(err.to_string()))
    }

    pub fn pdf_download_path(&self, id: &str, file_name: &str, file_type: FileType) -> String {
        self.service_path(
            Service::User,
            &format!(
                "file/pdfDownloader/{id}/{}/{}",
                utf8_percent_encode(file_name, PATH_SEGMENT),
                file_type.as_str()
            ),
        )
    }

    /// Direct image URL; images are loaded by the view, not fetched here.
    pub fn image_url(&self, id: &str, file_name: &str, file_type: FileType) -> String {
        self.url(&self.service_path(
            Service::User,
            &format!(
                "file/imgDownloader/{id}/{}/{}",
                utf8_percent_encode(file_name, PATH_SEGMENT),
                file_type.as_str()
            ),
        ))
    }

    /// Exchanges credentials for a bearer token.
    pub fn request_token(&self, user_name: &str, password: &str) -> ConsoleResult<String> {
        let request = ApiRequest::new(Method::Post, self.url("/auth/token")).json(json!({
            "serviceName": "USER",
            "userName": user_name,
            "password": password,
        }));
        let reply = self.execute(&request)?;
        if reply.status != 200 {
            return Err(ConsoleError::InvalidCredentials);
        }
        let token = reply.body.trim().trim_matches('"').to_string();
        if token.is_empty() {
            return Err(ConsoleError::InvalidCredentials);
        }
        Ok(token)
    }

    pub fn page_redirection(&self, session: &SessionContext) -> ConsoleResult<PageRedirect> {
        let path = self.service_path(Service::User, "userAccount/pageRedirection");
        let reply = self.execute(&self.authorized(session, Method::Get, &path))?;
        if !reply.is_ok() {
            return Err(status_error(&reply));
        }
        serde_json::from_str(&reply.body).map_err(|err| ConsoleError::Decode(err.to_string()))
    }
}

/// Error for a non-2xx reply, preferring the `message` the server sent.
fn status_error(reply: &HttpReply) -> ConsoleError {
    let message = serde_json::from_str::<Value>(&reply.body)
        .ok()
        .and_then(|body| body.get("message").map(|value| js_like_value_string(Some(value))))
        .unwrap_or_else(|| reply.body.trim().chars().take(200).collect());
    ConsoleError::Status {
        status: reply.status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_prefer_the_json_message() {
        let err = status_error(&HttpReply {
            status: 500,
            body: r#"{"message":"Internal Server Error"}"#.to_string(),
        });
        assert_eq!(err.to_string(), "Internal Server Error");

        let err = status_error(&HttpReply {
            status: 404,
            body: "Not Found".to_string(),
        });
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn stored_file_names_are_escaped_in_download_urls() {
        let config = ConsoleConfig {
            base_url: "http://cims.test".to_string(),
            ..ConsoleConfig::default()
        };
        let client = ApiClient::with_ureq(config);

        assert_eq!(
            client.image_url("12", "site photo #2.jpg", FileType::Document),
            "http://cims.test/user/file/imgDownloader/12/site%20photo%20%232.jpg/DOCUMENT"
        );
        assert_eq!(
            client.pdf_download_path("12", "1700000000_contract.pdf", FileType::Document),
            "/user/file/pdfDownloader/12/1700000000_contract.pdf/DOCUMENT"
        );
    }
}
