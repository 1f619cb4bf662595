//! Cliniko HTTP client
//!
//! API requests carry Basic authentication (the API key as user name, empty
//! password), `Accept`/`Content-Type: application/json` and the configured
//! User-Agent. Storage uploads go through a second client without API
//! credentials, built on the first upload and reused afterwards.

use super::api::AttachmentApi;
use super::models::{parse_upload_key, AttachmentRegistration, PresignedUploadTarget};
use crate::config::{ClinikoConfig, SecretString, UploadConfig};
use crate::domain::{ClinikoError, PatientId, Result, UploaderError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Cliniko API client
pub struct ClinikoClient {
    /// API host without trailing slash
    base_url: String,

    /// Client carrying the API headers
    client: Client,

    /// Storage upload client, created on first use
    upload_client: OnceCell<Client>,

    user_agent: String,
    timeout: Duration,
    tls_verify: bool,
    content_type: String,
}

impl ClinikoClient {
    /// Create a client from configuration and a resolved API key
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the key or User-Agent cannot be
    /// sent as a header value, or the HTTP client cannot be built.
    pub fn new(config: &ClinikoConfig, api_key: &SecretString, upload: &UploadConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Self::client_builder(timeout, config.tls_verify)
            .default_headers(api_headers(api_key, &config.user_agent)?)
            .build()
            .map_err(|e| UploaderError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            client,
            upload_client: OnceCell::new(),
            user_agent: config.user_agent.clone(),
            timeout,
            tls_verify: config.tls_verify,
            content_type: upload.content_type.clone(),
        })
    }

    fn client_builder(timeout: Duration, tls_verify: bool) -> ClientBuilder {
        let mut builder = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30));

        if !tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
    }

    async fn upload_client(&self) -> Result<&Client> {
        self.upload_client
            .get_or_try_init(|| async {
                tracing::debug!("Creating storage upload client");
                Self::client_builder(self.timeout, self.tls_verify)
                    .user_agent(self.user_agent.clone())
                    .build()
                    .map_err(|e| {
                        UploaderError::Configuration(format!(
                            "Failed to build upload HTTP client: {e}"
                        ))
                    })
            })
            .await
    }

    /// Whether the storage upload client has been created yet
    pub fn upload_client_initialized(&self) -> bool {
        self.upload_client.initialized()
    }
}

/// Builds the fixed API headers
fn api_headers(api_key: &SecretString, user_agent: &str) -> Result<HeaderMap> {
    let credentials = format!("{}:", api_key.expose_secret().as_ref());
    let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());

    let mut auth = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|_| {
        UploaderError::Configuration("API key cannot be used in an Authorization header".to_string())
    })?;
    auth.set_sensitive(true);

    let agent = HeaderValue::from_str(user_agent).map_err(|_| {
        UploaderError::Configuration(format!(
            "cliniko.user_agent is not a valid header value: {user_agent}"
        ))
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, agent);
    Ok(headers)
}

fn connection_failed(target: &str, err: reqwest::Error) -> UploaderError {
    UploaderError::Cliniko(ClinikoError::ConnectionFailed(format!("{target}: {err}")))
}

#[async_trait]
impl AttachmentApi for ClinikoClient {
    async fn presigned_post(&self, patient_id: &PatientId) -> Result<PresignedUploadTarget> {
        let url = format!(
            "{}/v1/patients/{}/attachment_presigned_post",
            self.base_url, patient_id
        );

        tracing::debug!(url = %url, patient_id = %patient_id, "Requesting presigned upload target");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| connection_failed(&url, e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| connection_failed(&url, e))?;

        if !status.is_success() {
            return Err(ClinikoError::from_status(
                status.as_u16(),
                format!("presigned post request failed: {body}"),
            )
            .into());
        }

        serde_json::from_str::<PresignedUploadTarget>(&body).map_err(|e| {
            ClinikoError::InvalidResponse(format!("presigned post body: {e}")).into()
        })
    }

    async fn upload(
        &self,
        target: &PresignedUploadTarget,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let client = self.upload_client().await?;

        let mut form = Form::new();
        for (name, value) in target.form_fields() {
            form = form.text(name.to_string(), value);
        }
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(&self.content_type)
            .map_err(|e| {
                UploaderError::Configuration(format!(
                    "Invalid upload content type {}: {e}",
                    self.content_type
                ))
            })?;
        // Storage ignores fields after the file part, so it goes last
        form = form.part("file", part);

        tracing::debug!(url = %target.url, file = %file_name, "Uploading to storage");

        let resp = client
            .post(&target.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| connection_failed(&target.url, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| connection_failed(&target.url, e))?;

        if !status.is_success() {
            return Err(ClinikoError::from_status(
                status.as_u16(),
                format!("storage upload failed: {body}"),
            )
            .into());
        }

        Ok(parse_upload_key(&body)?)
    }

    async fn register_attachment(&self, patient_id: &PatientId, upload_url: &str) -> Result<()> {
        let url = format!("{}/v1/patient_attachments", self.base_url);
        let registration = AttachmentRegistration {
            patient_id: patient_id.to_json(),
            upload_url: upload_url.to_string(),
        };

        let resp = self
            .client
            .post(&url)
            .json(&registration)
            .send()
            .await
            .map_err(|e| connection_failed(&url, e))?;

        let status = resp.status();
        if status == StatusCode::CREATED {
            return Ok(());
        }

        let body = body_or_placeholder(resp.text().await);
        Err(ClinikoError::RegistrationRejected {
            status: status.as_u16(),
            body,
        }
        .into())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Response body for error reporting, or a note on why it could not be read
fn body_or_placeholder<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
    body.unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use mockito::Matcher;

    fn client_for(server_url: &str) -> ClinikoClient {
        let config = ClinikoConfig {
            api_host: server_url.to_string(),
            user_agent: "Test Suite (tests@example.com)".to_string(),
            ..Default::default()
        };
        ClinikoClient::new(
            &config,
            &secret_string("test-key".to_string()),
            &UploadConfig::default(),
        )
        .unwrap()
    }

    fn patient(id: &str) -> PatientId {
        PatientId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_presigned_post_sends_api_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/patients/7/attachment_presigned_post")
            .match_header("authorization", "Basic dGVzdC1rZXk6")
            .match_header("accept", "application/json")
            .match_header("content-type", "application/json")
            .match_header("user-agent", "Test Suite (tests@example.com)")
            .with_status(200)
            .with_body(r#"{"url":"https://x/y","fields":{"k":"v"}}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let target = client.presigned_post(&patient("7")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(target.url, "https://x/y");
        assert_eq!(target.fields.get("k"), Some(&serde_json::json!("v")));
    }

    #[tokio::test]
    async fn test_presigned_post_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/patients/7/attachment_presigned_post")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .presigned_post(&patient("7"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploaderError::Cliniko(ClinikoError::ClientError { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_presigned_post_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/patients/7/attachment_presigned_post")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .presigned_post(&patient("7"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploaderError::Cliniko(ClinikoError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_sends_fields_and_pdf_part() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bucket")
            .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="k"\r\n\r\nv\r\n"#.to_string()),
                Matcher::Regex(r#"name="success_action_status"\r\n\r\n201\r\n"#.to_string()),
                Matcher::Regex(r#"(?s)name="k".*name="success_action_status".*name="file""#.to_string()),
                Matcher::Regex(r#"name="file"; filename="a.pdf""#.to_string()),
                Matcher::Regex("Content-Type: application/pdf".to_string()),
                Matcher::Regex("%PDF-1.4 invoice a".to_string()),
            ]))
            .with_status(201)
            .with_body("<PostResponse><Key>abc123</Key></PostResponse>")
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(!client.upload_client_initialized());

        let mut fields = serde_json::Map::new();
        fields.insert("k".to_string(), serde_json::json!("v"));
        fields.insert("success_action_status".to_string(), serde_json::json!(201));
        let target = PresignedUploadTarget {
            url: format!("{}/bucket", server.url()),
            fields,
        };

        let key = client
            .upload(&target, "a.pdf", b"%PDF-1.4 invoice a".to_vec())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(key, "abc123");
        assert!(client.upload_client_initialized());
    }

    #[tokio::test]
    async fn test_upload_without_key_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bucket")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let target = PresignedUploadTarget {
            url: format!("{}/bucket", server.url()),
            fields: Default::default(),
        };

        let err = client.upload(&target, "a.pdf", vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(
            err,
            UploaderError::Cliniko(ClinikoError::MalformedUploadResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_storage_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bucket")
            .with_status(403)
            .with_body("<Error><Code>AccessDenied</Code></Error>")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let target = PresignedUploadTarget {
            url: format!("{}/bucket", server.url()),
            fields: Default::default(),
        };

        let err = client.upload(&target, "a.pdf", vec![1]).await.unwrap_err();
        assert!(matches!(
            err,
            UploaderError::Cliniko(ClinikoError::ClientError { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_register_attachment_created() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/patient_attachments")
            .match_header("authorization", "Basic dGVzdC1rZXk6")
            .match_body(Matcher::Json(serde_json::json!({
                "patient_id": 7,
                "upload_url": "https://x/y/abc123"
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        client_for(&server.url())
            .register_attachment(&patient("7"), "https://x/y/abc123")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_register_attachment_rejected_keeps_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/patient_attachments")
            .with_status(200)
            .with_body("not created")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .register_attachment(&patient("7"), "https://x/y/abc123")
            .await
            .unwrap_err();

        match err {
            UploaderError::Cliniko(ClinikoError::RegistrationRejected { status, body }) => {
                assert_eq!(status, 200);
                assert_eq!(body, "not created");
            }
            other => panic!("Expected RegistrationRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_body_or_placeholder() {
        assert_eq!(body_or_placeholder::<String>(Ok("rejected".into())), "rejected");
        assert_eq!(
            body_or_placeholder::<String>(Err("connection reset".into())),
            "<unreadable body: connection reset>"
        );
    }

    #[tokio::test]
    async fn test_connection_failure() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = client_for("http://127.0.0.1:9");
        let err = client.presigned_post(&patient("7")).await.unwrap_err();
        assert!(matches!(
            err,
            UploaderError::Cliniko(ClinikoError::ConnectionFailed(_))
        ));
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let config = ClinikoConfig {
            user_agent: "bad\nagent".to_string(),
            ..Default::default()
        };
        let result = ClinikoClient::new(
            &config,
            &secret_string("k".to_string()),
            &UploadConfig::default(),
        );
        assert!(matches!(result, Err(UploaderError::Configuration(_))));
    }
}
