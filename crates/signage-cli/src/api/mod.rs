//! API client for the signage REST API

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use signage_core::{
    Account, Applet, AppletFileStore, AppletVersion, AppletVersionRef, AppletVersionStore,
    AuthTokens, CustomScript, Device, DevicePowerAction, FirmwareVersion, Organization, Plugin,
    ProgressReporter, RemoteFile, Result, Settings, SignageError, UploadFile,
};
use std::future::Future;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Header carrying the MD5 digest of an uploaded file
pub const CONTENT_HASH_HEADER: &str = "X-Content-Hash";

pub struct Client {
    http: ReqwestClient,
    base_url: String,
    token: Option<String>,
}

impl Client {
    /// Create a client from the stored settings
    pub fn new() -> anyhow::Result<Self> {
        let settings = crate::config::SettingsManager::load()?;
        Ok(Self::from_settings(&settings))
    }

    /// Create client from settings explicitly
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            http: ReqwestClient::new(),
            base_url: settings.server_url.trim_end_matches('/').to_string(),
            token: settings.access_token.clone(),
        }
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Client for commands that need a logged-in user
    pub fn authenticated() -> anyhow::Result<Self> {
        let client = Self::new()?;
        if client.token.is_none() {
            anyhow::bail!("Not logged in. Run `signage login` first");
        }
        Ok(client)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SignageError::Config(format!("Invalid server URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| SignageError::Config(format!("Invalid server URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments.iter().flat_map(|segment| segment.split('/')));
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| SignageError::Http(e.to_string()))?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = Self::send(self.request(Method::GET, segments)?.query(query)).await?;
        response
            .json()
            .await
            .map_err(|e| SignageError::Http(format!("Failed to parse response: {}", e)))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: serde_json::Value,
    ) -> Result<T> {
        let response = Self::send(self.request(method, segments)?.json(&body)).await?;
        response
            .json()
            .await
            .map_err(|e| SignageError::Http(format!("Failed to parse response: {}", e)))
    }

    async fn send_empty(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
        query: &[(&str, &str)],
    ) -> Result<()> {
        let mut builder = self.request(method, segments)?.query(query);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        Self::send(builder).await.map(|_| ())
    }

    /// Stream a file to `segments` with byte progress
    async fn upload_stream(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        file: &UploadFile,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        let handle = tokio::fs::File::open(&file.absolute_path)
            .await
            .map_err(|source| SignageError::FileRead {
                path: file.absolute_path.display().to_string(),
                source,
            })?;

        // The request body must be 'static, so chunk sizes travel over a
        // channel to the borrowed reporter.
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<u64>();
        let stream = ReaderStream::new(handle).inspect_ok(move |chunk| {
            let _ = tx.send(chunk.len() as u64);
        });

        let request = self
            .request(Method::PUT, segments)?
            .query(query)
            .header(CONTENT_TYPE, file.mime_type.as_str())
            .header(CONTENT_LENGTH, file.size)
            .header(CONTENT_HASH_HEADER, file.content_hash.as_str())
            .body(reqwest::Body::wrap_stream(stream));

        forward_progress(Self::send(request), rx, progress, &file.relative_path)
            .await
            .map(|_| ())
    }

    // =============== Account ===============

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let result = self
            .send_json(
                Method::POST,
                &["auth", "token"],
                serde_json::json!({
                    "email": email,
                    "password": password,
                }),
            )
            .await;

        match result {
            Err(SignageError::Api { status: 401, .. }) | Err(SignageError::Api { status: 403, .. }) => Err(
                SignageError::Api {
                    status: 401,
                    message: "Invalid email or password".to_string(),
                },
            ),
            other => other,
        }
    }

    pub async fn get_account(&self) -> Result<Account> {
        self.get_json(&["account"], &[]).await
    }

    // =============== Organizations ===============

    pub async fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.get_json(&["organization"], &[]).await
    }

    pub async fn get_organization(&self, uid: &str) -> Result<Organization> {
        self.get_json(&["organization", uid], &[]).await
    }

    // =============== Devices ===============

    pub async fn list_devices(&self, organization_uid: Option<&str>) -> Result<Vec<Device>> {
        let query: Vec<(&str, &str)> = organization_uid
            .map(|uid| vec![("organizationUid", uid)])
            .unwrap_or_default();
        self.get_json(&["device"], &query).await
    }

    pub async fn get_device(&self, uid: &str) -> Result<Device> {
        self.get_json(&["device", uid], &[]).await
    }

    pub async fn device_power_action(&self, uid: &str, action: DevicePowerAction) -> Result<()> {
        self.send_empty(
            Method::POST,
            &["device", uid, "power-action"],
            Some(serde_json::json!({ "devicePowerAction": action })),
            &[],
        )
        .await
    }

    // =============== Applets ===============

    pub async fn list_applets(&self, organization_uid: Option<&str>) -> Result<Vec<Applet>> {
        let query: Vec<(&str, &str)> = organization_uid
            .map(|uid| vec![("organizationUid", uid)])
            .unwrap_or_default();
        self.get_json(&["applet"], &query).await
    }

    pub async fn create_applet(&self, name: &str, organization_uid: Option<&str>) -> Result<Applet> {
        self.send_json(
            Method::POST,
            &["applet"],
            serde_json::json!({
                "name": name,
                "organizationUid": organization_uid,
            }),
        )
        .await
    }

    pub async fn list_applet_versions(&self, applet_uid: &str) -> Result<Vec<AppletVersion>> {
        self.get_json(&["applet", applet_uid, "version"], &[]).await
    }

    pub async fn create_applet_version(
        &self,
        version: &AppletVersionRef,
        entry_file: &str,
    ) -> Result<AppletVersion> {
        self.send_json(
            Method::POST,
            &["applet", version.applet_uid.as_str(), "version"],
            serde_json::json!({
                "version": version.version,
                "entryFile": entry_file,
            }),
        )
        .await
    }

    // =============== Firmware ===============

    pub async fn create_firmware_version(
        &self,
        application_type: &str,
        version: &str,
    ) -> Result<FirmwareVersion> {
        self.send_json(
            Method::POST,
            &["firmware", "version"],
            serde_json::json!({
                "applicationType": application_type,
                "version": version,
            }),
        )
        .await
    }

    pub async fn upload_firmware_file(
        &self,
        application_type: &str,
        version: &str,
        file: &UploadFile,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        self.upload_stream(
            &[
                "firmware",
                "version",
                application_type,
                version,
                "file",
                file.relative_path.as_str(),
            ],
            &[],
            file,
            progress,
        )
        .await
    }

    // =============== Plugins & Custom Scripts ===============

    pub async fn list_plugins(&self) -> Result<Vec<Plugin>> {
        self.get_json(&["plugin"], &[]).await
    }

    pub async fn list_custom_scripts(&self) -> Result<Vec<CustomScript>> {
        self.get_json(&["custom-script"], &[]).await
    }
}

fn build_query(build: bool) -> [(&'static str, &'static str); 1] {
    [("build", if build { "true" } else { "false" })]
}

#[async_trait]
impl AppletFileStore for Client {
    async fn list(&self, version: &AppletVersionRef) -> Result<Vec<RemoteFile>> {
        self.get_json(
            &["applet", version.applet_uid.as_str(), "version", version.version.as_str(), "file"],
            &[],
        )
        .await
    }

    async fn put(
        &self,
        version: &AppletVersionRef,
        file: &UploadFile,
        progress: &dyn ProgressReporter,
        build: bool,
    ) -> Result<()> {
        self.upload_stream(
            &[
                "applet",
                version.applet_uid.as_str(),
                "version",
                version.version.as_str(),
                "file",
                file.relative_path.as_str(),
            ],
            &build_query(build),
            file,
            progress,
        )
        .await
    }

    async fn remove(
        &self,
        version: &AppletVersionRef,
        relative_path: &str,
        build: bool,
    ) -> Result<()> {
        self.send_empty(
            Method::DELETE,
            &[
                "applet",
                version.applet_uid.as_str(),
                "version",
                version.version.as_str(),
                "file",
                relative_path,
            ],
            None,
            &build_query(build),
        )
        .await
    }
}

#[async_trait]
impl AppletVersionStore for Client {
    async fn get(&self, version: &AppletVersionRef) -> Result<AppletVersion> {
        self.get_json(
            &["applet", version.applet_uid.as_str(), "version", version.version.as_str()],
            &[],
        )
        .await
    }

    async fn update_entry_file(&self, version: &AppletVersionRef, entry_file: &str) -> Result<()> {
        self.send_empty(
            Method::PUT,
            &["applet", version.applet_uid.as_str(), "version", version.version.as_str()],
            Some(serde_json::json!({ "entryFile": entry_file })),
            &[],
        )
        .await
    }
}

/// Drive `request` while relaying chunk sizes from `rx` to `progress`.
///
/// Returns as soon as the request resolves, even if the server answered
/// without consuming the body and the sender is still alive.
async fn forward_progress<F: Future>(
    request: F,
    mut rx: UnboundedReceiver<u64>,
    progress: &dyn ProgressReporter,
    name: &str,
) -> F::Output {
    tokio::pin!(request);
    loop {
        tokio::select! {
            output = &mut request => {
                while let Ok(bytes) = rx.try_recv() {
                    progress.update(bytes, Some(name));
                }
                return output;
            }
            Some(bytes) = rx.recv() => progress.update(bytes, Some(name)),
        }
    }
}

/// Map HTTP failures onto the core error kinds; 404 stays distinguishable
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = api_error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SignageError::NotFound(message));
    }
    Err(SignageError::Api {
        status: status.as_u16(),
        message,
    })
}

fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["message"]
        .as_str()
        .or_else(|| value["error"].as_str())
        .map(str::to_string)
}
