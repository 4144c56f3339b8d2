//! Request/response collaborators of the chat client and their HTTP
//! implementation.

use futures::StreamExt as _;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::content::{ChatMessage, OneShotReply, StreamSetup};
use crate::errors::ClientError;
use crate::sse::{ByteStream, FrameStream, frame_stream};

/// Backend calls the chat input depends on.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Asks the backend to process `message` as a push stream.
    async fn start_stream(&self, message: &str) -> Result<StreamSetup, ClientError>;

    /// One-shot chat call, used when streaming is unavailable.
    async fn chat(&self, message: &str) -> Result<OneShotReply, ClientError>;

    /// Opens the push stream announced by [`Backend::start_stream`].
    async fn open_events(&self, stream_url: &str) -> Result<FrameStream, ClientError>;
}

#[derive(serde::Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct HistoryBody {
    #[serde(default)]
    history: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP implementation against the assistant web backend.
pub struct HttpBackend {
    client: reqwest::Client,
    base: reqwest::Url,
    request_timeout: std::time::Duration,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = reqwest::Url::parse(&base)
            .map_err(|e| ClientError::Config(format!("invalid base_url {base}: {e}")))?;
        // No client-wide timeout: it would cut long-lived push streams.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base,
            request_timeout: config.request_timeout,
        })
    }

    /// Loads the server-side conversation history.
    pub async fn history(&self) -> Result<Vec<ChatMessage>, ClientError> {
        let url = self.url("api/history")?;
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("history request failed: {e}")))?;
        let body: HistoryBody = decode(response).await?;
        Ok(body.history)
    }

    /// Clears the server-side conversation history and context.
    pub async fn clear_history(&self) -> Result<(), ClientError> {
        let url = self.url("api/clear")?;
        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("clear request failed: {e}")))?;
        let body: StatusBody = decode(response).await?;
        if body.status != "success" {
            return Err(ClientError::decode(format!(
                "clear history returned status {:?}: {}",
                body.status,
                body.message.unwrap_or_default()
            )));
        }
        Ok(())
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::Config(format!("invalid url {path}: {e}")))
    }

    async fn post_message<T: DeserializeOwned>(
        &self,
        path: &str,
        message: &str,
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .json(&MessageBody { message })
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("POST {path} failed: {e}")))?;
        decode(response).await
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn start_stream(&self, message: &str) -> Result<StreamSetup, ClientError> {
        debug!("requesting stream setup");
        self.post_message("api/stream", message).await
    }

    async fn chat(&self, message: &str) -> Result<OneShotReply, ClientError> {
        debug!("sending one-shot chat request");
        self.post_message("api/chat", message).await
    }

    async fn open_events(&self, stream_url: &str) -> Result<FrameStream, ClientError> {
        let url = self.url(stream_url)?;
        debug!(%url, "opening event stream");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("event stream request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }
        let bytes: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| ClientError::transport(format!("event stream read failed: {e}")))),
        );
        Ok(frame_stream(bytes))
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ClientError::Http {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::decode(format!("unexpected response body: {e}")))
}
