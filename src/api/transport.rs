//! HTTPトランスポート層
//!
//! ディスパッチャーはこのトレイト越しにバックエンドへ送信する。
//! テストではネットワークを使わない実装に差し替える。

use async_trait::async_trait;
use thiserror::Error;

use crate::api::upload::FileHandle;
use crate::config::ServerConfig;

/// 通信レベルのエラー（アプリケーションエラーとは区別する）
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Response body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// デコード前の生レスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// バックエンドへの送信手段
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// `file` フィールド1つだけのmultipartでファイルを送信
    async fn post_file(&self, endpoint: &str, file: &FileHandle)
        -> Result<RawReply, TransportError>;

    /// URLエンコードされたフォームを送信
    async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(&str, &str)],
    ) -> Result<RawReply, TransportError>;

    /// トランスポート名を取得
    fn name(&self) -> &'static str;
}

/// reqwestによるHTTP実装
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// 設定からクライアントを作成
    pub fn new(config: &ServerConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn read_reply(response: reqwest::Response) -> Result<RawReply, TransportError> {
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(
            status = status,
            response_size_bytes = body.len(),
            "📨 API response received"
        );

        Ok(RawReply { status, body })
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn post_file(
        &self,
        endpoint: &str,
        file: &FileHandle,
    ) -> Result<RawReply, TransportError> {
        let url = self.url_for(endpoint);
        let part = reqwest::multipart::Part::bytes(file.bytes().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::debug!(url = %url, file = file.file_name(), "📡 Uploading file");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("❌ Failed to reach {}: {}", url, e);
                e
            })?;

        Self::read_reply(response).await
    }

    async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(&str, &str)],
    ) -> Result<RawReply, TransportError> {
        let url = self.url_for(endpoint);
        tracing::debug!(url = %url, "📡 Posting form");

        let response = self
            .client
            .post(&url)
            .form(fields)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("❌ Failed to reach {}: {}", url, e);
                e
            })?;

        Self::read_reply(response).await
    }

    fn name(&self) -> &'static str {
        "HTTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_reply_success_range() {
        assert!(RawReply::new(200, "{}").is_success());
        assert!(RawReply::new(204, "").is_success());
        assert!(!RawReply::new(400, "{}").is_success());
        assert!(!RawReply::new(500, "").is_success());
    }

    #[test]
    fn test_http_transport_trims_trailing_slash() {
        let config = ServerConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ServerConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8000");
        assert_eq!(
            transport.url_for("/upload-feedback"),
            "http://localhost:8000/upload-feedback"
        );
        assert_eq!(transport.name(), "HTTP");
    }
}
