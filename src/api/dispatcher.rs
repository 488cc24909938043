//! リクエストディスパッチャー
//!
//! ファイルをmultipartに詰めてワークフローに対応するエンドポイントへ送り、
//! 応答を「成功」「アプリケーションエラー」「通信エラー」に分類する。
//! 描画状態には一切触れない。

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::models::{
    error_marker, Prediction, SentimentSummary, SummaryPayload, TrainAck, WorkflowOutcome,
};
use crate::api::transport::{HttpTransport, RawReply, TransportError, UploadTransport};
use crate::api::upload::FileHandle;
use crate::api::workflow::WorkflowKind;
use crate::config::ServerConfig;

/// 単一フィードバック判定のエンドポイント
pub const PREDICT_ENDPOINT: &str = "/predict-feedback";

/// ディスパッチ失敗の分類
#[derive(Error, Debug)]
pub enum DispatchError {
    /// 入力不足（ファイル未選択など）。リクエスト前に中断
    #[error("{0}")]
    UserInput(String),

    /// サーバーが `error` フィールドで返した論理エラー（文言はそのまま）
    #[error("{0}")]
    Application(String),

    /// 通信・デコードの失敗
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl DispatchError {
    /// ログ出力用の分類名
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::UserInput(_) => "user_input",
            DispatchError::Application(_) => "application",
            DispatchError::Transport(_) => "transport",
        }
    }
}

/// バックエンド呼び出しの窓口
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn UploadTransport>,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn UploadTransport>) -> Self {
        Self { transport }
    }

    /// reqwestトランスポートでディスパッチャーを作成
    pub fn http(config: &ServerConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config)?;
        info!(
            "🌐 Dispatcher ready: {} ({})",
            transport.base_url(),
            transport.name()
        );
        Ok(Self::new(Arc::new(transport)))
    }

    /// ワークフローを実行
    pub async fn submit(
        &self,
        workflow: WorkflowKind,
        file: Option<&FileHandle>,
    ) -> Result<WorkflowOutcome, DispatchError> {
        let file = file.ok_or_else(|| {
            warn!(workflow = %workflow, "⚠️ No file selected, request aborted");
            DispatchError::UserInput(workflow.missing_file_prompt().to_string())
        })?;

        if !file.has_csv_extension() {
            warn!(
                workflow = %workflow,
                file = file.file_name(),
                "⚠️ Uploading a file without .csv extension"
            );
        }

        info!(
            workflow = %workflow,
            endpoint = workflow.endpoint(),
            file = file.file_name(),
            size_bytes = file.len(),
            "📤 Submitting workflow"
        );

        let reply = self
            .transport
            .post_file(workflow.endpoint(), file)
            .await
            .map_err(|e| log_failure(workflow, e.into()))?;

        let body = classify(&reply).map_err(|e| log_failure(workflow, e))?;

        let outcome = match workflow {
            WorkflowKind::BulkAnalyze | WorkflowKind::Test => {
                decode_summary(body).map(WorkflowOutcome::Summary)
            }
            WorkflowKind::Train => serde_json::from_value::<TrainAck>(body)
                .map(WorkflowOutcome::Trained)
                .map_err(|e| DispatchError::from(TransportError::Decode(e))),
        }
        .map_err(|e| log_failure(workflow, e))?;

        debug!(workflow = %workflow, "✅ Workflow response decoded");
        Ok(outcome)
    }

    /// 一括分析
    pub async fn analyze(&self, file: Option<&FileHandle>) -> Result<SentimentSummary, DispatchError> {
        match self.submit(WorkflowKind::BulkAnalyze, file).await? {
            WorkflowOutcome::Summary(summary) => Ok(summary),
            WorkflowOutcome::Trained(_) => Err(unexpected_outcome(WorkflowKind::BulkAnalyze)),
        }
    }

    /// モデル学習
    pub async fn train(&self, file: Option<&FileHandle>) -> Result<TrainAck, DispatchError> {
        match self.submit(WorkflowKind::Train, file).await? {
            WorkflowOutcome::Trained(ack) => Ok(ack),
            WorkflowOutcome::Summary(_) => Err(unexpected_outcome(WorkflowKind::Train)),
        }
    }

    /// モデル評価
    pub async fn test(&self, file: Option<&FileHandle>) -> Result<SentimentSummary, DispatchError> {
        match self.submit(WorkflowKind::Test, file).await? {
            WorkflowOutcome::Summary(summary) => Ok(summary),
            WorkflowOutcome::Trained(_) => Err(unexpected_outcome(WorkflowKind::Test)),
        }
    }

    /// 単一フィードバックの判定
    pub async fn predict(&self, feedback: &str) -> Result<Prediction, DispatchError> {
        if feedback.trim().is_empty() {
            return Err(DispatchError::UserInput(
                "Please enter feedback text".to_string(),
            ));
        }

        info!(length = feedback.len(), "📤 Submitting single feedback");

        let reply = self
            .transport
            .post_form(PREDICT_ENDPOINT, &[("feedback", feedback)])
            .await?;
        let body = classify(&reply)?;
        let prediction =
            serde_json::from_value::<Prediction>(body).map_err(TransportError::Decode)?;

        if !prediction.confidence.is_finite() {
            return Err(TransportError::InvalidPayload(format!(
                "confidence is not a number: {}",
                prediction.confidence
            ))
            .into());
        }

        Ok(prediction)
    }
}

/// 生レスポンスを分類してJSON本文を返す
///
/// `error` が入っていればステータスに関係なくアプリケーションエラー。
pub fn classify(reply: &RawReply) -> Result<serde_json::Value, DispatchError> {
    let body: serde_json::Value = match serde_json::from_slice(&reply.body) {
        Ok(body) => body,
        Err(_) if !reply.is_success() => {
            return Err(TransportError::Status(reply.status).into());
        }
        Err(e) => return Err(TransportError::Decode(e).into()),
    };

    if let Some(message) = error_marker(&body) {
        return Err(DispatchError::Application(message));
    }

    if !reply.is_success() {
        return Err(TransportError::Status(reply.status).into());
    }

    Ok(body)
}

fn decode_summary(body: serde_json::Value) -> Result<SentimentSummary, DispatchError> {
    let payload: SummaryPayload = serde_json::from_value(body).map_err(TransportError::Decode)?;
    SentimentSummary::try_from(payload)
        .map_err(|reason| TransportError::InvalidPayload(reason).into())
}

fn unexpected_outcome(workflow: WorkflowKind) -> DispatchError {
    TransportError::InvalidPayload(format!("unexpected outcome for {}", workflow)).into()
}

fn log_failure(workflow: WorkflowKind, err: DispatchError) -> DispatchError {
    match &err {
        DispatchError::Application(message) => {
            warn!(workflow = %workflow, message = %message, "⚠️ Server reported an error");
        }
        other => {
            error!(
                workflow = %workflow,
                kind = other.kind(),
                error = %other,
                "❌ Workflow request failed"
            );
        }
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    /// 応答を固定で返し、呼び出しを記録するトランスポート
    struct CannedTransport {
        reply: Mutex<Option<Result<RawReply, TransportError>>>,
        calls: Mutex<Vec<String>>,
        forms: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl CannedTransport {
        fn replying(status: u16, body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(Ok(RawReply::new(status, body.to_string())))),
                calls: Mutex::new(Vec::new()),
                forms: Mutex::new(Vec::new()),
            })
        }

        fn raw(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(Ok(RawReply::new(status, body)))),
                calls: Mutex::new(Vec::new()),
                forms: Mutex::new(Vec::new()),
            })
        }

        fn take(&self, endpoint: &str) -> Result<RawReply, TransportError> {
            self.calls.lock().push(endpoint.to_string());
            self.reply
                .lock()
                .take()
                .unwrap_or_else(|| Err(TransportError::Status(599)))
        }
    }

    #[async_trait]
    impl UploadTransport for CannedTransport {
        async fn post_file(
            &self,
            endpoint: &str,
            _file: &FileHandle,
        ) -> Result<RawReply, TransportError> {
            self.take(endpoint)
        }

        async fn post_form(
            &self,
            endpoint: &str,
            fields: &[(&str, &str)],
        ) -> Result<RawReply, TransportError> {
            self.forms.lock().push(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            );
            self.take(endpoint)
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn csv() -> FileHandle {
        FileHandle::from_bytes("feedback.csv", "feedback\ngood\n")
    }

    #[tokio::test]
    async fn test_missing_file_aborts_before_request() {
        let transport = CannedTransport::replying(200, json!({}));
        let dispatcher = RequestDispatcher::new(transport.clone());

        let err = dispatcher.submit(WorkflowKind::Train, None).await.unwrap_err();

        assert!(matches!(err, DispatchError::UserInput(ref m) if m == "Please upload training CSV"));
        assert!(transport.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_analyze_success() {
        let transport = CannedTransport::replying(
            200,
            json!({
                "total": 100, "positive": 60, "neutral": 25, "negative": 15,
                "positive_pct": 60, "neutral_pct": 25, "negative_pct": 15,
                "overall": "Mostly Positive"
            }),
        );
        let dispatcher = RequestDispatcher::new(transport.clone());

        let summary = dispatcher.analyze(Some(&csv())).await.unwrap();

        assert_eq!(summary.counts(), [60, 25, 15]);
        assert_eq!(transport.calls.lock().as_slice(), ["/upload-feedback"]);
    }

    #[tokio::test]
    async fn test_error_field_wins_over_status() {
        let transport = CannedTransport::replying(400, json!({"error": "Only CSV allowed"}));
        let dispatcher = RequestDispatcher::new(transport);

        let err = dispatcher.analyze(Some(&csv())).await.unwrap_err();
        assert!(matches!(err, DispatchError::Application(ref m) if m == "Only CSV allowed"));
    }

    #[tokio::test]
    async fn test_error_field_with_success_status_is_logical_failure() {
        let transport = CannedTransport::replying(200, json!({"error": "Train model first"}));
        let dispatcher = RequestDispatcher::new(transport);

        let err = dispatcher.test(Some(&csv())).await.unwrap_err();
        assert_eq!(err.kind(), "application");
        assert_eq!(err.to_string(), "Train model first");
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transport_error() {
        let transport = CannedTransport::raw(200, "<html>oops</html>");
        let dispatcher = RequestDispatcher::new(transport);

        let err = dispatcher.analyze(Some(&csv())).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Transport(TransportError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_server_error_without_marker_is_status_error() {
        let transport = CannedTransport::raw(502, "Bad Gateway");
        let dispatcher = RequestDispatcher::new(transport);

        let err = dispatcher.train(Some(&csv())).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Transport(TransportError::Status(502))
        ));
    }

    #[tokio::test]
    async fn test_train_ack() {
        let transport =
            CannedTransport::replying(200, json!({"message": "✅ Model trained successfully"}));
        let dispatcher = RequestDispatcher::new(transport.clone());

        let ack = dispatcher.train(Some(&csv())).await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("✅ Model trained successfully"));
        assert_eq!(transport.calls.lock().as_slice(), ["/train-model"]);
    }

    #[tokio::test]
    async fn test_predict_rejects_blank_text() {
        let transport = CannedTransport::replying(200, json!({}));
        let dispatcher = RequestDispatcher::new(transport.clone());

        let err = dispatcher.predict("   ").await.unwrap_err();
        assert_eq!(err.kind(), "user_input");
        assert!(transport.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_predict_success() {
        let transport = CannedTransport::replying(
            200,
            json!({"sentiment": "positive", "emoji": "😊", "confidence": 0.91}),
        );
        let dispatcher = RequestDispatcher::new(transport.clone());

        let prediction = dispatcher.predict("Loved it").await.unwrap();
        assert_eq!(prediction.sentiment, "positive");
        assert_eq!(transport.calls.lock().as_slice(), [PREDICT_ENDPOINT]);
    }

    #[tokio::test]
    async fn test_predict_sends_text_as_entered() {
        let transport = CannedTransport::replying(
            200,
            json!({"sentiment": "neutral", "emoji": "😐", "confidence": 0.5}),
        );
        let dispatcher = RequestDispatcher::new(transport.clone());

        dispatcher.predict("  It was okay \n").await.unwrap();

        let forms = transport.forms.lock();
        assert_eq!(
            forms.as_slice(),
            [vec![("feedback".to_string(), "  It was okay \n".to_string())]]
        );
    }
}
