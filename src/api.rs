pub mod dispatcher; // ワークフロー送信と応答分類
pub mod models; // 送受信データ構造
pub mod transport; // HTTPトランスポート
pub mod upload; // アップロードファイル
pub mod workflow; // ワークフロー種別

pub use dispatcher::{DispatchError, RequestDispatcher};
pub use models::{Prediction, SentimentSummary, TrainAck, WorkflowOutcome};
pub use transport::{HttpTransport, RawReply, TransportError, UploadTransport};
pub use upload::FileHandle;
pub use workflow::WorkflowKind;
