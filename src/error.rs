//! クレート共通のエラー型
//!
//! 各レイヤーのエラー（送信・描画・エクスポート）を `SentiboardError` に集約します。

use thiserror::Error;

use crate::api::DispatchError;
use crate::dashboard::export::ExportError;
use crate::dashboard::RenderError;

/// クレート全体のエラー型
#[derive(Error, Debug)]
pub enum SentiboardError {
    /// バックエンド呼び出しの失敗
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// チャート描画の失敗
    #[error(transparent)]
    Render(#[from] RenderError),

    /// エクスポートの失敗
    #[error(transparent)]
    Export(#[from] ExportError),

    /// 設定関連のエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File I/O error: {0}")]
    StdIo(#[from] std::io::Error),

    #[error(transparent)]
    General(#[from] anyhow::Error),
}

pub type SentiboardResult<T> = Result<T, SentiboardError>;
