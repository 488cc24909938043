use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub mod json_exporter;
pub mod snapshot;
pub mod workbook_exporter;

pub use json_exporter::JsonExporter;
pub use snapshot::{ChartSnapshot, DashboardSnapshot};
pub use workbook_exporter::WorkbookExporter;

/// エクスポート形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Excel,
}

impl ExportFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }

    /// パスの拡張子から形式を推定
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ExportFormat::Json),
            "xlsx" => Some(ExportFormat::Excel),
            _ => None,
        }
    }

    /// 形式に対応するハンドラー
    pub fn handler(&self) -> Box<dyn FormatHandler> {
        match self {
            ExportFormat::Json => Box::new(JsonExporter::new()),
            ExportFormat::Excel => Box::new(WorkbookExporter::new()),
        }
    }
}

/// エクスポートエラー
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unsupported export target: {path}")]
    UnsupportedTarget { path: String },

    #[error("Nothing to export: {message}")]
    Empty { message: String },
}

/// フォーマットハンドラートレイト
pub trait FormatHandler: Send + Sync {
    fn export(&self, snapshot: &DashboardSnapshot) -> Result<Vec<u8>, ExportError>;
    fn file_extension(&self) -> &str;
}

/// スナップショットをファイルへ書き出す（形式は拡張子から判定）
pub fn export_to_file(snapshot: &DashboardSnapshot, path: &Path) -> Result<(), ExportError> {
    let format = ExportFormat::from_path(path).ok_or_else(|| ExportError::UnsupportedTarget {
        path: path.display().to_string(),
    })?;

    let bytes = format.handler().export(snapshot)?;
    std::fs::write(path, &bytes)?;

    tracing::info!(
        "💾 Dashboard exported to {} ({} bytes, {:?})",
        path.display(),
        bytes.len(),
        format
    );
    Ok(())
}
