//! ダッシュボード
//!
//! チャートスロット・テキスト欄・通知を管理し、ワークフロー応答を表示へ反映する。

pub mod chart; // チャート設定と色・ラベル
pub mod controller; // 応答の振り分けと世代管理
pub mod export; // スナップショット出力
pub mod slots; // スロット管理
pub mod summary; // テキスト欄
pub mod surface; // 描画先

pub use chart::{
    Category, ChartConfig, ChartHandle, ChartSlot, ChartSubtype, InstanceId, LabelStyle, RgbColor,
};
pub use controller::{
    run_prediction, run_workflow, Action, ApplyResult, DashboardController, Notice, NoticeKind,
    SharedController, Ticket,
};
pub use slots::{ChartSlotManager, RenderError};
pub use summary::TextSummary;
pub use surface::{ChartSurface, MemorySurface, TerminalSurface};
