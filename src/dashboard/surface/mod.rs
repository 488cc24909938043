//! 描画サーフェス
//!
//! チャートインスタンスの生成と破棄を担う。スロット管理はこのトレイト越しに描画する。

pub mod memory;
pub mod terminal;

pub use memory::MemorySurface;
pub use terminal::TerminalSurface;

use crate::dashboard::chart::{ChartConfig, ChartHandle, ChartSlot};
use crate::dashboard::slots::RenderError;

/// 描画サーフェストレイト
pub trait ChartSurface: Send + Sync {
    /// スロットに新しいチャートインスタンスを生成
    fn create(&self, slot: ChartSlot, config: ChartConfig) -> Result<ChartHandle, RenderError>;

    /// インスタンスを破棄して描画資源を解放
    fn destroy(&self, handle: ChartHandle);

    /// サーフェス名を取得
    fn name(&self) -> &'static str;
}
