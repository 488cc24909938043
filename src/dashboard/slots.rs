//! チャートスロット管理
//!
//! 各スロットは「空」か「インスタンス1つを保持」のどちらか。
//! 変更は「旧インスタンスを破棄してから新インスタンスを束縛する」操作だけで行う。

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::api::SentimentSummary;
use crate::dashboard::chart::{ChartConfig, ChartHandle, ChartSlot, ChartSubtype, LabelStyle};
use crate::dashboard::surface::ChartSurface;

/// 描画エラー
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{subtype} chart cannot be placed in the {slot} slot")]
    SubtypeMismatch { slot: ChartSlot, subtype: ChartSubtype },

    #[error("Surface error: {0}")]
    Surface(String),
}

/// 2つの描画スロットを所有するマネージャー
pub struct ChartSlotManager {
    surface: Arc<dyn ChartSurface>,
    slots: BTreeMap<ChartSlot, ChartHandle>,
}

impl ChartSlotManager {
    pub fn new(surface: Arc<dyn ChartSurface>) -> Self {
        Self {
            surface,
            slots: BTreeMap::new(),
        }
    }

    /// スロットへ描画する
    ///
    /// 種別がスロットに合わない場合はスロットに触れずにエラーを返す。
    pub fn render(
        &mut self,
        slot: ChartSlot,
        subtype: ChartSubtype,
        summary: &SentimentSummary,
        style: LabelStyle,
    ) -> Result<&ChartHandle, RenderError> {
        if !slot.accepts(subtype) {
            return Err(RenderError::SubtypeMismatch { slot, subtype });
        }

        if let Some(previous) = self.slots.remove(&slot) {
            debug!(
                slot = %slot,
                instance = %previous.id,
                subtype = %previous.config.subtype,
                "🧹 Destroying previous chart"
            );
            self.surface.destroy(previous);
        }

        let config = ChartConfig::from_summary(subtype, summary, style);
        let handle = self.surface.create(slot, config)?;

        info!(
            slot = %slot,
            instance = %handle.id,
            subtype = %subtype,
            data = ?handle.config.data,
            surface = self.surface.name(),
            "📈 Chart bound to slot"
        );

        let bound = self.slots.entry(slot).or_insert(handle);
        Ok(&*bound)
    }

    /// スロットに束縛中のインスタンス
    pub fn occupant(&self, slot: ChartSlot) -> Option<&ChartHandle> {
        self.slots.get(&slot)
    }

    pub fn is_occupied(&self, slot: ChartSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// 生存中のインスタンス（スロット順）
    pub fn live_instances(&self) -> impl Iterator<Item = &ChartHandle> {
        self.slots.values()
    }

    pub fn surface_name(&self) -> &'static str {
        self.surface.name()
    }
}
