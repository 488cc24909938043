//! エクスポート用のダッシュボードスナップショット

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dashboard::chart::{ChartHandle, ChartSlot, ChartSubtype, InstanceId};
use crate::dashboard::controller::DashboardController;
use crate::dashboard::summary::TextSummary;

/// 1スロット分のチャート内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub slot: ChartSlot,
    pub instance: InstanceId,
    pub subtype: ChartSubtype,
    pub title: String,
    pub dataset_label: Option<String>,
    pub labels: Vec<String>,
    pub data: Vec<u64>,
    /// "#rrggbb" 形式
    pub colors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&ChartHandle> for ChartSnapshot {
    fn from(handle: &ChartHandle) -> Self {
        Self {
            slot: handle.slot,
            instance: handle.id,
            subtype: handle.config.subtype,
            title: handle.slot.title().to_string(),
            dataset_label: handle.config.dataset_label.clone(),
            labels: handle.config.labels.to_vec(),
            data: handle.config.data.to_vec(),
            colors: handle.config.colors.iter().map(|c| c.hex()).collect(),
            created_at: handle.created_at,
        }
    }
}

/// ダッシュボード全体のスナップショット
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub charts: Vec<ChartSnapshot>,
    pub text: TextSummary,
}

impl DashboardSnapshot {
    /// 現在のスロットとテキスト欄を写し取る
    pub fn capture(controller: &DashboardController) -> Self {
        Self {
            generated_at: Utc::now(),
            charts: controller
                .slots()
                .live_instances()
                .map(ChartSnapshot::from)
                .collect(),
            text: controller.text().clone(),
        }
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<&ChartSnapshot> {
        self.charts.iter().find(|c| c.slot == slot)
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty() && self.text.lines().is_empty()
    }
}
