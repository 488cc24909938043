//! ワークフロー種別とエンドポイントの対応

use serde::{Deserialize, Serialize};

use crate::dashboard::{ChartSlot, ChartSubtype};

/// ユーザー操作で起動されるワークフロー
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum WorkflowKind {
    #[display("bulk-analyze")]
    BulkAnalyze,
    #[display("train")]
    Train,
    #[display("test")]
    Test,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 3] = [
        WorkflowKind::BulkAnalyze,
        WorkflowKind::Train,
        WorkflowKind::Test,
    ];

    /// 対応するバックエンドのパス
    pub fn endpoint(&self) -> &'static str {
        match self {
            WorkflowKind::BulkAnalyze => "/upload-feedback",
            WorkflowKind::Train => "/train-model",
            WorkflowKind::Test => "/test-model",
        }
    }

    /// ファイル未選択時にユーザーへ表示する文言
    pub fn missing_file_prompt(&self) -> &'static str {
        match self {
            WorkflowKind::BulkAnalyze => "Please upload a CSV file",
            WorkflowKind::Train => "Please upload training CSV",
            WorkflowKind::Test => "Upload test dataset",
        }
    }

    /// このワークフローが書き換えるスロット
    ///
    /// Test は分布スロットのみを更新し、件数比較スロットは前回の内容のまま残す。
    pub fn touched_slots(&self) -> &'static [ChartSlot] {
        match self {
            WorkflowKind::BulkAnalyze => &[ChartSlot::Distribution, ChartSlot::CountComparison],
            WorkflowKind::Train => &[],
            WorkflowKind::Test => &[ChartSlot::Distribution],
        }
    }

    /// 分布スロットに使うチャート種別
    pub fn distribution_subtype(&self) -> Option<ChartSubtype> {
        match self {
            WorkflowKind::BulkAnalyze => Some(ChartSubtype::Pie),
            WorkflowKind::Train => None,
            WorkflowKind::Test => Some(ChartSubtype::Doughnut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_distinct() {
        let mut endpoints: Vec<_> = WorkflowKind::ALL.iter().map(|w| w.endpoint()).collect();
        endpoints.sort();
        endpoints.dedup();
        assert_eq!(endpoints.len(), 3);
    }

    #[test]
    fn test_slot_effects() {
        assert_eq!(WorkflowKind::BulkAnalyze.touched_slots().len(), 2);
        assert!(WorkflowKind::Train.touched_slots().is_empty());
        assert_eq!(
            WorkflowKind::Test.touched_slots(),
            &[ChartSlot::Distribution]
        );
    }

    #[test]
    fn test_distribution_subtype() {
        assert_eq!(
            WorkflowKind::BulkAnalyze.distribution_subtype(),
            Some(ChartSubtype::Pie)
        );
        assert_eq!(
            WorkflowKind::Test.distribution_subtype(),
            Some(ChartSubtype::Doughnut)
        );
        assert_eq!(WorkflowKind::Train.distribution_subtype(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkflowKind::BulkAnalyze.to_string(), "bulk-analyze");
    }
}
