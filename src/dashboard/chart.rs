//! チャート定義
//!
//! 描画先に依存しないチャートの記述（種別・ラベル・データ・色）と、
//! 生成済みインスタンスのハンドルを定義する。

use serde::{Deserialize, Serialize};

use crate::api::SentimentSummary;

/// 固定の描画スロット
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
pub enum ChartSlot {
    /// 分布（円・ドーナツ）
    #[display("distribution")]
    Distribution,
    /// 件数比較（棒）
    #[display("count-comparison")]
    CountComparison,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 2] = [ChartSlot::Distribution, ChartSlot::CountComparison];

    /// このスロットに配置できる種別か
    pub fn accepts(&self, subtype: ChartSubtype) -> bool {
        match self {
            ChartSlot::Distribution => {
                matches!(subtype, ChartSubtype::Pie | ChartSubtype::Doughnut)
            }
            ChartSlot::CountComparison => matches!(subtype, ChartSubtype::Bar),
        }
    }

    /// 表示用タイトル
    pub fn title(&self) -> &'static str {
        match self {
            ChartSlot::Distribution => "Sentiment Distribution",
            ChartSlot::CountComparison => "Feedback Count",
        }
    }
}

/// チャート種別
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum ChartSubtype {
    #[display("pie")]
    Pie,
    #[display("doughnut")]
    Doughnut,
    #[display("bar")]
    Bar,
}

/// カテゴリ名の装飾
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LabelStyle {
    #[default]
    Plain,
    Emoji,
}

/// 感情カテゴリ（順序固定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Positive,
    Neutral,
    Negative,
}

impl Category {
    pub const ORDER: [Category; 3] = [Category::Positive, Category::Neutral, Category::Negative];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Positive => "Positive",
            Category::Neutral => "Neutral",
            Category::Negative => "Negative",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Positive => "😊",
            Category::Neutral => "😐",
            Category::Negative => "😡",
        }
    }

    /// 全ワークフロー・全種別で共通の色
    pub fn color(&self) -> RgbColor {
        match self {
            Category::Positive => RgbColor(0x22c55e),
            Category::Neutral => RgbColor(0x9ca3af),
            Category::Negative => RgbColor(0xef4444),
        }
    }

    pub fn label(&self, style: LabelStyle) -> String {
        match style {
            LabelStyle::Plain => self.name().to_string(),
            LabelStyle::Emoji => format!("{} {}", self.emoji(), self.name()),
        }
    }
}

/// 0xRRGGBB 形式の色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor(pub u32);

impl RgbColor {
    pub fn hex(&self) -> String {
        format!("#{:06x}", self.0)
    }
}

impl std::fmt::Display for RgbColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex())
    }
}

/// 1チャート分の描画内容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub subtype: ChartSubtype,
    pub labels: [String; 3],
    pub data: [u64; 3],
    pub colors: [RgbColor; 3],
    /// データセット名（棒グラフの凡例）
    pub dataset_label: Option<String>,
}

impl ChartConfig {
    /// 統計から描画内容を組み立てる
    ///
    /// データは常に [positive, neutral, negative] の順。`style` はラベルだけに影響する。
    pub fn from_summary(
        subtype: ChartSubtype,
        summary: &SentimentSummary,
        style: LabelStyle,
    ) -> Self {
        let dataset_label = match subtype {
            ChartSubtype::Bar => Some("Feedback Count".to_string()),
            ChartSubtype::Pie | ChartSubtype::Doughnut => None,
        };

        Self {
            subtype,
            labels: Category::ORDER.map(|c| c.label(style)),
            data: summary.counts(),
            colors: Category::ORDER.map(|c| c.color()),
            dataset_label,
        }
    }

    pub fn total(&self) -> u64 {
        self.data.iter().sum()
    }

    /// (ラベル, 値, 色) の組を順に返す
    pub fn points(&self) -> impl Iterator<Item = (&str, u64, RgbColor)> + '_ {
        self.labels
            .iter()
            .zip(self.data.iter())
            .zip(self.colors.iter())
            .map(|((label, value), color)| (label.as_str(), *value, *color))
    }
}

/// チャートインスタンスID
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub struct InstanceId(pub uuid::Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// 生成済みチャートインスタンス
///
/// スロットが排他的に所有し、Clone はしない。
#[derive(Debug, PartialEq, Serialize)]
pub struct ChartHandle {
    pub id: InstanceId,
    pub slot: ChartSlot,
    pub config: ChartConfig,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ChartHandle {
    pub fn new(slot: ChartSlot, config: ChartConfig) -> Self {
        Self {
            id: InstanceId::new(),
            slot,
            config,
            created_at: chrono::Utc::now(),
        }
    }
}
