//! バックエンドとの送受信データ構造

use serde::{Deserialize, Serialize};

/// 集計済みの感情統計
///
/// レスポンスごとに新しく作られ、描画後は保持しない。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    pub total: u64,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
    /// サーバーが付与する短い総評ラベル
    pub overall: String,
}

impl SentimentSummary {
    /// 3カテゴリの件数を固定順 [Positive, Neutral, Negative] で返す
    pub fn counts(&self) -> [u64; 3] {
        [self.positive, self.neutral, self.negative]
    }

    /// 3カテゴリの割合を固定順で返す
    pub fn percentages(&self) -> [f64; 3] {
        [self.positive_pct, self.neutral_pct, self.negative_pct]
    }

    /// 件数と割合の整合性を検証
    pub fn validate(&self) -> Result<(), String> {
        let classified = self
            .positive
            .checked_add(self.neutral)
            .and_then(|sum| sum.checked_add(self.negative))
            .ok_or_else(|| "category counts overflow".to_string())?;

        if classified > self.total {
            return Err(format!(
                "positive + neutral + negative ({}) exceeds total ({})",
                classified, self.total
            ));
        }

        for (name, pct) in [
            ("positive_pct", self.positive_pct),
            ("neutral_pct", self.neutral_pct),
            ("negative_pct", self.negative_pct),
        ] {
            if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
                return Err(format!("{} out of range: {}", name, pct));
            }
        }

        Ok(())
    }
}

/// 統計レスポンスのワイヤ形式
///
/// test-model は `total` を省略することがあるため Option で受ける。
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryPayload {
    #[serde(default)]
    pub total: Option<u64>,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
    pub overall: String,
}

impl TryFrom<SummaryPayload> for SentimentSummary {
    type Error = String;

    fn try_from(payload: SummaryPayload) -> Result<Self, Self::Error> {
        let classified = payload
            .positive
            .saturating_add(payload.neutral)
            .saturating_add(payload.negative);

        let summary = SentimentSummary {
            total: payload.total.unwrap_or(classified),
            positive: payload.positive,
            neutral: payload.neutral,
            negative: payload.negative,
            positive_pct: payload.positive_pct,
            neutral_pct: payload.neutral_pct,
            negative_pct: payload.negative_pct,
            overall: payload.overall,
        };
        summary.validate()?;
        Ok(summary)
    }
}

/// モデル学習の受領応答
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// 単一フィードバックの判定結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub sentiment: String,
    #[serde(default)]
    pub emoji: String,
    pub confidence: f64,
}

/// ワークフローの成功結果
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    Summary(SentimentSummary),
    Trained(TrainAck),
}

/// レスポンス本文からアプリケーションエラーを取り出す
///
/// 空文字列・null・false・0 はエラー扱いしない。
pub fn error_marker(body: &serde_json::Value) -> Option<String> {
    match body.get("error")? {
        serde_json::Value::Null | serde_json::Value::Bool(false) => None,
        serde_json::Value::String(message) if message.is_empty() => None,
        serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
        serde_json::Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
