//! テキストサマリー
//!
//! 数値・総評・学習ステータスなど、チャート以外の表示欄を保持する。

use serde::{Deserialize, Serialize};

use crate::api::{Prediction, SentimentSummary};

/// 学習成功時のステータス文言
pub const TRAIN_SUCCESS_STATUS: &str = "✅ Model trained successfully. You can now analyze feedback.";

/// 画面上のテキスト欄
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSummary {
    pub total: Option<String>,
    pub positive: Option<String>,
    pub neutral: Option<String>,
    pub negative: Option<String>,
    pub overall: Option<String>,
    pub test_overall: Option<String>,
    pub train_status: Option<String>,
    pub prediction: Option<String>,
}

impl TextSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 一括分析の結果で数値欄と総評を更新
    pub fn apply_bulk(&mut self, summary: &SentimentSummary) {
        self.total = Some(summary.total.to_string());
        self.positive = Some(count_with_pct(summary.positive, summary.positive_pct));
        self.neutral = Some(count_with_pct(summary.neutral, summary.neutral_pct));
        self.negative = Some(count_with_pct(summary.negative, summary.negative_pct));
        self.overall = Some(format!("🧠 Overall Review: {}", summary.overall));
    }

    /// モデル評価の結果を更新（数値欄は変更しない）
    pub fn apply_test(&mut self, summary: &SentimentSummary) {
        self.test_overall = Some(format!(
            "📊 Test Result: {}\n😊 {}% | 😐 {}% | 😡 {}%",
            summary.overall,
            format_pct(summary.positive_pct),
            format_pct(summary.neutral_pct),
            format_pct(summary.negative_pct)
        ));
    }

    pub fn set_train_success(&mut self) {
        self.train_status = Some(TRAIN_SUCCESS_STATUS.to_string());
    }

    pub fn set_train_failure(&mut self, message: &str) {
        self.train_status = Some(format!("❌ {}", message));
    }

    pub fn apply_prediction(&mut self, prediction: &Prediction) {
        let emoji = if prediction.emoji.is_empty() {
            emoji_for(&prediction.sentiment)
        } else {
            prediction.emoji.as_str()
        };
        self.prediction = Some(format!(
            "{} {} (confidence {})",
            emoji,
            prediction.sentiment,
            format_pct(prediction.confidence)
        ));
    }

    /// 表示用の行（空欄は省略）
    pub fn lines(&self) -> Vec<String> {
        let fields = [
            ("Total", &self.total),
            ("Positive", &self.positive),
            ("Neutral", &self.neutral),
            ("Negative", &self.negative),
        ];

        let mut lines: Vec<String> = fields
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{}: {}", name, v)))
            .collect();

        let extras = [
            &self.overall,
            &self.test_overall,
            &self.train_status,
            &self.prediction,
        ];
        for text in extras.into_iter().flatten() {
            lines.extend(text.lines().map(str::to_string));
        }

        lines
    }
}

/// "60 (60%)" 形式
pub fn count_with_pct(count: u64, pct: f64) -> String {
    format!("{} ({}%)", count, format_pct(pct))
}

/// 割合を最短表記で整形（60.0 → "60"、33.33 → "33.33"）
pub fn format_pct(pct: f64) -> String {
    if pct == 0.0 {
        // -0.0 を "0" に揃える
        return "0".to_string();
    }
    format!("{}", pct)
}

fn emoji_for(sentiment: &str) -> &'static str {
    match sentiment {
        "positive" => "😊",
        "negative" => "😡",
        _ => "😐",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk() -> SentimentSummary {
        SentimentSummary {
            total: 100,
            positive: 60,
            neutral: 25,
            negative: 15,
            positive_pct: 60.0,
            neutral_pct: 25.0,
            negative_pct: 15.0,
            overall: "Mostly Positive".to_string(),
        }
    }

    #[test]
    fn test_bulk_fields() {
        let mut text = TextSummary::new();
        text.apply_bulk(&bulk());

        assert_eq!(text.total.as_deref(), Some("100"));
        assert_eq!(text.positive.as_deref(), Some("60 (60%)"));
        assert_eq!(text.neutral.as_deref(), Some("25 (25%)"));
        assert_eq!(text.negative.as_deref(), Some("15 (15%)"));
        assert_eq!(text.overall.as_deref(), Some("🧠 Overall Review: Mostly Positive"));
    }

    #[test]
    fn test_fractional_percentages() {
        assert_eq!(count_with_pct(1, 33.33), "1 (33.33%)");
        assert_eq!(format_pct(12.5), "12.5");
        assert_eq!(format_pct(-0.0), "0");
    }

    #[test]
    fn test_test_result_leaves_numbers() {
        let mut text = TextSummary::new();
        text.apply_bulk(&bulk());
        let before = text.positive.clone();

        let test = SentimentSummary {
            total: 20,
            positive: 10,
            neutral: 5,
            negative: 5,
            positive_pct: 50.0,
            neutral_pct: 25.0,
            negative_pct: 25.0,
            overall: "Balanced".to_string(),
        };
        text.apply_test(&test);

        assert_eq!(text.positive, before);
        assert_eq!(
            text.test_overall.as_deref(),
            Some("📊 Test Result: Balanced\n😊 50% | 😐 25% | 😡 25%")
        );
    }

    #[test]
    fn test_train_status() {
        let mut text = TextSummary::new();
        text.set_train_failure("Only CSV files allowed");
        assert_eq!(text.train_status.as_deref(), Some("❌ Only CSV files allowed"));

        text.set_train_success();
        assert_eq!(text.train_status.as_deref(), Some(TRAIN_SUCCESS_STATUS));
    }

    #[test]
    fn test_prediction_falls_back_to_emoji_table() {
        let mut text = TextSummary::new();
        text.apply_prediction(&Prediction {
            sentiment: "negative".to_string(),
            emoji: String::new(),
            confidence: 0.87,
        });
        assert_eq!(text.prediction.as_deref(), Some("😡 negative (confidence 0.87)"));
    }

    #[test]
    fn test_lines_skip_empty_fields() {
        let mut text = TextSummary::new();
        assert!(text.lines().is_empty());

        text.apply_bulk(&bulk());
        let lines = text.lines();
        assert_eq!(lines[0], "Total: 100");
        assert_eq!(lines.len(), 5);
    }
}
