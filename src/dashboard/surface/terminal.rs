//! 端末出力サーフェス

use std::io::Write;

use parking_lot::Mutex;

use super::ChartSurface;
use crate::dashboard::chart::{ChartConfig, ChartHandle, ChartSlot, ChartSubtype};
use crate::dashboard::slots::RenderError;

const DEFAULT_BAR_WIDTH: usize = 40;

/// 生成時にテキストのチャートを書き出すサーフェス
pub struct TerminalSurface {
    writer: Mutex<Box<dyn Write + Send>>,
    bar_width: usize,
}

impl TerminalSurface {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }

    /// 標準出力へ描画
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn with_bar_width(mut self, bar_width: usize) -> Self {
        self.bar_width = bar_width.max(1);
        self
    }

    /// チャートをテキストに整形
    pub fn draw(&self, slot: ChartSlot, config: &ChartConfig) -> String {
        let icon = match config.subtype {
            ChartSubtype::Pie => "🥧",
            ChartSubtype::Doughnut => "🍩",
            ChartSubtype::Bar => "📊",
        };

        let mut out = format!("{} {} [{}]\n", icon, slot.title(), config.subtype);
        if let Some(label) = &config.dataset_label {
            out.push_str(&format!("   {}\n", label));
        }

        let label_width = config
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        let max = config.data.iter().copied().max().unwrap_or(0);
        let total = config.total();

        for (label, value, color) in config.points() {
            let filled = if max == 0 {
                0
            } else {
                ((value as f64 / max as f64) * self.bar_width as f64).round() as usize
            };
            let share = match config.subtype {
                ChartSubtype::Bar => String::new(),
                _ if total == 0 => " 0.0%".to_string(),
                _ => format!(" {:.1}%", value as f64 * 100.0 / total as f64),
            };
            let padding = label_width.saturating_sub(label.chars().count());

            out.push_str(&format!(
                "   {}{} {}{} {}{} {}\n",
                label,
                " ".repeat(padding),
                "█".repeat(filled),
                " ".repeat(self.bar_width - filled.min(self.bar_width)),
                value,
                share,
                color
            ));
        }

        out
    }
}

impl ChartSurface for TerminalSurface {
    fn create(&self, slot: ChartSlot, config: ChartConfig) -> Result<ChartHandle, RenderError> {
        let text = self.draw(slot, &config);
        let mut writer = self.writer.lock();
        writer
            .write_all(text.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| RenderError::Surface(format!("terminal write failed: {}", e)))?;

        Ok(ChartHandle::new(slot, config))
    }

    fn destroy(&self, handle: ChartHandle) {
        tracing::debug!(
            slot = %handle.slot,
            instance = %handle.id,
            "🧹 Terminal chart released"
        );
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SentimentSummary;
    use crate::dashboard::chart::LabelStyle;
    use std::sync::Arc;

    /// 書き込み内容を共有バッファに残すライター
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn summary() -> SentimentSummary {
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
    fn test_draw_pie() {
        let surface = TerminalSurface::new(Box::new(std::io::sink())).with_bar_width(10);
        let config = ChartConfig::from_summary(ChartSubtype::Pie, &summary(), LabelStyle::Plain);

        let text = surface.draw(ChartSlot::Distribution, &config);

        assert!(text.starts_with("🥧 Sentiment Distribution [pie]"));
        assert!(text.contains("Positive ██████████ 60 60.0% #22c55e"));
        assert!(text.contains("Negative"));
    }

    #[test]
    fn test_draw_bar_has_dataset_label() {
        let surface = TerminalSurface::new(Box::new(std::io::sink()));
        let config = ChartConfig::from_summary(ChartSubtype::Bar, &summary(), LabelStyle::Plain);

        let text = surface.draw(ChartSlot::CountComparison, &config);
        assert!(text.contains("Feedback Count"));
        assert!(!text.contains('%'));
    }

    #[test]
    fn test_create_writes_to_sink() {
        let buffer = SharedBuffer::default();
        let surface = TerminalSurface::new(Box::new(buffer.clone()));
        let config =
            ChartConfig::from_summary(ChartSubtype::Doughnut, &summary(), LabelStyle::Emoji);

        let handle = surface.create(ChartSlot::Distribution, config).unwrap();
        let written = String::from_utf8(buffer.0.lock().clone()).unwrap();

        assert!(written.contains("🍩"));
        assert!(written.contains("😊 Positive"));
        assert_eq!(handle.slot, ChartSlot::Distribution);
    }

    #[test]
    fn test_zero_data_draws_empty_bars() {
        let surface = TerminalSurface::new(Box::new(std::io::sink())).with_bar_width(5);
        let empty = SentimentSummary {
            total: 0,
            positive: 0,
            neutral: 0,
            negative: 0,
            positive_pct: 0.0,
            neutral_pct: 0.0,
            negative_pct: 0.0,
            overall: "😐 Mixed".to_string(),
        };
        let config = ChartConfig::from_summary(ChartSubtype::Pie, &empty, LabelStyle::Plain);

        let text = surface.draw(ChartSlot::Distribution, &config);
        assert!(!text.contains('█'));
        assert!(text.contains("0.0%"));
    }
}
