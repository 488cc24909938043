use super::{DashboardSnapshot, ExportError, FormatHandler};

/// JSON形式エクスポーター
pub struct JsonExporter {
    pretty_print: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self { pretty_print: true }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for JsonExporter {
    fn export(&self, snapshot: &DashboardSnapshot) -> Result<Vec<u8>, ExportError> {
        let result = if self.pretty_print {
            serde_json::to_vec_pretty(snapshot)
        } else {
            serde_json::to_vec(snapshot)
        };
        result.map_err(|e| ExportError::Serialization(format!("JSON serialization failed: {}", e)))
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::summary::TextSummary;

    #[test]
    fn test_export_is_parseable() {
        let mut text = TextSummary::new();
        text.set_train_success();
        let snapshot = DashboardSnapshot {
            text,
            ..DashboardSnapshot::default()
        };

        let bytes = JsonExporter::new().export(&snapshot).unwrap();
        let parsed: DashboardSnapshot = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(parsed.text.train_status, snapshot.text.train_status);
        assert!(parsed.charts.is_empty());
    }

    #[test]
    fn test_compact_output_has_no_newlines() {
        let bytes = JsonExporter::new()
            .with_pretty_print(false)
            .export(&DashboardSnapshot::default())
            .unwrap();
        assert!(!bytes.contains(&b'\n'));
    }
}
