//! アップロード対象ファイルのハンドル

use std::path::Path;

/// ユーザーが選択したファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    file_name: String,
    bytes: Vec<u8>,
}

impl FileHandle {
    /// メモリ上のデータからハンドルを作成
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// ローカルファイルを読み込んでハンドルを作成
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        tracing::debug!(
            file = %path.display(),
            size_bytes = bytes.len(),
            "📂 Upload file loaded"
        );

        Ok(Self { file_name, bytes })
    }

    /// ネイティブのファイルダイアログでCSVを選択
    ///
    /// キャンセルされた場合は None。
    pub async fn pick(title: &str) -> Option<Self> {
        let handle = rfd::AsyncFileDialog::new()
            .set_title(title)
            .add_filter("CSV", &["csv"])
            .pick_file()
            .await?;

        let file_name = handle.file_name();
        let bytes = handle.read().await;
        tracing::info!("📂 File picked: {} ({} bytes)", file_name, bytes.len());

        Some(Self { file_name, bytes })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 拡張子が .csv かどうか（大文字小文字は区別しない）
    pub fn has_csv_extension(&self) -> bool {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_csv_extension() {
        assert!(FileHandle::from_bytes("feedback.csv", "a").has_csv_extension());
        assert!(FileHandle::from_bytes("FEEDBACK.CSV", "a").has_csv_extension());
        assert!(!FileHandle::from_bytes("feedback.txt", "a").has_csv_extension());
        assert!(!FileHandle::from_bytes("feedback", "a").has_csv_extension());
    }

    #[tokio::test]
    async fn test_open_reads_file_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "feedback,sentiment").unwrap();
        writeln!(file, "great,positive").unwrap();

        let handle = FileHandle::open(&path).await.unwrap();
        assert_eq!(handle.file_name(), "train.csv");
        assert!(handle.bytes().starts_with(b"feedback,sentiment"));
        assert!(!handle.is_empty());
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileHandle::open(dir.path().join("missing.csv")).await;
        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::NotFound);
    }
}
