//! アプリケーション設定管理モジュール
//!
//! XDGディレクトリ上の `config.toml` を読み書きします。
//! 欠けている項目はデフォルト値で補います。

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "sifyfy";
const APPLICATION: &str = "sentiboard";

/// バックエンド接続設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 分析サーバーのベースURL
    pub base_url: String,
    /// リクエストタイムアウト秒（Noneの場合は無制限）
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: None,
            user_agent: format!("{}/{}", APPLICATION, env!("CARGO_PKG_VERSION")),
        }
    }
}

/// ダッシュボード設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 終了時に書き出すワークブック（Noneの場合は書き出さない）
    pub workbook_path: Option<PathBuf>,
    /// 終了時に書き出すJSONスナップショット
    pub snapshot_path: Option<PathBuf>,
    /// チャートを端末へ描画するか
    pub echo_charts: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            workbook_path: None,
            snapshot_path: None,
            echo_charts: true,
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// カスタムログディレクトリ（Noneの場合はXDGデフォルト使用）
    pub log_dir: Option<PathBuf>,
    /// ログレベル (trace/debug/info/warn/error)
    pub log_level: String,
    /// ファイル出力有効化
    pub enable_file_logging: bool,
    /// 保存するログファイル数上限
    pub max_log_files: u32,
    /// 古いログファイル自動削除
    pub auto_cleanup_enabled: bool,
    /// ログファイル名パターン（内部管理用）
    pub log_filename_pattern: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_level: "info".to_string(),
            enable_file_logging: false,
            max_log_files: 30,
            auto_cleanup_enabled: true,
            log_filename_pattern: format!("{}.log*", APPLICATION),
        }
    }
}

impl LogConfig {
    /// 実際に使うログディレクトリ
    pub fn resolve_log_dir(&self) -> Option<PathBuf> {
        self.log_dir.clone().or_else(|| {
            ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
                .map(|dirs| dirs.data_local_dir().join("logs"))
        })
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// 設定管理マネージャー
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        Ok(Self { config_path })
    }

    /// 任意パスの設定ファイルを扱う
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// XDGディレクトリに基づく設定ファイルパスを取得
    fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .context("Failed to get project directories")?;

        let config_file = project_dirs.config_dir().join("config.toml");
        debug!("Config file path: {}", config_file.display());

        Ok(config_file)
    }

    /// 設定を読み込み
    pub fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!(
                "Config file not found, using default settings: {}",
                self.config_path.display()
            );
            return Ok(AppConfig::default());
        }

        let config_content = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config: AppConfig = toml::from_str(&config_content).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })?;

        info!(
            "✅ Configuration loaded from: {}",
            self.config_path.display()
        );

        Ok(config)
    }

    /// 設定を保存
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let config_content =
            toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, config_content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;

        info!("💾 Configuration saved to: {}", self.config_path.display());
        Ok(())
    }

    /// 設定ファイルパスを取得
    pub fn get_config_file_path(&self) -> &Path {
        &self.config_path
    }

    /// 設定をリセット（デフォルト値に戻す）
    pub fn reset_config(&self) -> Result<()> {
        self.save_config(&AppConfig::default())?;
        info!("🔄 Configuration reset to defaults");
        Ok(())
    }

    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.server.timeout_secs, None);
        assert!(config.server.user_agent.starts_with("sentiboard/"));
        assert!(config.dashboard.echo_charts);
        assert_eq!(config.log.log_level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            server: ServerConfig {
                timeout_secs: Some(30),
                ..ServerConfig::default()
            },
            ..AppConfig::default()
        };
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            base_url = "http://analysis.internal:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "http://analysis.internal:9000");
        assert_eq!(config.server.timeout_secs, None);
        assert_eq!(config.dashboard, DashboardConfig::default());
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_config_manager_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("nested/config.toml"));

        let original = AppConfig {
            dashboard: DashboardConfig {
                workbook_path: Some(PathBuf::from("out/dashboard.xlsx")),
                snapshot_path: None,
                echo_charts: false,
            },
            ..AppConfig::default()
        };

        // 保存
        manager.save_config(&original).unwrap();
        assert!(manager.config_exists());

        // 読み込み
        let loaded = manager.load_config().unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let temp_dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("nonexistent.toml"));

        // 存在しないファイルの読み込み時はデフォルトが返される
        assert_eq!(manager.load_config().unwrap(), AppConfig::default());
        assert!(!manager.config_exists());
    }

    #[test]
    fn test_config_load_corrupted_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("corrupted.toml");
        std::fs::write(&config_path, "invalid toml content [unclosed section").unwrap();

        let manager = ConfigManager::with_path(config_path);
        assert!(manager.load_config().is_err());
    }

    #[test]
    fn test_reset_config() {
        let temp_dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.toml"));

        let mut config = AppConfig::default();
        config.server.base_url = "http://example.com".to_string();
        manager.save_config(&config).unwrap();

        manager.reset_config().unwrap();
        assert_eq!(manager.load_config().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_explicit_log_dir_wins() {
        let log = LogConfig {
            log_dir: Some(PathBuf::from("/tmp/sentiboard-logs")),
            ..LogConfig::default()
        };
        assert_eq!(
            log.resolve_log_dir(),
            Some(PathBuf::from("/tmp/sentiboard-logs"))
        );
    }
}
