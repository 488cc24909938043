//! ログ初期化
//!
//! 標準エラーへのコンパクト出力と、任意で日次ローテーションのJSONファイル出力を設定する。

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

const LOG_FILE_PREFIX: &str = "sentiboard.log";

/// ログを初期化する
///
/// `RUST_LOG` が設定されていればそれを優先し、なければ設定のログレベルを使う。
/// ファイル出力が有効な場合は返されたガードを保持しておくこと（破棄時にフラッシュされる）。
pub fn init_logging(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("Invalid log level: {}", config.log_level))?;

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact();

    let (file_layer, guard) = match file_log_dir(config) {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            if config.auto_cleanup_enabled {
                cleanup_old_logs(&dir, &config.log_filename_pattern, config.max_log_files)?;
            }

            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if guard.is_some() {
        info!("📝 File logging enabled");
    }
    Ok(guard)
}

fn file_log_dir(config: &LogConfig) -> Option<PathBuf> {
    if !config.enable_file_logging {
        return None;
    }
    let dir = config.resolve_log_dir();
    if dir.is_none() {
        warn!("⚠️ No log directory available, file logging disabled");
    }
    dir
}

/// 古いログファイルを削除し、新しいものから `max_files` 個だけ残す
///
/// 戻り値は削除したファイル数。
pub fn cleanup_old_logs(dir: &Path, pattern: &str, max_files: u32) -> anyhow::Result<usize> {
    let full_pattern = dir.join(pattern);
    let mut files: Vec<(SystemTime, PathBuf)> = glob::glob(&full_pattern.to_string_lossy())
        .with_context(|| format!("Invalid log file pattern: {}", pattern))?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .map(|path| {
            let modified = path
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();

    // 新しい順
    files.sort_by(|a, b| b.cmp(a));

    let mut removed = 0;
    for (_, path) in files.into_iter().skip(max_files as usize) {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("🗑️ Removed old log file: {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("❌ Failed to remove {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}
