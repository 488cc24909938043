//! sentiboard CLI
//!
//! 感情分析サーバーへCSVを送り、結果をダッシュボード（端末描画・ワークブック）に反映する。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use sentiboard::{
    api::{FileHandle, RequestDispatcher, WorkflowKind},
    config::{AppConfig, ConfigManager},
    dashboard::{
        export::{export_to_file, DashboardSnapshot, FormatHandler, JsonExporter},
        run_prediction, run_workflow, ApplyResult, ChartSlot, ChartSurface, DashboardController,
        MemorySurface, SharedController, TerminalSurface,
    },
    logging,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

#[derive(Parser, Debug)]
#[command(name = "sentiboard", version, about = "Customer feedback sentiment dashboard")]
struct Cli {
    /// 分析サーバーのベースURL
    #[arg(long, global = true)]
    server: Option<String>,

    /// リクエストタイムアウト（秒）
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// 終了時にワークブックを書き出すパス
    #[arg(long, global = true)]
    workbook: Option<PathBuf>,

    /// 終了時にJSONスナップショットを書き出すパス
    #[arg(long, global = true)]
    json: Option<PathBuf>,

    /// チャートを端末に描画しない
    #[arg(long, global = true)]
    no_charts: bool,

    /// ログレベル (trace/debug/info/warn/error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// フィードバックCSVを一括分析
    Analyze(FileArgs),
    /// 学習用CSVでモデルを学習
    Train(FileArgs),
    /// テスト用CSVでモデルを評価
    Test(FileArgs),
    /// 1件のフィードバックを判定
    Predict {
        /// 判定するテキスト
        text: String,
    },
    /// 標準入力からコマンドを読み、並行に実行する
    Session,
    /// 設定ファイルの操作
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
struct FileArgs {
    /// アップロードするCSV
    file: Option<PathBuf>,

    /// ファイルダイアログで選択
    #[arg(long)]
    pick: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// 現在の設定を表示
    Show,
    /// 設定ファイルのパスを表示
    Path,
    /// 設定をデフォルトに戻す
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new()?;
    let mut config = config_manager.load_config().unwrap_or_else(|e| {
        eprintln!("⚠️ Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    apply_overrides(&mut config, &cli);

    let _log_guard = logging::init_logging(&config.log)?;
    tracing::debug!(command = ?cli.command, "🎬 Starting sentiboard");

    match cli.command {
        Command::Config { action } => run_config_action(&config_manager, &config, action),
        Command::Analyze(args) => run_single(&config, WorkflowKind::BulkAnalyze, args).await,
        Command::Train(args) => run_single(&config, WorkflowKind::Train, args).await,
        Command::Test(args) => run_single(&config, WorkflowKind::Test, args).await,
        Command::Predict { text } => {
            let (controller, dispatcher) = build(&config)?;
            let result = run_prediction(&controller, &dispatcher, &text).await;
            let ok = report(&controller, &result);
            finish(&controller, &config)?;
            ensure_applied(ok)
        }
        Command::Session => run_session(&config).await,
    }
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.server.timeout_secs = Some(timeout);
    }
    if let Some(workbook) = &cli.workbook {
        config.dashboard.workbook_path = Some(workbook.clone());
    }
    if let Some(json) = &cli.json {
        config.dashboard.snapshot_path = Some(json.clone());
    }
    if cli.no_charts {
        config.dashboard.echo_charts = false;
    }
    if let Some(level) = &cli.log_level {
        config.log.log_level = level.clone();
    }
}

fn run_config_action(
    manager: &ConfigManager,
    config: &AppConfig,
    action: ConfigAction,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{}", text);
        }
        ConfigAction::Path => println!("{}", manager.get_config_file_path().display()),
        ConfigAction::Reset => {
            manager.reset_config()?;
            println!("🔄 Configuration reset: {}", manager.get_config_file_path().display());
        }
    }
    Ok(())
}

fn build(config: &AppConfig) -> anyhow::Result<(SharedController, RequestDispatcher)> {
    let surface: Arc<dyn ChartSurface> = if config.dashboard.echo_charts {
        Arc::new(TerminalSurface::stdout())
    } else {
        Arc::new(MemorySurface::new())
    };
    let dispatcher = RequestDispatcher::http(&config.server)?;
    Ok((DashboardController::shared(surface), dispatcher))
}

async fn run_single(config: &AppConfig, workflow: WorkflowKind, args: FileArgs) -> anyhow::Result<()> {
    let (controller, dispatcher) = build(config)?;
    let file = resolve_file(workflow, args.file.as_deref(), args.pick).await?;

    let result = run_workflow(&controller, &dispatcher, workflow, file).await;
    let ok = report(&controller, &result);
    finish(&controller, config)?;
    ensure_applied(ok)
}

/// アップロード対象を決める（未指定なら None のまま送信側に判断させる）
async fn resolve_file(
    workflow: WorkflowKind,
    path: Option<&Path>,
    pick: bool,
) -> anyhow::Result<Option<FileHandle>> {
    if pick {
        let title = format!("Select CSV for {}", workflow);
        return Ok(FileHandle::pick(&title).await);
    }
    match path {
        Some(path) => {
            let file = FileHandle::open(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(Some(file))
        }
        None => Ok(None),
    }
}

/// 通知とテキスト欄を表示し、反映できたかを返す
fn report(controller: &SharedController, result: &ApplyResult) -> bool {
    let mut controller = controller.lock();
    for notice in controller.drain_notices() {
        println!("{}", notice);
    }

    match result {
        ApplyResult::Applied { ticket, .. } => {
            tracing::debug!(seq = ticket.seq, "✅ Applied");
            for line in controller.text().lines() {
                println!("{}", line);
            }
            true
        }
        ApplyResult::Stale { ticket } => {
            println!("⏭️ [{}] superseded by a newer result", ticket.action);
            true
        }
        ApplyResult::Failed { .. } => false,
    }
}

fn ensure_applied(ok: bool) -> anyhow::Result<()> {
    if ok {
        Ok(())
    } else {
        Err(anyhow!("request did not complete"))
    }
}

/// 設定された出力先へスナップショットを書き出す
fn finish(controller: &SharedController, config: &AppConfig) -> anyhow::Result<()> {
    let snapshot = DashboardSnapshot::capture(&controller.lock());
    if snapshot.is_empty() {
        return Ok(());
    }

    if let Some(path) = &config.dashboard.workbook_path {
        export_to_file(&snapshot, path)?;
        println!("💾 Workbook written: {}", path.display());
    }
    if let Some(path) = &config.dashboard.snapshot_path {
        export_to_file(&snapshot, path)?;
        println!("💾 Snapshot written: {}", path.display());
    }
    Ok(())
}

/// セッションの1コマンド
enum SessionCommand {
    Workflow(WorkflowKind, Option<PathBuf>),
    Predict(String),
    Wait,
    Save(PathBuf),
    Json,
    Status,
    Help,
    Quit,
}

fn parse_session_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let path = || (!rest.is_empty()).then(|| PathBuf::from(rest));

    match head {
        "analyze" => Ok(SessionCommand::Workflow(WorkflowKind::BulkAnalyze, path())),
        "train" => Ok(SessionCommand::Workflow(WorkflowKind::Train, path())),
        "test" => Ok(SessionCommand::Workflow(WorkflowKind::Test, path())),
        "predict" => Ok(SessionCommand::Predict(rest.to_string())),
        "wait" => Ok(SessionCommand::Wait),
        "save" if !rest.is_empty() => Ok(SessionCommand::Save(PathBuf::from(rest))),
        "save" => Err("usage: save <path.xlsx|path.json>".to_string()),
        "json" => Ok(SessionCommand::Json),
        "status" => Ok(SessionCommand::Status),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command: {}", other)),
    }
}

const SESSION_HELP: &str = "\
commands:
  analyze <csv>   bulk-analyze feedback
  train <csv>     train the model
  test <csv>      evaluate the model
  predict <text>  classify one feedback
  wait            wait for running requests
  save <path>     export dashboard (.xlsx or .json)
  json            print dashboard snapshot
  status          print text fields and chart slots
  quit            wait and exit";

/// 標準入力のコマンドを読み、各リクエストを独立したタスクとして実行する
async fn run_session(config: &AppConfig) -> anyhow::Result<()> {
    let (controller, dispatcher) = build(config)?;
    let mut tasks: JoinSet<()> = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("📋 sentiboard session (type 'help' for commands)");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_session_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("❓ {}", message);
                continue;
            }
        };

        match command {
            SessionCommand::Workflow(workflow, path) => {
                let controller = controller.clone();
                let dispatcher = dispatcher.clone();
                tasks.spawn(async move {
                    let file = match path {
                        Some(path) => match FileHandle::open(&path).await {
                            Ok(file) => Some(file),
                            Err(e) => {
                                println!("❌ [{}] {}: {}", workflow, path.display(), e);
                                return;
                            }
                        },
                        None => None,
                    };
                    let result = run_workflow(&controller, &dispatcher, workflow, file).await;
                    report(&controller, &result);
                });
            }
            SessionCommand::Predict(text) => {
                let controller = controller.clone();
                let dispatcher = dispatcher.clone();
                tasks.spawn(async move {
                    let result = run_prediction(&controller, &dispatcher, &text).await;
                    report(&controller, &result);
                });
            }
            SessionCommand::Wait => drain_tasks(&mut tasks).await,
            SessionCommand::Save(path) => {
                let snapshot = DashboardSnapshot::capture(&controller.lock());
                match export_to_file(&snapshot, &path) {
                    Ok(()) => println!("💾 Saved: {}", path.display()),
                    Err(e) => println!("❌ {}", e),
                }
            }
            SessionCommand::Json => {
                let snapshot = DashboardSnapshot::capture(&controller.lock());
                match JsonExporter::new().export(&snapshot) {
                    Ok(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
                    Err(e) => println!("❌ {}", e),
                }
            }
            SessionCommand::Status => print_status(&controller),
            SessionCommand::Help => println!("{}", SESSION_HELP),
            SessionCommand::Quit => break,
        }
    }

    drain_tasks(&mut tasks).await;
    finish(&controller, config)?;
    println!("👋 Session closed");
    Ok(())
}

async fn drain_tasks(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("❌ Session task failed: {}", e);
        }
    }
}

fn print_status(controller: &SharedController) {
    let controller = controller.lock();
    for slot in ChartSlot::ALL {
        match controller.occupant(slot) {
            Some(handle) => println!(
                "📈 {}: {} {:?} ({})",
                slot, handle.config.subtype, handle.config.data, handle.id
            ),
            None => println!("📈 {}: empty", slot),
        }
    }
    for line in controller.text().lines() {
        println!("{}", line);
    }
}
