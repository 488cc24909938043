//! ダッシュボードコントローラー
//!
//! ワークフローごとにチケット（世代番号）を発行し、応答をテキスト欄と
//! チャートスロットへ振り分ける。後から発行されたチケットの結果が既に
//! 反映済みの表示先に対しては、古い応答を破棄する。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::api::{
    DispatchError, FileHandle, Prediction, RequestDispatcher, SentimentSummary, WorkflowKind,
    WorkflowOutcome,
};
use crate::dashboard::chart::{ChartHandle, ChartSlot, ChartSubtype, InstanceId, LabelStyle};
use crate::dashboard::slots::{ChartSlotManager, RenderError};
use crate::dashboard::summary::TextSummary;
use crate::dashboard::surface::ChartSurface;

/// 複数タスクから共有するコントローラー
pub type SharedController = Arc<Mutex<DashboardController>>;

/// ユーザー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum Action {
    #[display("{_0}")]
    Workflow(WorkflowKind),
    #[display("predict")]
    Predict,
}

/// 応答で書き換わる表示先
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Target {
    Slot(ChartSlot),
    Numbers,
    TestOverall,
    TrainStatus,
    Prediction,
}

impl Action {
    fn targets(&self) -> Vec<Target> {
        let mut targets: Vec<Target> = match self {
            Action::Workflow(workflow) => workflow
                .touched_slots()
                .iter()
                .map(|slot| Target::Slot(*slot))
                .collect(),
            Action::Predict => Vec::new(),
        };

        targets.push(match self {
            Action::Workflow(WorkflowKind::BulkAnalyze) => Target::Numbers,
            Action::Workflow(WorkflowKind::Test) => Target::TestOverall,
            Action::Workflow(WorkflowKind::Train) => Target::TrainStatus,
            Action::Predict => Target::Prediction,
        });
        targets
    }
}

/// 1回の操作に発行される世代番号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub seq: u64,
    pub action: Action,
}

/// ユーザーへの通知種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    /// ブロッキングなアラート相当
    Alert,
    /// インラインのステータス表示
    Status,
    /// 通信失敗
    TransportFailure,
    /// 描画失敗
    RenderFailure,
}

/// ユーザーへの通知
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub action: Action,
    pub message: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl Notice {
    fn new(kind: NoticeKind, action: Action, message: impl Into<String>) -> Self {
        Self {
            kind,
            action,
            message: message.into(),
            at: chrono::Utc::now(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.kind {
            NoticeKind::Alert => "🔔",
            NoticeKind::Status => "ℹ️",
            NoticeKind::TransportFailure => "⚠️",
            NoticeKind::RenderFailure => "🖼️",
        };
        write!(f, "{} [{}] {}", icon, self.action, self.message)
    }
}

/// 応答反映の結果
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyResult {
    /// 反映済み（新しく束縛されたインスタンス）
    Applied {
        ticket: Ticket,
        instances: Vec<InstanceId>,
    },
    /// より新しい結果が反映済みのため破棄
    Stale { ticket: Ticket },
    /// 失敗を通知
    Failed { ticket: Ticket, notice: Notice },
}

impl ApplyResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyResult::Applied { .. })
    }
}

/// スロット・テキスト欄・通知をまとめて管理
pub struct DashboardController {
    slots: ChartSlotManager,
    text: TextSummary,
    next_seq: u64,
    last_applied: HashMap<Target, u64>,
    notices: Vec<Notice>,
}

impl DashboardController {
    pub fn new(surface: Arc<dyn ChartSurface>) -> Self {
        Self {
            slots: ChartSlotManager::new(surface),
            text: TextSummary::new(),
            next_seq: 1,
            last_applied: HashMap::new(),
            notices: Vec::new(),
        }
    }

    pub fn shared(surface: Arc<dyn ChartSurface>) -> SharedController {
        Arc::new(Mutex::new(Self::new(surface)))
    }

    /// 操作開始時にチケットを発行
    pub fn issue(&mut self, action: Action) -> Ticket {
        let ticket = Ticket {
            seq: self.next_seq,
            action,
        };
        self.next_seq += 1;
        debug!(seq = ticket.seq, action = %action, "🎫 Ticket issued");
        ticket
    }

    /// ワークフロー応答を反映
    pub fn apply_workflow(
        &mut self,
        ticket: Ticket,
        result: Result<WorkflowOutcome, DispatchError>,
    ) -> ApplyResult {
        let workflow = match ticket.action {
            Action::Workflow(workflow) => workflow,
            Action::Predict => {
                let notice = Notice::new(
                    NoticeKind::Alert,
                    ticket.action,
                    "workflow result applied to a predict ticket",
                );
                return self.fail(ticket, notice);
            }
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => return self.reject(ticket, err),
        };

        if self.is_stale(ticket) {
            return self.discard(ticket);
        }

        let instances = match (workflow, outcome) {
            (WorkflowKind::Train, WorkflowOutcome::Trained(ack)) => {
                if let Some(message) = &ack.message {
                    debug!("🧠 Train acknowledged: {}", message);
                }
                self.text.set_train_success();
                Ok(Vec::new())
            }
            (WorkflowKind::BulkAnalyze, WorkflowOutcome::Summary(summary)) => {
                self.text.apply_bulk(&summary);
                self.render_bulk(&summary)
            }
            (WorkflowKind::Test, WorkflowOutcome::Summary(summary)) => {
                self.text.apply_test(&summary);
                self.render_test(&summary)
            }
            (workflow, outcome) => {
                let notice = Notice::new(
                    NoticeKind::TransportFailure,
                    ticket.action,
                    format!("unexpected {:?} outcome for {}", outcome, workflow),
                );
                return self.fail(ticket, notice);
            }
        };

        self.mark_applied(ticket);

        match instances {
            Ok(instances) => {
                info!(seq = ticket.seq, workflow = %workflow, "✅ Workflow result applied");
                ApplyResult::Applied { ticket, instances }
            }
            Err(err) => {
                error!(seq = ticket.seq, error = %err, "❌ Chart rendering failed");
                let notice = Notice::new(NoticeKind::RenderFailure, ticket.action, err.to_string());
                self.fail(ticket, notice)
            }
        }
    }

    /// 単一判定の応答を反映
    pub fn apply_prediction(
        &mut self,
        ticket: Ticket,
        result: Result<Prediction, DispatchError>,
    ) -> ApplyResult {
        let prediction = match result {
            Ok(prediction) => prediction,
            Err(err) => return self.reject(ticket, err),
        };

        if self.is_stale(ticket) {
            return self.discard(ticket);
        }

        self.text.apply_prediction(&prediction);
        self.mark_applied(ticket);
        ApplyResult::Applied {
            ticket,
            instances: Vec::new(),
        }
    }

    /// 一括分析：分布スロットに円、件数比較スロットに棒
    fn render_bulk(&mut self, summary: &SentimentSummary) -> Result<Vec<InstanceId>, RenderError> {
        let pie = self
            .slots
            .render(ChartSlot::Distribution, ChartSubtype::Pie, summary, LabelStyle::Plain)?
            .id;
        let bar = self
            .slots
            .render(ChartSlot::CountComparison, ChartSubtype::Bar, summary, LabelStyle::Plain)?
            .id;
        Ok(vec![pie, bar])
    }

    /// モデル評価：分布スロットのみドーナツで更新し、件数比較スロットは残す
    fn render_test(&mut self, summary: &SentimentSummary) -> Result<Vec<InstanceId>, RenderError> {
        let doughnut = self
            .slots
            .render(
                ChartSlot::Distribution,
                ChartSubtype::Doughnut,
                summary,
                LabelStyle::Emoji,
            )?
            .id;
        Ok(vec![doughnut])
    }

    fn is_stale(&self, ticket: Ticket) -> bool {
        ticket.action.targets().iter().any(|target| {
            self.last_applied
                .get(target)
                .is_some_and(|applied| *applied > ticket.seq)
        })
    }

    fn mark_applied(&mut self, ticket: Ticket) {
        for target in ticket.action.targets() {
            self.last_applied.insert(target, ticket.seq);
        }
    }

    fn discard(&self, ticket: Ticket) -> ApplyResult {
        warn!(
            seq = ticket.seq,
            action = %ticket.action,
            "⏭️ Discarding stale response"
        );
        ApplyResult::Stale { ticket }
    }

    /// ディスパッチ失敗を通知に変換（表示状態には触れない）
    fn reject(&mut self, ticket: Ticket, err: DispatchError) -> ApplyResult {
        let notice = match (&err, ticket.action) {
            (DispatchError::UserInput(message), action) => {
                Notice::new(NoticeKind::Alert, action, message.clone())
            }
            (DispatchError::Application(message), Action::Workflow(WorkflowKind::Train)) => {
                if !self.is_stale(ticket) {
                    self.text.set_train_failure(message);
                    self.mark_applied(ticket);
                }
                Notice::new(NoticeKind::Status, ticket.action, format!("❌ {}", message))
            }
            (DispatchError::Application(message), action) => {
                Notice::new(NoticeKind::Alert, action, message.clone())
            }
            (DispatchError::Transport(transport), action) => Notice::new(
                NoticeKind::TransportFailure,
                action,
                format!("Network error: {}", transport),
            ),
        };
        self.fail(ticket, notice)
    }

    fn fail(&mut self, ticket: Ticket, notice: Notice) -> ApplyResult {
        self.notices.push(notice.clone());
        ApplyResult::Failed { ticket, notice }
    }

    pub fn text(&self) -> &TextSummary {
        &self.text
    }

    pub fn slots(&self) -> &ChartSlotManager {
        &self.slots
    }

    pub fn occupant(&self, slot: ChartSlot) -> Option<&ChartHandle> {
        self.slots.occupant(slot)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// 通知を取り出して空にする
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

/// ワークフローを1回実行して反映する
///
/// ロックは発行時と反映時だけ取り、通信中は保持しない。
pub async fn run_workflow(
    controller: &SharedController,
    dispatcher: &RequestDispatcher,
    workflow: WorkflowKind,
    file: Option<FileHandle>,
) -> ApplyResult {
    let ticket = controller.lock().issue(Action::Workflow(workflow));
    let result = dispatcher.submit(workflow, file.as_ref()).await;
    controller.lock().apply_workflow(ticket, result)
}

/// 単一判定を1回実行して反映する
pub async fn run_prediction(
    controller: &SharedController,
    dispatcher: &RequestDispatcher,
    feedback: &str,
) -> ApplyResult {
    let ticket = controller.lock().issue(Action::Predict);
    let result = dispatcher.predict(feedback).await;
    controller.lock().apply_prediction(ticket, result)
}
