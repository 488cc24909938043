//! メモリ上のサーフェス（ヘッドレス実行・検証用）

use std::sync::Arc;

use parking_lot::Mutex;

use super::ChartSurface;
use crate::dashboard::chart::{ChartConfig, ChartHandle, ChartSlot, InstanceId};
use crate::dashboard::slots::RenderError;

#[derive(Debug, Default)]
struct MemoryState {
    live: Vec<(InstanceId, ChartSlot, ChartConfig)>,
    created: u64,
    destroyed: u64,
    fail_next: Option<String>,
}

/// 生存中のインスタンスを記録するサーフェス
///
/// Clone したハンドル同士は同じ状態を共有する。
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定スロットで生存中のインスタンス
    pub fn live_in(&self, slot: ChartSlot) -> Vec<(InstanceId, ChartConfig)> {
        self.state
            .lock()
            .live
            .iter()
            .filter(|(_, s, _)| *s == slot)
            .map(|(id, _, config)| (*id, config.clone()))
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn is_live(&self, id: InstanceId) -> bool {
        self.state.lock().live.iter().any(|(live, _, _)| *live == id)
    }

    pub fn created_count(&self) -> u64 {
        self.state.lock().created
    }

    pub fn destroyed_count(&self) -> u64 {
        self.state.lock().destroyed
    }

    /// 次回の生成を失敗させる
    pub fn fail_next_create(&self, reason: impl Into<String>) {
        self.state.lock().fail_next = Some(reason.into());
    }
}

impl ChartSurface for MemorySurface {
    fn create(&self, slot: ChartSlot, config: ChartConfig) -> Result<ChartHandle, RenderError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_next.take() {
            return Err(RenderError::Surface(reason));
        }

        let handle = ChartHandle::new(slot, config);
        state.live.push((handle.id, slot, handle.config.clone()));
        state.created += 1;
        Ok(handle)
    }

    fn destroy(&self, handle: ChartHandle) {
        let mut state = self.state.lock();
        let before = state.live.len();
        state.live.retain(|(id, _, _)| *id != handle.id);

        if state.live.len() == before {
            tracing::warn!(instance = %handle.id, "⚠️ Destroying an instance that is not live");
            return;
        }
        state.destroyed += 1;
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
