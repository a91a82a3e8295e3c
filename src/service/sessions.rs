use dashmap::DashMap;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::ScanConfig;
use crate::error::SessionError;
use crate::models::{ScanContext, SessionId};
use crate::service::aggregator::ScanAggregator;

/// 扫码会话表: 同一会话的请求由分片锁串行化，不同会话互不影响
pub struct SessionRegistry {
    sessions: DashMap<SessionId, ScanAggregator>,
    config: ScanConfig,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ScanConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
            clock,
        }
    }

    /// 开启新会话
    pub fn open(&self, context: ScanContext) -> SessionId {
        let id = SessionId::new();
        let aggregator = ScanAggregator::with_clock(context, &self.config, self.clock.clone());
        self.sessions.insert(id, aggregator);
        tracing::info!(session_id = %id, context = %context, "Scan session opened");
        id
    }

    /// 结束会话，丢弃其全部状态
    pub fn close(&self, id: SessionId) -> Result<(), SessionError> {
        match self.sessions.remove(&id) {
            Some((_, aggregator)) => {
                tracing::info!(
                    session_id = %id,
                    lines = aggregator.product_count(),
                    "Scan session closed"
                );
                Ok(())
            }
            None => Err(SessionError::NotFound(id)),
        }
    }

    /// 在指定会话上执行操作
    pub fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut ScanAggregator) -> T,
    ) -> Result<T, SessionError> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        Ok(f(session.value_mut()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
