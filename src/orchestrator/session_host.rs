//! 批改会话宿主 - 编排层
//!
//! ## 职责
//!
//! 1. **打开/重开**：每次打开都创建全新的会话（结果、标记清空）
//! 2. **权限检查**：打开前检查当前身份是否具备批量批改能力
//! 3. **过期响应丢弃**：网络请求期间不持锁，响应返回时核对代数，
//!    已关闭或已重开的会话不会被迟到的响应"复活"
//! 4. **自动关闭**：首次批改失败后由宿主关闭会话
//! 5. **完成回调**：每次会话关闭都调用一次 `on_complete`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clients::GradingApi;
use crate::error::SessionError;
use crate::models::{
    AverageScores, BatchGradingResult, Capability, GradingSummary, SessionContext, StudentId,
};
use crate::services::Notifier;
use crate::workflow::{BatchGradingSession, CloseOutcome, SessionCtx, StartOutcome};

/// 会话结束回调
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// 视图可见性变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// 打开某份作业的批改视图
    Open(SessionCtx),
    /// 关闭批改视图
    Closed,
}

struct ActiveSession {
    generation: u64,
    session: BatchGradingSession,
}

/// 批改会话宿主
pub struct GradingSessionHost {
    api: Arc<dyn GradingApi>,
    notifier: Arc<dyn Notifier>,
    context: SessionContext,
    on_complete: CompletionCallback,
    slot: Mutex<Option<ActiveSession>>,
    generation: AtomicU64,
}

impl GradingSessionHost {
    pub fn new(
        api: Arc<dyn GradingApi>,
        notifier: Arc<dyn Notifier>,
        context: SessionContext,
        on_complete: CompletionCallback,
    ) -> Self {
        Self {
            api,
            notifier,
            context,
            on_complete,
            slot: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// 处理视图可见性变化：打开即开始批改，关闭即结束会话
    pub async fn on_visibility_change(&self, visibility: Visibility) -> Result<(), SessionError> {
        match visibility {
            Visibility::Open(ctx) => {
                self.open(ctx).await?;
                self.start().await?;
            }
            Visibility::Closed => {
                self.close().await?;
            }
        }
        Ok(())
    }

    /// 打开新会话，已有会话被直接丢弃（不提交标记）
    pub async fn open(&self, ctx: SessionCtx) -> Result<(), SessionError> {
        self.context.require(Capability::BatchGrade)?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self.slot.lock().await.replace(ActiveSession {
            generation,
            session: BatchGradingSession::new(ctx),
        });

        if let Some(previous) = previous {
            warn!(
                "{} 会话被重新打开，旧会话 {} 已丢弃",
                ctx,
                previous.session.ctx()
            );
        }
        info!("{} 打开批改会话 (#{})", ctx, generation);
        Ok(())
    }

    /// 对当前会话执行批改
    ///
    /// 请求期间不持锁；尚无结果时批改失败会自动关闭会话，
    /// 重新批改失败则保留已有结果和标记
    pub async fn start(&self) -> Result<StartOutcome, SessionError> {
        let (generation, ticket, request, ctx) = {
            let mut slot = self.slot.lock().await;
            let active = slot.as_mut().ok_or(SessionError::NoActiveSession)?;
            let (ticket, request) = active.session.begin_grading();
            (active.generation, ticket, request, active.session.ctx())
        };

        let result = self.api.batch_grade(ctx.assignment_id, &request).await;

        let outcome = {
            let mut slot = self.slot.lock().await;
            match slot.as_mut() {
                Some(active) if active.generation == generation => {
                    active
                        .session
                        .finish_grading(ticket, result, self.notifier.as_ref())
                }
                _ => {
                    debug!("{} 会话已关闭或已重开，丢弃批改响应", ctx);
                    StartOutcome::Superseded
                }
            }
        };

        if outcome == StartOutcome::Failed {
            info!("{} 批改失败，自动关闭会话", ctx);
            self.close_generation(generation).await;
        }

        Ok(outcome)
    }

    /// 切换当前会话中某个学生的退回标记
    pub async fn toggle_return(&self, student_id: StudentId) -> Result<bool, SessionError> {
        self.context.require(Capability::ReturnForCorrection)?;
        let mut slot = self.slot.lock().await;
        let active = slot.as_mut().ok_or(SessionError::NoActiveSession)?;
        active.session.toggle_return(student_id)
    }

    pub async fn average_scores(&self) -> Result<AverageScores, SessionError> {
        self.with_session(|s| s.average_scores()).await
    }

    pub async fn summary(&self) -> Result<GradingSummary, SessionError> {
        self.with_session(|s| s.summary()).await
    }

    /// 当前批改结果的快照
    pub async fn results(&self) -> Result<Option<Vec<BatchGradingResult>>, SessionError> {
        self.with_session(|s| s.results().map(|r| r.to_vec())).await
    }

    pub async fn is_open(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// 关闭当前会话
    pub async fn close(&self) -> Result<CloseOutcome, SessionError> {
        let active = self
            .slot
            .lock()
            .await
            .take()
            .ok_or(SessionError::NoActiveSession)?;

        Ok(self.finish(active).await)
    }

    /// 只关闭指定代数的会话，避免误关重开后的新会话
    async fn close_generation(&self, generation: u64) {
        let active = {
            let mut slot = self.slot.lock().await;
            if matches!(slot.as_ref(), Some(active) if active.generation == generation) {
                slot.take()
            } else {
                None
            }
        };

        if let Some(active) = active {
            self.finish(active).await;
        }
    }

    async fn finish(&self, active: ActiveSession) -> CloseOutcome {
        let on_complete = Arc::clone(&self.on_complete);
        active
            .session
            .close(self.api.as_ref(), self.notifier.as_ref(), move || on_complete())
            .await
    }

    async fn with_session<T>(
        &self,
        f: impl FnOnce(&BatchGradingSession) -> T,
    ) -> Result<T, SessionError> {
        let slot = self.slot.lock().await;
        let active = slot.as_ref().ok_or(SessionError::NoActiveSession)?;
        Ok(f(&active.session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ScriptedGradingApi, ScriptedReply};
    use crate::models::{BatchGradeResponse, GradingStatus, Role};
    use crate::services::RecordingNotifier;
    use crate::workflow::batch_grading_session::MSG_GRADED;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn response(ids: &[StudentId]) -> BatchGradeResponse {
        BatchGradeResponse {
            total_students: ids.len() as u32,
            results: ids
                .iter()
                .map(|id| BatchGradingResult {
                    student_id: *id,
                    student_name: format!("学生{}", id),
                    total_score: 80.0,
                    missing_items_count: 0,
                    avg_pronunciation: 80.0,
                    avg_accuracy: 80.0,
                    avg_fluency: 80.0,
                    avg_completeness: 80.0,
                    status: GradingStatus::Graded,
                })
                .collect(),
        }
    }

    struct Fixture {
        api: Arc<ScriptedGradingApi>,
        notifier: Arc<RecordingNotifier>,
        completed: Arc<AtomicUsize>,
        host: GradingSessionHost,
    }

    fn fixture(role: Role, replies: Vec<ScriptedReply>) -> Fixture {
        let api = Arc::new(ScriptedGradingApi::new(replies));
        let notifier = Arc::new(RecordingNotifier::new());
        let completed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completed);
        let host = GradingSessionHost::new(
            api.clone(),
            notifier.clone(),
            SessionContext::new("token", role),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        Fixture {
            api,
            notifier,
            completed,
            host,
        }
    }

    #[tokio::test]
    async fn test_student_cannot_open() {
        let f = fixture(Role::Student, vec![]);
        let err = f.host.open(SessionCtx::new(1, 1)).await.unwrap_err();
        assert!(matches!(err, SessionError::PermissionDenied { .. }));
        assert!(!f.host.is_open().await);
    }

    #[tokio::test]
    async fn test_reopen_resets_state() {
        let f = fixture(
            Role::Teacher,
            vec![
                ScriptedReply::ok(response(&[1, 2])),
                ScriptedReply::ok(response(&[1, 2])),
            ],
        );

        f.host
            .on_visibility_change(Visibility::Open(SessionCtx::new(1, 1)))
            .await
            .unwrap();
        f.host.toggle_return(2).await.unwrap();
        f.host
            .on_visibility_change(Visibility::Closed)
            .await
            .unwrap();
        assert_eq!(f.completed.load(Ordering::SeqCst), 1);

        f.host.open(SessionCtx::new(1, 1)).await.unwrap();
        assert!(f.host.results().await.unwrap().is_none());
        assert_eq!(
            f.host.average_scores().await.unwrap(),
            AverageScores::default()
        );
        // 旧会话的标记不会带到新会话
        assert!(matches!(
            f.host.toggle_return(2).await,
            Err(SessionError::ResultsNotReady)
        ));
    }

    #[tokio::test]
    async fn test_failed_start_auto_closes() {
        let f = fixture(Role::Teacher, vec![ScriptedReply::fail(500, "down")]);

        f.host
            .on_visibility_change(Visibility::Open(SessionCtx::new(1, 1)))
            .await
            .unwrap();

        assert!(!f.host.is_open().await);
        assert_eq!(f.completed.load(Ordering::SeqCst), 1);
        assert_eq!(f.api.request_count(), 1);
        assert!(matches!(
            f.host.close().await,
            Err(SessionError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_failed_regrade_keeps_session_open() {
        let f = fixture(
            Role::Teacher,
            vec![
                ScriptedReply::ok(response(&[1, 2])),
                ScriptedReply::fail(500, "down"),
                ScriptedReply::ok(response(&[1, 2])),
            ],
        );
        f.host
            .on_visibility_change(Visibility::Open(SessionCtx::new(1, 1)))
            .await
            .unwrap();
        f.host.toggle_return(2).await.unwrap();

        assert_eq!(f.host.start().await.unwrap(), StartOutcome::RegradeFailed);
        assert!(f.host.is_open().await);
        assert_eq!(f.completed.load(Ordering::SeqCst), 0);
        assert_eq!(f.host.results().await.unwrap().unwrap().len(), 2);

        assert_eq!(
            f.host.close().await.unwrap(),
            CloseOutcome::Returned { count: 1 }
        );
        assert_eq!(f.api.request_count(), 3);
        assert_eq!(f.completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_late_response_after_close_is_discarded() {
        let f = fixture(
            Role::Teacher,
            vec![ScriptedReply::ok(response(&[1])).after(Duration::from_millis(50))],
        );
        f.host.open(SessionCtx::new(1, 1)).await.unwrap();

        let (start, close) = tokio::join!(f.host.start(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            f.host.close().await
        });

        assert_eq!(start.unwrap(), StartOutcome::Superseded);
        assert_eq!(close.unwrap(), CloseOutcome::NothingToReturn);
        assert!(!f.host.is_open().await);
        assert!(f.notifier.last(MSG_GRADED).is_none());
        assert_eq!(f.completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_late_response_after_reopen_is_discarded() {
        let f = fixture(
            Role::Teacher,
            vec![
                ScriptedReply::ok(response(&[1, 2, 3])).after(Duration::from_millis(50)),
                ScriptedReply::ok(response(&[4])),
            ],
        );
        f.host.open(SessionCtx::new(1, 1)).await.unwrap();

        let (first, second) = tokio::join!(f.host.start(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            f.host.open(SessionCtx::new(2, 1)).await.unwrap();
            f.host.start().await
        });

        assert_eq!(first.unwrap(), StartOutcome::Superseded);
        assert_eq!(second.unwrap(), StartOutcome::Graded { count: 1 });
        let results = f.host.results().await.unwrap().unwrap();
        assert_eq!(results[0].student_id, 4);
    }

    #[tokio::test]
    async fn test_overlapping_starts_latest_request_wins() {
        let f = fixture(
            Role::Teacher,
            vec![
                ScriptedReply::ok(response(&[1, 2])).after(Duration::from_millis(10)),
                ScriptedReply::ok(response(&[3])).after(Duration::from_millis(50)),
            ],
        );
        f.host.open(SessionCtx::new(1, 1)).await.unwrap();

        let (first, second) = tokio::join!(f.host.start(), f.host.start());

        assert_eq!(first.unwrap(), StartOutcome::Superseded);
        assert_eq!(second.unwrap(), StartOutcome::Graded { count: 1 });
        assert_eq!(f.host.summary().await.unwrap().total_students, 1);
    }

    #[tokio::test]
    async fn test_operations_without_session() {
        let f = fixture(Role::Teacher, vec![]);
        assert!(matches!(
            f.host.start().await,
            Err(SessionError::NoActiveSession)
        ));
        assert!(matches!(
            f.host.toggle_return(1).await,
            Err(SessionError::NoActiveSession)
        ));
        assert_eq!(f.completed.load(Ordering::SeqCst), 0);
    }
}
