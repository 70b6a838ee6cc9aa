//! 批量批改会话 - 流程层
//!
//! 核心职责：定义"一次批量批改"的完整生命周期
//!
//! 状态流转：
//! 1. Idle --start()--> Running --成功--> Ready
//! 2. Running --失败--> Idle（调用方随后关闭会话）
//! 3. Running --重新批改失败--> Ready（保留之前的结果和标记）
//! 4. Ready --toggle_return()--> Ready
//! 5. Idle / Ready --close()--> 会话被消费（Closed）

use serde_json::json;
use tracing::{debug, info, warn};

use crate::clients::GradingApi;
use crate::error::{ApiError, SessionError};
use crate::models::{
    AverageScores, BatchGradeRequest, BatchGradeResponse, BatchGradingResult, GradingSummary,
    ReturnFlags, StudentId,
};
use crate::services::Notifier;
use crate::workflow::session_ctx::SessionCtx;

/// 通知消息键
pub const MSG_GRADED: &str = "grading.batch.graded";
pub const MSG_GRADE_FAILED: &str = "grading.batch.failed";
pub const MSG_RETURNED: &str = "grading.batch.returned";
pub const MSG_RETURN_FAILED: &str = "grading.batch.return_failed";

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// 尚未批改（或批改失败）
    Idle,
    /// 批改请求进行中
    Running,
    /// 已拿到批改结果
    Ready,
}

/// 批改请求凭据
///
/// 只有最近一次发出的请求的响应会被采用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradingTicket(u64);

/// start() 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// 批改完成
    Graded { count: usize },
    /// 批改失败，调用方应关闭会话
    Failed,
    /// 重新批改失败，之前的结果和标记保持不变，会话仍可使用
    RegradeFailed,
    /// 响应已过期（有更新的请求，或会话已关闭），被丢弃
    Superseded,
}

/// close() 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// 没有需要退回的学生，未发请求
    NothingToReturn,
    /// 退回标记已提交
    Returned { count: usize },
    /// 退回标记提交失败（会话仍然关闭）
    ReturnFailed { count: usize },
}

/// 批量批改会话
///
/// - 持有批改结果和退回标记
/// - 不持有网络资源，接口和通知都由调用方传入
/// - close() 消费会话，关闭后无法再操作
#[derive(Debug)]
pub struct BatchGradingSession {
    ctx: SessionCtx,
    phase: SessionPhase,
    results: Option<Vec<BatchGradingResult>>,
    total_students: u32,
    return_flags: ReturnFlags,
    latest_ticket: u64,
}

impl BatchGradingSession {
    /// 创建新的会话（空结果、空标记）
    pub fn new(ctx: SessionCtx) -> Self {
        Self {
            ctx,
            phase: SessionPhase::Idle,
            results: None,
            total_students: 0,
            return_flags: ReturnFlags::new(),
            latest_ticket: 0,
        }
    }

    pub fn ctx(&self) -> SessionCtx {
        self.ctx
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// 批改结果，批改完成前为 None
    pub fn results(&self) -> Option<&[BatchGradingResult]> {
        self.results.as_deref()
    }

    pub fn return_flags(&self) -> &ReturnFlags {
        &self.return_flags
    }

    pub fn is_marked(&self, student_id: StudentId) -> bool {
        self.return_flags.get(&student_id).copied().unwrap_or(false)
    }

    /// 被标记为退回订正的学生
    pub fn marked_students(&self) -> Vec<StudentId> {
        self.return_flags
            .iter()
            .filter(|(_, marked)| **marked)
            .map(|(id, _)| *id)
            .collect()
    }

    /// 执行批量批改
    ///
    /// 失败时会发出错误通知并返回 `StartOutcome::Failed`，不会向上抛出错误
    pub async fn start(&mut self, api: &dyn GradingApi, notifier: &dyn Notifier) -> StartOutcome {
        let (ticket, request) = self.begin_grading();
        let result = api.batch_grade(self.ctx.assignment_id, &request).await;
        self.finish_grading(ticket, result, notifier)
    }

    /// 发起批改：进入 Running 并生成请求体
    ///
    /// 批改请求总是携带空的退回标记
    pub fn begin_grading(&mut self) -> (GradingTicket, BatchGradeRequest) {
        if self.phase == SessionPhase::Running {
            warn!("{} 上一次批改尚未返回，新的请求将覆盖它", self.ctx);
        }

        self.latest_ticket += 1;
        self.phase = SessionPhase::Running;
        info!("{} 🚀 开始批量批改", self.ctx);

        (
            GradingTicket(self.latest_ticket),
            BatchGradeRequest::grade(self.ctx.classroom_id),
        )
    }

    /// 处理批改响应
    pub fn finish_grading(
        &mut self,
        ticket: GradingTicket,
        result: Result<BatchGradeResponse, ApiError>,
        notifier: &dyn Notifier,
    ) -> StartOutcome {
        if ticket.0 != self.latest_ticket {
            debug!(
                "{} 丢弃过期的批改响应 (#{}, 最新 #{})",
                self.ctx, ticket.0, self.latest_ticket
            );
            return StartOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let count = response.results.len();
                // 结果整体替换，标记只保留仍在新结果中的学生
                self.return_flags
                    .retain(|id, _| response.results.iter().any(|r| r.student_id == *id));
                self.total_students = response.total_students;
                self.results = Some(response.results);
                self.phase = SessionPhase::Ready;

                info!("{} ✓ 批量批改完成，共 {} 名学生", self.ctx, count);
                notifier.success(MSG_GRADED, json!({ "count": count }));
                StartOutcome::Graded { count }
            }
            Err(source) => {
                let err = SessionError::GradingRequestFailed {
                    assignment_id: self.ctx.assignment_id,
                    source,
                };
                warn!("{} ❌ {}", self.ctx, err);
                notifier.error(MSG_GRADE_FAILED, json!({ "error": err.to_string() }));

                if self.results.is_some() {
                    self.phase = SessionPhase::Ready;
                    info!("{} 保留上一次的批改结果和退回标记", self.ctx);
                    return StartOutcome::RegradeFailed;
                }

                self.total_students = 0;
                self.return_flags.clear();
                self.phase = SessionPhase::Idle;
                StartOutcome::Failed
            }
        }
    }

    /// 切换学生的退回订正标记，返回切换后的值
    pub fn toggle_return(&mut self, student_id: StudentId) -> Result<bool, SessionError> {
        let results = self.results.as_ref().ok_or(SessionError::ResultsNotReady)?;
        if !results.iter().any(|r| r.student_id == student_id) {
            return Err(SessionError::UnknownStudent(student_id));
        }

        let flag = self.return_flags.entry(student_id).or_insert(false);
        *flag = !*flag;
        debug!("{} 学生 {} 退回标记: {}", self.ctx, student_id, *flag);
        Ok(*flag)
    }

    /// 四项指标的平均分，没有结果时全为 0
    pub fn average_scores(&self) -> AverageScores {
        AverageScores::from_results(self.results().unwrap_or_default())
    }

    pub fn summary(&self) -> GradingSummary {
        GradingSummary::from_results(self.total_students, self.results().unwrap_or_default())
    }

    /// 关闭会话
    ///
    /// 有退回标记时提交一次（尽力而为），无论成功与否都会调用 `on_complete`
    pub async fn close<F>(
        self,
        api: &dyn GradingApi,
        notifier: &dyn Notifier,
        on_complete: F,
    ) -> CloseOutcome
    where
        F: FnOnce(),
    {
        let marked = self.marked_students().len();

        let outcome = if marked == 0 {
            debug!("{} 没有需要退回的学生，跳过提交", self.ctx);
            CloseOutcome::NothingToReturn
        } else {
            info!("{} 📤 正在提交 {} 名学生的退回订正...", self.ctx, marked);
            let request =
                BatchGradeRequest::return_for_correction(self.ctx.classroom_id, self.return_flags.clone());

            match api.batch_grade(self.ctx.assignment_id, &request).await {
                Ok(_) => {
                    info!("{} ✓ 退回订正已提交", self.ctx);
                    notifier.success(MSG_RETURNED, json!({ "count": marked }));
                    CloseOutcome::Returned { count: marked }
                }
                Err(source) => {
                    let err = SessionError::CorrectionPersistFailed {
                        assignment_id: self.ctx.assignment_id,
                        count: marked,
                        source,
                    };
                    warn!("{} ⚠️ {}", self.ctx, err);
                    notifier.error(
                        MSG_RETURN_FAILED,
                        json!({ "count": marked, "error": err.to_string() }),
                    );
                    CloseOutcome::ReturnFailed { count: marked }
                }
            }
        };

        info!("{} 批改会话已结束", self.ctx);
        on_complete();
        outcome
    }
}
