//! 命令行入口流程
//!
//! 配置 → 客户端 → 宿主 → 批改 → 应用退回计划 → 关闭

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::clients::{GradingApi, HttpGradingClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{load_correction_plan, BatchGradingResult, CorrectionPlan};
use crate::orchestrator::session_host::{GradingSessionHost, Visibility};
use crate::services::{Notifier, TracingNotifier};
use crate::utils::logging;
use crate::workflow::SessionCtx;

/// 应用主结构
pub struct App {
    config: Config,
    ctx: SessionCtx,
    host: GradingSessionHost,
}

impl App {
    /// 初始化应用
    ///
    /// 缺少作业ID/班级ID或无法创建 HTTP 客户端时失败
    pub fn initialize(config: Config) -> AppResult<Self> {
        let client = HttpGradingClient::new(&config, &config.session_context())?;
        Self::with_api(config, Arc::new(client), Arc::new(TracingNotifier))
    }

    /// 使用指定的批改接口和通知器创建应用
    pub fn with_api(
        config: Config,
        api: Arc<dyn GradingApi>,
        notifier: Arc<dyn Notifier>,
    ) -> AppResult<Self> {
        let ctx = config.session_ctx()?;
        let host = GradingSessionHost::new(
            api,
            notifier,
            config.session_context(),
            Arc::new(|| info!("✓ 批改视图已关闭")),
        );

        Ok(Self { config, ctx, host })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        logging::log_startup(&self.ctx, &self.config.api_base_url);

        let plan = self.load_plan().await?;

        self.host
            .on_visibility_change(Visibility::Open(self.ctx))
            .await?;

        // 批改失败时宿主已经关闭了会话
        if !self.host.is_open().await {
            anyhow::bail!("{} 批量批改失败，会话已关闭", self.ctx);
        }

        let results = self.host.results().await?.unwrap_or_default();
        logging::log_results_table(&results);

        if plan.is_empty() {
            info!("未配置退回计划，不退回任何学生");
        } else {
            self.apply_plan(&plan, &results).await?;
        }

        let summary = self.host.summary().await?;
        let averages = self.host.average_scores().await?;
        let outcome = self.host.close().await?;

        logging::print_session_summary(&summary, &averages, &outcome);

        Ok(())
    }

    /// 按计划标记退回，计划中重复的学生只标记一次
    async fn apply_plan(&self, plan: &CorrectionPlan, results: &[BatchGradingResult]) -> Result<()> {
        for student_id in plan.students() {
            if results.iter().any(|r| r.student_id == student_id) {
                self.host.toggle_return(student_id).await?;
            } else {
                warn!("⚠️ 退回计划中的学生 {} 不在批改结果中，已跳过", student_id);
            }
        }
        Ok(())
    }

    /// 加载退回计划（未配置时为空）
    async fn load_plan(&self) -> Result<CorrectionPlan> {
        match &self.config.return_plan_file {
            Some(path) => load_correction_plan(Path::new(path)).await,
            None => Ok(CorrectionPlan::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ScriptedGradingApi, ScriptedReply};
    use crate::models::{BatchGradeRequest, BatchGradeResponse, GradingStatus};
    use crate::services::RecordingNotifier;
    use serde_json::json;

    fn response(ids: &[i64]) -> BatchGradeResponse {
        BatchGradeResponse {
            total_students: ids.len() as u32,
            results: ids
                .iter()
                .map(|id| BatchGradingResult {
                    student_id: *id,
                    student_name: format!("学生{}", id),
                    total_score: 70.0,
                    missing_items_count: 0,
                    avg_pronunciation: 70.0,
                    avg_accuracy: 70.0,
                    avg_fluency: 70.0,
                    avg_completeness: 70.0,
                    status: GradingStatus::Graded,
                })
                .collect(),
        }
    }

    async fn write_plan(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        tokio::fs::write(&path, content).await.unwrap();
        path.display().to_string()
    }

    fn config(plan: Option<String>) -> Config {
        Config {
            assignment_id: Some(31),
            classroom_id: Some(9),
            return_plan_file: plan,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_run_returns_each_planned_student_once() {
        let plan = write_plan("plan-dup", "return_for_correction = [2, 2, 7]\n").await;
        let api = Arc::new(ScriptedGradingApi::default());
        api.push(ScriptedReply::ok(response(&[1, 2])));
        api.push(ScriptedReply::ok(response(&[1, 2])));

        let app = App::with_api(
            config(Some(plan.clone())),
            api.clone(),
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap();
        let result = app.run().await;
        let _ = tokio::fs::remove_file(&plan).await;
        result.unwrap();

        let requests = api.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, BatchGradeRequest::grade(9));
        assert_eq!(
            serde_json::to_value(&requests[1].body).unwrap(),
            json!({ "classroom_id": 9, "return_for_correction": { "2": true } })
        );
    }

    #[tokio::test]
    async fn test_run_without_plan_sends_only_grading_request() {
        let api = Arc::new(ScriptedGradingApi::new([ScriptedReply::ok(response(&[1, 2]))]));
        let app = App::with_api(config(None), api.clone(), Arc::new(RecordingNotifier::new())).unwrap();

        app.run().await.unwrap();
        assert_eq!(api.request_count(), 1);
    }

    #[tokio::test]
    async fn test_run_fails_when_grading_fails() {
        let api = Arc::new(ScriptedGradingApi::new([ScriptedReply::fail(500, "down")]));
        let app = App::with_api(config(None), api.clone(), Arc::new(RecordingNotifier::new())).unwrap();

        assert!(app.run().await.is_err());
        assert_eq!(api.request_count(), 1);
    }

    #[test]
    fn test_missing_ids_rejected() {
        let api = Arc::new(ScriptedGradingApi::default());
        let err = App::with_api(Config::default(), api, Arc::new(RecordingNotifier::new()));
        assert!(err.is_err());
    }
}
