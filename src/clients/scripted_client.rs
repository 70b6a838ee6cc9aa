/// 内存中的批改接口实现
///
/// 按顺序返回预设的响应并记录所有请求，用于离线演示和测试
use crate::clients::GradingApi;
use crate::error::ApiError;
use crate::models::{BatchGradeRequest, BatchGradeResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// 一条预设响应
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    pub outcome: Result<BatchGradeResponse, (u16, String)>,
    /// 返回前的延迟，用于模拟慢请求
    pub delay: Duration,
}

impl ScriptedReply {
    pub fn ok(response: BatchGradeResponse) -> Self {
        Self {
            outcome: Ok(response),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(status: u16, message: impl Into<String>) -> Self {
        Self {
            outcome: Err((status, message.into())),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// 已记录的请求
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub assignment_id: i64,
    pub body: BatchGradeRequest,
}

#[derive(Debug, Default)]
pub struct ScriptedGradingApi {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedGradingApi {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 追加一条预设响应
    pub fn push(&self, reply: ScriptedReply) {
        lock(&self.replies).push_back(reply);
    }

    /// 已收到的请求快照
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl GradingApi for ScriptedGradingApi {
    async fn batch_grade(
        &self,
        assignment_id: i64,
        request: &BatchGradeRequest,
    ) -> Result<BatchGradeResponse, ApiError> {
        let endpoint = format!("/api/teachers/assignments/{}/batch-grade", assignment_id);

        lock(&self.requests).push(RecordedRequest {
            assignment_id,
            body: request.clone(),
        });
        let reply = lock(&self.replies).pop_front();

        let Some(reply) = reply else {
            return Err(ApiError::BadResponse {
                endpoint,
                status: 503,
                message: Some("no scripted reply".to_string()),
            });
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        reply.outcome.map_err(|(status, message)| ApiError::BadResponse {
            endpoint,
            status,
            message: Some(message),
        })
    }
}
