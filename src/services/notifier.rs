//! 通知服务 - 业务能力层
//!
//! 只负责"告诉用户发生了什么"，发出即忘，不返回任何结果

use serde_json::Value as JsonValue;
use std::sync::Mutex;
use tracing::{error, info};

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// 一条通知
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    /// 消息键（例如 `grading.batch.graded`）
    pub message: String,
    /// 消息参数（例如 `{"count": 2}`）
    pub params: JsonValue,
}

/// 通知接口
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str, params: JsonValue);
    fn error(&self, message: &str, params: JsonValue);
}

/// 将通知写入日志
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str, params: JsonValue) {
        info!("✅ {} {}", message, params);
    }

    fn error(&self, message: &str, params: JsonValue) {
        error!("❌ {} {}", message, params);
    }
}

/// 记录所有通知，供调用方事后检查
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收到的通知快照
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// 按消息键查找最后一条通知
    pub fn last(&self, message: &str) -> Option<Notification> {
        self.lock().iter().rev().find(|n| n.message == message).cloned()
    }

    fn push(&self, level: NotificationLevel, message: &str, params: JsonValue) {
        self.lock().push(Notification {
            level,
            message: message.to_string(),
            params,
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str, params: JsonValue) {
        self.push(NotificationLevel::Success, message, params);
    }

    fn error(&self, message: &str, params: JsonValue) {
        self.push(NotificationLevel::Error, message, params);
    }
}
