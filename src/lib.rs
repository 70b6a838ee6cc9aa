//! # Batch Grading
//!
//! 教师端批量批改会话客户端
//!
//! ## 架构设计
//!
//! ### ① 接口层（Clients）
//! - `clients/` - 批改接口的抽象与实现
//! - `GradingApi` - 批量批改接口（批改 / 提交退回标记共用）
//! - `HttpGradingClient` - 基于 reqwest 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 通知能力，发出即忘
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次批量批改"的完整生命周期
//! - `SessionCtx` - 上下文封装（assignment_id + classroom_id）
//! - `BatchGradingSession` - 批改 → 标记退回 → 关闭时提交
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_host` - 会话打开/重开/关闭，丢弃过期响应
//! - `orchestrator/app` - 命令行入口流程
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GradingApi, HttpGradingClient};
pub use config::Config;
pub use error::{ApiError, AppError, AppResult, SessionError};
pub use models::{AverageScores, BatchGradingResult, Role, SessionContext};
pub use orchestrator::{App, GradingSessionHost, Visibility};
pub use services::{Notifier, TracingNotifier};
pub use workflow::{BatchGradingSession, CloseOutcome, SessionCtx, StartOutcome};
