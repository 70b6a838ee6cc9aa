//! 编排层（Orchestration Layer）
//!
//! ### `session_host` - 批改会话宿主
//! - 响应视图打开/关闭
//! - 每次打开创建全新会话，丢弃过期响应
//! - 会话结束时调用完成回调
//!
//! ### `app` - 命令行入口流程
//! - 加载配置和退回计划
//! - 打开会话、批改、应用退回计划、关闭
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! session_host (打开/关闭/过期响应)
//!     ↓
//! workflow::BatchGradingSession (单次批改会话)
//!     ↓
//! clients / services (批改接口 / 通知)
//! ```

pub mod app;
pub mod session_host;

pub use app::App;
pub use session_host::{CompletionCallback, GradingSessionHost, Visibility};
