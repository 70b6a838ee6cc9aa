use crate::error::ConfigError;
use crate::models::{Role, SessionContext};
use crate::workflow::SessionCtx;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 批改 API 配置 ---
    pub api_base_url: String,
    pub api_token: String,
    /// 当前登录角色
    pub role: Role,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 会话绑定 ---
    pub assignment_id: Option<i64>,
    pub classroom_id: Option<i64>,
    /// 退回订正计划文件（TOML）
    pub return_plan_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: String::new(),
            role: Role::Teacher,
            request_timeout_secs: 60,
            assignment_id: None,
            classroom_id: None,
            return_plan_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("GRADING_API_BASE_URL").unwrap_or(default.api_base_url),
            api_token: std::env::var("GRADING_API_TOKEN").unwrap_or(default.api_token),
            role: std::env::var("GRADING_ROLE").ok().and_then(|v| Role::parse(&v)).unwrap_or(default.role),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            assignment_id: std::env::var("ASSIGNMENT_ID").ok().and_then(|v| v.parse().ok()),
            classroom_id: std::env::var("CLASSROOM_ID").ok().and_then(|v| v.parse().ok()),
            return_plan_file: std::env::var("RETURN_PLAN_FILE").ok().filter(|v| !v.is_empty()),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 当前登录身份
    pub fn session_context(&self) -> SessionContext {
        SessionContext::new(self.api_token.clone(), self.role)
    }

    /// 根据配置构建会话绑定，作业ID和班级ID都必须存在
    pub fn session_ctx(&self) -> Result<SessionCtx, ConfigError> {
        let assignment_id = self.assignment_id.ok_or_else(|| ConfigError::EnvVarNotFound {
            var_name: "ASSIGNMENT_ID".to_string(),
        })?;
        let classroom_id = self.classroom_id.ok_or_else(|| ConfigError::EnvVarNotFound {
            var_name: "CLASSROOM_ID".to_string(),
        })?;
        Ok(SessionCtx::new(assignment_id, classroom_id))
    }
}
