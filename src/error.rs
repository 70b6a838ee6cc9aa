use thiserror::Error;

use crate::models::grading::StudentId;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 批量批改会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（连接失败、超时等）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回非 2xx 响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 批量批改会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 首次批改请求失败，会话需要被关闭后重新打开
    #[error("批量批改请求失败 (作业: {assignment_id}): {source}")]
    GradingRequestFailed {
        assignment_id: i64,
        #[source]
        source: ApiError,
    },
    /// 关闭时提交退回标记失败（不阻塞关闭）
    #[error("退回订正提交失败 (作业: {assignment_id}, 学生数: {count}): {source}")]
    CorrectionPersistFailed {
        assignment_id: i64,
        count: usize,
        #[source]
        source: ApiError,
    },
    /// 批改结果尚未返回
    #[error("批改结果尚未就绪")]
    ResultsNotReady,
    /// 学生不在当前批改结果中
    #[error("学生 {0} 不在当前批改结果中")]
    UnknownStudent(StudentId),
    /// 当前没有打开的会话
    #[error("当前没有打开的批改会话")]
    NoActiveSession,
    /// 当前身份无权执行此操作
    #[error("角色 {role} 无权执行: {capability}")]
    PermissionDenied { role: String, capability: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
}

// ========== 便捷构造函数 ==========

impl ApiError {
    /// 创建API请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建JSON解析失败错误
    pub fn json_parse_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::JsonParseFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
