/// 批改 API 客户端
///
/// 封装所有与教师端批量批改接口相关的调用逻辑
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{BatchGradeRequest, BatchGradeResponse, SessionContext};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// 批量批改接口
///
/// 批改和提交退回标记走同一个接口，只有请求体中的 `return_for_correction` 不同
#[async_trait]
pub trait GradingApi: Send + Sync {
    async fn batch_grade(
        &self,
        assignment_id: i64,
        request: &BatchGradeRequest,
    ) -> Result<BatchGradeResponse, ApiError>;
}

/// 基于 reqwest 的批改客户端
pub struct HttpGradingClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpGradingClient {
    /// 创建新的批改客户端
    pub fn new(config: &Config, context: &SessionContext) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::request_failed(&config.api_base_url, e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: context.token().to_string(),
        })
    }

    /// 批量批改接口地址
    pub fn endpoint(&self, assignment_id: i64) -> String {
        format!(
            "{}/api/teachers/assignments/{}/batch-grade",
            self.base_url, assignment_id
        )
    }
}

#[async_trait]
impl GradingApi for HttpGradingClient {
    async fn batch_grade(
        &self,
        assignment_id: i64,
        request: &BatchGradeRequest,
    ) -> Result<BatchGradeResponse, ApiError> {
        let endpoint = self.endpoint(assignment_id);

        debug!(
            "POST {} (班级: {}, 退回标记: {} 条)",
            endpoint,
            request.classroom_id,
            request.return_for_correction.len()
        );

        let mut builder = self.client.post(&endpoint).json(request);
        if !self.token.is_empty() {
            builder = builder.bearer_auth(&self.token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("批改接口返回错误 ({}): {}", status, body);
            return Err(ApiError::BadResponse {
                endpoint,
                status: status.as_u16(),
                message: if body.is_empty() { None } else { Some(body) },
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::request_failed(&endpoint, e))?;

        let parsed: BatchGradeResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::json_parse_failed(&endpoint, e))?;

        debug!("批改接口返回 {} 条结果", parsed.results.len());

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = Config {
            api_base_url: "https://edu.example.com/".to_string(),
            ..Config::default()
        };
        let client = HttpGradingClient::new(&config, &SessionContext::new("t", Role::Teacher)).unwrap();

        assert_eq!(
            client.endpoint(42),
            "https://edu.example.com/api/teachers/assignments/42/batch-grade"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_failed() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let client = HttpGradingClient::new(&config, &SessionContext::new("t", Role::Teacher)).unwrap();

        let err = client
            .batch_grade(1, &BatchGradeRequest::grade(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed { .. }));
    }
}
