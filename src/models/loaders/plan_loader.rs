use crate::models::grading::StudentId;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;

/// 退回订正计划
///
/// ```toml
/// return_for_correction = [2, 5]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CorrectionPlan {
    #[serde(default)]
    pub return_for_correction: Vec<StudentId>,
}

impl CorrectionPlan {
    pub fn is_empty(&self) -> bool {
        self.return_for_correction.is_empty()
    }

    /// 去重后的学生列表，重复出现的学生只退回一次
    pub fn students(&self) -> BTreeSet<StudentId> {
        self.return_for_correction.iter().copied().collect()
    }
}

/// 从 TOML 文件加载退回订正计划
pub async fn load_correction_plan(toml_file_path: &Path) -> Result<CorrectionPlan> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let plan: CorrectionPlan = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    tracing::info!(
        "已加载退回计划 {}: {} 名学生",
        toml_file_path.display(),
        plan.return_for_correction.len()
    );

    Ok(plan)
}
