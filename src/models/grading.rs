//! 批量批改相关的数据结构
//!
//! 字段命名与服务端 JSON 保持一致（snake_case）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 学生ID（服务端整数ID）
pub type StudentId = i64;

/// 退回订正标记表
///
/// 未出现的学生视为 `false`
pub type ReturnFlags = BTreeMap<StudentId, bool>;

/// 学生作业状态（由服务端设置）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GradingStatus {
    /// 已批改
    Graded,
    /// 已退回订正
    Returned,
}

impl GradingStatus {
    /// 获取显示名称
    pub fn name(self) -> &'static str {
        match self {
            GradingStatus::Graded => "已批改",
            GradingStatus::Returned => "已退回",
        }
    }
}

impl std::fmt::Display for GradingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 单个学生的批改结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchGradingResult {
    pub student_id: StudentId,
    pub student_name: String,
    /// 总分，通常在 0-100 之间（客户端不做校验）
    pub total_score: f64,
    /// 缺失/未批改的小题数量
    pub missing_items_count: u32,
    pub avg_pronunciation: f64,
    pub avg_accuracy: f64,
    pub avg_fluency: f64,
    pub avg_completeness: f64,
    pub status: GradingStatus,
}

/// 批量批改请求体
///
/// 批改和提交退回标记共用同一个请求结构，只有 `return_for_correction` 不同
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchGradeRequest {
    pub classroom_id: i64,
    #[serde(default)]
    pub return_for_correction: ReturnFlags,
}

impl BatchGradeRequest {
    /// 重新批改（不改变任何学生状态）
    pub fn grade(classroom_id: i64) -> Self {
        Self {
            classroom_id,
            return_for_correction: ReturnFlags::new(),
        }
    }

    /// 提交退回订正标记
    pub fn return_for_correction(classroom_id: i64, flags: ReturnFlags) -> Self {
        Self {
            classroom_id,
            return_for_correction: flags,
        }
    }
}

/// 批量批改响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchGradeResponse {
    pub total_students: u32,
    #[serde(default)]
    pub results: Vec<BatchGradingResult>,
}

/// 四项指标的平均分
///
/// 计算时保留完整精度，只在显示时保留一位小数
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AverageScores {
    pub avg_accuracy: f64,
    pub avg_fluency: f64,
    pub avg_pronunciation: f64,
    pub avg_completeness: f64,
}

impl AverageScores {
    /// 计算结果列表的算术平均值，空列表返回全 0
    pub fn from_results(results: &[BatchGradingResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut sum = Self::default();
        for r in results {
            sum.avg_accuracy += r.avg_accuracy;
            sum.avg_fluency += r.avg_fluency;
            sum.avg_pronunciation += r.avg_pronunciation;
            sum.avg_completeness += r.avg_completeness;
        }

        let n = results.len() as f64;
        Self {
            avg_accuracy: sum.avg_accuracy / n,
            avg_fluency: sum.avg_fluency / n,
            avg_pronunciation: sum.avg_pronunciation / n,
            avg_completeness: sum.avg_completeness / n,
        }
    }
}

impl std::fmt::Display for AverageScores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "准确度 {:.1} | 流利度 {:.1} | 发音 {:.1} | 完整度 {:.1}",
            self.avg_accuracy, self.avg_fluency, self.avg_pronunciation, self.avg_completeness
        )
    }
}

/// 批改结果汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GradingSummary {
    pub total_students: u32,
    pub graded: usize,
    pub returned: usize,
    /// 存在缺失小题的学生数
    pub with_missing_items: usize,
    pub avg_total_score: f64,
}

impl GradingSummary {
    pub fn from_results(total_students: u32, results: &[BatchGradingResult]) -> Self {
        let graded = results
            .iter()
            .filter(|r| r.status == GradingStatus::Graded)
            .count();
        let avg_total_score = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.total_score).sum::<f64>() / results.len() as f64
        };

        Self {
            total_students,
            graded,
            returned: results.len() - graded,
            with_missing_items: results.iter().filter(|r| r.missing_items_count > 0).count(),
            avg_total_score,
        }
    }
}
