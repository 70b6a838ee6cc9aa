//! 批改会话上下文
//!
//! 封装"我正在批改哪个班级的哪份作业"这一信息

use std::fmt::Display;

/// 批改会话上下文
///
/// 会话生命周期内不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionCtx {
    /// 作业ID
    pub assignment_id: i64,

    /// 班级ID
    pub classroom_id: i64,
}

impl SessionCtx {
    /// 创建新的会话上下文
    pub fn new(assignment_id: i64, classroom_id: i64) -> Self {
        Self {
            assignment_id,
            classroom_id,
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[作业 ID#{} 班级 ID#{}]",
            self.assignment_id, self.classroom_id
        )
    }
}
