/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// 教师
    Teacher,
    /// 学生
    Student,
    /// 管理员
    Admin,
}

/// 角色能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Capability {
    /// 批量批改作业
    BatchGrade,
    /// 退回学生作业订正
    ReturnForCorrection,
    /// 查看自己的成绩
    ViewOwnResults,
    /// 管理用户
    ManageUsers,
    /// 管理订阅
    ManageSubscriptions,
}

const TEACHER_CAPABILITIES: &[Capability] = &[
    Capability::BatchGrade,
    Capability::ReturnForCorrection,
    Capability::ViewOwnResults,
];

const STUDENT_CAPABILITIES: &[Capability] =
    &[Capability::ViewOwnResults, Capability::ManageSubscriptions];

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::BatchGrade,
    Capability::ReturnForCorrection,
    Capability::ViewOwnResults,
    Capability::ManageUsers,
    Capability::ManageSubscriptions,
];

impl Role {
    /// 获取角色的能力表
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Teacher => TEACHER_CAPABILITIES,
            Role::Student => STUDENT_CAPABILITIES,
            Role::Admin => ADMIN_CAPABILITIES,
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Role::Teacher => "教师",
            Role::Student => "学生",
            Role::Admin => "管理员",
        }
    }

    /// 从字符串解析角色（不区分大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "teacher" | "教师" => Some(Role::Teacher),
            "student" | "学生" => Some(Role::Student),
            "admin" | "管理员" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Capability {
    pub fn name(self) -> &'static str {
        match self {
            Capability::BatchGrade => "批量批改",
            Capability::ReturnForCorrection => "退回订正",
            Capability::ViewOwnResults => "查看成绩",
            Capability::ManageUsers => "管理用户",
            Capability::ManageSubscriptions => "管理订阅",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
