//! 会话身份上下文
//!
//! 显式注入到需要身份/权限的组件中，替代全局的 token 存储

use std::collections::HashSet;

use crate::error::SessionError;
use crate::models::role::{Capability, Role};

/// 当前登录身份
///
/// 能力集合在创建时根据角色计算一次
#[derive(Debug, Clone)]
pub struct SessionContext {
    token: String,
    role: Role,
    capabilities: HashSet<Capability>,
}

impl SessionContext {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
            capabilities: role.capabilities().iter().copied().collect(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// 检查能力，不满足时返回 `PermissionDenied`
    pub fn require(&self, capability: Capability) -> Result<(), SessionError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(SessionError::PermissionDenied {
                role: self.role.to_string(),
                capability: capability.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_capability() {
        let ctx = SessionContext::new("t", Role::Student);
        assert!(ctx.require(Capability::ViewOwnResults).is_ok());
        assert!(matches!(
            ctx.require(Capability::BatchGrade),
            Err(SessionError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_capabilities_follow_role() {
        let ctx = SessionContext::new("teacher-token", Role::Teacher);

        assert_eq!(ctx.token(), "teacher-token");
        assert_eq!(ctx.role(), Role::Teacher);
        assert!(ctx.can(Capability::BatchGrade));
        assert!(!ctx.can(Capability::ManageSubscriptions));
    }
}
