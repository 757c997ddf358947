//! Access control seam for privileged operations
//!
//! Tariff changes are restricted to administrators. The policy is a trait so
//! the CLI can run with a permissive implementation while a deployment that
//! fronts this layer with real accounts can plug its own in.

use parqueo_types::{Error, Result};

/// Operator role attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Employee,
    Admin,
}

/// Decides whether the current caller may act with the given role
pub trait AccessPolicy: Send + Sync {
    fn require(&self, role: Role) -> Result<()>;
}

/// Policy that grants every role; used by the local CLI
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn require(&self, _role: Role) -> Result<()> {
        Ok(())
    }
}

/// Policy bound to one fixed role
pub struct FixedRole(pub Role);

impl AccessPolicy for FixedRole {
    fn require(&self, role: Role) -> Result<()> {
        match (self.0, role) {
            (Role::Admin, _) | (Role::Employee, Role::Employee) => Ok(()),
            (Role::Employee, Role::Admin) => Err(Error::Unauthorized(
                "administrator role required".to_string(),
            )),
        }
    }
}
