// Role -> permission/section allow-lists
//
// Every role enumerates its full allow-list; there is no inheritance and no
// union across roles.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Manager,
    Redacteur,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Manager => "manager",
            Role::Redacteur => "redacteur",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(Role::SuperAdmin),
            "manager" => Some(Role::Manager),
            "redacteur" => Some(Role::Redacteur),
            _ => None,
        }
    }

    /// Fine-grained permission tags granted to this role
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::SuperAdmin => &[
                ViewAllDashboard,
                ManageScenarios,
                ManageGeneration,
                ManageTemplates,
                ManageSettings,
                ManageUsers,
                ManageWebhooks,
                ManageApiKeys,
                ViewSystemLogs,
                ManagePrompts,
            ],
            Role::Manager => &[
                ViewAllDashboard,
                ViewScenarios,
                ManageGeneration,
                ManageTemplates,
                ViewProjects,
                ManagePrompts,
                ViewCampaigns,
            ],
            Role::Redacteur => &[
                ViewOwnDashboard,
                UseGeneration,
                ViewTemplates,
                ViewOwnPrompts,
                ViewScenarios,
            ],
        }
    }

    /// UI sections visible to this role
    pub fn sections(&self) -> &'static [Section] {
        use Section::*;
        match self {
            Role::SuperAdmin => &[
                Dashboard, Scenarios, Generation, Templates, Projects, History, Webhooks,
                Settings, Users, Campaigns,
            ],
            Role::Manager => &[
                Dashboard, Scenarios, Generation, Templates, Projects, History, Campaigns,
            ],
            Role::Redacteur => &[Dashboard, Generation, Templates, History],
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn can_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.can(*p))
    }

    /// Guard helper for mutation routes
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_any(&self, permissions: &[Permission]) -> Result<()> {
        if self.can_any(permissions) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewAllDashboard,
    ViewOwnDashboard,
    ManageScenarios,
    ViewScenarios,
    ManageGeneration,
    UseGeneration,
    ManageTemplates,
    ViewTemplates,
    ManageSettings,
    ManageUsers,
    ManageWebhooks,
    ManageApiKeys,
    ViewSystemLogs,
    ManagePrompts,
    ViewOwnPrompts,
    ViewProjects,
    ViewCampaigns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Scenarios,
    Generation,
    Templates,
    Projects,
    History,
    Webhooks,
    Settings,
    Users,
    Campaigns,
}
