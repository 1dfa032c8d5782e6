use serde::{Deserialize, Serialize};

use super::Role;

/// Capability set for one role. Every flag is explicit for every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_view_residents: bool,
    pub can_manage_residents: bool,
    pub can_view_schedule: bool,
    pub can_manage_schedule: bool,
    pub can_view_announcements: bool,
    pub can_manage_announcements: bool,
    pub can_view_feedback: bool,
    pub can_manage_feedback: bool,
    pub can_submit_reports: bool,
    pub can_view_reports: bool,
    pub can_submit_feedback: bool,
}

/// RT/RW: full management access, but does not file reports or feedback.
const ADMIN: Permissions = Permissions {
    can_view_residents: true,
    can_manage_residents: true,
    can_view_schedule: true,
    can_manage_schedule: true,
    can_view_announcements: true,
    can_manage_announcements: true,
    can_view_feedback: true,
    can_manage_feedback: true,
    can_submit_reports: false,
    can_view_reports: true,
    can_submit_feedback: false,
};

const SECURITY: Permissions = Permissions {
    can_view_residents: false,
    can_manage_residents: false,
    can_view_schedule: true,
    can_manage_schedule: false,
    can_view_announcements: true,
    can_manage_announcements: false,
    can_view_feedback: false,
    can_manage_feedback: false,
    can_submit_reports: true,
    can_view_reports: false,
    can_submit_feedback: false,
};

const RESIDENT: Permissions = Permissions {
    can_view_residents: false,
    can_manage_residents: false,
    can_view_schedule: true,
    can_manage_schedule: false,
    can_view_announcements: true,
    can_manage_announcements: false,
    can_view_feedback: false,
    can_manage_feedback: false,
    can_submit_reports: false,
    can_view_reports: false,
    can_submit_feedback: true,
};

impl Permissions {
    /// Resolve the capability set for a role.
    pub const fn for_role(role: Role) -> Permissions {
        match role {
            Role::Admin => ADMIN,
            Role::Security => SECURITY,
            Role::Resident => RESIDENT,
        }
    }

    /// Check a single capability flag by name.
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::ViewResidents => self.can_view_residents,
            Permission::ManageResidents => self.can_manage_residents,
            Permission::ViewSchedule => self.can_view_schedule,
            Permission::ManageSchedule => self.can_manage_schedule,
            Permission::ViewAnnouncements => self.can_view_announcements,
            Permission::ManageAnnouncements => self.can_manage_announcements,
            Permission::ViewFeedback => self.can_view_feedback,
            Permission::ManageFeedback => self.can_manage_feedback,
            Permission::SubmitReports => self.can_submit_reports,
            Permission::ViewReports => self.can_view_reports,
            Permission::SubmitFeedback => self.can_submit_feedback,
        }
    }

    /// All granted permissions, in declaration order.
    pub fn granted(&self) -> Vec<Permission> {
        Permission::ALL
            .iter()
            .copied()
            .filter(|p| self.allows(*p))
            .collect()
    }
}

impl From<Role> for Permissions {
    fn from(role: Role) -> Self {
        Permissions::for_role(role)
    }
}

/// Name of one capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewResidents,
    ManageResidents,
    ViewSchedule,
    ManageSchedule,
    ViewAnnouncements,
    ManageAnnouncements,
    ViewFeedback,
    ManageFeedback,
    SubmitReports,
    ViewReports,
    SubmitFeedback,
}

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::ViewResidents,
        Permission::ManageResidents,
        Permission::ViewSchedule,
        Permission::ManageSchedule,
        Permission::ViewAnnouncements,
        Permission::ManageAnnouncements,
        Permission::ViewFeedback,
        Permission::ManageFeedback,
        Permission::SubmitReports,
        Permission::ViewReports,
        Permission::SubmitFeedback,
    ];

    /// Field name as used by the web front-end.
    pub fn key(&self) -> &'static str {
        match self {
            Permission::ViewResidents => "canViewResidents",
            Permission::ManageResidents => "canManageResidents",
            Permission::ViewSchedule => "canViewSchedule",
            Permission::ManageSchedule => "canManageSchedule",
            Permission::ViewAnnouncements => "canViewAnnouncements",
            Permission::ManageAnnouncements => "canManageAnnouncements",
            Permission::ViewFeedback => "canViewFeedback",
            Permission::ManageFeedback => "canManageFeedback",
            Permission::SubmitReports => "canSubmitReports",
            Permission::ViewReports => "canViewReports",
            Permission::SubmitFeedback => "canSubmitFeedback",
        }
    }
}
