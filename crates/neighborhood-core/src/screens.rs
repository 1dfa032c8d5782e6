//! Screen catalogue and view gating.
//!
//! Each screen decides two things from the session's capability set: whether
//! the screen opens at all (otherwise the caller is redirected), and which
//! management controls it shows. Hiding a control is not a substitute for
//! the action-layer check in `store`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::auth::SessionContext;
use crate::permissions::{Permissions, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Login,
    Dashboard,
    Residents,
    SecuritySchedule,
    Feedback,
    Announcements,
}

impl Screen {
    /// Screens listed in the sidebar, in display order.
    pub const MENU: [Screen; 5] = [
        Screen::Dashboard,
        Screen::Residents,
        Screen::SecuritySchedule,
        Screen::Feedback,
        Screen::Announcements,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Screen::Login => "/login",
            Screen::Dashboard => "/dashboard",
            Screen::Residents => "/residents",
            Screen::SecuritySchedule => "/security-schedule",
            Screen::Feedback => "/feedback",
            Screen::Announcements => "/announcements",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Dashboard => "Dashboard",
            Screen::Residents => "Manajemen Warga",
            Screen::SecuritySchedule => "Jadwal Keamanan",
            Screen::Feedback => "Feedback",
            Screen::Announcements => "Pengumuman",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Screen::Login => "🔑",
            Screen::Dashboard => "🏠",
            Screen::Residents => "👥",
            Screen::SecuritySchedule => "🔐",
            Screen::Feedback => "💬",
            Screen::Announcements => "📢",
        }
    }

    /// Whether a session with these permissions may open the screen.
    pub fn can_open(&self, permissions: &Permissions) -> bool {
        match self {
            Screen::Login | Screen::Dashboard => true,
            Screen::Residents => permissions.can_view_residents,
            Screen::SecuritySchedule => permissions.can_view_schedule,
            Screen::Feedback => permissions.can_view_feedback || permissions.can_submit_feedback,
            Screen::Announcements => permissions.can_view_announcements,
        }
    }

    /// Sidebar visibility. Narrower than `can_open` for the schedule, which
    /// residents can open by path but do not see in the menu.
    pub fn in_menu_for(&self, role: Role) -> bool {
        match self {
            Screen::Login => false,
            Screen::Dashboard | Screen::Announcements => true,
            Screen::Residents => role == Role::Admin,
            Screen::SecuritySchedule => matches!(role, Role::Admin | Role::Security),
            Screen::Feedback => matches!(role, Role::Admin | Role::Resident),
        }
    }

    fn affordances(&self, permissions: &Permissions) -> Affordances {
        let manage = match self {
            Screen::Residents => permissions.can_manage_residents,
            Screen::SecuritySchedule => permissions.can_manage_schedule,
            Screen::Announcements => permissions.can_manage_announcements,
            Screen::Feedback => permissions.can_manage_feedback,
            Screen::Dashboard => permissions.can_manage_residents,
            Screen::Login => false,
        };
        let is_feedback = *self == Screen::Feedback;
        Affordances {
            can_create: if is_feedback {
                permissions.can_submit_feedback
            } else {
                manage
            },
            can_edit: manage && !is_feedback,
            can_delete: manage,
            can_reply: manage && is_feedback,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Screen {
    type Err = String;

    /// Accepts a route path (`/security-schedule`) or a bare name (`schedule`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('/').to_lowercase().as_str() {
            "login" => Ok(Screen::Login),
            "" | "dashboard" => Ok(Screen::Dashboard),
            "residents" => Ok(Screen::Residents),
            "security-schedule" | "schedule" => Ok(Screen::SecuritySchedule),
            "feedback" => Ok(Screen::Feedback),
            "announcements" => Ok(Screen::Announcements),
            other => Err(format!("Unknown screen: {}", other)),
        }
    }
}

/// Management controls a screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Affordances {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_reply: bool,
}

impl Affordances {
    pub fn any(&self) -> bool {
        self.can_create || self.can_edit || self.can_delete || self.can_reply
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAccess {
    Granted(Affordances),
    Redirect(Screen),
}

/// Decide what happens when the session navigates to `screen`.
///
/// Without a session every screen but login redirects to login; a screen the
/// role cannot view redirects to the dashboard.
pub fn open_screen(session: Option<&SessionContext>, screen: Screen) -> ScreenAccess {
    let ctx = match session {
        Some(ctx) => ctx,
        None if screen == Screen::Login => return ScreenAccess::Granted(Affordances::default()),
        None => return ScreenAccess::Redirect(Screen::Login),
    };

    if screen.can_open(ctx.permissions()) {
        ScreenAccess::Granted(screen.affordances(ctx.permissions()))
    } else {
        ScreenAccess::Redirect(Screen::Dashboard)
    }
}

/// Sidebar entries for a role.
pub fn menu_for(role: Role) -> Vec<Screen> {
    Screen::MENU
        .iter()
        .copied()
        .filter(|s| s.in_menu_for(role))
        .collect()
}
