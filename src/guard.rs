use crate::permissions::Permission;
use crate::router::Route;
use crate::session::{Session, SessionStatus};

/// Access rule attached to a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Public,
    Protected { required: Option<Permission> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    Redirect(Route),
    Pending,
}

impl Guard {
    pub fn protected() -> Self {
        Guard::Protected { required: None }
    }

    pub fn requires(permission: Permission) -> Self {
        Guard::Protected {
            required: Some(permission),
        }
    }

    /// Decide from the session alone; re-run whenever the session changes
    pub fn check(&self, session: &Session) -> GuardOutcome {
        let required = match self {
            Guard::Public => return GuardOutcome::Render,
            Guard::Protected { required } => required,
        };

        match session.status {
            SessionStatus::Loading => GuardOutcome::Pending,
            SessionStatus::Unauthenticated => GuardOutcome::Redirect(Route::Auth),
            SessionStatus::Authenticated => match required {
                Some(permission) if !session.has_permission(permission) => {
                    GuardOutcome::Redirect(Route::DEFAULT)
                }
                _ => GuardOutcome::Render,
            },
        }
    }
}
