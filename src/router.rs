use std::fmt;

use serde::Serialize;
use tokio::sync::watch;

use crate::guard::{Guard, GuardOutcome};
use crate::permissions::Permission;
use crate::session::Session;

/// Every location the console can show
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "route", content = "path", rename_all = "snake_case")]
pub enum Route {
    Auth,
    Login,
    Dashboard,
    Incidents,
    Sos,
    Alerts,
    Map,
    Reports,
    Personnel,
    Settings,
    NotFound(String),
}

/// How a route is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    Guarded(Guard),
    /// Alias kept so old links land somewhere sensible
    Redirect(Route),
}

/// Outcome of resolving one location against the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(Route),
    /// Session still loading; render nothing yet
    Pending,
}

impl Route {
    pub const DEFAULT: Route = Route::Dashboard;

    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Route::Auth,
            "/login" => Route::Login,
            "/dashboard" => Route::Dashboard,
            "/incidents" => Route::Incidents,
            "/sos" => Route::Sos,
            "/alerts" => Route::Alerts,
            "/map" => Route::Map,
            "/reports" => Route::Reports,
            "/personnel" => Route::Personnel,
            "/settings" => Route::Settings,
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Auth => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Incidents => "/incidents",
            Route::Sos => "/sos",
            Route::Alerts => "/alerts",
            Route::Map => "/map",
            Route::Reports => "/reports",
            Route::Personnel => "/personnel",
            Route::Settings => "/settings",
            Route::NotFound(path) => path,
        }
    }

    pub fn access(&self) -> RouteAccess {
        match self {
            Route::Auth | Route::NotFound(_) => RouteAccess::Guarded(Guard::Public),
            Route::Login => RouteAccess::Redirect(Route::Auth),
            Route::Settings => RouteAccess::Redirect(Route::Dashboard),
            Route::Personnel => RouteAccess::Guarded(Guard::requires(Permission::ManageUsers)),
            Route::Dashboard
            | Route::Incidents
            | Route::Sos
            | Route::Alerts
            | Route::Map
            | Route::Reports => RouteAccess::Guarded(Guard::protected()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Resolve a route against a session snapshot. Pure: no I/O.
pub fn resolve(route: &Route, session: &Session) -> Resolution {
    match route.access() {
        RouteAccess::Redirect(target) => Resolution::Redirect(target),
        RouteAccess::Guarded(guard) => match guard.check(session) {
            GuardOutcome::Render => Resolution::Render(route.clone()),
            GuardOutcome::Redirect(target) => Resolution::Redirect(target),
            GuardOutcome::Pending => Resolution::Pending,
        },
    }
}

/// Current location. Written by the session provider and the console.
#[derive(Debug)]
pub struct Navigator {
    location: watch::Sender<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Auth)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (location, _) = watch::channel(initial);
        Self { location }
    }

    pub fn current(&self) -> Route {
        self.location.borrow().clone()
    }

    /// Replace the current location
    pub fn replace(&self, route: Route) {
        let previous = self.location.send_replace(route.clone());
        if previous != route {
            tracing::debug!("Navigate {} -> {}", previous, route);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.location.subscribe()
    }
}
