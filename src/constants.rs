use serde::Serialize;

use crate::permissions::Permission;
use crate::router::Route;

pub const APP_NAME: &str = "Beacon";
pub const APP_DESCRIPTION: &str = "Public Safety Admin Dashboard";

/// Sidebar entry; `required` hides it from principals without that permission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
    pub required: Option<Permission>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavGroup {
    pub category: &'static str,
    pub items: Vec<NavItem>,
}

fn item(route: Route, label: &'static str) -> NavItem {
    NavItem {
        route,
        label,
        required: None,
    }
}

pub fn nav_groups() -> Vec<NavGroup> {
    vec![
        NavGroup {
            category: "COMMAND",
            items: vec![
                item(Route::Dashboard, "Overview"),
                item(Route::Sos, "Live Operations"),
                item(Route::Incidents, "Incidents"),
            ],
        },
        NavGroup {
            category: "ANALYSIS",
            items: vec![
                item(Route::Map, "Map View"),
                item(Route::Reports, "Reports"),
                NavItem {
                    route: Route::Personnel,
                    label: "Personnel",
                    required: Some(Permission::ManageUsers),
                },
            ],
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    pub tile_url: &'static str,
}

/// Manila
pub const MAP_CONFIG: MapConfig = MapConfig {
    center_lat: 14.5995,
    center_lng: 120.9842,
    zoom: 12,
    tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportType {
    pub title: &'static str,
    pub description: &'static str,
}

pub const REPORT_TYPES: [ReportType; 3] = [
    ReportType {
        title: "Daily Incident Summary",
        description: "Overview of all incidents reported in the last 24 hours",
    },
    ReportType {
        title: "Weekly Response Analysis",
        description: "Response times and resolution rates for the past week",
    },
    ReportType {
        title: "Monthly Safety Report",
        description: "Comprehensive monthly report with trends and insights",
    },
];
