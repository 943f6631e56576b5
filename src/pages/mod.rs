//! Page composition. Each page pulls from the data hooks it needs and
//! returns a `View`; fetch failures become inline error sections.

pub mod alerts;
pub mod auth;
pub mod dashboard;
pub mod incidents;
pub mod map;
pub mod not_found;
pub mod personnel;
pub mod reports;
pub mod sos;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{IncidentsApi, PersonnelApi, SosApi};
use crate::error::{ClientError, ClientResult};
use crate::router::Route;
use crate::session::Session;

/// Rendered page, printable as text or serializable as JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Text {
        body: String,
    },
    Stats {
        items: Vec<Stat>,
    },
    Table {
        title: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        empty: String,
    },
    Links {
        title: String,
        items: Vec<Link>,
    },
    Form {
        title: String,
        fields: Vec<String>,
    },
    Error {
        code: String,
        message: String,
    },
}

/// Query-string inputs a page may read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    pub search: Option<String>,
    pub status: Option<String>,
}

impl PageParams {
    /// Pull `q`/`search` and `status` out of a location such as `/personnel?q=ana`
    pub fn from_location(location: &str) -> Self {
        let mut params = PageParams::default();
        let query = match location.split_once('?') {
            Some((_, query)) => query,
            None => return params,
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "q" | "search" => params.search = Some(value),
                "status" => params.status = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// Everything a page may read while rendering
pub struct PageContext<'a> {
    pub session: &'a Session,
    pub incidents: &'a IncidentsApi,
    pub sos: &'a SosApi,
    pub personnel: &'a PersonnelApi,
    pub params: &'a PageParams,
    pub now: DateTime<Utc>,
}

/// Render the page behind `route`. Redirect aliases never reach here.
pub async fn render(route: &Route, ctx: &PageContext<'_>) -> View {
    match route {
        Route::Auth | Route::Login => auth::render(ctx),
        Route::Dashboard | Route::Settings => dashboard::render(ctx).await,
        Route::Incidents => incidents::render(ctx).await,
        Route::Sos => sos::render(ctx).await,
        Route::Alerts => alerts::render(ctx),
        Route::Map => map::render(ctx).await,
        Route::Reports => reports::render(),
        Route::Personnel => personnel::render(ctx).await,
        Route::NotFound(path) => not_found::render(path),
    }
}

impl View {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            sections: Vec::new(),
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| matches!(s, Section::Error { .. }))
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn table(&self, title: &str) -> Option<&Vec<Vec<String>>> {
        self.sections.iter().find_map(|s| match s {
            Section::Table { title: t, rows, .. } if t == title => Some(rows),
            _ => None,
        })
    }
}

impl Section {
    pub fn text(body: impl Into<String>) -> Self {
        Section::Text { body: body.into() }
    }

    pub fn stats<L: Into<String>, V: ToString>(items: impl IntoIterator<Item = (L, V)>) -> Self {
        Section::Stats {
            items: items
                .into_iter()
                .map(|(label, value)| Stat {
                    label: label.into(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    pub fn table(title: impl Into<String>, columns: &[&str], rows: Vec<Vec<String>>, empty: impl Into<String>) -> Self {
        Section::Table {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            empty: empty.into(),
        }
    }

    pub fn error(err: &ClientError) -> Self {
        Section::Error {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Unwrap a list result, turning a failure into an inline error section
pub(crate) fn or_error<T>(view: &mut View, result: ClientResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        view.push(Section::error(&e));
        Vec::new()
    })
}

/// Coarse "5m ago" style age
pub fn ago(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "-".to_string();
    };
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(subtitle) = &self.subtitle {
            writeln!(f, "{}", subtitle)?;
        }
        for section in &self.sections {
            writeln!(f)?;
            write!(f, "{}", section)?;
        }
        Ok(())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Text { body } => writeln!(f, "{}", body),
            Section::Stats { items } => {
                let line: Vec<String> = items.iter().map(|s| format!("{}: {}", s.label, s.value)).collect();
                writeln!(f, "{}", line.join("  |  "))
            }
            Section::Table {
                title,
                columns,
                rows,
                empty,
            } => {
                writeln!(f, "{} ({})", title, rows.len())?;
                if rows.is_empty() {
                    return writeln!(f, "  {}", empty);
                }
                write_table(f, columns, rows)
            }
            Section::Links { title, items } => {
                writeln!(f, "{}", title)?;
                for link in items {
                    writeln!(f, "  {:<20} {}", link.label, link.path)?;
                }
                Ok(())
            }
            Section::Form { title, fields } => writeln!(f, "{}: {}", title, fields.join(", ")),
            Section::Error { code, message } => writeln!(f, "! {} ({})", message, code),
        }
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, columns: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(f, "  {}", line(columns))?;
    for row in rows {
        writeln!(f, "  {}", line(row))?;
    }
    Ok(())
}
