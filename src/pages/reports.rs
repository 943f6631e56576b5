use super::{Section, View};
use crate::constants::REPORT_TYPES;

pub fn render() -> View {
    let mut view = View::new("Reports").subtitle("Generate and export operational reports");
    let rows = REPORT_TYPES
        .iter()
        .map(|r| vec![r.title.to_string(), r.description.to_string()])
        .collect();
    view.push(Section::table("Available Reports", &["Report", "Description"], rows, "No reports"));
    view
}
