use super::{Link, Section, View};
use crate::router::Route;

pub fn render(path: &str) -> View {
    let mut view = View::new("404").subtitle("Page not found");
    view.push(Section::text(format!("No page at '{}'.", path)));
    view.push(Section::Links {
        title: "Go to".into(),
        items: vec![Link {
            label: "Overview".into(),
            path: Route::DEFAULT.path().to_string(),
        }],
    });
    view
}
