use super::{or_error, PageContext, Section, View};
use crate::models::Personnel;

pub const STAFF_TABLE: &str = "Staff Accounts";
pub const USERS_TABLE: &str = "All Users";

pub async fn render(ctx: &PageContext<'_>) -> View {
    let mut view = View::new("Personnel").subtitle("Manage admin and personnel accounts");
    let query = ctx.params.search.as_deref().unwrap_or("");

    let (admins, users) = futures::join!(ctx.personnel.admins(), ctx.personnel.users());
    let admins = or_error(&mut view, admins);
    let users = or_error(&mut view, users);

    if !query.is_empty() {
        view.push(Section::text(format!("Filtered by \"{}\"", query)));
    }

    view.push(table(STAFF_TABLE, &admins, query));
    view.push(table(USERS_TABLE, &users, query));
    view
}

fn table(title: &str, people: &[Personnel], query: &str) -> Section {
    let rows = people
        .iter()
        .filter(|p| p.matches(query))
        .map(|p| {
            vec![
                p.initials(),
                p.full_name.clone(),
                p.email.clone(),
                p.role.map(|r| r.label()).unwrap_or("-").to_string(),
            ]
        })
        .collect();
    Section::table(title, &["", "Name", "Email", "Role"], rows, "No users found")
}
