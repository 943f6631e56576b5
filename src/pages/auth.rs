use super::{Link, PageContext, Section, View};
use crate::api::auth::MIN_PASSWORD_LENGTH;
use crate::constants::{APP_DESCRIPTION, APP_NAME};
use crate::router::Route;

pub fn render(ctx: &PageContext<'_>) -> View {
    let mut view = View::new(APP_NAME).subtitle(APP_DESCRIPTION);

    if let Some(principal) = ctx.session.principal.as_ref().filter(|_| ctx.session.is_authenticated()) {
        view.push(Section::text(format!("Signed in as {}.", principal.name)));
        view.push(Section::Links {
            title: "Continue".into(),
            items: vec![Link {
                label: "Overview".into(),
                path: Route::DEFAULT.path().to_string(),
            }],
        });
        return view;
    }

    view.push(Section::Form {
        title: "Sign in".into(),
        fields: vec!["email".into(), "password".into()],
    });
    view.push(Section::Form {
        title: "Create account".into(),
        fields: vec![
            "full_name".into(),
            "email".into(),
            format!("password (min {} characters)", MIN_PASSWORD_LENGTH),
            "role (admin | personnel)".into(),
        ],
    });
    view
}
