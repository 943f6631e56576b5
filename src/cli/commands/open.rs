use crate::app::Console;
use crate::cli::utils::output_item;
use crate::cli::OutputFormat;
use crate::layout::Layout;

pub async fn handle(console: &Console, path: &str, output_format: &OutputFormat) -> anyhow::Result<()> {
    let screen = console.open(path).await;
    output_item(output_format, &screen)
}

pub fn nav(console: &Console, output_format: &OutputFormat) -> anyhow::Result<()> {
    let session = console.session().snapshot();
    let layout = Layout::for_session(&session, &console.navigator().current());
    output_item(output_format, &layout)
}
