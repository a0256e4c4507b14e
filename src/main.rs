use anyhow::Context;
use gpui::{App, Application};
use tracing_subscriber::EnvFilter;

use chess_session::app;
use chess_session::config::SessionConfig;
use chess_session::ui::FileAssets;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SessionConfig::from_env().context("loading session config")?;

    Application::new()
        .with_assets(FileAssets::new())
        .run(move |cx: &mut App| app::run(config, cx));
    Ok(())
}
