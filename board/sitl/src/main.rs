use log::info;

mod app;
mod config;
mod simulator;
mod timer;

use app::SitlApp;
use config::SitlConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SitlConfig::from_env()?;
    info!("Starting orientation SITL: {:?}", config);

    let mut app = SitlApp::new(config)?;
    app.run().await?;

    let world = app.frame().world();
    info!(
        "Dispatched {} orientation events, {} sensor requests, {} visibility changes",
        app.events().len(),
        world.borrow().requests.len(),
        app.visibility_changes()
    );
    Ok(())
}
