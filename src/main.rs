use dotenv::dotenv;
use gymbooker::{BookerConfig, DebugSink, PushPressClient, RequestStore, Scheduler};

extern crate env_logger;
extern crate log;

use log::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = BookerConfig::new()?;

    env_logger::Builder::new()
        .filter_level(if config.debug_all {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let client = PushPressClient::new(
        config.credentials(),
        DebugSink::new(config.debug_err, config.debug_all),
    )?;
    let store = RequestStore::new(&config.state_path);

    let mut scheduler = Scheduler::new(client, store);
    scheduler.run().await;
    Ok(())
}
