mod config;
mod errors;
mod limits;
mod logging;
mod sanitize;
mod server;
mod static_files;
mod storage;
mod upload;

use crate::config::{canonical_dir, Config};
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path = PathBuf::from("cropdrop.toml");
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i >= args.len() { eprintln!("--config requires a path"); std::process::exit(2); }
                config_path = PathBuf::from(&args[i]);
            }
            _ => {}
        }
        i += 1;
    }

    let cfg = Config::load(&config_path).context("loading config")?;
    cfg.validate().context("validating config")?;

    let addr = format!("{}:{}", cfg.server.bind_addr, cfg.server.port);
    let state = server::AppState::new(cfg)?;
    let upload_dir = canonical_dir(state.store.dir()).context("resolving upload dir")?;

    info!(
        addr = %addr,
        upload_dir = %upload_dir.display(),
        public_dir = %state.cfg.storage.public_dir.display(),
        max_body_bytes = state.cfg.limits.max_body_bytes(),
        "cropdrop ready"
    );
    println!("cropdrop ready addr={} upload_dir={}", addr, upload_dir.display());

    server::serve(state).await
}
