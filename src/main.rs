use std::sync::Arc;

use anyhow::Result;
use panel_query_cache::config;
use panel_query_cache::infrastructure::upstream::HttpBackend;
use panel_query_cache::server;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_from_env()?;
    server::init_tracing(&config.log_level, &config.log_format)?;
    config.print_summary();

    let backend = HttpBackend::new(config.require_backend_url()?, config.backend_timeout())?;

    server::run(config, Arc::new(backend)).await
}
