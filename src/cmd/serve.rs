use std::net::SocketAddr;

use anyhow::{Context, Result};

use tubeprobe::Config;

pub async fn cmd_serve(mut config: Config, bind: Option<SocketAddr>) -> Result<()> {
    if let Some(bind) = bind {
        config.bind = bind;
    }

    tracing::info!(
        concurrency = config.concurrency_limit,
        resolve_timeout_secs = config.resolve_timeout_secs,
        probe_timeout_secs = config.probe_timeout_secs,
        ytdlp = %config.ytdlp.binary.display(),
        "starting tubeprobe {}",
        tubeprobe::VERSION
    );

    let addr = config.bind;
    tubeprobe::server::serve(config)
        .await
        .with_context(|| format!("server on {addr} failed"))
}
