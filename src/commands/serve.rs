use crate::commands::Out;
use crate::{api, Config, Result};

/// Serves the HTTP API on `listen`, or on the configured address, until ctrl-c or SIGTERM.
pub async fn serve(config: Config, listen: Option<String>) -> Result<Out<()>> {
    let addr = listen.unwrap_or_else(|| config.listen().to_string());
    api::serve(config, &addr).await?;
    Ok("The server has shut down".into())
}
