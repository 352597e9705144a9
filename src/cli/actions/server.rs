use crate::api;
use crate::cli::actions::Action;
use anyhow::{anyhow, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, dsn, issuer } => {
            // Fail fast on a malformed DSN before touching the pool
            let dsn = Url::parse(&dsn)?;

            match dsn.scheme() {
                "postgres" | "postgresql" => (),
                scheme => return Err(anyhow!("unsupported database scheme: {scheme}")),
            }

            api::new(port, dsn.to_string(), issuer).await?;
        }
    }

    Ok(())
}
