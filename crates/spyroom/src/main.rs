use spyroom::prelude::*;

#[tokio::main]
async fn main() -> Result<(), SpyroomError> {
    let config = ServerConfig::from_env()?;
    init_tracing(&config.log_level);

    let server = SpyroomServer::builder().config(config).build().await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
