use verein_service::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let state = AppState::from_config(config.clone()).await?;
    let app = router(state);

    Server::new(config).serve(app).await
}
