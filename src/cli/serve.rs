use crate::api;
use crate::cli::commands::ServeArgs;
use crate::cli::CliContext;
use crate::errors::CiphertraceError;
use tracing::info;

pub async fn handle_serve(args: ServeArgs, ctx: &CliContext) -> Result<(), CiphertraceError> {
    let host = args.host.unwrap_or_else(|| ctx.config.server.host.clone());
    let port = args.port.unwrap_or(ctx.config.server.port);
    info!(host = %host, port, db = %ctx.db_path, "Starting API server");

    let state = api::create_app_state(&ctx.config, &ctx.db_path).await?;
    let app = api::build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CiphertraceError::Internal(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
