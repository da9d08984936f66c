use crate::app::App;
use crate::config::AppConfig;
use crate::responses::error_to_response;
use crate::router::handle;
use astra::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod config;
mod errors;
mod responses;
mod router;
mod table;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("strike_dash=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let addr = config.bind_addr;
    let workers = config.max_workers;

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "could not build the HTTP client");
            std::process::exit(1);
        }
    };

    info!(
        %addr,
        workers,
        api = %app.config.api_base,
        graphql = %app.config.graphql_url,
        "starting server at http://{addr}"
    );

    let server = Server::bind(&addr).max_workers(workers);

    let result = server.serve(move |req, _info| match handle(req, &app) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    if let Err(e) = result {
        error!(error = %e, "server ended with error");
    }

    info!("server shut down cleanly");
}
