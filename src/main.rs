use actix_web::{middleware::ErrorHandlers, web, HttpServer};
use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use roster::{config, http, App};

#[derive(Debug, Error)]
#[error("Failed to run roster server")]
struct ServerError;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_error::ErrorLayer::default())
        .init();
}

async fn run() -> Result<(), ServerError> {
    let config = config::Server::load().change_context(ServerError)?;
    let addr = (config.ip, config.port);
    let workers = config.workers;

    let app = App::new(config).await.change_context(ServerError)?;
    tracing::info!("Listening on {}:{}", addr.0, addr.1);

    let mut server = HttpServer::new(move || {
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .wrap(TracingLogger::<http::util::QuieterRootSpanBuilder>::new())
            .wrap(ErrorHandlers::new().default_handler(http::util::handle_actix_web_error))
            .configure(http::controllers::configure)
    });

    if let Some(workers) = workers {
        server = server.workers(workers.get());
    }

    server
        .bind(addr)
        .change_context(ServerError)
        .attach_printable_lazy(|| format!("could not bind to {}:{}", addr.0, addr.1))?
        .run()
        .await
        .change_context(ServerError)
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(error) = run().await {
        tracing::error!("{error:?}");
        std::process::exit(1);
    }
}
