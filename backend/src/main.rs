use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use log::info;

use geo_predictor::config::ServerConfig;
use geo_predictor::inference::Predictor;
use geo_predictor::routes;
use geo_predictor::simulation::Simulator;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting simulated geotemporal prediction service");

    let config = ServerConfig::from_env()?;
    let sim = &config.simulation;
    info!("Max predictions per request: {}", config.max_predictions);
    info!(
        "Simulation: latency {}..={}s, failure probability {}",
        sim.latency_min_secs, sim.latency_max_secs, sim.failure_probability
    );

    let predictor = web::Data::new(
        Predictor::new(Simulator::new(config.simulation.clone()))
            .with_max_predictions(config.max_predictions),
    );
    let bind_address = config.bind_address();

    info!("Listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Endpoints:");
    info!("   POST /getPrediction  - Extrapolate future points");
    info!("   GET  /api/health     - Health check");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(predictor.clone())
            .configure(routes::configure)
            .default_service(web::route().to(routes::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
