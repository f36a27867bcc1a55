use health_monitor::configuration::get_configuration;
use health_monitor::startup::run;
use health_monitor::telemetry::{get_subscriber, init_subscriber};
use std::net::TcpListener;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("health-monitor".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration()?;

    let address = settings.address();
    tracing::info!(
        service = %settings.service_name,
        environment = %settings.environment,
        "Start server at {:?}",
        &address
    );
    let listener = TcpListener::bind(&address)?;

    run(listener, settings).await?.await?;
    Ok(())
}
