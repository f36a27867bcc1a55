use health_monitor::configuration::Settings;
use health_monitor::health::HealthService;
use health_monitor::startup::{build_health_service, run_with_service};
use health_monitor::telemetry::{get_subscriber, init_subscriber};
use std::net::TcpListener;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

// Set TEST_LOG=1 to see the Bunyan output of a test run.
fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::stdout));
        } else {
            init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::sink));
        }
    });
}

pub struct TestApp {
    pub address: String,
    pub service: Arc<HealthService>,
}

pub async fn spawn_app() -> TestApp {
    let settings = Settings::default();
    let service = Arc::new(build_health_service(&settings));
    spawn_app_with_service(settings, service).await
}

pub async fn spawn_app_with_service(settings: Settings, service: Arc<HealthService>) -> TestApp {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = run_with_service(listener, settings, service.clone())
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp { address, service }
}
