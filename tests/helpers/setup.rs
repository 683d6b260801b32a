use pillbox_api::Application;
use pillbox_infra::{Config, PillboxContext};
use pillbox_sdk::PillboxSDK;

pub struct TestApp {
    pub config: Config,
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, PillboxSDK, String) {
    let mut ctx = PillboxContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.timezone = chrono_tz::UTC;

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp { config };
    let sdk = PillboxSDK::new(address.clone());
    (app, sdk, address)
}
