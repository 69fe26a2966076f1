use std::{net::SocketAddr, sync::Arc, time::Duration};

use contact_mailer::{AppState, config, notifier::SmtpNotifier, router, service::ContactService};

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().expect("failed to locate or load config file");
    tracing::info!("Successfully loaded contact mailer config");

    // Setup service
    let notifier = SmtpNotifier::new(&cfg.email).expect("failed to configure SMTP relay");
    let service = ContactService::new(Arc::new(notifier), cfg.email.recipient());
    let state = Arc::new(AppState::new(service, &cfg.server));

    // Forget idle clients
    let cleanup_state = state.clone();
    let cleanup_interval = cfg.server.cleanup_interval().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    // Setup router
    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_addr)
        .await
        .expect("Failed to bind to address");
    let addr = listener
        .local_addr()
        .expect("Failed to read bound address");

    tracing::info!("Contact mailer starting, listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
