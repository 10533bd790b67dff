use std::net::SocketAddr;
use std::sync::Arc;

use daytrip_api::{
    app,
    state::{AppState, AuthConfig},
};
use daytrip_order::{BookingService, SettlementService};
use daytrip_pay::TapPayClient;
use daytrip_store::{
    DbClient, PgAttractionRepository, PgBookingRepository, PgMemberRepository, PgOrderRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "daytrip_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = daytrip_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting daytrip API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let gateway = TapPayClient::new(
        &config.tappay.url,
        &config.tappay.partner_key,
        &config.tappay.merchant_id,
    )
    .expect("Failed to build payment gateway client");

    let members = Arc::new(PgMemberRepository::new(db.pool.clone()));
    let attractions = Arc::new(PgAttractionRepository::new(db.pool.clone()));
    let booking_repo = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let order_repo = Arc::new(PgOrderRepository::new(db.pool.clone()));

    let app_state = AppState {
        members,
        attractions: attractions.clone(),
        bookings: Arc::new(BookingService::new(booking_repo.clone(), attractions)),
        settlement: Arc::new(SettlementService::new(
            booking_repo,
            order_repo,
            Arc::new(gateway),
        )),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
