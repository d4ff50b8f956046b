use rusty_bikeshare_ddd::{
    adapters::http::{EquipmentClient, ExternalClient},
    adapters::mock::{
        CyclistRepository as MockCyclistRepository, EquipmentGateway as MockEquipmentGateway,
        NotificationGateway as MockNotificationGateway, PaymentGateway as MockPaymentGateway,
        RentalRepository as MockRentalRepository,
    },
    adapters::postgres::{PostgresCyclistRepository, PostgresRentalRepository},
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    domain::billing::BillingPolicy,
    domain::value_objects::{BicycleId, BicycleStatus, DockId},
    ports::{
        CyclistRepository, EquipmentGateway, NotificationGateway, PaymentGateway, RentalRepository,
    },
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_bikeshare_ddd=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Repositories: Postgres when DATABASE_URL is set, in-memory otherwise
    let (cyclists, rentals): (Arc<dyn CyclistRepository>, Arc<dyn RentalRepository>) =
        match std::env::var("DATABASE_URL") {
            Ok(database_url) => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(5)
                    .connect(&database_url)
                    .await
                    .expect("Failed to connect to database");

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .expect("Failed to run migrations");

                tracing::info!("Using Postgres repositories");
                (
                    Arc::new(PostgresCyclistRepository::new(pool.clone())),
                    Arc::new(PostgresRentalRepository::new(pool)),
                )
            }
            Err(_) => {
                tracing::info!("DATABASE_URL not set, using in-memory repositories");
                (
                    Arc::new(MockCyclistRepository::new()),
                    Arc::new(MockRentalRepository::new()),
                )
            }
        };

    // Equipment service: HTTP client when EQUIPMENT_SERVICE_URL is set,
    // in-memory gateway with a few demo docks otherwise
    let equipment: Arc<dyn EquipmentGateway> = match std::env::var("EQUIPMENT_SERVICE_URL") {
        Ok(base_url) => {
            tracing::info!("Using equipment service at {}", base_url);
            Arc::new(EquipmentClient::new(base_url).expect("Failed to build equipment client"))
        }
        Err(_) => {
            tracing::info!("EQUIPMENT_SERVICE_URL not set, using in-memory equipment");
            let gateway = MockEquipmentGateway::new();
            seed_demo_equipment(&gateway);
            Arc::new(gateway)
        }
    };

    // External service (payments and email): one client covers both ports
    let (payment, notifier): (Arc<dyn PaymentGateway>, Arc<dyn NotificationGateway>) =
        match std::env::var("EXTERNAL_SERVICE_URL") {
            Ok(base_url) => {
                tracing::info!("Using external service at {}", base_url);
                let client = Arc::new(
                    ExternalClient::new(base_url).expect("Failed to build external client"),
                );
                (client.clone(), client)
            }
            Err(_) => {
                tracing::info!("EXTERNAL_SERVICE_URL not set, using in-memory gateways");
                (
                    Arc::new(MockPaymentGateway::new()),
                    Arc::new(MockNotificationGateway::new()),
                )
            }
        };

    // Create service dependencies
    let service_deps = ServiceDependencies {
        cyclists,
        rentals,
        equipment,
        payment,
        notifier,
        billing: BillingPolicy::default(),
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

/// Seed docks and bicycles so the service is usable standalone
fn seed_demo_equipment(gateway: &MockEquipmentGateway) {
    gateway.add_bicycle(BicycleId::new(1), BicycleStatus::Available);
    gateway.add_bicycle(BicycleId::new(2), BicycleStatus::Available);
    gateway.add_dock(DockId::new(1), Some(BicycleId::new(1)));
    gateway.add_dock(DockId::new(2), Some(BicycleId::new(2)));
    gateway.add_dock(DockId::new(3), None);
}
