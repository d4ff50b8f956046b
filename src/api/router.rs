use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, activate_cyclist, can_rent, current_rental, email_exists, get_card, get_cyclist,
    register_cyclist, rent_bicycle, replace_card, reset_database, return_bicycle, update_cyclist,
};

/// Creates the API router with all cyclist and rental endpoints
///
/// Cyclist endpoints:
/// - POST /ciclista - Register a cyclist
/// - GET /ciclista/existeEmail/:email - Check whether an email is taken
/// - GET /ciclista/:id - Get a cyclist
/// - PUT /ciclista/:id - Update a cyclist
/// - POST /ciclista/:id/ativar - Activate a registration
/// - GET /ciclista/:id/permiteAluguel - Check whether the cyclist may rent
/// - GET /ciclista/:id/bicicletaAlugada - Get the bicycle currently in use
///
/// Credit card endpoints:
/// - GET /cartaoDeCredito/:id - Get the registered card
/// - PUT /cartaoDeCredito/:id - Replace the payment method
///
/// Rental endpoints:
/// - POST /aluguel - Start a rental
/// - POST /devolucao - Return a bicycle
///
/// Maintenance:
/// - GET /restaurarBanco - Reset the database (acceptance testing)
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Cyclist endpoints
        .route("/ciclista", post(register_cyclist))
        .route("/ciclista/existeEmail/:email", get(email_exists))
        .route("/ciclista/:id", get(get_cyclist).put(update_cyclist))
        .route("/ciclista/:id/ativar", post(activate_cyclist))
        .route("/ciclista/:id/permiteAluguel", get(can_rent))
        .route("/ciclista/:id/bicicletaAlugada", get(current_rental))
        // Credit card endpoints
        .route("/cartaoDeCredito/:id", get(get_card).put(replace_card))
        // Rental endpoints
        .route("/aluguel", post(rent_bicycle))
        .route("/devolucao", post(return_bicycle))
        // Maintenance (acceptance testing support)
        .route("/restaurarBanco", get(reset_database))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
