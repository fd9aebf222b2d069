//! Route table

use super::handlers::*;
use crate::shop::RepairShop;
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

/// Build the REST router for a shop
///
/// - `GET /health`
/// - `GET|POST /{customers,devices,tickets,services,invoices}`
/// - `GET|PUT|DELETE /{kind}/{id}`; deletes of customers, devices and tickets cascade
/// - `GET /tickets/{id}/services`
/// - `PUT /invoices/{id}/status`, `POST /invoices/{id}/recompute`
/// - `GET /invoices/{id}/receipt` (text/plain)
/// - `POST /invoices/quote`
/// - `GET /summary`, `GET /combos/{kind}`, `GET /search/{kind}?field=&value=`
pub fn build_router(shop: RepairShop) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/devices", get(list_devices).post(create_device))
        .route(
            "/devices/{id}",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route(
            "/tickets/{id}",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
        .route("/tickets/{id}/services", get(ticket_services))
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/quote", post(quote))
        .route(
            "/invoices/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/{id}/status", put(set_invoice_status))
        .route("/invoices/{id}/recompute", post(recompute_invoice))
        .route("/invoices/{id}/receipt", get(receipt))
        .route("/summary", get(summary))
        .route("/combos/{kind}", get(combo))
        .route("/search/{kind}", get(search))
        .layer(TraceLayer::new_for_http())
        .with_state(shop)
}
