//! HTTP handlers
//!
//! Handlers only translate between JSON and [`RepairShop`] calls. The shop
//! is synchronous and may touch the filesystem, so every call runs on the
//! blocking pool.
//!
//! Money fields (`cost`, `tax_rate`, `discount`) are accepted as JSON strings
//! or numbers and parsed with [`parse_amount`]; a missing or blank value is
//! zero.

use crate::billing::parse_amount;
use crate::core::entity::{EntityKind, RecordId};
use crate::core::error::{ShopError, StoreError};
use crate::entities::{InvoiceTerms, NewCustomer, NewDevice, NewService, NewTicket, PaidStatus, TicketStatus};
use crate::shop::{ComboKind, RepairShop};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

/// Run a shop call on the blocking pool
async fn run<T, F>(shop: RepairShop, f: F) -> Result<T, ShopError>
where
    T: Send + 'static,
    F: FnOnce(&RepairShop) -> Result<T, ShopError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&shop))
        .await
        .map_err(|e| ShopError::from(StoreError::Task(e.to_string())))?
}

/// Parse a money field that may arrive as a string, a number or not at all
fn amount(field: &str, value: &Value) -> Result<Decimal, ShopError> {
    match value {
        Value::Null => Ok(Decimal::ZERO),
        Value::String(raw) => parse_amount(field, raw),
        Value::Number(n) => parse_amount(field, &n.to_string()),
        other => Err(ShopError::invalid(
            field,
            format!("expected a number, got {}", other),
        )),
    }
}

fn terms(tax_rate: &Value, discount: &Value, paid_status: Option<&str>) -> Result<InvoiceTerms, ShopError> {
    let mut terms = InvoiceTerms::new(amount("tax_rate", tax_rate)?, amount("discount", discount)?);
    if let Some(status) = paid_status {
        terms.paid_status = status.parse()?;
    }
    Ok(terms)
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "fixdesk",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

pub async fn list_customers(State(shop): State<RepairShop>) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, |shop| shop.list_customers()).await?))
}

pub async fn create_customer(
    State(shop): State<RepairShop>,
    Json(input): Json<NewCustomer>,
) -> Result<impl IntoResponse, ShopError> {
    let customer = run(shop, move |shop| shop.add_customer(input)).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.get_customer(id)).await?))
}

pub async fn update_customer(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
    Json(input): Json<NewCustomer>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.update_customer(id, input)).await?))
}

pub async fn delete_customer(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.delete_customer(id)).await?))
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

pub async fn list_devices(State(shop): State<RepairShop>) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, |shop| shop.list_devices()).await?))
}

pub async fn create_device(
    State(shop): State<RepairShop>,
    Json(input): Json<NewDevice>,
) -> Result<impl IntoResponse, ShopError> {
    let device = run(shop, move |shop| shop.add_device(input)).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

pub async fn get_device(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.get_device(id)).await?))
}

pub async fn update_device(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
    Json(input): Json<NewDevice>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.update_device(id, input)).await?))
}

pub async fn delete_device(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.delete_device(id)).await?))
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// Body of `PUT /tickets/{id}`
#[derive(Debug, Deserialize)]
pub struct TicketUpdate {
    pub status: String,
    #[serde(default)]
    pub technician: Option<String>,
}

pub async fn list_tickets(State(shop): State<RepairShop>) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, |shop| shop.list_tickets()).await?))
}

pub async fn create_ticket(
    State(shop): State<RepairShop>,
    Json(input): Json<NewTicket>,
) -> Result<impl IntoResponse, ShopError> {
    let ticket = run(shop, move |shop| shop.add_ticket(input)).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn get_ticket(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.get_ticket(id)).await?))
}

pub async fn update_ticket(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
    Json(body): Json<TicketUpdate>,
) -> Result<impl IntoResponse, ShopError> {
    let status: TicketStatus = body.status.parse()?;
    let ticket = run(shop, move |shop| match body.technician {
        Some(technician) => {
            let input = NewTicket::new(0, technician).with_status(status);
            shop.update_ticket(id, input)
        }
        None => shop.set_ticket_status(id, status),
    })
    .await?;
    Ok(Json(ticket))
}

pub async fn delete_ticket(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.delete_ticket(id)).await?))
}

pub async fn ticket_services(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.services_for_ticket(id)).await?))
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Body of `POST /services`
#[derive(Debug, Deserialize)]
pub struct ServiceBody {
    pub ticket_id: RecordId,
    pub description: String,
    #[serde(default)]
    pub cost: Value,
}

/// Body of `PUT /services/{id}`
#[derive(Debug, Deserialize)]
pub struct ServiceUpdate {
    pub description: String,
    #[serde(default)]
    pub cost: Value,
}

pub async fn list_services(State(shop): State<RepairShop>) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, |shop| shop.list_services()).await?))
}

pub async fn create_service(
    State(shop): State<RepairShop>,
    Json(body): Json<ServiceBody>,
) -> Result<impl IntoResponse, ShopError> {
    let input = NewService::new(body.ticket_id, body.description, amount("cost", &body.cost)?);
    let service = run(shop, move |shop| shop.add_service(input)).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn get_service(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.get_service(id)).await?))
}

pub async fn update_service(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
    Json(body): Json<ServiceUpdate>,
) -> Result<impl IntoResponse, ShopError> {
    let cost = amount("cost", &body.cost)?;
    let service = run(shop, move |shop| shop.update_service(id, &body.description, cost)).await?;
    Ok(Json(service))
}

pub async fn delete_service(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.delete_service(id)).await?))
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// Body of `POST /invoices`
#[derive(Debug, Deserialize)]
pub struct InvoiceBody {
    pub ticket_id: RecordId,
    #[serde(default)]
    pub tax_rate: Value,
    #[serde(default)]
    pub discount: Value,
    #[serde(default)]
    pub paid_status: Option<String>,
}

/// Body of `PUT /invoices/{id}`
#[derive(Debug, Deserialize)]
pub struct TermsBody {
    #[serde(default)]
    pub tax_rate: Value,
    #[serde(default)]
    pub discount: Value,
    #[serde(default)]
    pub paid_status: Option<String>,
}

/// Body of `PUT /invoices/{id}/status`
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub paid_status: String,
}

/// Body of `POST /invoices/quote`
#[derive(Debug, Deserialize)]
pub struct QuoteBody {
    #[serde(default)]
    pub costs: Vec<Value>,
    #[serde(default)]
    pub tax_rate: Value,
    #[serde(default)]
    pub discount: Value,
}

pub async fn list_invoices(State(shop): State<RepairShop>) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, |shop| shop.list_invoices()).await?))
}

pub async fn create_invoice(
    State(shop): State<RepairShop>,
    Json(body): Json<InvoiceBody>,
) -> Result<impl IntoResponse, ShopError> {
    let terms = terms(&body.tax_rate, &body.discount, body.paid_status.as_deref())?;
    let ticket_id = body.ticket_id;
    let invoice = run(shop, move |shop| shop.generate_invoice(ticket_id, terms)).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn get_invoice(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.get_invoice(id)).await?))
}

pub async fn update_invoice(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
    Json(body): Json<TermsBody>,
) -> Result<impl IntoResponse, ShopError> {
    let terms = terms(&body.tax_rate, &body.discount, body.paid_status.as_deref())?;
    Ok(Json(run(shop, move |shop| shop.update_invoice(id, terms)).await?))
}

pub async fn set_invoice_status(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
    Json(body): Json<StatusBody>,
) -> Result<impl IntoResponse, ShopError> {
    let status: PaidStatus = body.paid_status.parse()?;
    Ok(Json(run(shop, move |shop| shop.set_invoice_status(id, status)).await?))
}

pub async fn recompute_invoice(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.recompute_invoice(id)).await?))
}

pub async fn delete_invoice(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, move |shop| shop.delete_invoice(id)).await?))
}

pub async fn receipt(
    State(shop): State<RepairShop>,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ShopError> {
    let text = run(shop, move |shop| shop.receipt(id)).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

pub async fn quote(
    State(shop): State<RepairShop>,
    Json(body): Json<QuoteBody>,
) -> Result<impl IntoResponse, ShopError> {
    let costs = body
        .costs
        .iter()
        .map(|cost| amount("cost", cost))
        .collect::<Result<Vec<_>, _>>()?;
    let totals = shop.quote(
        &costs,
        amount("tax_rate", &body.tax_rate)?,
        amount("discount", &body.discount)?,
    )?;
    Ok(Json(totals))
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Query of `GET /search/{kind}`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub field: String,
    pub value: String,
}

pub async fn summary(State(shop): State<RepairShop>) -> Result<impl IntoResponse, ShopError> {
    Ok(Json(run(shop, |shop| shop.summary()).await?))
}

pub async fn combo(
    State(shop): State<RepairShop>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ShopError> {
    let kind: ComboKind = kind.parse()?;
    let options = run(shop, move |shop| shop.combo(kind)).await?;
    Ok(Json(options.as_ref().clone()))
}

pub async fn search(
    State(shop): State<RepairShop>,
    Path(kind): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ShopError> {
    let kind = EntityKind::from_name(&kind)
        .ok_or_else(|| ShopError::invalid("kind", format!("unknown record kind '{}'", kind)))?;
    let found = run(shop, move |shop| shop.search(kind, &params.field, &params.value)).await?;
    Ok(Json(found))
}
