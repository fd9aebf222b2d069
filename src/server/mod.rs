//! HTTP exposure of the repair shop
//!
//! A thin axum layer over [`RepairShop`](crate::shop::RepairShop):
//! - `router` holds the route table
//! - `handlers` translate JSON to shop calls on the blocking pool
//! - `builder` assembles and serves the application with graceful shutdown

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use router::build_router;
