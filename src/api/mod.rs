//! REST API module for the reservation service.
//!
//! This module provides the HTTP boundary around
//! [`ReservationService`](crate::service::ReservationService); it owns
//! routing and status-code mapping and nothing else.

pub mod reservation_routes;

pub use reservation_routes::{reservation_router, AppState};
