use std::sync::Arc;

use daytrip_core::repository::{AttractionRepository, MemberRepository};
use daytrip_order::{BookingService, SettlementService};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub members: Arc<dyn MemberRepository>,
    pub attractions: Arc<dyn AttractionRepository>,
    pub bookings: Arc<BookingService>,
    pub settlement: Arc<SettlementService>,
    pub auth: AuthConfig,
}
