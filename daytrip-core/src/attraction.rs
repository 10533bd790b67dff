use serde::{Deserialize, Serialize};

/// Attractions are listed in fixed pages of this size.
pub const PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attraction {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub address: String,
    pub transport: String,
    pub mrt: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub images: Vec<String>,
}

/// The attraction fields embedded in booking and order payloads: identity,
/// address and the first image only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttractionCard {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub image: String,
}
