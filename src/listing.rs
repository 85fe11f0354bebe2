// Data structures for the normalized listing output schema
use serde::{Deserialize, Serialize};

// One entry of the branch inventory list. Records missing either field are
// counted as skipped before any detail fetch happens.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyReference {
    pub prop_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Flat,
    Studio,
}

// The vendor-independent listing shape returned to callers. Optional array
// fields are omitted entirely when no items were found, never serialized as
// empty arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedListing {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub street_address: String,
    pub address: String,
    pub city: String,
    pub postcode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_amount: Option<f64>,
    pub available_from: String,
    pub furnished: bool,
    pub bills_included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epc_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub council_tax_band: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floorplans: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_tours: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landlord_email: Option<String>,
    pub landlord_account_type: String,
    pub status: String,
    pub external_id: String,
}
