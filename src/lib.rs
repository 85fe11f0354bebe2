// Main library file for the student lettings proxy

// Export modules for each stage of the import pipeline
pub mod classify;
pub mod config;
pub mod error;
pub mod import;
pub mod listing;
pub mod mapper;
pub mod server;
pub mod token;
pub mod vendor;
pub mod xml;

// Re-export key types for convenience
pub use config::Config;
pub use error::{MapError, ProxyError};
pub use import::{ImportReport, Importer};
pub use listing::{NormalizedListing, PropertyReference, PropertyType};
pub use server::{router, AppState};
pub use token::TokenManager;
pub use vendor::{HttpVendorApi, VendorApi};
pub use xml::{get, get_all, get_text, parse_xml, text_of, XmlValue};
