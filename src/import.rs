// The fetch, filter and map pipeline for one import run
use crate::classify;
use crate::error::ProxyError;
use crate::listing::{NormalizedListing, PropertyReference};
use crate::mapper;
use crate::token::TokenManager;
use crate::vendor::VendorApi;
use crate::xml;
use std::sync::Arc;

#[derive(Debug)]
pub struct ImportReport {
    pub properties: Vec<NormalizedListing>,
    // every entry of the branch list, including invalid references
    pub total_found: usize,
    // invalid references plus records the classifier rejected
    pub skipped: usize,
    // per-property fetch, parse or mapping failures
    pub errors: usize,
}

pub struct Importer {
    vendor: Arc<dyn VendorApi>,
    tokens: Arc<TokenManager>,
    property_list_url: String,
    strict_classifier: bool,
}

impl Importer {
    pub fn new(
        vendor: Arc<dyn VendorApi>,
        tokens: Arc<TokenManager>,
        property_list_url: String,
        strict_classifier: bool,
    ) -> Self {
        Self {
            vendor,
            tokens,
            property_list_url,
            strict_classifier,
        }
    }

    // Details are fetched one at a time, in list order. Credential or
    // list-level failures abort the run; everything per-property is contained
    // and counted so a single malformed record never sinks the batch.
    pub async fn run(&self, agent_email: Option<&str>) -> Result<ImportReport, ProxyError> {
        let token = self.tokens.get_token().await?;

        let list_xml = self.vendor.fetch_xml(&self.property_list_url, &token).await?;
        let list = xml::parse_xml(&list_xml)?;

        let entries = xml::get_all(&list, "properties.property");
        let total_found = entries.len();

        let mut skipped = 0usize;
        let mut references = Vec::new();
        for entry in entries {
            let prop_id = xml::get_text(entry, "prop_id").filter(|id| !id.is_empty());
            let url = xml::get_text(entry, "url").filter(|url| !url.is_empty());
            match (prop_id, url) {
                (Some(prop_id), Some(url)) => references.push(PropertyReference {
                    prop_id: prop_id.to_string(),
                    url: url.to_string(),
                }),
                _ => {
                    tracing::warn!("property list entry missing prop_id or url, skipping");
                    skipped += 1;
                }
            }
        }

        tracing::info!(
            total_found,
            candidates = references.len(),
            "fetched branch property list"
        );

        let mut errors = 0usize;
        let mut properties = Vec::new();
        for reference in &references {
            let detail_xml = match self.vendor.fetch_xml(&reference.url, &token).await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(prop_id = %reference.prop_id, error = %err, "property fetch failed");
                    errors += 1;
                    continue;
                }
            };

            let record = match xml::parse_xml(&detail_xml) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(prop_id = %reference.prop_id, error = %err, "property parse failed");
                    errors += 1;
                    continue;
                }
            };

            if !classify::is_student_letting(&record, self.strict_classifier)
                || !classify::is_web_available(&record)
            {
                skipped += 1;
                continue;
            }

            match mapper::map_property(&record, agent_email) {
                Ok(listing) => properties.push(listing),
                Err(err) => {
                    tracing::warn!(prop_id = %reference.prop_id, error = %err, "property mapping failed");
                    errors += 1;
                }
            }
        }

        Ok(ImportReport {
            properties,
            total_found,
            skipped,
            errors,
        })
    }
}
