// Environment configuration, validated at startup
use anyhow::Context;
use std::time::Duration;

const VENDOR_HOST: &str = "https://webservices.vebra.com/export";

// All required values must be present before the server starts; a missing
// credential must never flow silently into request construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub vendor_username: String,
    pub vendor_password: String,
    pub datafeed_id: String,
    pub branch_id: String,
    pub proxy_secret: String,
    pub token_ttl: Duration,
    pub classifier_strict: bool,
    pub proxy_ip: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a port number")?;

        let vendor_username =
            std::env::var("VENDOR_USERNAME").context("VENDOR_USERNAME must be provided")?;
        let vendor_password =
            std::env::var("VENDOR_PASSWORD").context("VENDOR_PASSWORD must be provided")?;
        let datafeed_id =
            std::env::var("VENDOR_DATAFEED_ID").context("VENDOR_DATAFEED_ID must be provided")?;
        let branch_id =
            std::env::var("VENDOR_BRANCH_ID").context("VENDOR_BRANCH_ID must be provided")?;
        let proxy_secret =
            std::env::var("PROXY_SECRET").context("PROXY_SECRET must be provided")?;

        let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .context("TOKEN_TTL_SECS must be a number of seconds")?;

        let classifier_strict = matches!(
            std::env::var("CLASSIFIER_STRICT").as_deref(),
            Ok("1") | Ok("true")
        );

        let proxy_ip = std::env::var("PROXY_IP").unwrap_or_else(|_| "unknown".to_string());

        Ok(Config {
            port,
            vendor_username,
            vendor_password,
            datafeed_id,
            branch_id,
            proxy_secret,
            token_ttl: Duration::from_secs(token_ttl_secs),
            classifier_strict,
            proxy_ip,
        })
    }

    pub fn api_base(&self) -> String {
        format!("{}/{}/v10", VENDOR_HOST, self.datafeed_id)
    }

    // The branch inventory endpoint: prop_id + url pairs for every property.
    pub fn property_list_url(&self) -> String {
        format!("{}/branch/{}/property", self.api_base(), self.branch_id)
    }
}
