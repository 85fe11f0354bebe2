// Authenticated HTTP access to the vendor datafeed
use crate::error::ProxyError;
use async_trait::async_trait;

// Seam between the pipeline and the network, so tests can fake the upstream.
#[async_trait]
pub trait VendorApi: Send + Sync + 'static {
    // Exchanges the configured credentials for a short-lived token carried in
    // the response `token` header of the branch endpoint.
    async fn fetch_token_header(&self) -> Result<String, ProxyError>;

    // Fetches one XML document with the token-as-username Basic-Auth scheme.
    async fn fetch_xml(&self, url: &str, token: &str) -> Result<String, ProxyError>;
}

pub struct HttpVendorApi {
    client: reqwest::Client,
    api_base: String,
    username: String,
    password: String,
}

impl HttpVendorApi {
    pub fn new(api_base: String, username: String, password: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            username,
            password,
        }
    }
}

#[async_trait]
impl VendorApi for HttpVendorApi {
    async fn fetch_token_header(&self) -> Result<String, ProxyError> {
        let url = format!("{}/branch", self.api_base);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProxyError::Auth(format!(
                "vendor rejected credentials with status {}",
                response.status()
            )));
        }

        // Header names are matched case-insensitively; the vendor has been
        // observed sending both `token` and `Token`.
        let token = response
            .headers()
            .get("token")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ProxyError::Auth("vendor response carried no token header".to_string()))?;

        Ok(token.to_string())
    }

    async fn fetch_xml(&self, url: &str, token: &str) -> Result<String, ProxyError> {
        // Token as username, empty password. This is the vendor's convention
        // for all data requests and is distinct from the credential exchange.
        let response = self
            .client
            .get(url)
            .basic_auth(token, Some(""))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProxyError::UpstreamFetch {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
