use crate::cddb::MetadataProvider;
use crate::cddb::error::{MetadataResult, NetworkError};
use crate::cddb::models::DiscMetadata;
use crate::cddb::query::CddbRequest;
use crate::cddb::response::parse_response;
use crate::config::CddbConfig;
use crate::toc::TableOfContents;
use crate::util::http::build_client;
use log::debug;
use reqwest::{Client, Method};
use std::time::Duration;
use tokio::sync::Mutex;
use tower::limit::RateLimit;
use tower::{Service, ServiceBuilder, ServiceExt};

/// Queries a CDDB server over HTTP.
///
/// Requests go through a rate limit; a failed request is reported as is and
/// never retried.
pub struct CddbClient {
    client: Client,
    service: Mutex<RateLimit<Client>>,
    config: CddbConfig,
}

impl CddbClient {
    /// Must be called from within a tokio runtime.
    pub fn new(config: CddbConfig) -> MetadataResult<Self> {
        let client = build_client(config.timeout)?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: CddbConfig, client: Client) -> Self {
        let service = ServiceBuilder::new()
            .rate_limit(config.requests_per_second.max(1), Duration::from_secs(1))
            .service(client.clone());

        Self {
            client,
            service: Mutex::new(service),
            config,
        }
    }

    pub async fn fetch(&self, toc: &TableOfContents) -> MetadataResult<DiscMetadata> {
        let request = CddbRequest::query(toc, &self.config);
        let url = request.url(&self.config.server_url)?;

        debug!("Querying metadata for disc {}: {url}", toc.disc_id());

        let req = self.client.request(Method::GET, url).build()?;

        let response = {
            let mut service = self.service.lock().await;
            service.ready().await?.call(req)
        }
        .await?;

        if !response.status().is_success() {
            return Err(NetworkError::NoSuccessStatusCode(response.status()).into());
        }

        let body = response.text().await?;
        debug!("Metadata reply for disc {}: {body:?}", toc.disc_id());

        parse_response(&body)
    }
}

impl MetadataProvider for CddbClient {
    async fn fetch(&self, toc: &TableOfContents) -> MetadataResult<DiscMetadata> {
        CddbClient::fetch(self, toc).await
    }
}
