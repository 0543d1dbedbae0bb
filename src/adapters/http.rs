use tracing::debug;
use url::Url;

use crate::config::PluginConfig;
use crate::ports::master::{MasterApi, MasterError, MasterResponse, MasterRoute};

/// `MasterApi` over HTTPS using reqwest.
#[derive(Debug, Clone)]
pub struct HttpMasterApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpMasterApi {
    pub fn new(config: &PluginConfig) -> Result<Self, MasterError> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(config.tls_no_verify);
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MasterError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: config.master_url.clone(),
        })
    }

    /// `{base}/api/{login}/{GUID}/{resource}?{query}` with every segment
    /// percent-encoded.
    pub fn url_for(&self, route: &MasterRoute) -> Result<Url, MasterError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| MasterError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["api", route.login.as_str(), route.guid.as_str(), route.resource]);
        url.set_query(None);
        if !route.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &route.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn finish(resp: reqwest::Response) -> Result<MasterResponse, MasterError> {
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| MasterError::ReadBody(e.to_string()))?;
        debug!(status, bytes = body.len(), "master responded");
        Ok(MasterResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[async_trait::async_trait]
impl MasterApi for HttpMasterApi {
    async fn get(&self, route: &MasterRoute) -> Result<MasterResponse, MasterError> {
        let url = self.url_for(route)?;
        debug!(resource = route.resource, "GET master");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MasterError::Request(e.to_string()))?;
        Self::finish(resp).await
    }

    async fn post(
        &self,
        route: &MasterRoute,
        body: Vec<u8>,
    ) -> Result<MasterResponse, MasterError> {
        let url = self.url_for(route)?;
        debug!(resource = route.resource, bytes = body.len(), "POST master");
        let resp = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| MasterError::Request(e.to_string()))?;
        Self::finish(resp).await
    }
}
