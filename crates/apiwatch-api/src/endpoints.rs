// Endpoint registry: list, fetch, create, delete.

use tracing::debug;

use crate::client::MonitorClient;
use crate::error::Error;
use crate::models::{Confirmation, CreateEndpointRequest, Created, EndpointId, MonitoredEndpoint};

impl MonitorClient {
    /// List every monitored endpoint, in server order.
    ///
    /// `GET /apis`
    pub async fn list_endpoints(&self) -> Result<Vec<MonitoredEndpoint>, Error> {
        let url = self.url("apis")?;
        self.get(url, &[]).await
    }

    /// Fetch a single endpoint.
    ///
    /// `GET /apis/{id}`
    pub async fn get_endpoint(&self, id: EndpointId) -> Result<MonitoredEndpoint, Error> {
        let url = self.url(&format!("apis/{id}"))?;
        self.get(url, &[]).await
    }

    /// Register a new endpoint.
    ///
    /// `POST /apis` with `{"name": "...", "url": "..."}`. Both values are
    /// trimmed; an empty one is rejected without a request. The service
    /// owns URL validation and duplicate detection, which come back as
    /// [`Error::Validation`].
    pub async fn create_endpoint(&self, name: &str, url: &str) -> Result<Created, Error> {
        let name = name.trim();
        let target = url.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if target.is_empty() {
            return Err(Error::InvalidInput {
                field: "url",
                reason: "must not be empty".into(),
            });
        }

        debug!(name, url = target, "creating endpoint");
        let request_url = self.url("apis")?;
        self.post_json(request_url, &CreateEndpointRequest { name, url: target })
            .await
    }

    /// Stop monitoring an endpoint. History is removed with it.
    ///
    /// `DELETE /apis/{id}`
    pub async fn delete_endpoint(&self, id: EndpointId) -> Result<Confirmation, Error> {
        debug!(%id, "deleting endpoint");
        let url = self.url(&format!("apis/{id}"))?;
        self.delete(url).await
    }
}
