//! Read-side queries.

use std::sync::Arc;

use vproc_models::{RequestId, RequestSummary, StatusView};
use vproc_store::RequestRepository;

use super::{load_request, Collaborators};
use crate::error::CoreResult;

#[derive(Clone)]
pub struct QueryService {
    repository: Arc<dyn RequestRepository>,
}

impl QueryService {
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            repository: collaborators.repository.clone(),
        }
    }

    /// Status of one request. Foreign requests are reported as not found.
    pub async fn get_status(&self, request_id: &RequestId, owner_id: &str) -> CoreResult<StatusView> {
        let request = load_request(self.repository.as_ref(), request_id, Some(owner_id)).await?;
        Ok(StatusView::from(&request))
    }

    /// All requests of `owner_id`, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> CoreResult<Vec<RequestSummary>> {
        let mut requests = self.repository.find_by_owner(owner_id).await?;
        requests.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(requests.iter().map(RequestSummary::from).collect())
    }
}
