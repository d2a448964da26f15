//! Background service answering bus requests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use acrotip_protocols::{PageContext, Request, RequestHandler, Response};

use crate::orchestrator::LookupOrchestrator;
use crate::recent::RecentLookups;

pub struct BackgroundService {
    orchestrator: Arc<LookupOrchestrator>,
    recent: RecentLookups,
}

impl BackgroundService {
    pub fn new(orchestrator: Arc<LookupOrchestrator>, recent: RecentLookups) -> Self {
        Self {
            orchestrator,
            recent,
        }
    }

    pub fn orchestrator(&self) -> &Arc<LookupOrchestrator> {
        &self.orchestrator
    }
}

#[async_trait]
impl RequestHandler for BackgroundService {
    async fn handle(&self, request: Request) -> Response {
        debug!("Handling {} request", request.kind());
        match request {
            Request::ResolveLookup { term, context } => {
                let result = self.orchestrator.resolve(&term, &context).await;
                self.recent.track(&term).await;
                Response::Lookup { result }
            }
            Request::ManualLookup { term } => {
                let result = self
                    .orchestrator
                    .resolve(&term, &PageContext::default())
                    .await;
                self.recent.track(&term).await;
                Response::Lookup { result }
            }
            Request::ClearCache => {
                self.orchestrator.cache().clear().await;
                Response::Cleared
            }
            Request::TrackRecent { term } => {
                self.recent.track(&term).await;
                Response::Ack
            }
            Request::RecentLookups => Response::Recent {
                terms: self.recent.list().await,
            },
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
