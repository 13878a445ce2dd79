use crate::cycle::{RewriteRequest, RewriteResult};
use crate::error::CycleError;
use async_trait::async_trait;

/// The single typed operation the rewrite engine exposes.
///
/// Implementations own transport, authentication, and response-shape
/// validation; callers never see a raw completion payload.
#[async_trait]
pub trait RewriteEngine: Send + Sync {
    async fn complete(&self, request: &RewriteRequest) -> Result<RewriteResult, CycleError>;
}
