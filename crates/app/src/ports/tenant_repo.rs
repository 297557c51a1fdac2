//! Tenant repository port.

use std::future::Future;
use std::sync::Arc;

use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::TenantId;
use schoolhub_domain::tenant::Tenant;

/// Read access to tenant records.
pub trait TenantRepository {
    /// Get a tenant by id.
    fn get_by_id(
        &self,
        id: TenantId,
    ) -> impl Future<Output = Result<Option<Tenant>, SchoolHubError>> + Send;
}

impl<T: TenantRepository + Send + Sync> TenantRepository for Arc<T> {
    fn get_by_id(
        &self,
        id: TenantId,
    ) -> impl Future<Output = Result<Option<Tenant>, SchoolHubError>> + Send {
        (**self).get_by_id(id)
    }
}
