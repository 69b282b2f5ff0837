//! Upstream resource fetchers
//!
//! One thin, composable function per upstream resource family. Each performs
//! a single cached GET and reshapes the payload into the facade's resource
//! envelope, attaching self-referential navigation URLs. Catalog data goes
//! through the shared client; everything else through the caller's private
//! session. Upstream failures propagate unchanged; reshaping never swallows
//! them.

pub mod accounts;
pub mod catalog;
pub mod projects;
pub mod services;

use serde::de::DeserializeOwned;

use crate::error::{Result, UpstreamError};

pub use accounts::{Account, account, accounts};
pub use catalog::{
    MajorVersion, PlanSummary, Region, ServicePlan, ServiceTypeInfo, ServiceTypeResource,
    ServiceVersion, VersionCatalog, VersionLifecycle, find_plan, plan_regions, service_plans,
    service_type, service_types, service_versions,
};
pub use projects::{Project, ProjectAccount, ProjectBilling, projects};
pub use services::{ResourceRef, ServiceEntry, services, services_for_project};

/// Headers for an authenticated upstream call.
///
/// The bearer credential goes into the `authorization` header verbatim, the
/// way the upstream expects it.
pub(crate) fn auth_headers(credential: &str) -> Vec<(String, String)> {
    vec![("authorization".to_string(), credential.to_string())]
}

/// Deserialize a cached JSON body into a typed payload
pub(crate) fn parse<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        UpstreamError::InvalidResponse(format!("Failed to parse upstream payload: {}", e)).into()
    })
}
