//! Service type and version catalog fetchers
//!
//! Catalog data requires no credential and rides through the shared client,
//! whose entries never expire.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::cache::{CachedClient, Fetched};
use crate::config::FacadeConfig;
use crate::error::{Error, Result};
use crate::transport::HttpTransport;
use crate::upstream::parse;

/// Raw payload of `GET /v1/service_types`
#[derive(Debug, Clone, Deserialize)]
struct ServiceTypesResponse {
    #[serde(default)]
    service_types: HashMap<String, ServiceTypeInfo>,
}

/// Per-type entry of the upstream catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTypeInfo {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub latest_available_version: Option<String>,

    #[serde(default)]
    pub default_version: Option<String>,

    #[serde(default)]
    pub service_plans: Vec<ServicePlan>,

    /// Upstream attributes the facade carries through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One service plan with its per-region attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub service_plan: String,

    #[serde(default)]
    pub regions: HashMap<String, Region>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Region attributes within one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub disk_space_mb: Option<u64>,

    #[serde(default)]
    pub price_usd: Option<String>,

    #[serde(default)]
    pub node_memory_mb: Option<f64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One service type reshaped into the facade's resource envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceTypeResource {
    pub name: String,
    pub description: Option<String>,
    pub versions: VersionLinks,
    pub plans: PlanLinks,
}

/// Version summary with a link to the full version listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionLinks {
    pub latest_available_version: Option<String>,
    pub default_version: Option<String>,
    pub all_versions: String,
}

/// Plan listing link plus per-plan shortcuts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanLinks {
    pub url: String,
    pub shortcuts: BTreeMap<String, String>,
}

/// Plan name with its self link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummary {
    pub plan: String,
    pub url: String,
}

/// Fetch the full service-type catalog, keyed by type name.
pub async fn service_types<T: HttpTransport>(
    client: &CachedClient<T>,
    config: &FacadeConfig,
) -> Result<Fetched<BTreeMap<String, ServiceTypeInfo>>> {
    let url = format!("{}/v1/service_types", config.upstream_base_url);
    let fetched = client.get(&url, &[]).await?;
    let from_cache = fetched.from_cache;
    let response: ServiceTypesResponse = parse(fetched.value)?;

    Ok(Fetched {
        value: response.service_types.into_iter().collect(),
        from_cache,
    })
}

/// Fetch one service type reshaped with navigation links.
pub async fn service_type<T: HttpTransport>(
    client: &CachedClient<T>,
    config: &FacadeConfig,
    name: &str,
) -> Result<Fetched<ServiceTypeResource>> {
    let catalog = service_types(client, config).await?;
    let from_cache = catalog.from_cache;

    let info = catalog
        .value
        .get(name)
        .cloned()
        .ok_or_else(|| Error::ServiceTypeNotFound(name.to_string()))?;

    let plans_base = format!(
        "{}/service_types/{}/service_plans",
        config.public_base_url, name
    );
    let shortcuts = info
        .service_plans
        .iter()
        .map(|plan| {
            (
                plan.service_plan.clone(),
                format!("{}/{}/", plans_base, plan.service_plan),
            )
        })
        .collect();

    Ok(Fetched {
        value: ServiceTypeResource {
            name: name.to_string(),
            description: info.description,
            versions: VersionLinks {
                latest_available_version: info.latest_available_version,
                default_version: info.default_version,
                all_versions: format!(
                    "{}/service_types/{}/versions",
                    config.public_base_url, name
                ),
            },
            plans: PlanLinks {
                url: plans_base,
                shortcuts,
            },
        },
        from_cache,
    })
}

/// List the plans of one service type with their self links.
pub async fn service_plans<T: HttpTransport>(
    client: &CachedClient<T>,
    config: &FacadeConfig,
    name: &str,
) -> Result<Fetched<Vec<PlanSummary>>> {
    let catalog = service_types(client, config).await?;
    let from_cache = catalog.from_cache;

    let info = catalog
        .value
        .get(name)
        .cloned()
        .ok_or_else(|| Error::ServiceTypeNotFound(name.to_string()))?;

    let plans = info
        .service_plans
        .into_iter()
        .map(|plan| PlanSummary {
            url: format!(
                "{}/service_types/{}/service_plans/{}",
                config.public_base_url, name, plan.service_plan
            ),
            plan: plan.service_plan,
        })
        .collect();

    Ok(Fetched {
        value: plans,
        from_cache,
    })
}

/// Resolve exactly one plan by name.
///
/// Zero matches and multiple matches are distinct, recoverable errors.
pub fn find_plan<'a>(
    service_type: &str,
    plans: &'a [ServicePlan],
    name: &str,
) -> Result<&'a ServicePlan> {
    let mut matches = plans.iter().filter(|p| p.service_plan == name);

    match (matches.next(), matches.next()) {
        (Some(plan), None) => Ok(plan),
        (None, _) => Err(Error::PlanNotFound {
            service_type: service_type.to_string(),
            plan: name.to_string(),
        }),
        (Some(_), Some(_)) => Err(Error::AmbiguousPlan {
            service_type: service_type.to_string(),
            plan: name.to_string(),
            matches: 2 + matches.count(),
        }),
    }
}

/// Fetch the region map of one plan, the paginator's input.
pub async fn plan_regions<T: HttpTransport>(
    client: &CachedClient<T>,
    config: &FacadeConfig,
    service_type_name: &str,
    plan_name: &str,
) -> Result<Fetched<HashMap<String, Region>>> {
    let catalog = service_types(client, config).await?;
    let from_cache = catalog.from_cache;

    let info = catalog
        .value
        .get(service_type_name)
        .ok_or_else(|| Error::ServiceTypeNotFound(service_type_name.to_string()))?;
    let plan = find_plan(service_type_name, &info.service_plans, plan_name)?;

    Ok(Fetched {
        value: plan.regions.clone(),
        from_cache,
    })
}

/// Raw payload of `GET /v1/service_versions`
#[derive(Debug, Clone, Deserialize)]
struct ServiceVersionsResponse {
    #[serde(default)]
    service_versions: Vec<ServiceVersion>,
}

/// One entry of the flat upstream version list.
///
/// The unfiltered listing carries the upstream payload through untouched, so
/// unknown fields ride along in `extra` and absent fields are not
/// re-serialized as nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_end_of_life_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aiven_end_of_life_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_start_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_end_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_life_help_article_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_time: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Lifecycle timestamps carried through verbatim, possibly null
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionLifecycle {
    pub upstream_end_of_life_time: Option<String>,
    pub aiven_end_of_life_time: Option<String>,
    pub aiven_availability_start_time: Option<String>,
    pub aiven_availability_end_time: Option<String>,
    pub aiven_end_of_life_help_article_url: Option<String>,
    pub aiven_termination_time: Option<String>,
}

/// One major version of a filtered service type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MajorVersion {
    pub state: Option<String>,
    pub lifecycle: VersionLifecycle,
}

/// Version listing: flat when unfiltered, keyed by major version when
/// filtered down to one service type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VersionCatalog {
    All(Vec<ServiceVersion>),
    ByMajorVersion(BTreeMap<String, MajorVersion>),
}

/// Fetch service versions, optionally filtered to one service type.
///
/// With a filter, only entries whose `service_type` matches are kept and the
/// result is re-keyed by major version; entries without a major version are
/// skipped.
pub async fn service_versions<T: HttpTransport>(
    client: &CachedClient<T>,
    config: &FacadeConfig,
    filter_by_type: Option<&str>,
) -> Result<Fetched<VersionCatalog>> {
    let url = format!("{}/v1/service_versions", config.upstream_base_url);
    let fetched = client.get(&url, &[]).await?;
    let from_cache = fetched.from_cache;
    let response: ServiceVersionsResponse = parse(fetched.value)?;

    Ok(Fetched {
        value: response.service_versions,
        from_cache,
    }
    .map(|versions| match filter_by_type {
        None => VersionCatalog::All(versions),
        Some(service_type) => {
            let by_major = versions
                .into_iter()
                .filter(|v| v.service_type.as_deref() == Some(service_type))
                .filter_map(|v| {
                    let major = v.major_version.clone()?;
                    Some((
                        major,
                        MajorVersion {
                            state: v.state,
                            lifecycle: VersionLifecycle {
                                upstream_end_of_life_time: v.upstream_end_of_life_time,
                                aiven_end_of_life_time: v.aiven_end_of_life_time,
                                aiven_availability_start_time: v.availability_start_time,
                                aiven_availability_end_time: v.availability_end_time,
                                aiven_end_of_life_help_article_url: v.end_of_life_help_article_url,
                                aiven_termination_time: v.termination_time,
                            },
                        },
                    ))
                })
                .collect();
            VersionCatalog::ByMajorVersion(by_major)
        }
    }))
}
