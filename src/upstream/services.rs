//! Service fetchers
//!
//! `services` is the one fan-out in the crate: without an explicit project
//! list it first resolves the caller's projects, then issues one cached call
//! per project and flattens the results in input order. For P projects that
//! is 1 + P upstream calls, each independently cached. The first failing
//! project fetch fails the whole request.

use serde::{Deserialize, Serialize};

use crate::cache::Fetched;
use crate::cache::registry::SessionRegistry;
use crate::config::FacadeConfig;
use crate::error::Result;
use crate::transport::HttpTransport;
use crate::upstream::{auth_headers, parse, projects};

#[derive(Debug, Clone, Deserialize)]
struct ServicesResponse {
    #[serde(default)]
    services: Vec<RawService>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawService {
    #[serde(default)]
    service_name: Option<String>,
}

/// Name plus self link, used for both the project and service blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRef {
    pub name: String,
    pub url: String,
}

/// One service in the flattened cross-project listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceEntry {
    pub project: ResourceRef,
    pub service: ResourceRef,
}

/// List the service names of one project.
pub async fn services_for_project<T: HttpTransport>(
    registry: &SessionRegistry<T>,
    config: &FacadeConfig,
    credential: &str,
    project: &str,
) -> Result<Fetched<Vec<String>>> {
    let client = registry.client_for(credential)?;
    let url = format!(
        "{}/v1/project/{}/service",
        config.upstream_base_url, project
    );
    let fetched = client.get(&url, &auth_headers(credential)).await?;
    let from_cache = fetched.from_cache;
    let response: ServicesResponse = parse(fetched.value)?;

    Ok(Fetched {
        value: response,
        from_cache,
    }
    .map(|response| {
        response
            .services
            .into_iter()
            .filter_map(|service| service.service_name)
            .collect()
    }))
}

/// List services across projects.
///
/// With no explicit project list, every project the credential can see is
/// resolved first. Result order follows the project list, then the upstream
/// service order within each project. `from_cache` is true only when every
/// call in the fan-out was served from the cache.
pub async fn services<T: HttpTransport>(
    registry: &SessionRegistry<T>,
    config: &FacadeConfig,
    credential: &str,
    project_filter: Option<&[String]>,
) -> Result<Fetched<Vec<ServiceEntry>>> {
    let mut all_from_cache = true;

    let project_names: Vec<String> = match project_filter {
        Some(projects) => projects.to_vec(),
        None => {
            let fetched = projects::projects(registry, config, credential).await?;
            all_from_cache &= fetched.from_cache;
            fetched
                .value
                .into_iter()
                .filter_map(|project| project.project_name)
                .collect()
        }
    };

    let mut entries = Vec::new();
    for project in &project_names {
        let fetched = services_for_project(registry, config, credential, project).await?;
        all_from_cache &= fetched.from_cache;

        for name in fetched.value {
            entries.push(ServiceEntry {
                project: ResourceRef {
                    name: project.clone(),
                    url: format!("{}/projects/{}/", config.public_base_url, project),
                },
                service: ResourceRef {
                    url: format!(
                        "{}/projects/{}/services/{}/",
                        config.public_base_url, project, name
                    ),
                    name,
                },
            });
        }
    }

    Ok(Fetched {
        value: entries,
        from_cache: all_from_cache,
    })
}
