//! Project fetcher
//!
//! Reshapes the upstream project list into the facade's envelope: account and
//! billing references become nested blocks with navigation URLs, and every
//! project links to its service listing.

use serde::{Deserialize, Serialize};

use crate::cache::Fetched;
use crate::cache::registry::SessionRegistry;
use crate::config::FacadeConfig;
use crate::error::Result;
use crate::transport::HttpTransport;
use crate::upstream::{auth_headers, parse};

#[derive(Debug, Clone, Deserialize)]
struct ProjectsResponse {
    #[serde(default)]
    projects: Vec<RawProject>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawProject {
    #[serde(default)]
    tenant_id: Option<String>,

    #[serde(default)]
    project_name: Option<String>,

    #[serde(default)]
    account_id: Option<String>,

    #[serde(default)]
    account_name: Option<String>,

    #[serde(default)]
    billing_group_id: Option<String>,

    #[serde(default)]
    billing_group_name: Option<String>,
}

/// Project resource in the facade's envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub tenant_id: Option<String>,
    pub project_name: Option<String>,

    /// Owning account, present only when the upstream reports both id and name
    pub account: Option<ProjectAccount>,

    pub billing: ProjectBilling,

    /// Link to this project's service listing
    pub services: String,
}

/// Account block nested under a project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAccount {
    pub account_id: String,
    pub account_name: String,
    pub url: String,
}

/// Billing block nested under a project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectBilling {
    pub billing_group_id: Option<String>,
    pub billing_group_name: Option<String>,

    /// Billing group link; needs both the account and the group id
    pub url: Option<String>,
}

/// List the caller's projects in the facade's envelope.
pub async fn projects<T: HttpTransport>(
    registry: &SessionRegistry<T>,
    config: &FacadeConfig,
    credential: &str,
) -> Result<Fetched<Vec<Project>>> {
    let client = registry.client_for(credential)?;
    let url = format!("{}/v1/project", config.upstream_base_url);
    let fetched = client.get(&url, &auth_headers(credential)).await?;
    let from_cache = fetched.from_cache;
    let response: ProjectsResponse = parse(fetched.value)?;

    let projects = response
        .projects
        .into_iter()
        .map(|raw| reshape(config, raw))
        .collect();

    Ok(Fetched {
        value: projects,
        from_cache,
    })
}

fn reshape(config: &FacadeConfig, raw: RawProject) -> Project {
    let account = match (&raw.account_id, &raw.account_name) {
        (Some(id), Some(name)) => Some(ProjectAccount {
            account_id: id.clone(),
            account_name: name.clone(),
            url: format!("{}/accounts/{}/", config.public_base_url, id),
        }),
        _ => None,
    };

    let billing_url = match (&raw.account_id, &raw.billing_group_id) {
        (Some(account_id), Some(group_id)) => Some(format!(
            "{}/accounts/{}/billing_group/{}",
            config.public_base_url, account_id, group_id
        )),
        _ => None,
    };

    let services = format!(
        "{}/services?project={}",
        config.public_base_url,
        raw.project_name.as_deref().unwrap_or_default()
    );

    Project {
        tenant_id: raw.tenant_id,
        project_name: raw.project_name,
        account,
        billing: ProjectBilling {
            billing_group_id: raw.billing_group_id,
            billing_group_name: raw.billing_group_name,
            url: billing_url,
        },
        services,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    fn setup() -> (SessionRegistry<MockTransport>, MockTransport, FacadeConfig) {
        let config = FacadeConfig::default();
        let transport = MockTransport::new();
        let registry = SessionRegistry::new(transport.clone(), &config);
        (registry, transport, config)
    }

    #[tokio::test]
    async fn test_projects_full_reshape() {
        let (registry, transport, config) = setup();
        transport.push_ok(json!({
            "projects": [{
                "tenant_id": "aiven",
                "project_name": "alpha",
                "account_id": "acc-1",
                "account_name": "Team One",
                "billing_group_id": "bg-9",
                "billing_group_name": "Main"
            }]
        }));

        let projects = projects(&registry, &config, "token-1").await.unwrap().value;
        assert_eq!(projects.len(), 1);

        let project = &projects[0];
        assert_eq!(project.project_name.as_deref(), Some("alpha"));

        let account = project.account.as_ref().unwrap();
        assert_eq!(account.account_id, "acc-1");
        assert_eq!(account.url, "http://localhost:8000/accounts/acc-1/");

        assert_eq!(
            project.billing.url.as_deref(),
            Some("http://localhost:8000/accounts/acc-1/billing_group/bg-9")
        );
        assert_eq!(
            project.services,
            "http://localhost:8000/services?project=alpha"
        );
    }

    #[tokio::test]
    async fn test_projects_partial_blocks_omitted() {
        let (registry, transport, config) = setup();
        transport.push_ok(json!({
            "projects": [{
                "project_name": "beta",
                "account_id": "acc-1",
                "billing_group_id": "bg-9"
            }]
        }));

        let projects = projects(&registry, &config, "token-1").await.unwrap().value;
        let project = &projects[0];

        // Account block needs both id and name
        assert_eq!(project.account, None);
        // Billing URL needs the account id, which is present
        assert!(project.billing.url.is_some());
        assert_eq!(project.billing.billing_group_name, None);
    }

    #[tokio::test]
    async fn test_projects_billing_url_needs_account() {
        let (registry, transport, config) = setup();
        transport.push_ok(json!({
            "projects": [{
                "project_name": "gamma",
                "billing_group_id": "bg-9",
                "billing_group_name": "Main"
            }]
        }));

        let projects = projects(&registry, &config, "token-1").await.unwrap().value;
        assert_eq!(projects[0].billing.url, None);
        assert_eq!(projects[0].billing.billing_group_id.as_deref(), Some("bg-9"));
    }

    #[tokio::test]
    async fn test_projects_require_credential() {
        let (registry, _transport, config) = setup();

        let result = projects(&registry, &config, "").await;
        assert!(matches!(result, Err(crate::error::Error::MissingCredential)));
    }
}
