//! ARM resource ID parsing
//!
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/{child}/{name}...]`

use armflow_cloud::CloudError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub namespace: Option<String>,
    pub resource_type: Option<String>,
    pub name: String,
}

impl ResourceId {
    pub fn parse(id: &str) -> armflow_cloud::Result<Self> {
        let invalid = || CloudError::Validation(format!("invalid resource ID: {}", id));

        if !id.starts_with('/') {
            return Err(invalid());
        }
        let segments: Vec<&str> = id.trim_matches('/').split('/').collect();
        if segments.len() < 4
            || !segments[0].eq_ignore_ascii_case("subscriptions")
            || !segments[2].eq_ignore_ascii_case("resourceGroups")
            || segments.iter().any(|s| s.is_empty())
        {
            return Err(invalid());
        }

        let (namespace, resource_type) = match segments.get(4) {
            Some(p) if p.eq_ignore_ascii_case("providers") => (
                segments.get(5).map(|s| s.to_string()),
                segments.get(6).map(|s| s.to_string()),
            ),
            _ => (None, None),
        };

        Ok(Self {
            subscription_id: segments[1].to_string(),
            resource_group: segments[3].to_string(),
            namespace,
            resource_type,
            // Resource group IDs end at the group itself
            name: segments[segments.len() - 1].to_string(),
        })
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.namespace, &self.resource_type) {
            (Some(ns), Some(ty)) => write!(
                f,
                "/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
                self.subscription_id, self.resource_group, ns, ty, self.name
            ),
            _ => write!(
                f,
                "/subscriptions/{}/resourceGroups/{}",
                self.subscription_id, self.resource_group
            ),
        }
    }
}
