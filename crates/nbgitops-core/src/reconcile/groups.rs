// ── Group resolution & pruning ──

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use super::Reconciler;
use crate::error::CoreError;
use crate::model::{ALL_GROUP, DesiredState};
use crate::remote::ManagementApi;

/// Bidirectional name ↔ identifier map over every group the desired state
/// references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    by_name: HashMap<String, String>,
    by_id: HashMap<String, String>,
}

impl GroupIndex {
    fn insert(&mut self, name: String, id: String) {
        self.by_id.insert(id.clone(), name.clone());
        self.by_name.insert(name, id);
    }

    /// Identifier for a required group name.
    pub fn id(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Name for an identifier of a required group.
    pub fn name(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Translate a list of names, failing on any name outside the index.
    pub fn ids(&self, names: &[String]) -> Result<Vec<String>, CoreError> {
        super::resolve_all("group", names, &self.by_name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn by_name(&self) -> &HashMap<String, String> {
        &self.by_name
    }

    pub fn by_id(&self) -> &HashMap<String, String> {
        &self.by_id
    }
}

impl<A: ManagementApi> Reconciler<'_, A> {
    /// Make sure every referenced group exists remotely and index them.
    pub async fn resolve_groups(&self, desired: &DesiredState) -> Result<GroupIndex, CoreError> {
        let required: BTreeSet<&String> = desired.referenced_groups().collect();
        let remote = self.api.list_groups().await?;

        let mut index = GroupIndex::default();
        for group in remote {
            if required.contains(&group.name) {
                index.insert(group.name, group.id);
            }
        }

        for name in required {
            if index.contains_name(name) {
                continue;
            }
            self.announce(&format!("Creating group {name}"));
            let created = self.api.create_group(name).await?;
            info!(name = %name, id = %created.id, "created group");
            index.insert(name.clone(), created.id);
        }

        debug!(groups = index.len(), "groups resolved");
        Ok(index)
    }

    /// Delete every remote group outside the required set, except `All`.
    pub async fn prune_groups(&self, index: &GroupIndex) -> Result<(), CoreError> {
        for group in self.api.list_groups().await? {
            if group.name == ALL_GROUP || index.contains_name(&group.name) {
                continue;
            }
            self.announce(&format!(
                "Deleting group {} as it's not used by any configuration",
                group.name
            ));
            self.api.delete_group(&group).await?;
        }
        Ok(())
    }
}
