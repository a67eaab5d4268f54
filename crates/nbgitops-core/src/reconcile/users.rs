// ── User reconciliation ──
//
// Users come from the identity provider: they are updated or blocked, never
// created or deleted.

use std::collections::HashMap;

use tracing::debug;

use super::{GroupIndex, Reconciler};
use crate::error::CoreError;
use crate::model::set::same_set;
use crate::model::{DesiredState, Role, User};
use crate::remote::ManagementApi;

impl<A: ManagementApi> Reconciler<'_, A> {
    /// Reconcile users and return every remote user keyed by id, with groups
    /// (as identifiers), role and blocked state as they stand after this step.
    pub async fn reconcile_users(
        &self,
        desired: &DesiredState,
        groups: &GroupIndex,
    ) -> Result<HashMap<String, User>, CoreError> {
        let by_email: HashMap<&str, &User> =
            desired.users.iter().map(|u| (u.email.as_str(), u)).collect();

        let mut reconciled = HashMap::new();
        for remote in self.api.list_users().await? {
            let user = self.reconcile_user(remote, &by_email, groups).await?;
            reconciled.insert(user.id.clone(), user);
        }
        Ok(reconciled)
    }

    async fn reconcile_user(
        &self,
        mut user: User,
        by_email: &HashMap<&str, &User>,
        groups: &GroupIndex,
    ) -> Result<User, CoreError> {
        if user.service_user {
            debug!(id = %user.id, "skipping service user");
            return Ok(user);
        }
        if user.email.is_empty() {
            self.report(&format!(
                "User ID {} exists in NetBird with no email, most likely deleted from SSO",
                user.id
            ));
        }

        let Some(wanted) = by_email.get(user.email.as_str()).filter(|_| !user.email.is_empty())
        else {
            if user.is_locked_down() {
                debug!(email = %user.email, "untracked user already blocked");
                return Ok(user);
            }
            self.announce(&format!(
                "User {} exists in NetBird but not in Git, user blocked",
                user.email
            ));
            user.blocked = true;
            user.groups.clear();
            user.role = Role::User;
            self.api.update_user(&user).await?;
            return Ok(user);
        };

        let wanted_ids = groups.ids(&wanted.groups)?;
        if same_set(&wanted_ids, &user.groups) && user.role == wanted.role {
            debug!(email = %user.email, "user matches");
            return Ok(user);
        }

        let current_names: Vec<&str> = user
            .groups
            .iter()
            .map(|id| groups.name(id).unwrap_or(id))
            .collect();
        self.announce(&format!(
            "Updating user {}: groups {:?} -> {:?}, role {} -> {}",
            user.email, current_names, wanted.groups, user.role, wanted.role
        ));
        user.groups = wanted_ids;
        user.role = wanted.role;
        self.api.update_user(&user).await?;
        Ok(user)
    }
}
