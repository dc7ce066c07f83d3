//! User repository and directory for identity resolution.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::users;
use tillbook_core::audit::{AuditError, UserDirectory as UserDirectoryTrait};
use tillbook_core::identity::UserRecord;
use tillbook_shared::Role;

/// User row as exposed to the API layer.
#[derive(Debug, Clone)]
pub struct User {
    /// User id.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Roles held by the user.
    pub roles: Vec<Role>,
    /// Whether the user can log in and appear in the directory.
    pub is_active: bool,
}

/// User repository implementation.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Find a user by id.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuditError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;
        Ok(model.map(to_user))
    }
}

impl UserDirectoryTrait for UserRepository {
    async fn active_users(&self) -> Result<Vec<UserRecord>, AuditError> {
        let models = users::Entity::find()
            .filter(users::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| UserRecord {
                id: m.id,
                display_name: m.display_name,
            })
            .collect())
    }
}

fn to_user(model: users::Model) -> User {
    // Unknown role strings are dropped rather than failing the row.
    let roles = model
        .roles
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(Role::parse)
                .collect()
        })
        .unwrap_or_default();

    User {
        id: model.id,
        email: model.email,
        display_name: model.display_name,
        roles,
        is_active: model.is_active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_to_user_parses_roles_and_drops_unknown() {
        let model = users::Model {
            id: Uuid::new_v4(),
            email: "john@example.com".to_string(),
            display_name: "John Smith".to_string(),
            roles: serde_json::json!(["cashier", "cashup_reviewer", "superhero"]),
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        let user = to_user(model);
        assert_eq!(user.roles, vec![Role::Cashier, Role::CashupReviewer]);
    }

    #[test]
    fn test_to_user_tolerates_non_array_roles() {
        let model = users::Model {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            display_name: "Jane Doe".to_string(),
            roles: serde_json::json!("cashier"),
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        assert!(to_user(model).roles.is_empty());
    }
}
