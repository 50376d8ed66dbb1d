//! Branch and staff directory.
//!
//! Read-only lookups over branches and dentists, plus staff sign-in.

use crate::{
    entities::{Branch, Dentist, User, UserProfile, branch, dentist, user},
    errors::{Error, Result},
};
use sea_orm::{FromQueryResult, JoinType, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// A dentist with the location of their branch.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct DentistListing {
    /// Dentist's display name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Location of the dentist's branch
    pub branch_location: String,
}

/// A signed-in staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffAccount {
    /// Account id
    pub user_id: i64,
    /// Login name
    pub username: String,
    /// Profile first name
    pub first_name: String,
    /// Profile last name
    pub last_name: String,
    /// Profile role, e.g. `Admin` or `Staff`
    pub role: String,
    /// Linked dentist, if any
    pub dentist_id: Option<i64>,
}

/// Retrieves all branches ordered by id.
pub async fn list_branches(db: &DatabaseConnection) -> Result<Vec<branch::Model>> {
    Branch::find()
        .order_by_asc(branch::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a branch by id, returning None if it does not exist.
pub async fn get_branch(db: &DatabaseConnection, branch_id: i64) -> Result<Option<branch::Model>> {
    Branch::find_by_id(branch_id).one(db).await.map_err(Into::into)
}

/// Loads a branch that must exist.
pub(crate) async fn require_branch<C>(db: &C, branch_id: i64) -> Result<branch::Model>
where
    C: ConnectionTrait,
{
    Branch::find_by_id(branch_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Branch", branch_id))
}

/// Lists every dentist with their branch location, ordered by dentist id.
pub async fn list_dentists(db: &DatabaseConnection) -> Result<Vec<DentistListing>> {
    Dentist::find()
        .select_only()
        .column(dentist::Column::FullName)
        .column(dentist::Column::Email)
        .column_as(branch::Column::Location, "branch_location")
        .join(JoinType::InnerJoin, dentist::Relation::Branch.def())
        .order_by_asc(dentist::Column::Id)
        .into_model::<DentistListing>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Checks staff credentials.
///
/// Returns None when the username is unknown or the password does not match.
/// Passwords are compared in clear text.
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<StaffAccount>> {
    let found = User::find()
        .filter(user::Column::Username.eq(username))
        .find_also_related(UserProfile)
        .one(db)
        .await?;

    let Some((account, Some(profile))) = found else {
        warn!("Sign-in failed: unknown user");
        return Ok(None);
    };
    if account.password != password {
        warn!(user_id = account.id, "Sign-in failed: wrong password");
        return Ok(None);
    }

    info!(user_id = account.id, role = %profile.role, "Staff signed in");
    Ok(Some(StaffAccount {
        user_id: account.id,
        username: account.username,
        first_name: profile.first_name,
        last_name: profile.last_name,
        role: profile.role,
        dentist_id: account.dentist_id,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::Set;

    #[tokio::test]
    async fn test_list_and_get_branches() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_branch(&db, "Main Branch").await?;
        let b = create_test_branch(&db, "Ayala Center").await?;

        let all = list_branches(&db).await?;
        assert_eq!(all, vec![a.clone(), b.clone()]);
        assert_eq!(get_branch(&db, a.id).await?, Some(a));
        assert_eq!(get_branch(&db, 404).await?, None);

        assert_eq!(require_branch(&db, b.id).await?.location, "Ayala Center");
        assert!(matches!(
            require_branch(&db, 404).await,
            Err(Error::NotFound { entity: "Branch", .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_dentists_includes_branch_location() -> Result<()> {
        let db = setup_test_db().await?;
        let branch = create_test_branch(&db, "Main Branch").await?;
        dentist::ActiveModel {
            full_name: Set("Dr. Ana Reyes".to_string()),
            email: Set("ana@healteeth.test".to_string()),
            branch_id: Set(branch.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let dentists = list_dentists(&db).await?;
        assert_eq!(
            dentists,
            vec![DentistListing {
                full_name: "Dr. Ana Reyes".to_string(),
                email: "ana@healteeth.test".to_string(),
                branch_location: "Main Branch".to_string(),
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_account(&db, "staff01", "staffpwd", "Staff").await?;

        let account = authenticate(&db, "staff01", "staffpwd").await?.unwrap();
        assert_eq!(account.user_id, created.id);
        assert_eq!(account.role, "Staff");
        assert_eq!(account.dentist_id, None);

        assert!(authenticate(&db, "staff01", "wrong").await?.is_none());
        assert!(authenticate(&db, "nobody", "staffpwd").await?.is_none());
        Ok(())
    }
}
