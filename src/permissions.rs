//! Permission administration: reconciling a user's desired page/team
//! permission sets against the stored ones. User creation funnels through
//! the same reconciliation so both paths share one validation contract.

use serde::{Deserialize, Serialize};

use crate::auth::CredentialHasher;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{AccessLevel, Page, PageCapability, PageGrant, TeamGrant, User, UserUpdate};

/// One desired page capability, as submitted by a caller. The page key is
/// validated against the closed page set; the view/edit pair is
/// normalized before storage.
#[derive(Debug, Clone, Deserialize)]
pub struct PageAssignment {
    pub page: String,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_edit: bool,
}

/// One desired team access level. An absent level removes any existing
/// permission for that team.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamAssignment {
    pub team_id: i64,
    #[serde(default)]
    pub access_level: Option<String>,
}

/// The full desired state for one reconciliation call. `pages` and
/// `teams` are complete sets: anything not listed is removed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageAssignment>,
    #[serde(default)]
    pub teams: Vec<TeamAssignment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub password: String,
    #[serde(default)]
    pub must_change_password: bool,
    #[serde(default)]
    pub pages: Vec<PageAssignment>,
    #[serde(default)]
    pub teams: Vec<TeamAssignment>,
}

#[derive(Debug, Serialize)]
pub struct PagePermissionView {
    pub page: Page,
    pub can_view: bool,
    pub can_edit: bool,
}

#[derive(Debug, Serialize)]
pub struct TeamPermissionView {
    pub team_id: i64,
    pub team_name: String,
    pub access_level: AccessLevel,
}

/// A user together with their resolved permissions, as returned by the
/// permission endpoints and /auth/me.
#[derive(Debug, Serialize)]
pub struct UserWithPermissions {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub must_change_password: bool,
    pub is_active: bool,
    pub pages: Vec<PagePermissionView>,
    pub teams: Vec<TeamPermissionView>,
}

/// Validates and normalizes a desired state into a storable `UserUpdate`.
/// A non-empty new password is hashed here; rotation side effects
/// (clearing must_change_password, bumping token_version) happen in the
/// store transaction.
fn build_user_update(
    hasher: &CredentialHasher,
    update: &PermissionUpdate,
) -> Result<UserUpdate> {
    let mut pages = Vec::with_capacity(update.pages.len());
    for assignment in &update.pages {
        let page = Page::parse(&assignment.page)
            .ok_or(Error::InvalidInput("invalid_page"))?;
        let capability =
            PageCapability::new(assignment.can_view, assignment.can_edit).normalized();
        pages.push(PageGrant {
            page,
            can_view: capability.can_view,
            can_edit: capability.can_edit,
        });
    }

    let mut teams = Vec::with_capacity(update.teams.len());
    for assignment in &update.teams {
        let access_level = match assignment.access_level.as_deref() {
            Some(level) => Some(
                AccessLevel::parse(level).ok_or(Error::InvalidInput("invalid_access_level"))?,
            ),
            None => None,
        };
        teams.push(TeamGrant {
            team_id: assignment.team_id,
            access_level,
        });
    }

    let password_hash = match update.new_password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(hasher.hash(password)?),
        None => None,
    };

    Ok(UserUpdate {
        display_name: update.display_name.clone(),
        password_hash,
        pages,
        teams,
    })
}

/// Reconciles one user's permissions (and optionally display name and
/// credentials) against the desired state.
pub fn apply_permission_update(
    store: &dyn Store,
    hasher: &CredentialHasher,
    user_id: i64,
    update: &PermissionUpdate,
) -> Result<UserWithPermissions> {
    let desired = build_user_update(hasher, update)?;
    let user = store.apply_user_update(user_id, &desired)?;
    resolve_user(store, &user)
}

/// Creates a user, then runs the permission reconciliation on the fresh
/// row. Validation failures roll back nothing but the permission state;
/// the caller sees the same error codes as an update would produce.
pub fn create_user_with_permissions(
    store: &dyn Store,
    hasher: &CredentialHasher,
    new_user: &NewUser,
) -> Result<UserWithPermissions> {
    let now = chrono::Utc::now();
    let user = store.create_user(&User {
        id: 0,
        username: new_user.username.clone(),
        display_name: new_user.display_name.clone(),
        password_hash: hasher.hash(&new_user.password)?,
        must_change_password: new_user.must_change_password,
        is_active: true,
        token_version: 1,
        created_at: now,
        updated_at: now,
    })?;

    let update = PermissionUpdate {
        display_name: None,
        new_password: None,
        pages: new_user.pages.clone(),
        teams: new_user.teams.clone(),
    };
    apply_permission_update(store, hasher, user.id, &update)
}

/// Loads a user's permissions and joins team names for display. Pages are
/// ordered by page key, teams by team name.
pub fn resolve_user(store: &dyn Store, user: &User) -> Result<UserWithPermissions> {
    let pages = store
        .list_page_permissions(user.id)?
        .into_iter()
        .map(|perm| PagePermissionView {
            page: perm.page,
            can_view: perm.can_view,
            can_edit: perm.can_edit,
        })
        .collect();

    let mut teams = Vec::new();
    for perm in store.list_team_permissions(user.id)? {
        let team = store.get_team(perm.team_id)?.ok_or(Error::NotFound)?;
        teams.push(TeamPermissionView {
            team_id: perm.team_id,
            team_name: team.name,
            access_level: perm.access_level,
        });
    }
    teams.sort_by(|a, b| a.team_name.cmp(&b.team_name));

    Ok(UserWithPermissions {
        id: user.id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        must_change_password: user.must_change_password,
        is_active: user.is_active,
        pages,
        teams,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::store::SqliteStore;
    use crate::types::Team;

    fn setup() -> (SqliteStore, CredentialHasher) {
        let store = SqliteStore::new(":memory:").unwrap();
        store.initialize().unwrap();
        (store, CredentialHasher::new())
    }

    fn make_team(store: &SqliteStore, name: &str, code: &str) -> Team {
        let now = Utc::now();
        store
            .create_team(&Team {
                id: 0,
                name: name.to_string(),
                code: code.to_string(),
                description: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap()
    }

    fn make_user(store: &SqliteStore, hasher: &CredentialHasher, username: &str) -> UserWithPermissions {
        create_user_with_permissions(
            store,
            hasher,
            &NewUser {
                username: username.to_string(),
                display_name: username.to_string(),
                password: "initial-pw".to_string(),
                must_change_password: false,
                pages: vec![],
                teams: vec![],
            },
        )
        .unwrap()
    }

    fn page(page: &str, can_view: bool, can_edit: bool) -> PageAssignment {
        PageAssignment {
            page: page.to_string(),
            can_view,
            can_edit,
        }
    }

    fn team(team_id: i64, level: Option<&str>) -> TeamAssignment {
        TeamAssignment {
            team_id,
            access_level: level.map(str::to_string),
        }
    }

    #[test]
    fn test_edit_implies_view_regardless_of_request() {
        let (store, hasher) = setup();
        let user = make_user(&store, &hasher, "alice");

        let resolved = apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                pages: vec![page("schedule", false, true)],
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(resolved.pages.len(), 1);
        assert!(resolved.pages[0].can_view);
        assert!(resolved.pages[0].can_edit);
    }

    #[test]
    fn test_absent_page_is_removed() {
        let (store, hasher) = setup();
        let user = make_user(&store, &hasher, "alice");

        apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                pages: vec![page("schedule", true, false), page("people", true, false)],
                ..Default::default()
            },
        )
        .unwrap();

        let resolved = apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                pages: vec![page("schedule", true, false)],
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(resolved.pages.len(), 1);
        assert_eq!(resolved.pages[0].page, Page::Schedule);
    }

    #[test]
    fn test_unknown_page_rejected() {
        let (store, hasher) = setup();
        let user = make_user(&store, &hasher, "alice");

        let result = apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                pages: vec![page("dashboard", true, false)],
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::InvalidInput("invalid_page"))));
    }

    #[test]
    fn test_unknown_access_level_rejected() {
        let (store, hasher) = setup();
        let user = make_user(&store, &hasher, "alice");
        let ops = make_team(&store, "Operations", "ops");

        let result = apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                teams: vec![team(ops.id, Some("admin"))],
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(Error::InvalidInput("invalid_access_level"))
        ));
    }

    #[test]
    fn test_missing_team_rejected() {
        let (store, hasher) = setup();
        let user = make_user(&store, &hasher, "alice");

        let result = apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                teams: vec![team(999, Some("read"))],
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::TeamNotFound)));
    }

    #[test]
    fn test_absent_level_removes_then_readd_keeps_single_row() {
        let (store, hasher) = setup();
        let user = make_user(&store, &hasher, "alice");
        let ops = make_team(&store, "Operations", "ops");

        apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                teams: vec![team(ops.id, Some("read"))],
                ..Default::default()
            },
        )
        .unwrap();

        let removed = apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                teams: vec![team(ops.id, None)],
                ..Default::default()
            },
        )
        .unwrap();
        assert!(removed.teams.is_empty());

        apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                teams: vec![team(ops.id, Some("read"))],
                ..Default::default()
            },
        )
        .unwrap();
        let resolved = apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                teams: vec![team(ops.id, Some("write"))],
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(resolved.teams.len(), 1);
        assert_eq!(resolved.teams[0].access_level, AccessLevel::Write);
        assert_eq!(store.list_team_permissions(user.id).unwrap().len(), 1);
    }

    #[test]
    fn test_password_rotation_bumps_token_version() {
        let (store, hasher) = setup();
        let created = create_user_with_permissions(
            &store,
            &hasher,
            &NewUser {
                username: "alice".to_string(),
                display_name: "Alice".to_string(),
                password: "initial-pw".to_string(),
                must_change_password: true,
                pages: vec![],
                teams: vec![],
            },
        )
        .unwrap();

        let before = store.get_user(created.id).unwrap().unwrap();
        assert!(before.must_change_password);

        apply_permission_update(
            &store,
            &hasher,
            created.id,
            &PermissionUpdate {
                new_password: Some("rotated-pw".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let after = store.get_user(created.id).unwrap().unwrap();
        assert_eq!(after.token_version, before.token_version + 1);
        assert!(!after.must_change_password);
        assert!(hasher.verify("rotated-pw", &after.password_hash).unwrap());
    }

    #[test]
    fn test_empty_new_password_is_ignored() {
        let (store, hasher) = setup();
        let user = make_user(&store, &hasher, "alice");
        let before = store.get_user(user.id).unwrap().unwrap();

        apply_permission_update(
            &store,
            &hasher,
            user.id,
            &PermissionUpdate {
                new_password: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();

        let after = store.get_user(user.id).unwrap().unwrap();
        assert_eq!(after.token_version, before.token_version);
        assert_eq!(after.password_hash, before.password_hash);
    }

    #[test]
    fn test_create_user_assigns_permissions_in_one_path() {
        let (store, hasher) = setup();
        let ops = make_team(&store, "Operations", "ops");

        let created = create_user_with_permissions(
            &store,
            &hasher,
            &NewUser {
                username: "planner".to_string(),
                display_name: "Planner".to_string(),
                password: "pw".to_string(),
                must_change_password: false,
                pages: vec![page("schedule", false, true)],
                teams: vec![team(ops.id, Some("write"))],
            },
        )
        .unwrap();

        assert_eq!(created.pages.len(), 1);
        assert!(created.pages[0].can_view); // normalized on the create path too
        assert_eq!(created.teams.len(), 1);
        assert_eq!(created.teams[0].access_level, AccessLevel::Write);
    }

    #[test]
    fn test_duplicate_username_conflict() {
        let (store, hasher) = setup();
        make_user(&store, &hasher, "alice");

        let result = create_user_with_permissions(
            &store,
            &hasher,
            &NewUser {
                username: "alice".to_string(),
                display_name: "Other Alice".to_string(),
                password: "pw".to_string(),
                must_change_password: false,
                pages: vec![],
                teams: vec![],
            },
        );
        assert!(matches!(result, Err(Error::Conflict("duplicate_username"))));
    }
}
