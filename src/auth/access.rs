use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{AccessLevel, Page, PagePermission, User};

/// Returns the user's permission for a page, or Forbidden. Denies when no
/// permission row exists, when view is not granted, or when edit is
/// required but not granted.
pub fn require_page(
    store: &dyn Store,
    user: &User,
    page: Page,
    require_edit: bool,
) -> Result<PagePermission> {
    let perm = store
        .get_page_permission(user.id, page)?
        .ok_or(Error::Forbidden)?;

    if !perm.can_view {
        return Err(Error::Forbidden);
    }
    if require_edit && !perm.can_edit {
        return Err(Error::Forbidden);
    }

    Ok(perm)
}

/// Returns the user's access level on a team, or Forbidden. Absence of a
/// team permission is always a denial, never an implicit default.
pub fn require_team(
    store: &dyn Store,
    user: &User,
    team_id: i64,
    min_level: AccessLevel,
) -> Result<AccessLevel> {
    let perm = store
        .get_team_permission(user.id, team_id)?
        .ok_or(Error::Forbidden)?;

    if !perm.access_level.satisfies(min_level) {
        return Err(Error::Forbidden);
    }

    Ok(perm.access_level)
}
