mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface. Every write method is a single
/// transactional unit; multi-statement writes commit all-or-nothing.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    /// Deletes the user and, first, its page and team permissions.
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn count_users(&self) -> Result<i64>;

    // Permission lookups
    fn get_page_permission(&self, user_id: i64, page: Page) -> Result<Option<PagePermission>>;
    fn list_page_permissions(&self, user_id: i64) -> Result<Vec<PagePermission>>;
    fn get_team_permission(&self, user_id: i64, team_id: i64) -> Result<Option<TeamPermission>>;
    fn list_team_permissions(&self, user_id: i64) -> Result<Vec<TeamPermission>>;

    /// Applies a reconciled desired state (fields, pages, teams) to one
    /// user inside one transaction. Pages/teams absent from the desired
    /// sets are removed; existing rows are updated in place.
    fn apply_user_update(&self, user_id: i64, update: &UserUpdate) -> Result<User>;

    // Team operations
    fn create_team(&self, team: &Team) -> Result<Team>;
    fn get_team(&self, id: i64) -> Result<Option<Team>>;
    fn list_teams(&self) -> Result<Vec<Team>>;
    /// Deletes the team and, first, its schedule entries, people, shift
    /// definitions, and team permissions.
    fn delete_team(&self, id: i64) -> Result<bool>;

    // Person operations
    fn create_person(&self, person: &Person) -> Result<Person>;
    fn get_person(&self, id: i64) -> Result<Option<Person>>;
    fn list_people(&self, team_id: i64) -> Result<Vec<Person>>;
    /// People shown on the grid: active and show_in_schedule, ordered by
    /// sort_index then name.
    fn list_roster_people(&self, team_id: i64) -> Result<Vec<Person>>;
    fn update_person(&self, id: i64, patch: &PersonPatch) -> Result<Person>;
    /// Deletes the person and, first, its schedule entries.
    fn delete_person(&self, id: i64) -> Result<bool>;

    // Shift definition operations
    fn create_shift(&self, shift: &ShiftDefinition) -> Result<ShiftDefinition>;
    fn get_shift(&self, id: i64) -> Result<Option<ShiftDefinition>>;
    fn get_active_shift_by_code(
        &self,
        team_id: i64,
        code: &str,
    ) -> Result<Option<ShiftDefinition>>;
    fn list_shifts(&self, team_id: i64) -> Result<Vec<ShiftDefinition>>;
    fn update_shift(&self, id: i64, patch: &ShiftPatch) -> Result<ShiftDefinition>;
    fn delete_shift(&self, id: i64) -> Result<bool>;

    // Schedule entry operations
    fn get_entry(
        &self,
        team_id: i64,
        person_id: i64,
        day: NaiveDate,
    ) -> Result<Option<ScheduleEntry>>;
    fn list_entries(
        &self,
        team_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>>;
    /// Upsert keyed by (team, person, day); the last write wins.
    fn upsert_entry(
        &self,
        team_id: i64,
        person_id: i64,
        day: NaiveDate,
        shift_code: &str,
        updated_by: i64,
    ) -> Result<ScheduleEntry>;
    fn delete_entry(&self, team_id: i64, person_id: i64, day: NaiveDate) -> Result<bool>;
}
