use std::fmt;

use serde::{Deserialize, Serialize};

/// The functional areas a user can be granted view/edit capability on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Schedule,
    Settings,
    Permissions,
    People,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Schedule, Page::Settings, Page::Permissions, Page::People];

    /// Converts a page key string to its enum value.
    pub fn parse(s: &str) -> Option<Page> {
        match s {
            "schedule" => Some(Page::Schedule),
            "settings" => Some(Page::Settings),
            "permissions" => Some(Page::Permissions),
            "people" => Some(Page::People),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Page::Schedule => "schedule",
            Page::Settings => "settings",
            Page::Permissions => "permissions",
            Page::People => "people",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's access level on one team's data. Absence of a level means no
/// access; there is no implicit default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Write,
}

impl AccessLevel {
    /// Converts an access level string to its enum value.
    pub fn parse(s: &str) -> Option<AccessLevel> {
        match s {
            "read" => Some(AccessLevel::Read),
            "write" => Some(AccessLevel::Write),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Read => "read",
            AccessLevel::Write => "write",
        }
    }

    /// Returns true if this level satisfies the required minimum.
    /// Write satisfies both minimums; Read satisfies only Read.
    #[must_use]
    pub const fn satisfies(self, min: AccessLevel) -> bool {
        match min {
            AccessLevel::Read => true,
            AccessLevel::Write => matches!(self, AccessLevel::Write),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A view/edit capability pair for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageCapability {
    pub can_view: bool,
    pub can_edit: bool,
}

impl PageCapability {
    #[must_use]
    pub const fn new(can_view: bool, can_edit: bool) -> Self {
        Self { can_view, can_edit }
    }

    /// Normalizes a requested capability pair so the stored invariant
    /// `can_edit implies can_view` holds: requesting edit grants view,
    /// and edit is retained only alongside view.
    #[must_use]
    pub const fn normalized(self) -> Self {
        let can_view = self.can_view || self.can_edit;
        let can_edit = self.can_edit && can_view;
        Self { can_view, can_edit }
    }
}
