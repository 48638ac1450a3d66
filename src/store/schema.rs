pub const SCHEMA: &str = r#"
-- Accounts that sign in; permissions hang off users
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    password_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    must_change_password INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    token_version INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Teams own people and shift definitions
CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    code TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Per-page view/edit capability; can_edit never holds without can_view
CREATE TABLE IF NOT EXISTS user_page_permissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    page TEXT NOT NULL,
    can_view INTEGER NOT NULL DEFAULT 0,
    can_edit INTEGER NOT NULL DEFAULT 0,
    UNIQUE(user_id, page)
);

-- Per-team access level; absence of a row means no access
CREATE TABLE IF NOT EXISTS user_team_permissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    team_id INTEGER NOT NULL REFERENCES teams(id),
    access_level TEXT NOT NULL,           -- read / write
    UNIQUE(user_id, team_id)
);

CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id INTEGER NOT NULL REFERENCES teams(id),
    name TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    show_in_schedule INTEGER NOT NULL DEFAULT 1,
    sort_index INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    UNIQUE(team_id, name)
);

-- The closed vocabulary of valid shift codes per team
CREATE TABLE IF NOT EXISTS shift_definitions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id INTEGER NOT NULL REFERENCES teams(id),
    code TEXT NOT NULL,
    display_name TEXT NOT NULL,
    bg_color TEXT NOT NULL,
    text_color TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    UNIQUE(team_id, code)
);

-- Grid cells. Cleared cells are deleted, never stored with an empty code.
-- shift_code references shift_definitions only by string; updated_by keeps
-- attribution even after the writing user is gone.
CREATE TABLE IF NOT EXISTS schedule_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id INTEGER NOT NULL REFERENCES teams(id),
    person_id INTEGER NOT NULL REFERENCES people(id),
    day TEXT NOT NULL,                    -- YYYY-MM-DD
    shift_code TEXT NOT NULL,
    updated_at TEXT DEFAULT (datetime('now')),
    updated_by INTEGER NOT NULL,
    UNIQUE(team_id, person_id, day)
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_page_permissions_user ON user_page_permissions(user_id);
CREATE INDEX IF NOT EXISTS idx_team_permissions_user ON user_team_permissions(user_id);
CREATE INDEX IF NOT EXISTS idx_people_team ON people(team_id);
CREATE INDEX IF NOT EXISTS idx_shift_definitions_team ON shift_definitions(team_id);
CREATE INDEX IF NOT EXISTS idx_schedule_entries_team_day ON schedule_entries(team_id, day);
CREATE INDEX IF NOT EXISTS idx_schedule_entries_person ON schedule_entries(person_id);
"#;
