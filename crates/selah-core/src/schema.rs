//! Database schema definitions for selah.

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Table tracking applied schema versions.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// SQL schema for creating all tables.
pub const SCHEMA: &str = r#"
-- Users table: opaque identities issued by the session gateway,
-- including the designated guest identity.
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

-- One theme per liturgical week, seeded forward from a start Sunday.
CREATE TABLE IF NOT EXISTS weekly_themes (
    id TEXT PRIMARY KEY,
    week_start_date TEXT NOT NULL UNIQUE,
    liturgical_season TEXT NOT NULL,
    theme_title TEXT NOT NULL,
    theme_description TEXT NOT NULL,
    featured_exercise_id TEXT,
    reflection_prompt TEXT,
    created_at TEXT NOT NULL
);

-- Seven rows per theme, one per day of week (0 = Sunday .. 6 = Saturday).
CREATE TABLE IF NOT EXISTS daily_content (
    id TEXT PRIMARY KEY,
    weekly_theme_id TEXT NOT NULL REFERENCES weekly_themes(id) ON DELETE CASCADE,
    day_of_week INTEGER NOT NULL,
    scripture_reference TEXT NOT NULL,
    scripture_text TEXT NOT NULL,
    reflection_prompt TEXT NOT NULL,
    day_title TEXT,
    somatic_prompt TEXT,
    UNIQUE(weekly_theme_id, day_of_week)
);

-- One recap per (user, week). Sections are JSON text columns.
CREATE TABLE IF NOT EXISTS weekly_recaps (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    week_start_date TEXT NOT NULL,
    week_end_date TEXT NOT NULL,
    is_premium INTEGER NOT NULL DEFAULT 0,
    scripture_section TEXT NOT NULL,
    body_section TEXT NOT NULL,
    community_section TEXT NOT NULL,
    prompting_section TEXT NOT NULL,
    personal_synthesis TEXT,
    practice_visualization TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(user_id, week_start_date)
);

CREATE INDEX IF NOT EXISTS idx_weekly_recaps_user_id ON weekly_recaps(user_id);

-- One preferences row per user.
CREATE TABLE IF NOT EXISTS recap_preferences (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    delivery_day TEXT NOT NULL DEFAULT 'sunday',
    delivery_time TEXT NOT NULL DEFAULT '08:00',
    updated_at TEXT NOT NULL
);

-- Activity fact tables. Owned by other subsystems; this core only reads
-- them (writes exist for tests and demo seeding).
CREATE TABLE IF NOT EXISTS reflections (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reflections_user_id ON reflections(user_id);

CREATE TABLE IF NOT EXISTS exercises (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS practice_completions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    exercise_id TEXT NOT NULL REFERENCES exercises(id),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_practice_completions_user_id ON practice_completions(user_id);

CREATE TABLE IF NOT EXISTS check_ins (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS community_posts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);
"#;
