//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    full_name   TEXT NOT NULL,
    avatar      TEXT,
    location    TEXT,            -- 'City, Region, Country', free text
    created_at  TEXT NOT NULL
);

-- A row with shared_from_post_id set is a share of that post.
CREATE TABLE IF NOT EXISTS posts (
    post_id             TEXT PRIMARY KEY,
    author_id           TEXT NOT NULL REFERENCES users(user_id),
    title               TEXT,
    content             TEXT NOT NULL DEFAULT '',
    created_at          TEXT NOT NULL,
    reactions           TEXT,    -- JSON: kind -> [user_id] | null
    shared_from_post_id TEXT REFERENCES posts(post_id),
    shared_comment      TEXT,
    deleted_at          TEXT     -- soft-deletion marker
);

-- Comment and view authors are not foreign keys: events outlive the users
-- who produced them.
CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    post_id     TEXT NOT NULL REFERENCES posts(post_id),
    user_id     TEXT NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS view_events (
    view_id     TEXT PRIMARY KEY,
    post_id     TEXT NOT NULL REFERENCES posts(post_id),
    user_id     TEXT NOT NULL,
    viewed_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS saved_posts (
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    post_id     TEXT NOT NULL REFERENCES posts(post_id),
    saved_at    TEXT NOT NULL,
    PRIMARY KEY (user_id, post_id)
);

CREATE INDEX IF NOT EXISTS posts_shared_from_idx ON posts(shared_from_post_id);
CREATE INDEX IF NOT EXISTS comments_post_idx     ON comments(post_id);
CREATE INDEX IF NOT EXISTS view_events_post_idx  ON view_events(post_id);
CREATE INDEX IF NOT EXISTS saved_posts_post_idx  ON saved_posts(post_id);

PRAGMA user_version = 1;
";
