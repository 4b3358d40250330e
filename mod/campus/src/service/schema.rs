use campus_core::ServiceError;
use campus_sql::SQLStore;

/// SQL DDL statements to initialize the campus database schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with extracted columns for filtering and uniqueness. The password
/// hash is column-only and never part of `data`.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        password_hash TEXT,
        email TEXT UNIQUE,
        student_id TEXT UNIQUE,
        name TEXT,
        role TEXT,
        batch_id TEXT,
        is_alumni INTEGER DEFAULT 0,
        course TEXT,
        department TEXT,
        year INTEGER,
        company TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS batches (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT UNIQUE,
        year INTEGER,
        is_completed INTEGER DEFAULT 0,
        completed_date TEXT,
        total_students INTEGER DEFAULT 0,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS companies (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        user_id TEXT,
        revoked INTEGER DEFAULT 0,
        issued_at TEXT,
        expires_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
    "CREATE INDEX IF NOT EXISTS idx_users_batch ON users(batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_users_alumni ON users(is_alumni)",
    "CREATE INDEX IF NOT EXISTS idx_users_company ON users(company)",
    "CREATE INDEX IF NOT EXISTS idx_batches_completed ON batches(is_completed)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
