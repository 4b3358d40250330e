pub mod schema;

pub mod alumni;
pub mod auth;
pub mod batch;
pub mod company;
pub mod profile;
pub mod seed;
pub mod stats;
pub mod student;
pub mod upload;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use campus_blob::BlobStore;
use campus_core::{ServiceError, merge_patch, now_rfc3339};
use campus_sql::{Row, SQLStore, Value};

use crate::model::{Batch, Role, User};

/// Campus service configuration.
#[derive(Debug, Clone)]
pub struct CampusConfig {
    /// JWT signing secret.
    pub jwt_secret: String,

    /// Token lifetime in seconds (default: 7 days).
    pub token_ttl: i64,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "campus-dev-secret-change-me".to_string(),
            token_ttl: 604800, // 7 days
        }
    }
}

/// Campus service — holds the storage backends and all business logic.
pub struct CampusService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
    pub(crate) config: CampusConfig,
}

impl CampusService {
    /// Create a new CampusService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        blob: Arc<dyn BlobStore>,
        config: CampusConfig,
    ) -> Result<Arc<Self>, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, blob, config }))
    }

    // ── Generic record helpers ──

    /// Insert a record as JSON into a table with extracted columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        columns: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in columns.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                ServiceError::Conflict(msg)
            } else {
                ServiceError::Storage(msg)
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, ServiceError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self.sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows.first()
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{}", table, id)))?;
        let data = row.get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and extracted columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        columns: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in columns.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                ServiceError::Conflict(msg)
            } else {
                ServiceError::Storage(msg)
            }
        })?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    /// Delete a record by id.
    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), ServiceError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self.sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// List records with equality filters, a fixed ordering, and pagination.
    /// `order_by` must be a literal column list, never caller input.
    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        order_by: &str,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<T>, usize), ServiceError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as cnt FROM {}{}", table, where_sql);
        let count_rows = self.sql
            .query(&count_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(offset as i64));

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY {} LIMIT ?{} OFFSET ?{}",
            table, where_sql, order_by, limit_idx, offset_idx,
        );

        let rows = self.sql
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok((Self::decode_rows(&rows)?, total))
    }

    /// Count records with equality filters.
    pub(crate) fn count_records(
        &self,
        table: &str,
        filters: &[(&str, Value)],
    ) -> Result<i64, ServiceError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let sql = format!("SELECT COUNT(*) as cnt FROM {}{}", table, where_sql);
        let rows = self.sql
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }

    /// Decode the `data` column of each row into `T`.
    pub(crate) fn decode_rows<T: DeserializeOwned>(rows: &[Row]) -> Result<Vec<T>, ServiceError> {
        let mut items = Vec::new();
        for row in rows {
            let data = row.get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let item: T = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            items.push(item);
        }
        Ok(items)
    }

    /// Apply a JSON merge-patch to a record, protecting id/createdAt and
    /// stamping updatedAt. A patch that produces an invalid document
    /// (wrong field type, unknown enum value) is the caller's fault.
    pub(crate) fn apply_patch<T: Serialize + DeserializeOwned>(
        current: &T,
        patch: serde_json::Value,
    ) -> Result<T, ServiceError> {
        let mut json = serde_json::to_value(current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let now = now_rfc3339();

        let mut patch = patch;
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
            obj.remove("createdAt");
            obj.insert("updatedAt".into(), serde_json::json!(now));
        }

        merge_patch(&mut json, &patch);
        serde_json::from_value(json)
            .map_err(|e| ServiceError::Validation(format!("invalid field value: {}", e)))
    }

    // ── Extracted-column sets ──

    /// The extracted columns for a user row, derived from the document so
    /// the two representations never drift.
    pub(crate) fn user_columns(user: &User) -> Vec<(&'static str, Value)> {
        vec![
            ("email", opt_text(&user.email)),
            ("student_id", opt_text(&user.student_id)),
            ("name", Value::Text(user.name.clone())),
            ("role", Value::Text(role_text(user.role).to_string())),
            ("batch_id", opt_text(&user.batch)),
            ("is_alumni", Value::Integer(if user.is_alumni { 1 } else { 0 })),
            ("course", Value::Text(user.course.clone())),
            ("department", Value::Text(user.department.clone())),
            ("year", user.year.map(Value::Integer).unwrap_or(Value::Null)),
            ("company", Value::Text(user.company.clone())),
            ("created_at", Value::Text(user.created_at.clone())),
            ("updated_at", Value::Text(user.updated_at.clone())),
        ]
    }

    /// The extracted columns for a batch row.
    pub(crate) fn batch_columns(batch: &Batch) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::Text(batch.batch_name.clone())),
            ("year", Value::Integer(batch.year)),
            ("is_completed", Value::Integer(if batch.is_completed { 1 } else { 0 })),
            ("completed_date", opt_text(&batch.completed_date)),
            ("total_students", Value::Integer(batch.total_students)),
            ("created_at", Value::Text(batch.created_at.clone())),
            ("updated_at", Value::Text(batch.updated_at.clone())),
        ]
    }

    // ── Shared lookups ──

    /// Get any user (admin or student) by id.
    pub fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        self.get_record("users", id)
    }

    /// Find a user by email, returning the document and the password hash
    /// (which lives only in its own column).
    pub(crate) fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data, password_hash FROM users WHERE email = ?1",
                &[Value::Text(email.to_lowercase())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let data = row.get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        let user: User = serde_json::from_str(data)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let hash = row.get_str("password_hash").unwrap_or_default().to_string();
        Ok(Some((user, hash)))
    }

    /// Find a student by campus-issued student id.
    pub(crate) fn find_user_by_student_id(
        &self,
        student_id: &str,
    ) -> Result<Option<User>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data FROM users WHERE student_id = ?1",
                &[Value::Text(student_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(Self::decode_rows(&rows)?.into_iter().next())
    }
}

/// Map an optional string to a SQL value, NULL when absent.
pub(crate) fn opt_text(v: &Option<String>) -> Value {
    match v {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

/// The role column value for a user.
pub(crate) fn role_text(role: Role) -> &'static str {
    match role {
        Role::Student => "student",
        Role::Admin => "admin",
    }
}

/// Require a non-empty input field.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    value
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ServiceError::Validation(format!("{} is required", field)))
}

/// Escape LIKE wildcards in user input. Pair with `ESCAPE '\'`.
pub(crate) fn like_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
