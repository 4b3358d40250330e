use serde::Deserialize;

use campus_core::ServiceError;
use campus_sql::Value;

use crate::model::{Role, User};
use crate::service::{CampusService, like_escape};

/// Filters for the alumni directory.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlumniQuery {
    pub batch: Option<String>,
    pub company: Option<String>,
    pub course: Option<String>,
    pub department: Option<String>,
    /// Substring match on name or company.
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl CampusService {
    /// List alumni for the directory. Emails are stripped: the directory
    /// is visible to every authenticated user, contact goes through the
    /// listed social links.
    pub fn list_alumni(&self, query: &AlumniQuery) -> Result<(Vec<User>, usize), ServiceError> {
        let mut clauses = vec!["role = 'student'".to_string(), "is_alumni = 1".to_string()];
        let mut params: Vec<Value> = Vec::new();

        for (col, value) in [
            ("batch_id", &query.batch),
            ("company", &query.company),
            ("course", &query.course),
            ("department", &query.department),
        ] {
            if let Some(v) = value {
                params.push(Value::Text(v.clone()));
                clauses.push(format!("{} = ?{}", col, params.len()));
            }
        }
        if let Some(ref search) = query.search {
            let pattern = format!("%{}%", like_escape(search));
            params.push(Value::Text(pattern));
            let idx = params.len();
            clauses.push(format!(
                "(name LIKE ?{i} ESCAPE '\\' OR company LIKE ?{i} ESCAPE '\\')",
                i = idx
            ));
        }

        let where_sql = clauses.join(" AND ");
        let count_rows = self.sql
            .query(
                &format!("SELECT COUNT(*) as cnt FROM users WHERE {}", where_sql),
                &params,
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        params.push(Value::Integer(query.limit.unwrap_or(50) as i64));
        let limit_idx = params.len();
        params.push(Value::Integer(query.offset.unwrap_or(0) as i64));
        let offset_idx = params.len();

        let rows = self.sql
            .query(
                &format!(
                    "SELECT data FROM users WHERE {} ORDER BY name ASC LIMIT ?{} OFFSET ?{}",
                    where_sql, limit_idx, offset_idx
                ),
                &params,
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let items: Vec<User> = Self::decode_rows::<User>(&rows)?
            .into_iter()
            .map(User::without_email)
            .collect();
        Ok((items, total))
    }

    /// Distinct employers of alumni, for the directory's company filter.
    pub fn alumni_companies(&self) -> Result<Vec<String>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT DISTINCT company FROM users \
                 WHERE role = 'student' AND is_alumni = 1 AND company != '' \
                 ORDER BY company ASC",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get_str("company").map(|s| s.to_string()))
            .collect())
    }

    /// Fetch one alumni profile. A current student and a nonexistent id
    /// are indistinguishable from the caller's side: both are NotFound.
    pub fn get_alumnus(&self, id: &str) -> Result<User, ServiceError> {
        let user: User = self
            .get_record("users", id)
            .map_err(|_| ServiceError::NotFound("alumni profile not found".into()))?;
        if user.role != Role::Student || !user.is_alumni {
            return Err(ServiceError::NotFound("alumni profile not found".into()));
        }
        Ok(user.without_email())
    }
}
