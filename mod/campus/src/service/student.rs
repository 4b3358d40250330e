use serde::Deserialize;
use tracing::info;

use campus_core::{ServiceError, new_id, now_rfc3339};
use campus_sql::Value;

use crate::model::{Role, User};
use crate::service::auth::{conflict_message, hash_password, normalize_email, validate_password};
use crate::service::{CampusService, like_escape};

/// Parameters for creating a student, from the admin CRUD endpoint or
/// self-registration. All fields arrive optional; the required ones are
/// enforced here so a missing field is a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStudentInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub student_id: Option<String>,
    pub batch: Option<String>,
    pub course: Option<String>,
    pub department: Option<String>,
    pub year: Option<i64>,
    pub phone: Option<String>,
}

/// Filters for the admin student listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentQuery {
    pub batch: Option<String>,
    pub is_alumni: Option<bool>,
    pub course: Option<String>,
    pub department: Option<String>,
    /// Substring match on name, email, or student id.
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// The fields the administrative update path may touch. Everything else
/// in the patch is rejected: admin edits manage the student record, not
/// the student's own profile.
const ADMIN_EDITABLE: &[&str] = &[
    "name",
    "email",
    "studentId",
    "batch",
    "course",
    "department",
    "year",
    "phone",
];

/// Sortable columns for the student listing. Caller input is mapped
/// through this table and never interpolated into SQL directly.
const SORTABLE: &[(&str, &str)] = &[
    ("name", "name"),
    ("email", "email"),
    ("studentId", "student_id"),
    ("year", "year"),
    ("createdAt", "created_at"),
];

impl CampusService {
    /// Create a student record.
    ///
    /// The owning batch must exist; its member count is recounted after
    /// the insert. A student created into an already-completed batch
    /// starts as an alumni.
    pub fn create_student(&self, input: CreateStudentInput) -> Result<User, ServiceError> {
        let name = input.name
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ServiceError::Validation("name is required".into()))?;
        let email = normalize_email(input.email)?;
        let password = validate_password(input.password)?;
        let student_id = input.student_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ServiceError::Validation("studentId is required".into()))?;
        let batch_id = input.batch
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ServiceError::Validation("batch is required".into()))?;
        let course = input.course
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ServiceError::Validation("course is required".into()))?;
        let department = input.department
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ServiceError::Validation("department is required".into()))?;
        let year = input.year
            .ok_or_else(|| ServiceError::Validation("year is required".into()))?;

        let batch = self.get_batch(&batch_id)?;
        let hash = hash_password(&password)?;

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name,
            email: Some(email),
            role: Role::Student,
            student_id: Some(student_id),
            batch: Some(batch_id.clone()),
            course,
            department,
            year: Some(year),
            phone: input.phone.unwrap_or_default(),
            // A batch completed before this student joined still makes
            // them an alumni; the cascade only runs at completion time.
            is_alumni: batch.is_completed,
            job_role: String::new(),
            company: String::new(),
            work_location: String::new(),
            salary: 0,
            experience: String::new(),
            achievements: vec![],
            current_status: Default::default(),
            skills: vec![],
            linkedin_profile: String::new(),
            github_profile: String::new(),
            portfolio_website: String::new(),
            profile_picture: String::new(),
            resume: String::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        let mut columns = Self::user_columns(&user);
        columns.push(("password_hash", Value::Text(hash)));
        self.insert_record("users", &user.id, &user, &columns)
            .map_err(conflict_message)?;

        self.recount(&batch_id)?;
        info!("student {} created in batch {}", user.id, batch.batch_name);
        Ok(user)
    }

    /// Get a student by id. Admin records are not reachable through this
    /// path.
    pub fn get_student(&self, id: &str) -> Result<User, ServiceError> {
        let user: User = self.get_record("users", id)?;
        if user.role != Role::Student {
            return Err(ServiceError::NotFound(format!("users/{}", id)));
        }
        Ok(user)
    }

    /// List students with filters, substring search, sorting, and
    /// pagination.
    pub fn list_students(&self, query: &StudentQuery) -> Result<(Vec<User>, usize), ServiceError> {
        let mut clauses = vec!["role = 'student'".to_string()];
        let mut params: Vec<Value> = Vec::new();

        let eq = |clauses: &mut Vec<String>, params: &mut Vec<Value>, col: &str, v: &str| {
            params.push(Value::Text(v.to_string()));
            clauses.push(format!("{} = ?{}", col, params.len()));
        };

        if let Some(ref batch) = query.batch {
            eq(&mut clauses, &mut params, "batch_id", batch);
        }
        if let Some(ref course) = query.course {
            eq(&mut clauses, &mut params, "course", course);
        }
        if let Some(ref department) = query.department {
            eq(&mut clauses, &mut params, "department", department);
        }
        if let Some(is_alumni) = query.is_alumni {
            params.push(Value::Integer(if is_alumni { 1 } else { 0 }));
            clauses.push(format!("is_alumni = ?{}", params.len()));
        }
        if let Some(ref search) = query.search {
            let pattern = format!("%{}%", like_escape(search));
            params.push(Value::Text(pattern));
            let idx = params.len();
            clauses.push(format!(
                "(name LIKE ?{i} ESCAPE '\\' OR email LIKE ?{i} ESCAPE '\\' \
                 OR student_id LIKE ?{i} ESCAPE '\\')",
                i = idx
            ));
        }

        let where_sql = clauses.join(" AND ");
        let order = sort_clause(query.sort_by.as_deref(), query.sort_order.as_deref())?;

        let count_rows = self.sql
            .query(
                &format!("SELECT COUNT(*) as cnt FROM users WHERE {}", where_sql),
                &params,
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);
        params.push(Value::Integer(limit as i64));
        let limit_idx = params.len();
        params.push(Value::Integer(offset as i64));
        let offset_idx = params.len();

        let rows = self.sql
            .query(
                &format!(
                    "SELECT data FROM users WHERE {} ORDER BY {} LIMIT ?{} OFFSET ?{}",
                    where_sql, order, limit_idx, offset_idx
                ),
                &params,
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok((Self::decode_rows(&rows)?, total))
    }

    /// Administrative student update: merge-patch over the admin field
    /// set. A field outside that set is a validation error — admin edits
    /// are explicit, unlike the silent-drop profile path.
    ///
    /// Changing the batch validates the new batch and recounts both the
    /// old and the new one. Reassignment never touches `is_alumni`.
    pub fn update_student(
        &self,
        id: &str,
        mut patch: serde_json::Value,
    ) -> Result<User, ServiceError> {
        let current = self.get_student(id)?;

        let Some(obj) = patch.as_object_mut() else {
            return Err(ServiceError::Validation("patch must be a JSON object".into()));
        };
        if let Some(field) = obj.keys().find(|k| !ADMIN_EDITABLE.contains(&k.as_str())) {
            return Err(ServiceError::Validation(format!(
                "field '{}' is not editable here",
                field
            )));
        }
        if let Some(email) = obj.get("email").and_then(|v| v.as_str()) {
            let normalized = normalize_email(Some(email.to_string()))?;
            obj.insert("email".into(), serde_json::json!(normalized));
        }

        let old_batch = current.batch.clone();
        let new_batch = obj
            .get("batch")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        if let Some(ref b) = new_batch {
            // Fail before writing anything if the target batch is bogus.
            self.get_batch(b)?;
        }

        let updated: User = Self::apply_patch(&current, patch)?;
        self.update_record("users", id, &updated, &Self::user_columns(&updated))
            .map_err(conflict_message)?;

        if let Some(target) = new_batch {
            if old_batch.as_deref() != Some(target.as_str()) {
                if let Some(old_id) = old_batch {
                    self.recount(&old_id)?;
                }
                self.recount(&target)?;
            }
        }

        self.get_student(id)
    }

    /// Delete a student: remove the record, revoke their sessions so
    /// outstanding tokens die, and recount the batch they belonged to.
    pub fn delete_student(&self, id: &str) -> Result<(), ServiceError> {
        let user = self.get_student(id)?;
        self.delete_record("users", id)?;
        self.revoke_user_sessions(id)?;
        if let Some(batch_id) = user.batch {
            self.recount(&batch_id)?;
        }
        info!("student {} deleted", id);
        Ok(())
    }
}

/// Build a safe ORDER BY clause from caller-supplied sort parameters.
fn sort_clause(sort_by: Option<&str>, sort_order: Option<&str>) -> Result<String, ServiceError> {
    let column = match sort_by {
        None => "name",
        Some(requested) => SORTABLE
            .iter()
            .find(|(api, _)| *api == requested)
            .map(|(_, col)| *col)
            .ok_or_else(|| {
                ServiceError::Validation(format!("cannot sort by '{}'", requested))
            })?,
    };
    let direction = match sort_order {
        None | Some("asc") => "ASC",
        Some("desc") => "DESC",
        Some(other) => {
            return Err(ServiceError::Validation(format!(
                "sortOrder must be asc or desc, got '{}'",
                other
            )));
        }
    };
    Ok(format!("{} {}", column, direction))
}
