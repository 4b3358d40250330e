use tracing::info;

use campus_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use campus_sql::{Statement, Value};

use crate::model::Batch;
use crate::service::{CampusService, required};

/// Parameters for creating a new batch. All fields arrive optional from
/// the API; required ones are enforced here so a missing field is a 400,
/// not a deserialization failure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBatchInput {
    pub batch_name: Option<String>,
    pub year: Option<i64>,
    pub course: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

impl CampusService {
    pub fn create_batch(&self, input: CreateBatchInput) -> Result<Batch, ServiceError> {
        let batch_name = required(input.batch_name, "batchName")?;
        let year = input.year
            .ok_or_else(|| ServiceError::Validation("year is required".into()))?;
        let course = required(input.course, "course")?;
        let department = required(input.department, "department")?;

        let now = now_rfc3339();
        let batch = Batch {
            id: new_id(),
            batch_name,
            year,
            course,
            department,
            start_date: input.start_date,
            end_date: input.end_date,
            is_completed: false,
            completed_date: None,
            total_students: 0,
            description: input.description.unwrap_or_default(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.insert_record("batches", &batch.id, &batch, &Self::batch_columns(&batch))?;
        Ok(batch)
    }

    pub fn get_batch(&self, id: &str) -> Result<Batch, ServiceError> {
        self.get_record("batches", id)
    }

    /// List batches, newest graduation year first, name as tiebreak.
    pub fn list_batches(&self, params: &ListParams) -> Result<ListResult<Batch>, ServiceError> {
        let (items, total) = self.list_records(
            "batches",
            &[],
            "year DESC, name ASC",
            params.limit,
            params.offset,
        )?;
        Ok(ListResult { items, total })
    }

    /// Complete a batch: set the completion flag and date, and cascade
    /// alumni status to every member student, in a single transaction.
    ///
    /// Completing an already-completed batch is a no-op that returns the
    /// unchanged batch: the completion date is never reset and the
    /// cascade never re-runs. Membership is untouched, so the cached
    /// student count stays as-is.
    pub fn complete_batch(&self, id: &str) -> Result<Batch, ServiceError> {
        let batch: Batch = self.get_record("batches", id)?;
        if batch.is_completed {
            return Ok(batch);
        }

        let now = now_rfc3339();
        let affected = self.sql
            .exec_batch(&completion_statements(id, &now))
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        // One affected row is the batch itself; the rest are cascaded
        // members. Zero means a concurrent completion committed first
        // and this call degraded to the no-op.
        if affected > 0 {
            info!(
                "batch {} completed, {} students became alumni",
                batch.batch_name,
                affected - 1
            );
        }
        self.get_record("batches", id)
    }

    /// Recompute and persist a batch's cached student count.
    ///
    /// Always re-queries and overwrites, never increments, so concurrent
    /// membership changes self-correct on the next call. Only the count
    /// and the update timestamp are written; the rest of the stored
    /// document is left alone, so an interleaved completion is never
    /// reverted from a stale snapshot. Invoked on student create,
    /// delete, and batch reassignment (for both batches), never by
    /// completion. A missing batch is a caller bug and fails with
    /// NotFound.
    pub fn recount(&self, batch_id: &str) -> Result<i64, ServiceError> {
        let count = self.count_records(
            "users",
            &[
                ("batch_id", Value::Text(batch_id.to_string())),
                ("role", Value::Text("student".into())),
            ],
        )?;

        let affected = self.sql
            .exec(
                "UPDATE batches SET \
                 data = json_set(data, '$.totalStudents', ?1, '$.updatedAt', ?2), \
                 total_students = ?1, updated_at = ?2 \
                 WHERE id = ?3",
                &[
                    Value::Integer(count),
                    Value::Text(now_rfc3339()),
                    Value::Text(batch_id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("batches/{}", batch_id)));
        }
        Ok(count)
    }
}

/// The completion transaction. The batch update is guarded on
/// `is_completed = 0`, so a lost double-submit race cannot reset the
/// completion date, and it patches the stored document with `json_set`
/// instead of overwriting it, so a student total committed by a
/// concurrent recount survives. The member update flips both the
/// column and the stored JSON; its `is_alumni = 0` guard keeps the
/// cascade idempotent per user.
fn completion_statements(batch_id: &str, now: &str) -> Vec<Statement> {
    vec![
        Statement::new(
            "UPDATE batches SET \
             data = json_set(data, '$.isCompleted', json('true'), \
                             '$.completedDate', ?1, '$.updatedAt', ?1), \
             is_completed = 1, completed_date = ?1, updated_at = ?1 \
             WHERE id = ?2 AND is_completed = 0",
            vec![
                Value::Text(now.to_string()),
                Value::Text(batch_id.to_string()),
            ],
        ),
        Statement::new(
            "UPDATE users SET is_alumni = 1, \
             data = replace(data, '\"isAlumni\":false', '\"isAlumni\":true') \
             WHERE batch_id = ?1 AND role = 'student' AND is_alumni = 0",
            vec![Value::Text(batch_id.to_string())],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use crate::service::student::CreateStudentInput;
    use crate::service::test_support::test_service;
    use campus_sql::Value;

    fn batch_input(name: &str, year: i64) -> CreateBatchInput {
        CreateBatchInput {
            batch_name: Some(name.into()),
            year: Some(year),
            course: Some("B.Tech".into()),
            department: Some("Computer Science".into()),
            ..Default::default()
        }
    }

    fn add_student(svc: &CampusService, batch_id: &str, n: u32) -> User {
        svc.create_student(CreateStudentInput {
            name: Some(format!("Student {}", n)),
            email: Some(format!("s{}@campus.edu", n)),
            password: Some("secret123".into()),
            student_id: Some(format!("CS{:05}", n)),
            batch: Some(batch_id.to_string()),
            course: Some("B.Tech".into()),
            department: Some("CS".into()),
            year: Some(2020),
            phone: None,
        })
        .unwrap()
    }

    #[test]
    fn create_requires_fields() {
        let (_tmp, svc) = test_service();
        let err = svc.create_batch(CreateBatchInput::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = svc
            .create_batch(CreateBatchInput {
                batch_name: Some("CS-2021".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn duplicate_name_is_conflict() {
        let (_tmp, svc) = test_service();
        svc.create_batch(batch_input("CS-2021", 2021)).unwrap();
        let err = svc.create_batch(batch_input("CS-2021", 2022)).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn list_sorts_year_desc_then_name_asc() {
        let (_tmp, svc) = test_service();
        svc.create_batch(batch_input("ME-2021", 2021)).unwrap();
        svc.create_batch(batch_input("CS-2022", 2022)).unwrap();
        svc.create_batch(batch_input("CS-2021", 2021)).unwrap();

        let list = svc.list_batches(&ListParams::default()).unwrap();
        assert_eq!(list.total, 3);
        let names: Vec<&str> = list.items.iter().map(|b| b.batch_name.as_str()).collect();
        assert_eq!(names, vec!["CS-2022", "CS-2021", "ME-2021"]);
    }

    #[test]
    fn complete_unknown_batch_is_not_found() {
        let (_tmp, svc) = test_service();
        let err = svc.complete_batch("nope").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn completion_cascades_to_members() {
        // Scenario: three students, complete, all become alumni while the
        // cached count stays untouched.
        let (_tmp, svc) = test_service();
        let batch = svc.create_batch(batch_input("CS-2020", 2020)).unwrap();
        let students: Vec<User> = (1..=3).map(|n| add_student(&svc, &batch.id, n)).collect();
        assert_eq!(svc.get_batch(&batch.id).unwrap().total_students, 3);

        let completed = svc.complete_batch(&batch.id).unwrap();
        assert!(completed.is_completed);
        assert!(completed.completed_date.is_some());
        assert_eq!(completed.total_students, 3);

        // Every member is an alumni in the stored document...
        for s in &students {
            assert!(svc.get_user(&s.id).unwrap().is_alumni);
        }
        // ...and in the extracted column.
        let alumni = svc
            .count_records(
                "users",
                &[
                    ("batch_id", Value::Text(batch.id.clone())),
                    ("is_alumni", Value::Integer(1)),
                ],
            )
            .unwrap();
        assert_eq!(alumni, 3);
    }

    #[test]
    fn student_added_before_completion_is_cascaded() {
        let (_tmp, svc) = test_service();
        let batch = svc.create_batch(batch_input("CS-2020", 2020)).unwrap();
        for n in 1..=3 {
            add_student(&svc, &batch.id, n);
        }
        let fourth = add_student(&svc, &batch.id, 4);
        assert_eq!(svc.get_batch(&batch.id).unwrap().total_students, 4);

        svc.complete_batch(&batch.id).unwrap();
        assert!(svc.get_user(&fourth.id).unwrap().is_alumni);
        let alumni = svc
            .count_records(
                "users",
                &[
                    ("batch_id", Value::Text(batch.id.clone())),
                    ("is_alumni", Value::Integer(1)),
                ],
            )
            .unwrap();
        assert_eq!(alumni, 4);
    }

    #[test]
    fn complete_twice_is_noop() {
        let (_tmp, svc) = test_service();
        let batch = svc.create_batch(batch_input("CS-2020", 2020)).unwrap();
        let member = add_student(&svc, &batch.id, 1);

        let first = svc.complete_batch(&batch.id).unwrap();
        let date = first.completed_date.clone().unwrap();

        // Force one member back to non-alumni, behind the service's back.
        // A second complete must not re-run the cascade over it.
        svc.sql
            .exec(
                "UPDATE users SET is_alumni = 0, \
                 data = replace(data, '\"isAlumni\":true', '\"isAlumni\":false') \
                 WHERE id = ?1",
                &[Value::Text(member.id.clone())],
            )
            .unwrap();

        let second = svc.complete_batch(&batch.id).unwrap();
        assert!(second.is_completed);
        assert_eq!(second.completed_date.as_deref(), Some(date.as_str()));
        assert!(!svc.get_user(&member.id).unwrap().is_alumni);
    }

    #[test]
    fn empty_batch_completes_fine() {
        let (_tmp, svc) = test_service();
        let batch = svc.create_batch(batch_input("CS-2019", 2019)).unwrap();
        let completed = svc.complete_batch(&batch.id).unwrap();
        assert!(completed.is_completed);
        assert_eq!(completed.total_students, 0);
    }

    #[test]
    fn completion_commit_keeps_concurrently_updated_count() {
        // An in-flight completion whose snapshot predates a membership
        // change: the transaction is prepared while the batch has three
        // students, a fourth registers, then the transaction commits.
        // The commit must not revert the count to the stale snapshot,
        // and the late arrival is cascaded along with the rest.
        let (_tmp, svc) = test_service();
        let batch = svc.create_batch(batch_input("CS-2020", 2020)).unwrap();
        for n in 1..=3 {
            add_student(&svc, &batch.id, n);
        }

        let pending = completion_statements(&batch.id, "2030-01-01T00:00:00Z");
        let fourth = add_student(&svc, &batch.id, 4);
        svc.sql.exec_batch(&pending).unwrap();

        let stored = svc.get_batch(&batch.id).unwrap();
        assert!(stored.is_completed);
        assert_eq!(stored.completed_date.as_deref(), Some("2030-01-01T00:00:00Z"));
        assert_eq!(stored.total_students, 4);
        assert!(svc.get_user(&fourth.id).unwrap().is_alumni);

        // Document and extracted column agree.
        let rows = svc.sql
            .query(
                "SELECT total_students FROM batches WHERE id = ?1",
                &[Value::Text(batch.id.clone())],
            )
            .unwrap();
        assert_eq!(rows[0].get_i64("total_students"), Some(4));
    }

    #[test]
    fn late_completion_commit_cannot_reset_date() {
        // Two completions race past the same not-yet-completed read.
        // The loser's write lands after the winner's commit and must
        // leave the winner's completion date in place.
        let (_tmp, svc) = test_service();
        let batch = svc.create_batch(batch_input("CS-2020", 2020)).unwrap();
        add_student(&svc, &batch.id, 1);

        let loser = completion_statements(&batch.id, "2031-06-30T00:00:00Z");
        let winner = svc.complete_batch(&batch.id).unwrap();
        let date = winner.completed_date.clone().unwrap();

        svc.sql.exec_batch(&loser).unwrap();
        let stored = svc.get_batch(&batch.id).unwrap();
        assert_eq!(stored.completed_date.as_deref(), Some(date.as_str()));
    }

    #[test]
    fn recount_preserves_completion_state() {
        let (_tmp, svc) = test_service();
        let batch = svc.create_batch(batch_input("CS-2020", 2020)).unwrap();
        add_student(&svc, &batch.id, 1);
        let completed = svc.complete_batch(&batch.id).unwrap();
        let date = completed.completed_date.clone();

        assert_eq!(svc.recount(&batch.id).unwrap(), 1);
        let stored = svc.get_batch(&batch.id).unwrap();
        assert!(stored.is_completed);
        assert_eq!(stored.completed_date, date);
        assert_eq!(stored.total_students, 1);
        assert_eq!(stored.batch_name, "CS-2020");
    }

    #[test]
    fn recount_missing_batch_fails_loudly() {
        let (_tmp, svc) = test_service();
        let err = svc.recount("gone").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn recount_is_idempotent() {
        let (_tmp, svc) = test_service();
        let batch = svc.create_batch(batch_input("CS-2021", 2021)).unwrap();
        add_student(&svc, &batch.id, 1);
        add_student(&svc, &batch.id, 2);

        assert_eq!(svc.recount(&batch.id).unwrap(), 2);
        assert_eq!(svc.recount(&batch.id).unwrap(), 2);
        assert_eq!(svc.get_batch(&batch.id).unwrap().total_students, 2);
    }
}
