use campus_core::ServiceError;

use crate::model::User;
use crate::service::CampusService;

// ── Field write policy ──────────────────────────────────────────────
//
// The self-service profile update is gated per field: contact and
// social fields are always the owner's to edit, work-profile fields
// unlock when the owner becomes an alumni. Fields outside both tables
// (role, batch, isAlumni, ...) are never writable through this path.

/// Profile fields a student may edit regardless of alumni status.
pub const ALWAYS_EDITABLE: &[&str] = &[
    "phone",
    "linkedinProfile",
    "githubProfile",
    "portfolioWebsite",
    "skills",
];

/// Profile fields that unlock once the student is an alumni.
pub const ALUMNI_ONLY: &[&str] = &[
    "jobRole",
    "company",
    "workLocation",
    "salary",
    "experience",
    "achievements",
    "currentStatus",
];

/// Decide whether a user may write a profile field. Pure and stateless;
/// evaluated per field on every self-update.
pub fn field_writable(user: &User, field: &str) -> bool {
    if ALWAYS_EDITABLE.contains(&field) {
        return true;
    }
    if ALUMNI_ONLY.contains(&field) {
        return user.is_alumni;
    }
    false
}

impl CampusService {
    /// Apply a self-service profile update for the given user.
    ///
    /// Disallowed fields are silently dropped rather than rejected,
    /// matching the behavior the frontend expects: the caller can see
    /// what actually applied in the returned profile. A patch with no
    /// surviving fields is a valid no-op (only `updatedAt` moves).
    pub fn update_own_profile(
        &self,
        user_id: &str,
        mut patch: serde_json::Value,
    ) -> Result<User, ServiceError> {
        let current: User = self.get_record("users", user_id)?;

        let Some(obj) = patch.as_object_mut() else {
            return Err(ServiceError::Validation("patch must be a JSON object".into()));
        };
        obj.retain(|field, _| field_writable(&current, field));

        let updated: User = Self::apply_patch(&current, patch)?;
        self.update_record("users", user_id, &updated, &Self::user_columns(&updated))?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CurrentStatus;
    use crate::service::batch::CreateBatchInput;
    use crate::service::student::CreateStudentInput;
    use crate::service::test_support::test_service;

    fn student(svc: &CampusService, completed_batch: bool) -> User {
        let batch = svc
            .create_batch(CreateBatchInput {
                batch_name: Some("CS-2020".into()),
                year: Some(2020),
                course: Some("B.Tech".into()),
                department: Some("CS".into()),
                ..Default::default()
            })
            .unwrap();
        let user = svc
            .create_student(CreateStudentInput {
                name: Some("John Doe".into()),
                email: Some("john@campus.edu".into()),
                password: Some("secret123".into()),
                student_id: Some("CS20001".into()),
                batch: Some(batch.id.clone()),
                course: Some("B.Tech".into()),
                department: Some("CS".into()),
                year: Some(2020),
                phone: None,
            })
            .unwrap();
        if completed_batch {
            svc.complete_batch(&batch.id).unwrap();
            return svc.get_user(&user.id).unwrap();
        }
        user
    }

    #[test]
    fn policy_partitions_fields() {
        let (_tmp, svc) = test_service();
        let mut u = student(&svc, false);
        assert!(field_writable(&u, "phone"));
        assert!(field_writable(&u, "skills"));
        assert!(!field_writable(&u, "jobRole"));
        assert!(!field_writable(&u, "currentStatus"));
        assert!(!field_writable(&u, "isAlumni"));
        assert!(!field_writable(&u, "batch"));
        assert!(!field_writable(&u, "email"));

        u.is_alumni = true;
        assert!(field_writable(&u, "jobRole"));
        assert!(field_writable(&u, "salary"));
        assert!(field_writable(&u, "phone"));
        assert!(!field_writable(&u, "role"));
    }

    #[test]
    fn non_alumni_work_fields_dropped() {
        // Scenario: {phone, jobRole} from a non-alumni applies the phone
        // and silently drops the job role.
        let (_tmp, svc) = test_service();
        let u = student(&svc, false);

        let updated = svc
            .update_own_profile(
                &u.id,
                serde_json::json!({"phone": "555-1234", "jobRole": "Engineer"}),
            )
            .unwrap();
        assert_eq!(updated.phone, "555-1234");
        assert_eq!(updated.job_role, "");

        let stored = svc.get_user(&u.id).unwrap();
        assert_eq!(stored.phone, "555-1234");
        assert_eq!(stored.job_role, "");
    }

    #[test]
    fn alumni_can_write_work_fields() {
        let (_tmp, svc) = test_service();
        let u = student(&svc, true);
        assert!(u.is_alumni);

        let updated = svc
            .update_own_profile(
                &u.id,
                serde_json::json!({
                    "jobRole": "Engineer",
                    "company": "Google",
                    "salary": 180000,
                    "currentStatus": "employed",
                }),
            )
            .unwrap();
        assert_eq!(updated.job_role, "Engineer");
        assert_eq!(updated.company, "Google");
        assert_eq!(updated.salary, 180000);
        assert_eq!(updated.current_status, CurrentStatus::Employed);
    }

    #[test]
    fn profile_update_never_touches_identity_fields() {
        let (_tmp, svc) = test_service();
        let u = student(&svc, true);

        let updated = svc
            .update_own_profile(
                &u.id,
                serde_json::json!({
                    "isAlumni": false,
                    "role": "admin",
                    "email": "evil@campus.edu",
                    "studentId": "HAX",
                    "skills": ["rust"],
                }),
            )
            .unwrap();
        assert!(updated.is_alumni);
        assert_eq!(updated.email.as_deref(), Some("john@campus.edu"));
        assert_eq!(updated.student_id.as_deref(), Some("CS20001"));
        assert_eq!(updated.skills, vec!["rust".to_string()]);
    }

    #[test]
    fn invalid_enum_value_is_validation_error() {
        let (_tmp, svc) = test_service();
        let u = student(&svc, true);
        let err = svc
            .update_own_profile(&u.id, serde_json::json!({"currentStatus": "retired"}))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
