use serde::Deserialize;
use tracing::info;

use campus_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use campus_sql::Value;

use crate::model::{Company, SharedBatch};
use crate::service::{CampusService, required};

/// Parameters for creating a placement-partner company.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCompanyInput {
    pub company_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
}

impl CampusService {
    pub fn create_company(&self, input: CreateCompanyInput) -> Result<Company, ServiceError> {
        let company_name = required(input.company_name, "companyName")?;
        let contact_email = required(input.contact_email, "contactEmail")?;
        let contact_person = required(input.contact_person, "contactPerson")?;

        let now = now_rfc3339();
        let company = Company {
            id: new_id(),
            company_name,
            contact_email,
            contact_person,
            contact_phone: input.contact_phone.unwrap_or_default(),
            website: input.website.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            industry: input.industry.unwrap_or_default(),
            location: input.location.unwrap_or_default(),
            shared_student_lists: vec![],
            created_at: now.clone(),
            updated_at: now,
        };

        self.insert_record(
            "companies",
            &company.id,
            &company,
            &[
                ("name", Value::Text(company.company_name.clone())),
                ("created_at", Value::Text(company.created_at.clone())),
                ("updated_at", Value::Text(company.updated_at.clone())),
            ],
        )?;
        Ok(company)
    }

    pub fn get_company(&self, id: &str) -> Result<Company, ServiceError> {
        self.get_record("companies", id)
    }

    /// List companies alphabetically.
    pub fn list_companies(
        &self,
        params: &ListParams,
    ) -> Result<ListResult<Company>, ServiceError> {
        let (items, total) =
            self.list_records("companies", &[], "name ASC", params.limit, params.offset)?;
        Ok(ListResult { items, total })
    }

    /// Share a batch's current student list with a company.
    ///
    /// The share event records the member ids as they are right now and
    /// is never recomputed: later membership changes don't rewrite
    /// history. The log is append-only; no mutation path exists for
    /// past events.
    pub fn share_students(
        &self,
        company_id: &str,
        batch_id: &str,
        message: Option<String>,
    ) -> Result<usize, ServiceError> {
        let mut company = self.get_company(company_id)?;
        let batch = self.get_batch(batch_id)?;

        let rows = self.sql
            .query(
                "SELECT id FROM users WHERE batch_id = ?1 AND role = 'student' ORDER BY name ASC",
                &[Value::Text(batch_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let students: Vec<String> = rows
            .iter()
            .filter_map(|r| r.get_str("id").map(|s| s.to_string()))
            .collect();
        let shared = students.len();

        let now = now_rfc3339();
        company.shared_student_lists.push(SharedBatch {
            batch: batch_id.to_string(),
            students,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Student list for {}", batch.batch_name)),
            shared_date: now.clone(),
        });
        company.updated_at = now.clone();

        self.update_record(
            "companies",
            company_id,
            &company,
            &[
                ("name", Value::Text(company.company_name.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        info!(
            "shared {} students of batch {} with company {}",
            shared, batch.batch_name, company.company_name
        );
        Ok(shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::batch::CreateBatchInput;
    use crate::service::student::CreateStudentInput;
    use crate::service::test_support::test_service;

    fn company_input(name: &str) -> CreateCompanyInput {
        CreateCompanyInput {
            company_name: Some(name.into()),
            contact_email: Some("hr@example.com".into()),
            contact_person: Some("Sarah Connor".into()),
            ..Default::default()
        }
    }

    fn make_batch(svc: &CampusService, name: &str) -> String {
        svc.create_batch(CreateBatchInput {
            batch_name: Some(name.into()),
            year: Some(2021),
            course: Some("B.Tech".into()),
            department: Some("CS".into()),
            ..Default::default()
        })
        .unwrap()
        .id
    }

    fn add_student(svc: &CampusService, batch: &str, n: u32) -> String {
        svc.create_student(CreateStudentInput {
            name: Some(format!("Student {}", n)),
            email: Some(format!("s{}@campus.edu", n)),
            password: Some("secret123".into()),
            student_id: Some(format!("CS{:05}", n)),
            batch: Some(batch.into()),
            course: Some("B.Tech".into()),
            department: Some("CS".into()),
            year: Some(2021),
            phone: None,
        })
        .unwrap()
        .id
    }

    #[test]
    fn create_requires_contact_fields() {
        let (_tmp, svc) = test_service();
        let err = svc
            .create_company(CreateCompanyInput {
                company_name: Some("X".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn list_sorts_by_name() {
        let (_tmp, svc) = test_service();
        svc.create_company(company_input("InnovateLab")).unwrap();
        svc.create_company(company_input("DataCorp")).unwrap();
        let list = svc.list_companies(&ListParams::default()).unwrap();
        let names: Vec<&str> = list.items.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["DataCorp", "InnovateLab"]);
    }

    #[test]
    fn share_snapshots_current_membership() {
        let (_tmp, svc) = test_service();
        let company = svc.create_company(company_input("DataCorp")).unwrap();
        let batch = make_batch(&svc, "CS-2021");
        let s1 = add_student(&svc, &batch, 1);
        let s2 = add_student(&svc, &batch, 2);

        let shared = svc.share_students(&company.id, &batch, None).unwrap();
        assert_eq!(shared, 2);

        // Membership changes after the share must not rewrite the event.
        svc.delete_student(&s2).unwrap();
        add_student(&svc, &batch, 3);

        let stored = svc.get_company(&company.id).unwrap();
        assert_eq!(stored.shared_student_lists.len(), 1);
        let event = &stored.shared_student_lists[0];
        assert_eq!(event.students, vec![s1.clone(), s2.clone()]);
        assert_eq!(event.message, "Student list for CS-2021");

        // A second share appends, never replaces.
        svc.share_students(&company.id, &batch, Some("Round two".into()))
            .unwrap();
        let stored = svc.get_company(&company.id).unwrap();
        assert_eq!(stored.shared_student_lists.len(), 2);
        assert_eq!(stored.shared_student_lists[0].students, vec![s1, s2]);
        assert_eq!(stored.shared_student_lists[1].message, "Round two");
        assert_eq!(stored.shared_student_lists[1].students.len(), 2);
    }

    #[test]
    fn share_with_missing_batch_or_company_is_not_found() {
        let (_tmp, svc) = test_service();
        let company = svc.create_company(company_input("DataCorp")).unwrap();
        let batch = make_batch(&svc, "CS-2021");

        let err = svc.share_students(&company.id, "ghost", None).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = svc.share_students("ghost", &batch, None).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        // Neither failure appended anything.
        assert!(svc.get_company(&company.id).unwrap().shared_student_lists.is_empty());
    }
}
