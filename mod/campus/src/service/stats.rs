use serde::Serialize;

use campus_core::ServiceError;
use campus_sql::Value;

use crate::model::User;
use crate::service::CampusService;

/// Admin dashboard counters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    pub current_students: i64,
    pub total_alumni: i64,
    pub total_batches: i64,
    pub active_batches: i64,
    pub completed_batches: i64,
    pub total_companies: i64,
}

/// One employer with its alumni headcount.
#[derive(Debug, Serialize)]
pub struct CompanyCount {
    pub company: String,
    pub count: i64,
}

/// Stats shown on a student's own dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub is_alumni: bool,
    pub batch_mates: i64,
    pub batch_alumni: i64,
    pub total_alumni: i64,
    pub top_companies: Vec<CompanyCount>,
}

impl CampusService {
    pub fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        let student = ("role", Value::Text("student".into()));
        let total_students = self.count_records("users", &[student.clone()])?;
        let total_alumni = self.count_records(
            "users",
            &[student.clone(), ("is_alumni", Value::Integer(1))],
        )?;
        let total_batches = self.count_records("batches", &[])?;
        let completed_batches =
            self.count_records("batches", &[("is_completed", Value::Integer(1))])?;

        Ok(DashboardStats {
            total_students,
            current_students: total_students - total_alumni,
            total_alumni,
            total_batches,
            active_batches: total_batches - completed_batches,
            completed_batches,
            total_companies: self.count_records("companies", &[])?,
        })
    }

    /// Stats for one student's dashboard. The caller must be a student;
    /// batch-scoped numbers exclude the student themselves.
    pub fn student_stats(&self, user_id: &str) -> Result<StudentStats, ServiceError> {
        let user = self.get_student(user_id)?;
        let student = ("role", Value::Text("student".into()));

        let (batch_mates, batch_alumni) = match user.batch {
            Some(ref batch_id) => {
                let members = self.count_records(
                    "users",
                    &[student.clone(), ("batch_id", Value::Text(batch_id.clone()))],
                )?;
                let alumni = self.count_records(
                    "users",
                    &[
                        student.clone(),
                        ("batch_id", Value::Text(batch_id.clone())),
                        ("is_alumni", Value::Integer(1)),
                    ],
                )?;
                // The member count includes the student; alumni may too.
                let alumni = if user.is_alumni { alumni - 1 } else { alumni };
                (members - 1, alumni)
            }
            None => (0, 0),
        };

        Ok(StudentStats {
            is_alumni: user.is_alumni,
            batch_mates,
            batch_alumni,
            total_alumni: self.count_records(
                "users",
                &[student, ("is_alumni", Value::Integer(1))],
            )?,
            top_companies: self.top_companies(5)?,
        })
    }

    /// The busiest alumni employers, largest first, name as tiebreak.
    pub fn top_companies(&self, limit: usize) -> Result<Vec<CompanyCount>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT company, COUNT(*) as cnt FROM users \
                 WHERE role = 'student' AND is_alumni = 1 AND company != '' \
                 GROUP BY company ORDER BY cnt DESC, company ASC LIMIT ?1",
                &[Value::Integer(limit as i64)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .filter_map(|r| {
                Some(CompanyCount {
                    company: r.get_str("company")?.to_string(),
                    count: r.get_i64("cnt")?,
                })
            })
            .collect())
    }

    /// A student's batch mates, alphabetical, excluding the student.
    pub fn my_batch(&self, user_id: &str) -> Result<Vec<User>, ServiceError> {
        let user = self.get_student(user_id)?;
        let Some(batch_id) = user.batch else {
            return Ok(vec![]);
        };

        let rows = self.sql
            .query(
                "SELECT data FROM users \
                 WHERE batch_id = ?1 AND role = 'student' AND id != ?2 \
                 ORDER BY name ASC",
                &[Value::Text(batch_id), Value::Text(user_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Self::decode_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::batch::CreateBatchInput;
    use crate::service::student::CreateStudentInput;
    use crate::service::test_support::test_service;

    fn make_batch(svc: &CampusService, name: &str, year: i64) -> String {
        svc.create_batch(CreateBatchInput {
            batch_name: Some(name.into()),
            year: Some(year),
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
            year: Some(2020),
            phone: None,
        })
        .unwrap()
        .id
    }

    #[test]
    fn dashboard_counts_line_up() {
        let (_tmp, svc) = test_service();
        let done = make_batch(&svc, "CS-2020", 2020);
        let open = make_batch(&svc, "CS-2021", 2021);
        for n in 1..=2 {
            add_student(&svc, &done, n);
        }
        add_student(&svc, &open, 3);
        svc.complete_batch(&done).unwrap();

        let stats = svc.dashboard_stats().unwrap();
        assert_eq!(stats.total_students, 3);
        assert_eq!(stats.total_alumni, 2);
        assert_eq!(stats.current_students, 1);
        assert_eq!(stats.total_batches, 2);
        assert_eq!(stats.completed_batches, 1);
        assert_eq!(stats.active_batches, 1);
        assert_eq!(stats.total_companies, 0);
    }

    #[test]
    fn student_stats_exclude_self() {
        let (_tmp, svc) = test_service();
        let done = make_batch(&svc, "CS-2020", 2020);
        let me = add_student(&svc, &done, 1);
        add_student(&svc, &done, 2);
        add_student(&svc, &done, 3);
        svc.complete_batch(&done).unwrap();
        svc.update_own_profile(&me, serde_json::json!({"company": "Google"}))
            .unwrap();

        let stats = svc.student_stats(&me).unwrap();
        assert!(stats.is_alumni);
        assert_eq!(stats.batch_mates, 2);
        assert_eq!(stats.batch_alumni, 2);
        assert_eq!(stats.total_alumni, 3);
        assert_eq!(stats.top_companies.len(), 1);
        assert_eq!(stats.top_companies[0].company, "Google");
        assert_eq!(stats.top_companies[0].count, 1);
    }

    #[test]
    fn top_companies_rank_by_headcount() {
        let (_tmp, svc) = test_service();
        let done = make_batch(&svc, "CS-2020", 2020);
        let ids: Vec<String> = (1..=3).map(|n| add_student(&svc, &done, n)).collect();
        svc.complete_batch(&done).unwrap();
        for (i, id) in ids.iter().enumerate() {
            let company = if i < 2 { "Google" } else { "Microsoft" };
            svc.update_own_profile(id, serde_json::json!({"company": company}))
                .unwrap();
        }

        let top = svc.top_companies(5).unwrap();
        assert_eq!(top[0].company, "Google");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[1].company, "Microsoft");
        assert_eq!(top[1].count, 1);
    }

    #[test]
    fn my_batch_is_sorted_and_excludes_self() {
        let (_tmp, svc) = test_service();
        let open = make_batch(&svc, "CS-2021", 2021);
        let me = add_student(&svc, &open, 2);
        add_student(&svc, &open, 3);
        add_student(&svc, &open, 1);

        let mates = svc.my_batch(&me).unwrap();
        let names: Vec<&str> = mates.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Student 1", "Student 3"]);
    }
}
