use tracing::info;

use campus_core::{ServiceError, new_id, now_rfc3339};
use campus_sql::Value;

use crate::model::{Batch, CurrentStatus, Role, User};
use crate::service::CampusService;
use crate::service::auth::hash_password;
use crate::service::company::CreateCompanyInput;

/// What `seed` created, for the CLI summary.
#[derive(Debug)]
pub struct SeedSummary {
    pub batches: usize,
    pub users: usize,
    pub companies: usize,
}

/// Everything needed to build one seeded user record.
struct SeedUser<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
    student_id: &'a str,
    batch: &'a str,
    course: &'a str,
    year: i64,
    phone: &'a str,
    is_alumni: bool,
    job_role: &'a str,
    company: &'a str,
    work_location: &'a str,
    salary: i64,
    experience: &'a str,
    skills: &'a [&'a str],
    linkedin: &'a str,
    github: &'a str,
    current_status: CurrentStatus,
}

impl Default for SeedUser<'_> {
    fn default() -> Self {
        Self {
            name: "",
            email: "",
            password: "student123",
            role: Role::Student,
            student_id: "",
            batch: "",
            course: "Computer Science",
            year: 3,
            phone: "",
            is_alumni: false,
            job_role: "",
            company: "",
            work_location: "",
            salary: 0,
            experience: "",
            skills: &[],
            linkedin: "",
            github: "",
            current_status: CurrentStatus::Studying,
        }
    }
}

impl CampusService {
    /// Wipe the database and load the reference demo data set: three
    /// batches (one completed with three alumni), an admin account, four
    /// current students, and three partner companies.
    ///
    /// Demo accounts: `admin@campus.edu`/`admin123` and
    /// `student@campus.edu`/`student123`.
    pub fn seed(&self) -> Result<SeedSummary, ServiceError> {
        for table in ["users", "batches", "companies", "sessions"] {
            self.sql
                .exec(&format!("DELETE FROM {}", table), &[])
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        let cs2020 = self.seed_batch(
            "CS-2020",
            2020,
            "Computer Science",
            "2020-08-01",
            "2024-05-31",
            Some("2024-05-31T00:00:00Z"),
            "Computer Science batch of 2020-2024",
        )?;
        let cs2021 = self.seed_batch(
            "CS-2021",
            2021,
            "Computer Science",
            "2021-08-01",
            "2025-05-31",
            None,
            "Computer Science batch of 2021-2025",
        )?;
        let it2022 = self.seed_batch(
            "IT-2022",
            2022,
            "Information Technology",
            "2022-08-01",
            "2026-05-31",
            None,
            "Information Technology batch of 2022-2026",
        )?;

        let users: Vec<SeedUser> = vec![
            SeedUser {
                name: "Admin User",
                email: "admin@campus.edu",
                password: "admin123",
                role: Role::Admin,
                course: "",
                phone: "+1234567890",
                ..Default::default()
            },
            SeedUser {
                name: "John Doe",
                email: "john.doe@email.com",
                student_id: "CS20001",
                batch: &cs2020,
                year: 4,
                phone: "+1234567891",
                is_alumni: true,
                job_role: "Software Engineer",
                company: "Google",
                work_location: "Mountain View, CA",
                salary: 120000,
                experience: "2 years",
                skills: &["JavaScript", "React", "Node.js", "Python"],
                linkedin: "https://linkedin.com/in/johndoe",
                github: "https://github.com/johndoe",
                current_status: CurrentStatus::Employed,
                ..Default::default()
            },
            SeedUser {
                name: "Jane Smith",
                email: "jane.smith@email.com",
                student_id: "CS20002",
                batch: &cs2020,
                year: 4,
                phone: "+1234567892",
                is_alumni: true,
                job_role: "Full Stack Developer",
                company: "Microsoft",
                work_location: "Seattle, WA",
                salary: 115000,
                experience: "1.5 years",
                skills: &["C#", ".NET", "Angular", "SQL Server"],
                linkedin: "https://linkedin.com/in/janesmith",
                github: "https://github.com/janesmith",
                current_status: CurrentStatus::Employed,
                ..Default::default()
            },
            SeedUser {
                name: "Mike Johnson",
                email: "mike.johnson@email.com",
                student_id: "CS20003",
                batch: &cs2020,
                year: 4,
                phone: "+1234567893",
                is_alumni: true,
                job_role: "Data Scientist",
                company: "Facebook",
                work_location: "Menlo Park, CA",
                salary: 130000,
                experience: "2 years",
                skills: &["Python", "Machine Learning", "TensorFlow", "SQL"],
                linkedin: "https://linkedin.com/in/mikejohnson",
                github: "https://github.com/mikejohnson",
                current_status: CurrentStatus::Employed,
                ..Default::default()
            },
            SeedUser {
                name: "Alice Brown",
                email: "alice.brown@email.com",
                student_id: "CS21001",
                batch: &cs2021,
                phone: "+1234567894",
                skills: &["Java", "Spring Boot", "MySQL"],
                linkedin: "https://linkedin.com/in/alicebrown",
                github: "https://github.com/alicebrown",
                ..Default::default()
            },
            SeedUser {
                name: "Bob Wilson",
                email: "bob.wilson@email.com",
                student_id: "CS21002",
                batch: &cs2021,
                phone: "+1234567895",
                skills: &["Python", "Django", "PostgreSQL"],
                linkedin: "https://linkedin.com/in/bobwilson",
                github: "https://github.com/bobwilson",
                ..Default::default()
            },
            SeedUser {
                name: "Carol Davis",
                email: "carol.davis@email.com",
                student_id: "IT22001",
                batch: &it2022,
                course: "Information Technology",
                year: 2,
                phone: "+1234567896",
                skills: &["HTML", "CSS", "JavaScript"],
                linkedin: "https://linkedin.com/in/caroldavis",
                github: "https://github.com/caroldavis",
                ..Default::default()
            },
            SeedUser {
                name: "Demo Student",
                email: "student@campus.edu",
                student_id: "DEMO001",
                batch: &cs2021,
                phone: "+1234567890",
                skills: &["JavaScript", "React", "Node.js"],
                ..Default::default()
            },
        ];
        let user_count = users.len();
        for user in users {
            self.seed_user(user)?;
        }

        for batch_id in [&cs2020, &cs2021, &it2022] {
            self.recount(batch_id)?;
        }

        let companies = [
            CreateCompanyInput {
                company_name: Some("Tech Solutions Inc".into()),
                contact_email: Some("hr@techsolutions.com".into()),
                contact_person: Some("Sarah Manager".into()),
                contact_phone: Some("+1234567800".into()),
                website: Some("https://techsolutions.com".into()),
                description: Some("Leading software development company".into()),
                industry: Some("Software Development".into()),
                location: Some("San Francisco, CA".into()),
            },
            CreateCompanyInput {
                company_name: Some("InnovateLab".into()),
                contact_email: Some("careers@innovatelab.com".into()),
                contact_person: Some("David Recruiter".into()),
                contact_phone: Some("+1234567801".into()),
                website: Some("https://innovatelab.com".into()),
                description: Some("Innovative technology solutions provider".into()),
                industry: Some("Technology".into()),
                location: Some("Austin, TX".into()),
            },
            CreateCompanyInput {
                company_name: Some("DataCorp".into()),
                contact_email: Some("jobs@datacorp.com".into()),
                contact_person: Some("Lisa Hiring".into()),
                contact_phone: Some("+1234567802".into()),
                website: Some("https://datacorp.com".into()),
                description: Some("Data analytics and AI company".into()),
                industry: Some("Data Analytics".into()),
                location: Some("New York, NY".into()),
            },
        ];
        let company_count = companies.len();
        for company in companies {
            self.create_company(company)?;
        }

        let summary = SeedSummary {
            batches: 3,
            users: user_count,
            companies: company_count,
        };
        info!(
            "seeded {} batches, {} users, {} companies",
            summary.batches, summary.users, summary.companies
        );
        Ok(summary)
    }

    fn seed_batch(
        &self,
        name: &str,
        year: i64,
        course: &str,
        start: &str,
        end: &str,
        completed: Option<&str>,
        description: &str,
    ) -> Result<String, ServiceError> {
        let now = now_rfc3339();
        let batch = Batch {
            id: new_id(),
            batch_name: name.to_string(),
            year,
            course: course.to_string(),
            department: "Engineering".to_string(),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            is_completed: completed.is_some(),
            completed_date: completed.map(|d| d.to_string()),
            total_students: 0,
            description: description.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.insert_record("batches", &batch.id, &batch, &Self::batch_columns(&batch))?;
        Ok(batch.id)
    }

    fn seed_user(&self, seed: SeedUser) -> Result<(), ServiceError> {
        let is_student = seed.role == Role::Student;
        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: seed.name.to_string(),
            email: Some(seed.email.to_string()),
            role: seed.role,
            student_id: is_student.then(|| seed.student_id.to_string()),
            batch: is_student.then(|| seed.batch.to_string()),
            course: seed.course.to_string(),
            department: if is_student { "Engineering".into() } else { String::new() },
            year: is_student.then_some(seed.year),
            phone: seed.phone.to_string(),
            is_alumni: seed.is_alumni,
            job_role: seed.job_role.to_string(),
            company: seed.company.to_string(),
            work_location: seed.work_location.to_string(),
            salary: seed.salary,
            experience: seed.experience.to_string(),
            achievements: vec![],
            current_status: seed.current_status,
            skills: seed.skills.iter().map(|s| s.to_string()).collect(),
            linkedin_profile: seed.linkedin.to_string(),
            github_profile: seed.github.to_string(),
            portfolio_website: String::new(),
            profile_picture: String::new(),
            resume: String::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        let hash = hash_password(seed.password)?;
        let mut columns = Self::user_columns(&user);
        columns.push(("password_hash", Value::Text(hash)));
        self.insert_record("users", &user.id, &user, &columns)
    }
}

#[cfg(test)]
mod tests {
    use crate::service::alumni::AlumniQuery;
    use crate::service::test_support::test_service;

    #[test]
    fn seed_builds_consistent_state() {
        let (_tmp, svc) = test_service();
        let summary = svc.seed().unwrap();
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.users, 8);
        assert_eq!(summary.companies, 3);

        // Completed batch invariant: every CS-2020 member is an alumni.
        let batches = svc.list_batches(&Default::default()).unwrap();
        let cs2020 = batches
            .items
            .iter()
            .find(|b| b.batch_name == "CS-2020")
            .unwrap();
        assert!(cs2020.is_completed);
        assert!(cs2020.completed_date.is_some());
        assert_eq!(cs2020.total_students, 3);

        let (members, _) = svc
            .list_alumni(&AlumniQuery {
                batch: Some(cs2020.id.clone()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(members.len(), 3);

        // Cached counts match actual membership.
        let cs2021 = batches
            .items
            .iter()
            .find(|b| b.batch_name == "CS-2021")
            .unwrap();
        assert_eq!(cs2021.total_students, 3);
        assert!(!cs2021.is_completed);

        let stats = svc.dashboard_stats().unwrap();
        assert_eq!(stats.total_students, 7);
        assert_eq!(stats.total_alumni, 3);
        assert_eq!(stats.total_companies, 3);
    }

    #[test]
    fn seed_accounts_can_log_in() {
        let (_tmp, svc) = test_service();
        svc.seed().unwrap();

        let (_, admin) = svc.login("admin@campus.edu", "admin123").unwrap();
        assert!(admin.email.is_some());
        let (_, student) = svc.login("student@campus.edu", "student123").unwrap();
        assert!(!student.is_alumni);
    }

    #[test]
    fn seed_is_rerunnable() {
        let (_tmp, svc) = test_service();
        svc.seed().unwrap();
        let summary = svc.seed().unwrap();
        assert_eq!(summary.users, 8);
        let stats = svc.dashboard_stats().unwrap();
        assert_eq!(stats.total_students, 7);
    }
}
