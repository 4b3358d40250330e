use serde::{Deserialize, Serialize};

/// User role. Students are the managed population; admins run the campus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Self::Student
    }
}

/// What an alumni is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentStatus {
    Studying,
    JobSearching,
    Employed,
    Entrepreneur,
    HigherStudies,
}

impl Default for CurrentStatus {
    fn default() -> Self {
        Self::Studying
    }
}

/// A notable achievement on an alumni profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// User — one person, admin or student. Alumni are students whose batch
/// completed; they keep role "student" with `is_alumni` set.
///
/// The password hash is stored in its own SQL column, never in this
/// document, so it cannot leak through serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Login email, unique, stored lowercased. Omitted from alumni
    /// directory responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Role,

    /// Campus-issued id, unique among students. Admins have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,

    /// Owning batch id. Required for students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub course: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub department: String,

    /// Year of study / graduation year. Required for students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,

    /// Set by the batch-completion cascade, or at creation when the
    /// owning batch is already completed. Students never set this
    /// themselves. Always serialized: the cascade rewrites it in place
    /// inside the stored JSON.
    #[serde(default)]
    pub is_alumni: bool,

    // ── Work profile, writable only while is_alumni ──
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_role: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub work_location: String,

    #[serde(default)]
    pub salary: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub experience: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<Achievement>,

    #[serde(default)]
    pub current_status: CurrentStatus,

    // ── Contact / social, writable regardless of alumni status ──
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub linkedin_profile: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub github_profile: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub portfolio_website: String,

    /// Stored file URLs (`/api/files/...`), set by the upload endpoints.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile_picture: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resume: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

impl User {
    /// Copy with the email removed, for alumni-directory responses.
    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_student() -> User {
        User {
            id: "u1".into(),
            name: "John Doe".into(),
            email: Some("john@campus.edu".into()),
            role: Role::Student,
            student_id: Some("CS20001".into()),
            batch: Some("b1".into()),
            course: "B.Tech".into(),
            department: "CS".into(),
            year: Some(2020),
            phone: String::new(),
            is_alumni: false,
            job_role: String::new(),
            company: String::new(),
            work_location: String::new(),
            salary: 0,
            experience: String::new(),
            achievements: vec![],
            current_status: CurrentStatus::Studying,
            skills: vec!["java".into()],
            linkedin_profile: String::new(),
            github_profile: String::new(),
            portfolio_website: String::new(),
            profile_picture: String::new(),
            resume: String::new(),
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn user_json_roundtrip() {
        let u = sample_student();
        let json = serde_json::to_string(&u).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(u, back);
    }

    #[test]
    fn alumni_flag_always_serialized() {
        // The completion cascade rewrites `"isAlumni":false` inside the
        // stored document, so the key must be present even when false.
        let json = serde_json::to_string(&sample_student()).unwrap();
        assert!(json.contains("\"isAlumni\":false"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&CurrentStatus::JobSearching).unwrap(),
            "\"job_searching\""
        );
    }

    #[test]
    fn without_email_strips_email() {
        let u = sample_student().without_email();
        assert!(u.email.is_none());
        let json = serde_json::to_string(&u).unwrap();
        assert!(!json.contains("email"));
    }
}
