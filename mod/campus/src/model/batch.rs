use serde::{Deserialize, Serialize};

/// Batch — a graduating cohort of students.
///
/// Completion is one-way: once `is_completed` is set the batch stays
/// completed and every member student becomes an alumni.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Unique cohort name (e.g. "CS-2021").
    pub batch_name: String,

    /// Graduation year.
    pub year: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub course: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub department: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    /// Set together with `completed_date`, and only together.
    #[serde(default)]
    pub is_completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,

    /// Cached count of member students. Not a source of truth: recomputed
    /// from the users table whenever membership changes.
    #[serde(default)]
    pub total_students: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_json_roundtrip() {
        let b = Batch {
            id: "b1".into(),
            batch_name: "CS-2021".into(),
            year: 2021,
            course: "B.Tech".into(),
            department: "Computer Science".into(),
            start_date: Some("2017-08-01".into()),
            end_date: Some("2021-05-31".into()),
            is_completed: false,
            completed_date: None,
            total_students: 0,
            description: String::new(),
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&b).unwrap();
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
        // An incomplete batch serializes no completedDate at all.
        assert!(!json.contains("completedDate"));
    }
}
