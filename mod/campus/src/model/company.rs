use serde::{Deserialize, Serialize};

/// One share event: the student membership of a batch as it was at share
/// time. Appended once and never recomputed, even if the batch's
/// membership changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedBatch {
    /// Batch id the snapshot was taken from.
    pub batch: String,

    /// User ids of the batch's students at share time.
    pub students: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// RFC 3339 timestamp of the share.
    pub shared_date: String,
}

/// Company — a placement partner student lists are shared with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    pub company_name: String,

    pub contact_email: String,

    pub contact_person: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_phone: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub industry: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,

    /// Append-only share-event log.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_student_lists: Vec<SharedBatch>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}
