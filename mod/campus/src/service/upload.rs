use tracing::info;

use campus_core::ServiceError;

use crate::model::User;
use crate::service::CampusService;

/// Extensions accepted for profile pictures.
const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Extensions accepted for resumes.
const DOC_EXTS: &[&str] = &["pdf", "doc", "docx"];

/// URL prefix the file-serving endpoint is mounted at. Stored URLs are
/// this prefix plus the blob key.
const FILES_PREFIX: &str = "/api/files/";

impl CampusService {
    /// Store a user's profile picture and record its URL on the record.
    /// Replaces any previous picture, including one with a different
    /// extension.
    pub fn upload_profile_picture(
        &self,
        user_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<String, ServiceError> {
        let ext = checked_extension(filename, IMAGE_EXTS)?;
        let key = format!("avatars/{}.{}", user_id, ext);
        self.replace_user_file(user_id, &key, data, |u| &mut u.profile_picture)
    }

    /// Store a student's resume and record its URL on the record.
    pub fn upload_resume(
        &self,
        user_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<String, ServiceError> {
        let ext = checked_extension(filename, DOC_EXTS)?;
        let key = format!("resumes/{}.{}", user_id, ext);
        self.replace_user_file(user_id, &key, data, |u| &mut u.resume)
    }

    /// Delete a user's profile picture blob and clear the URL field.
    pub fn delete_profile_picture(&self, user_id: &str) -> Result<(), ServiceError> {
        self.clear_user_file(user_id, |u| &mut u.profile_picture)
    }

    /// Delete a student's resume blob and clear the URL field.
    pub fn delete_resume(&self, user_id: &str) -> Result<(), ServiceError> {
        self.clear_user_file(user_id, |u| &mut u.resume)
    }

    /// Fetch a stored blob by key, for the file-serving endpoint.
    pub fn get_file(&self, key: &str) -> Result<Option<Vec<u8>>, ServiceError> {
        self.blob
            .get(key)
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    fn replace_user_file(
        &self,
        user_id: &str,
        key: &str,
        data: &[u8],
        field: fn(&mut User) -> &mut String,
    ) -> Result<String, ServiceError> {
        let mut user: User = self.get_record("users", user_id)?;

        // Drop the old blob when the key changed (new extension).
        if let Some(old_key) = stored_key(field(&mut user)) {
            if old_key != key {
                self.blob
                    .delete(&old_key)
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
            }
        }

        self.blob
            .put(key, data)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let url = format!("{}{}", FILES_PREFIX, key);
        *field(&mut user) = url.clone();
        user.updated_at = campus_core::now_rfc3339();
        self.update_record("users", user_id, &user, &Self::user_columns(&user))?;

        info!("stored {} ({} bytes) for user {}", key, data.len(), user_id);
        Ok(url)
    }

    fn clear_user_file(
        &self,
        user_id: &str,
        field: fn(&mut User) -> &mut String,
    ) -> Result<(), ServiceError> {
        let mut user: User = self.get_record("users", user_id)?;
        if let Some(key) = stored_key(field(&mut user)) {
            self.blob
                .delete(&key)
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }
        field(&mut user).clear();
        user.updated_at = campus_core::now_rfc3339();
        self.update_record("users", user_id, &user, &Self::user_columns(&user))?;
        Ok(())
    }
}

/// Extract the blob key back out of a stored file URL.
fn stored_key(url: &str) -> Option<String> {
    url.strip_prefix(FILES_PREFIX)
        .filter(|k| !k.is_empty())
        .map(|k| k.to_string())
}

/// Validate a filename's extension against an allow-list and return it
/// lowercased.
fn checked_extension(filename: &str, allowed: &[&str]) -> Result<String, ServiceError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ServiceError::Validation("filename has no extension".into()))?;
    if !allowed.contains(&ext.as_str()) {
        return Err(ServiceError::Validation(format!(
            "file type .{} not allowed (expected one of: {})",
            ext,
            allowed.join(", ")
        )));
    }
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::batch::CreateBatchInput;
    use crate::service::student::CreateStudentInput;
    use crate::service::test_support::test_service;

    fn make_student(svc: &CampusService) -> String {
        let batch = svc
            .create_batch(CreateBatchInput {
                batch_name: Some("CS-2021".into()),
                year: Some(2021),
                course: Some("B.Tech".into()),
                department: Some("CS".into()),
                ..Default::default()
            })
            .unwrap();
        svc.create_student(CreateStudentInput {
            name: Some("John Doe".into()),
            email: Some("john@campus.edu".into()),
            password: Some("secret123".into()),
            student_id: Some("CS21001".into()),
            batch: Some(batch.id),
            course: Some("B.Tech".into()),
            department: Some("CS".into()),
            year: Some(2021),
            phone: None,
        })
        .unwrap()
        .id
    }

    #[test]
    fn upload_records_url_and_serves_bytes() {
        let (_tmp, svc) = test_service();
        let id = make_student(&svc);

        let url = svc.upload_profile_picture(&id, "me.png", b"fake-png").unwrap();
        assert_eq!(url, format!("/api/files/avatars/{}.png", id));
        assert_eq!(svc.get_user(&id).unwrap().profile_picture, url);

        let key = format!("avatars/{}.png", id);
        assert_eq!(svc.get_file(&key).unwrap().as_deref(), Some(b"fake-png".as_slice()));
    }

    #[test]
    fn reupload_with_new_extension_drops_old_blob() {
        let (_tmp, svc) = test_service();
        let id = make_student(&svc);

        svc.upload_profile_picture(&id, "me.png", b"old").unwrap();
        let url = svc.upload_profile_picture(&id, "me.jpg", b"new").unwrap();
        assert_eq!(url, format!("/api/files/avatars/{}.jpg", id));

        assert!(svc.get_file(&format!("avatars/{}.png", id)).unwrap().is_none());
        assert_eq!(
            svc.get_file(&format!("avatars/{}.jpg", id)).unwrap().as_deref(),
            Some(b"new".as_slice())
        );
    }

    #[test]
    fn rejects_disallowed_extension() {
        let (_tmp, svc) = test_service();
        let id = make_student(&svc);

        let err = svc.upload_profile_picture(&id, "script.exe", b"x").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = svc.upload_resume(&id, "resume.png", b"x").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = svc.upload_resume(&id, "noext", b"x").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn delete_clears_field_and_blob() {
        let (_tmp, svc) = test_service();
        let id = make_student(&svc);

        svc.upload_resume(&id, "cv.pdf", b"cv-bytes").unwrap();
        svc.delete_resume(&id).unwrap();

        assert_eq!(svc.get_user(&id).unwrap().resume, "");
        assert!(svc.get_file(&format!("resumes/{}.pdf", id)).unwrap().is_none());

        // Deleting with nothing stored is a no-op.
        svc.delete_resume(&id).unwrap();
    }
}
