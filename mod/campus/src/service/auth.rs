use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;

use campus_core::{ServiceError, new_id};
use campus_sql::Value;

use crate::model::{Claims, Role, Session, User};
use crate::service::CampusService;
use crate::service::student::CreateStudentInput;

/// Registration request, admin or student.
#[derive(Debug, Default)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub student_id: Option<String>,
    pub batch: Option<String>,
    pub course: Option<String>,
    pub department: Option<String>,
    pub year: Option<i64>,
}

impl CampusService {
    /// Register a new account and log it in.
    ///
    /// Students go through the same creation path the admin CRUD uses,
    /// including the owning batch's member recount.
    pub fn register(&self, input: RegisterInput) -> Result<(String, User), ServiceError> {
        let role = match input.role.as_deref() {
            None | Some("student") => Role::Student,
            Some("admin") => Role::Admin,
            Some(other) => {
                return Err(ServiceError::Validation(format!("unknown role: {}", other)));
            }
        };

        let user = match role {
            Role::Student => self.create_student(CreateStudentInput {
                name: input.name,
                email: input.email,
                password: input.password,
                student_id: input.student_id,
                batch: input.batch,
                course: input.course,
                department: input.department,
                year: input.year,
                phone: None,
            })?,
            Role::Admin => self.create_admin(input)?,
        };

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    fn create_admin(&self, input: RegisterInput) -> Result<User, ServiceError> {
        let name = input.name
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ServiceError::Validation("name is required".into()))?;
        let email = normalize_email(input.email)?;
        let password = validate_password(input.password)?;
        let hash = hash_password(&password)?;

        let now = campus_core::now_rfc3339();
        let user = User {
            id: new_id(),
            name,
            email: Some(email.clone()),
            role: Role::Admin,
            student_id: None,
            batch: None,
            course: String::new(),
            department: String::new(),
            year: None,
            phone: String::new(),
            is_alumni: false,
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

        info!("admin {} registered", email);
        Ok(user)
    }

    /// Log in with email + password. Unknown email and wrong password are
    /// deliberately indistinguishable.
    pub fn login(&self, email: &str, password: &str) -> Result<(String, User), ServiceError> {
        let Some((user, hash)) = self.find_user_by_email(email)? else {
            return Err(ServiceError::Unauthorized("invalid credentials".into()));
        };
        if !verify_password(password, &hash) {
            return Err(ServiceError::Unauthorized("invalid credentials".into()));
        }

        let token = self.issue_token(&user)?;
        info!("user {} logged in", user.id);
        Ok((token, user))
    }

    /// Issue a signed JWT for a user and record the session.
    pub fn issue_token(&self, user: &User) -> Result<String, ServiceError> {
        let session_id = new_id();
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.config.token_ttl);

        let claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(format!("JWT encode failed: {}", e)))?;

        let session = Session {
            id: session_id,
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: exp.to_rfc3339(),
            revoked: false,
        };
        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::Integer(0)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;

        Ok(token)
    }

    /// Verify and decode a JWT. Returns the claims if the signature and
    /// expiry check out and the session has not been revoked.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))?;

        let claims = token_data.claims;

        if let Ok(session) = self.get_record::<Session>("sessions", &claims.sid) {
            if session.revoked {
                return Err(ServiceError::Unauthorized("session has been revoked".into()));
            }
        }

        Ok(claims)
    }

    /// Revoke every active session of a user. Used when a student record
    /// is deleted so stale tokens stop working immediately.
    pub fn revoke_user_sessions(&self, user_id: &str) -> Result<u64, ServiceError> {
        let affected = self.sql
            .exec(
                "UPDATE sessions SET revoked = 1, \
                 data = REPLACE(data, '\"revoked\":false', '\"revoked\":true') \
                 WHERE user_id = ?1 AND revoked = 0",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(affected)
    }
}

/// Hash a plain password with argon2id (PHC string format).
pub(crate) fn hash_password(password: &str) -> Result<String, ServiceError> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hash failed: {}", e)))
}

/// Verify a password against an argon2id hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Require a well-formed email and normalize it to lowercase.
pub(crate) fn normalize_email(email: Option<String>) -> Result<String, ServiceError> {
    let email = email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ServiceError::Validation("email is required".into()))?;
    if !email.contains('@') {
        return Err(ServiceError::Validation("invalid email".into()));
    }
    Ok(email)
}

/// Require a password of at least 6 characters.
pub(crate) fn validate_password(password: Option<String>) -> Result<String, ServiceError> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ServiceError::Validation("password is required".into()))?;
    if password.chars().count() < 6 {
        return Err(ServiceError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }
    Ok(password)
}

/// Rewrite a raw UNIQUE-constraint conflict into a caller-friendly one.
pub(crate) fn conflict_message(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Conflict(msg) if msg.contains("email") => {
            ServiceError::Conflict("email already registered".into())
        }
        ServiceError::Conflict(msg) if msg.contains("student_id") => {
            ServiceError::Conflict("student id already registered".into())
        }
        other => other,
    }
}
