use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use adboard_core::{DomainError, DomainResult, Entity, UserId};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 254;

/// Account role.
///
/// Admins may modify any listing or comment; everyone else only their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl core::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

/// A registered account. Email is the login identifier; there is no
/// separate username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub role: Role,
    pub image_url: Option<String>,
    /// Operator-console access flag. Forced true on bootstrap admins.
    pub staff: bool,
    /// Bootstrap accounts created from the operator tooling. Implies admin.
    pub superuser: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated registration input. The password travels separately: only its
/// hash ever reaches the entity.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Partial profile update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

impl User {
    /// Register a new account. Validates and normalizes every field; the
    /// email is lowercased so lookups are case-insensitive.
    pub fn register(input: NewUser, password_hash: String) -> DomainResult<Self> {
        Ok(Self {
            id: UserId::new(),
            email: validate_email(&input.email)?,
            password_hash,
            first_name: validate_name("first_name", &input.first_name)?,
            last_name: validate_name("last_name", &input.last_name)?,
            phone: validate_phone(&input.phone)?,
            role: Role::User,
            image_url: None,
            staff: false,
            superuser: false,
            active: true,
            created_at: Utc::now(),
        })
    }

    /// Register an account through the administrative bootstrap path.
    ///
    /// The role is forced to admin and both privileged flags are forced
    /// true. Passing an explicit `false` for either flag is a caller bug
    /// and fails as an invariant violation.
    pub fn register_admin(
        input: NewUser,
        password_hash: String,
        staff: Option<bool>,
        superuser: Option<bool>,
    ) -> DomainResult<Self> {
        if staff == Some(false) {
            return Err(DomainError::invariant("admin accounts must have staff=true"));
        }
        if superuser == Some(false) {
            return Err(DomainError::invariant(
                "admin accounts must have superuser=true",
            ));
        }
        let mut user = Self::register(input, password_hash)?;
        user.role = Role::Admin;
        user.staff = true;
        user.superuser = true;
        Ok(user)
    }

    /// Whether this account may act on resources it does not own.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.superuser
    }

    /// Apply a profile patch, validating each supplied field.
    pub fn apply_patch(&mut self, patch: UserPatch) -> DomainResult<()> {
        if let Some(first_name) = patch.first_name {
            self.first_name = validate_name("first_name", &first_name)?;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = validate_name("last_name", &last_name)?;
        }
        if let Some(phone) = patch.phone {
            self.phone = validate_phone(&phone)?;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        Ok(())
    }

    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
    }

    /// Promote an existing account to a bootstrap admin.
    pub fn grant_admin(&mut self) {
        self.role = Role::Admin;
        self.staff = true;
        self.superuser = true;
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Normalize and validate an email address. This is deliberately shallow:
/// non-empty local and domain parts around a single `@`, bounded length.
pub fn validate_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::validation("email cannot be empty"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(DomainError::validation(format!(
            "email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.starts_with('.') && domain.contains('.')
        }
        None => false,
    };
    if !valid || email.contains(char::is_whitespace) {
        return Err(DomainError::validation("email is not a valid address"));
    }
    Ok(email)
}

fn validate_name(field: &str, raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_phone(raw: &str) -> DomainResult<String> {
    let phone = raw.trim();
    if phone.is_empty() {
        return Err(DomainError::validation("phone cannot be empty"));
    }
    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(DomainError::validation(format!(
            "phone cannot exceed {MAX_PHONE_LEN} characters"
        )));
    }
    Ok(phone.to_string())
}
