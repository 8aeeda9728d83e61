//! User, credential, and registration models.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Email, Role, UserId};
use crate::validation::{ValidationError, required};

/// The signed-in user as returned by the backend and persisted under `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserSummary {
    /// "First Last", the form reviews are attributed under.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this is a back-office account.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Overlay the fields present in a profile response.
    #[must_use]
    pub fn merged_with(mut self, patch: UserPatch) -> Self {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        self
    }
}

/// A partial user, as returned by `PUT /users/profile`.
///
/// `phone` and `address` tell an absent field (`None`) apart from an explicit
/// `null` (`Some(None)`), which clears the stored value.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
}

/// Mark a field that appears in the payload, `null` included.
#[allow(clippy::option_option)]
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Editable profile fields. Unset fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// Whether any field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

/// Login form payload.
#[derive(Clone, Serialize)]
pub struct Credentials {
    email: Email,
    password: String,
}

impl Credentials {
    /// Validate a login form.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed email or a blank password.
    pub fn new(email: &str, password: &str) -> Result<Self, ValidationError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(ValidationError::Required("Password"));
        }
        Ok(Self {
            email,
            password: password.to_string(),
        })
    }

    /// The email being signed in.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// `POST /auth/login` response.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub user: UserSummary,
    pub token: String,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Registration form as filled in, before validation.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_to_terms: bool,
}

/// Validated `POST /auth/register` body.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    first_name: String,
    last_name: String,
    email: Email,
    password: String,
}

impl Registration {
    /// The email being registered.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegistrationForm {
    /// Check the form in the order the registration screen does.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: password confirmation, terms, then
    /// required fields and email shape.
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if !self.agree_to_terms {
            return Err(ValidationError::TermsNotAccepted);
        }
        let first_name = required(&self.first_name, "First name")?;
        let last_name = required(&self.last_name, "Last name")?;
        let email = Email::parse(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("Password"));
        }

        Ok(Registration {
            first_name,
            last_name,
            email,
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn priya() -> UserSummary {
        serde_json::from_value(serde_json::json!({
            "id": 3,
            "firstName": "Priya",
            "lastName": "Sharma",
            "email": "priya@techmart.in",
            "role": "CUSTOMER"
        }))
        .unwrap()
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            first_name: "Priya".into(),
            last_name: "Sharma".into(),
            email: "priya@techmart.in".into(),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
            agree_to_terms: true,
        }
    }

    #[test]
    fn test_user_summary_defaults_and_names() {
        let user = priya();
        assert_eq!(user.full_name(), "Priya Sharma");
        assert!(!user.is_admin());
        assert!(user.phone.is_none());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("phone").is_none());
        assert_eq!(json["firstName"], "Priya");
    }

    #[test]
    fn test_merge_keeps_fields_missing_from_patch() {
        let patch: UserPatch =
            serde_json::from_str(r#"{"phone":"9876543210","address":"12 MG Road"}"#).unwrap();
        let merged = priya().merged_with(patch);
        assert_eq!(merged.first_name, "Priya");
        assert_eq!(merged.phone.as_deref(), Some("9876543210"));
        assert_eq!(merged.address.as_deref(), Some("12 MG Road"));
    }

    #[test]
    fn test_merge_clears_fields_sent_as_null() {
        let mut user = priya();
        user.phone = Some("9876543210".into());
        user.address = Some("12 MG Road".into());

        let patch: UserPatch =
            serde_json::from_str(r#"{"phone":null,"firstName":"Priyanka"}"#).unwrap();
        assert_eq!(patch.phone, Some(None));
        assert_eq!(patch.address, None);

        let merged = user.merged_with(patch);
        assert_eq!(merged.first_name, "Priyanka");
        assert_eq!(merged.phone, None);
        assert_eq!(merged.address.as_deref(), Some("12 MG Road"));
    }

    #[test]
    fn test_registration_checks_in_screen_order() {
        let mut bad = form();
        bad.confirm_password = "other".into();
        bad.agree_to_terms = false;
        assert_eq!(bad.validate().unwrap_err(), ValidationError::PasswordMismatch);

        let mut bad = form();
        bad.agree_to_terms = false;
        assert_eq!(bad.validate().unwrap_err(), ValidationError::TermsNotAccepted);

        let mut bad = form();
        bad.last_name = " ".into();
        assert_eq!(
            bad.validate().unwrap_err(),
            ValidationError::Required("Last name")
        );
    }

    #[test]
    fn test_registration_body_shape() {
        let body = serde_json::to_value(form().validate().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "firstName": "Priya",
                "lastName": "Sharma",
                "email": "priya@techmart.in",
                "password": "hunter22"
            })
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("admin@techmart.com", "s3cret!").unwrap();
        let debug = format!("{credentials:?}");
        assert!(debug.contains("admin@techmart.com"));
        assert!(!debug.contains("s3cret!"));
        assert!(Credentials::new("admin@techmart.com", "").is_err());
    }
}
