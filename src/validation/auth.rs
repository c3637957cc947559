use crate::error::{AuthError, FieldError, Result};
use crate::handlers::auth::RegisterRequest;

/// Checks an email address for basic shape.
///
/// The backend performs the authoritative check; this only stops obviously
/// malformed input before it reaches the network.
fn check_email(email: &str) -> Option<FieldError> {
    if email.is_empty() {
        return Some(FieldError::new("email", "Email is required"));
    }
    if email.len() > 255 {
        return Some(FieldError::new("email", "Email must be at most 255 characters"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Some(FieldError::new("email", "Email must contain an @"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Some(FieldError::new("email", "Email address is not valid"));
    }
    None
}

fn check_password(password: &str) -> Option<FieldError> {
    if password.len() < 8 {
        return Some(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
    }
    if password.len() > 128 {
        return Some(FieldError::new(
            "password",
            "Password must be at most 128 characters",
        ));
    }
    None
}

fn check_required(field: &'static str, value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        Some(FieldError::new(field, format!("{} is required", field)))
    } else {
        None
    }
}

/// Validates login credentials before any network call.
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    let errors: Vec<FieldError> = [check_email(email), check_password(password)]
        .into_iter()
        .flatten()
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(errors))
    }
}

/// Validates a full registration payload before any network call.
pub fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    let mut errors: Vec<FieldError> = Vec::new();

    errors.extend(check_email(&payload.email));
    errors.extend(check_password(&payload.password));
    errors.extend(check_required("firstName", &payload.first_name));
    errors.extend(check_required("lastName", &payload.last_name));
    errors.extend(check_required("phone", &payload.phone));
    errors.extend(check_required("address", &payload.address));
    errors.extend(check_required("city", &payload.city));
    errors.extend(check_required("country", &payload.country));
    errors.extend(check_required("currency", &payload.currency));
    errors.extend(check_required("state", &payload.state));
    errors.extend(check_required("postalCode", &payload.postal_code));
    errors.extend(check_required("dob", &payload.dob));
    errors.extend(check_required("govId", &payload.gov_id));

    if !payload.data_authorization {
        errors.push(FieldError::new(
            "dataAuthorization",
            "Data processing authorization must be accepted",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(errors))
    }
}
