use crate::error::{Error, Result};
use crate::types::{AccountType, PAID_MONTHS_CHOICES};

const MAX_USER_NAME_LEN: usize = 64;
const MAX_REPO_NAME_LEN: usize = 100;
const MAX_BOX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_FILE_NAME_LEN: usize = 255;

fn is_valid_handle_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn validate_title(name: &str, entity: &str, max_len: usize) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(format!("{entity} name cannot be empty")));
    }
    if name.chars().count() > max_len {
        return Err(Error::Validation(format!(
            "{entity} name cannot exceed {max_len} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::Validation(format!(
            "{entity} name cannot contain control characters"
        )));
    }
    if name.trim() != name {
        return Err(Error::Validation(format!(
            "{entity} name cannot start or end with whitespace"
        )));
    }
    Ok(())
}

/// User names are handles: alphanumerics, hyphens and underscores.
pub fn validate_user_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("User name cannot be empty".into()));
    }
    if name.len() > MAX_USER_NAME_LEN {
        return Err(Error::Validation(format!(
            "User name cannot exceed {MAX_USER_NAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_handle_char) {
        return Err(Error::Validation(
            "User name can only contain alphanumeric characters, hyphens, and underscores".into(),
        ));
    }
    if name.starts_with('-') || name.starts_with('_') {
        return Err(Error::Validation(
            "User name cannot start with a hyphen or underscore".into(),
        ));
    }
    Ok(())
}

pub fn validate_repo_name(name: &str) -> Result<()> {
    validate_title(name, "Repository", MAX_REPO_NAME_LEN)
}

pub fn validate_box_name(name: &str) -> Result<()> {
    validate_title(name, "Box", MAX_BOX_NAME_LEN)
}

pub fn validate_description(description: &str) -> Result<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::Validation(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("File name cannot be empty".into()));
    }
    if name.chars().count() > MAX_FILE_NAME_LEN {
        return Err(Error::Validation(format!(
            "File name cannot exceed {MAX_FILE_NAME_LEN} characters"
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::Validation("File name is reserved".into()));
    }
    if name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(Error::Validation(
            "File name cannot contain path separators or control characters".into(),
        ));
    }
    Ok(())
}

/// `paid_months` is only meaningful on PAID accounts and must be a sold period.
pub fn validate_account_terms(account_type: AccountType, paid_months: Option<i32>) -> Result<()> {
    match (account_type, paid_months) {
        (AccountType::Free, Some(_)) => Err(Error::Validation(
            "paid_months is only valid for PAID accounts".into(),
        )),
        (AccountType::Paid, Some(months)) if !PAID_MONTHS_CHOICES.contains(&months) => {
            Err(Error::Validation(format!(
                "paid_months must be one of {PAID_MONTHS_CHOICES:?}"
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_names() {
        assert!(validate_user_name("alice").is_ok());
        assert!(validate_user_name("alice-2_b").is_ok());
        assert!(validate_user_name("").is_err());
        assert!(validate_user_name("-alice").is_err());
        assert!(validate_user_name("al ice").is_err());
        assert!(validate_user_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_titles_allow_free_text() {
        assert!(validate_repo_name("Family Photos 2024").is_ok());
        assert!(validate_box_name("Summer: beach & hikes").is_ok());
        assert!(validate_box_name("   ").is_err());
        assert!(validate_box_name(" padded").is_err());
        assert!(validate_repo_name("line\nbreak").is_err());
        assert!(validate_repo_name(&"r".repeat(101)).is_err());
    }

    #[test]
    fn test_account_terms() {
        assert!(validate_account_terms(AccountType::Free, None).is_ok());
        assert!(validate_account_terms(AccountType::Paid, Some(6)).is_ok());
        assert!(validate_account_terms(AccountType::Paid, None).is_ok());
        assert!(validate_account_terms(AccountType::Paid, Some(2)).is_err());
        assert!(validate_account_terms(AccountType::Free, Some(1)).is_err());
    }

    #[test]
    fn test_file_names() {
        assert!(validate_file_name("IMG_0001.jpg").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("a/b.jpg").is_err());
        assert!(validate_file_name("a\\b.jpg").is_err());
    }
}
