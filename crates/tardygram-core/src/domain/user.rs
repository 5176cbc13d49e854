use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - a registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A user that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

impl User {
    /// Public handle shown next to the user's posts.
    pub fn username(&self) -> &str {
        &self.email
    }
}

/// Mask an email address for logging, keeping the first character and the domain.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if local.chars().count() > 1 => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        Some((_, domain)) => format!("***@{domain}"),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ben@ben.com"), "b***@ben.com");
        assert_eq!(mask_email("b@ben.com"), "***@ben.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
