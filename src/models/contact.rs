use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(name: &str, email: &str, subject: &str, message: &str) -> Self {
        ContactForm {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            subject: subject.trim().to_string(),
            message: message.trim().to_string(),
        }
    }

    /// Required fields first, then the email format.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [&self.name, &self.email, &self.subject, &self.message];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err("Please fill in all fields".to_string());
        }
        if !is_valid_email(&self.email) {
            return Err("Please enter a valid email address".to_string());
        }
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}
