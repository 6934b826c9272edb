use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub post_id: i64,
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommentForm {
    pub name: String,
    pub text: String,
}

impl CommentForm {
    pub fn new(name: &str, text: &str) -> Self {
        CommentForm {
            name: name.trim().to_string(),
            text: text.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.text.trim().is_empty() {
            return Err("Please fill in all fields".to_string());
        }
        Ok(())
    }
}
