use std::env;

use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TutorConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Read from GEMINI_API_KEY; never written back to disk with a value.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub api_key: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_key: String::new(),
        }
    }
}

impl TutorConfig {
    pub fn new() -> Self {
        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| default_api_url());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| default_model());
        let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();

        Self {
            api_url,
            model,
            api_key,
        }
    }
}
