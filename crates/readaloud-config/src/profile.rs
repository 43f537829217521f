use serde::Deserialize;

/// Reader profile used when the identity token does not provide one
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_age")]
    pub age: String,
    #[serde(default = "default_skill_rating")]
    pub skill_rating: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            age: default_age(),
            skill_rating: default_skill_rating(),
        }
    }
}

fn default_name() -> String {
    "Pete".to_string()
}

fn default_age() -> String {
    "20".to_string()
}

fn default_skill_rating() -> String {
    "4".to_string()
}
