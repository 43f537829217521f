use serde::{Deserialize, Serialize};

/// Lightweight reader signals passed to the paragraph generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub age: String,
    pub skill_rating: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, age: impl Into<String>, skill_rating: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            skill_rating: skill_rating.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let profile = UserProfile::new("Jack", "4", "4");
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["skillRating"], "4");
        assert_eq!(json["name"], "Jack");
    }
}
