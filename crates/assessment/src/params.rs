use base64::Engine;
use serde::Serialize;

/// Pronunciation assessment settings sent with every scoring request
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssessmentParameters<'a> {
    pub reference_text: &'a str,
    pub grading_system: &'static str,
    pub dimension: &'static str,
    pub enable_miscue: &'static str,
}

impl<'a> AssessmentParameters<'a> {
    pub const fn new(reference_text: &'a str) -> Self {
        Self {
            reference_text,
            grading_system: "HundredMark",
            dimension: "Comprehensive",
            enable_miscue: "True",
        }
    }

    /// Base64-encoded JSON, the form expected in the `Pronunciation-Assessment` header
    pub fn to_header_value(&self) -> serde_json::Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(json))
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use serde_json::Value;

    use super::*;

    fn decode(header: &str) -> Value {
        let raw = base64::engine::general_purpose::STANDARD.decode(header).unwrap();
        serde_json::from_slice(&raw).unwrap()
    }

    #[test]
    fn header_decodes_to_fixed_parameters() {
        let header = AssessmentParameters::new("the quick brown fox").to_header_value().unwrap();
        let json = decode(&header);

        assert_eq!(json["ReferenceText"], "the quick brown fox");
        assert_eq!(json["GradingSystem"], "HundredMark");
        assert_eq!(json["Dimension"], "Comprehensive");
        assert_eq!(json["EnableMiscue"], "True");
    }

    #[test]
    fn reference_text_with_quotes_stays_valid_json() {
        let header = AssessmentParameters::new(r#"She said "hi" \ left"#).to_header_value().unwrap();

        assert_eq!(decode(&header)["ReferenceText"], r#"She said "hi" \ left"#);
    }
}
