use jwt_compact::UntrustedToken;
use readaloud_core::UserProfile;
use serde_json::{Map, Value};

use crate::error::IdentityError;

/// Read the claims of an identity token
///
/// The token was received directly from the provider's token endpoint over TLS, so its signature
/// is not verified here.
pub fn decode(id_token: &str) -> Result<Value, IdentityError> {
    let token = UntrustedToken::new(id_token).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

    let claims = token
        .deserialize_claims_unchecked::<Map<String, Value>>()
        .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

    serde_json::to_value(&claims).map_err(|e| IdentityError::InvalidToken(e.to_string()))
}

/// Build the reader profile from identity claims, filling gaps from `fallback`
pub fn profile(claims: &Value, fallback: &UserProfile) -> UserProfile {
    let name = claim(claims, "name")
        .or_else(|| claim(claims, "nickname"))
        .unwrap_or_else(|| fallback.name.clone());

    UserProfile {
        name,
        age: claim(claims, "age").unwrap_or_else(|| fallback.age.clone()),
        skill_rating: claim(claims, "skill_rating").unwrap_or_else(|| fallback.skill_rating.clone()),
    }
}

fn claim(claims: &Value, key: &str) -> Option<String> {
    match claims.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
