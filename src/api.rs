//! JSON request handler for code issuance.
//!
//! Framework-agnostic: takes the parsed query parameters and returns a
//! status code plus JSON body, ready for whatever HTTP layer hosts it.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::CodeError;
use crate::generator::CodeGenerator;

/// Status and body of a handled request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

/// Handles `GET ...?category=<id>`.
///
/// When the family has a fixed prefix (tickets) and no `category` is given,
/// `default_category` is used instead. Success is `200 {"code": ...}`;
/// failures carry a generic message and the error kind, never a code.
#[must_use]
pub fn next_code(
    generator: &CodeGenerator<'_>,
    query: &HashMap<String, String>,
    default_category: Option<&str>,
) -> ApiResponse {
    let category = query.get("category").map(String::as_str).or(default_category).unwrap_or("");
    match generator.next_code(category) {
        Ok(issued) => ApiResponse { status: 200, body: json!({ "code": issued.code }) },
        Err(err) => error_response(&err),
    }
}

/// Maps a [`CodeError`] to its HTTP status and error body.
#[must_use]
pub fn error_response(err: &CodeError) -> ApiResponse {
    let (status, message) = match err {
        CodeError::Validation(detail) => (400, format!("invalid request: {detail}")),
        CodeError::ConflictExhausted { .. } => (409, "code generation is busy, try again".into()),
        CodeError::Persistence(_) => (500, "failed to generate code".into()),
    };
    ApiResponse { status, body: json!({ "error": message, "kind": err.kind() }) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::FixedClock;
    use crate::code::{CodeFamily, TICKET_CATEGORY};
    use crate::context::ServiceContext;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ServiceContext {
        let now = Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap();
        ServiceContext::in_memory(Box::new(FixedClock::new(now)))
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn returns_code_json() {
        let ctx = ctx();
        let gen = CodeGenerator::new(&ctx, CodeFamily::assets(4));

        let resp = next_code(&gen, &query(&[("category", "LAPTOP")]), None);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, json!({ "code": "LAPTOP-2501-0001" }));
    }

    #[test]
    fn missing_category_is_bad_request() {
        let ctx = ctx();
        let gen = CodeGenerator::new(&ctx, CodeFamily::assets(4));

        let resp = next_code(&gen, &query(&[]), None);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["kind"], "validation");
        assert!(resp.body.get("code").is_none());
    }

    #[test]
    fn tickets_fall_back_to_fixed_category() {
        let ctx = ctx();
        let gen = CodeGenerator::new(&ctx, CodeFamily::tickets("TKT", 4));

        let resp = next_code(&gen, &query(&[]), Some(TICKET_CATEGORY));
        assert_eq!(resp.body, json!({ "code": "TKT-2501-0001" }));
    }

    #[test]
    fn error_statuses() {
        let conflict = CodeError::ConflictExhausted {
            category: "A".into(),
            period: "2501".into(),
            attempts: 5,
        };
        assert_eq!(error_response(&conflict).status, 409);
        let failed = error_response(&CodeError::Persistence("disk full".into()));
        assert_eq!(failed.status, 500);
        assert_eq!(failed.body["error"], "failed to generate code");
    }
}
