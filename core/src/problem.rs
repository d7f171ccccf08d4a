//! The structured error body ("Problem") returned by the backend.

use serde_json::Value;

/// A structured error body returned by the backend.
///
/// The backend describes request failures with a JSON object carrying
/// a dotted-decimal machine code (for example `401.2` or `404.1`) and
/// a human-readable message. Any error body that does not match this
/// shape is not a Problem and is handled through the generic failure
/// path.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Machine-readable problem code, for example `404.1`.
    pub code: f64,
    /// Default human-readable message.
    pub message: String,
}

impl Problem {
    /// Recognize a response body as a Problem.
    ///
    /// Returns `Some` iff the body is a JSON object with a numeric
    /// `code` and a string `message`.
    #[must_use]
    pub fn from_value(body: &Value) -> Option<Problem> {
        let object = body.as_object()?;
        let code = object.get("code")?.as_f64()?;
        let message = object.get("message")?.as_str()?;
        Some(Problem { code, message: message.to_string() })
    }

    /// Whether this Problem carries the given dotted-decimal code.
    ///
    /// Codes are compared with a tolerance well below the backend's
    /// two-decimal code granularity, since they travel as JSON
    /// numbers.
    #[must_use]
    pub fn is_code(&self, code: f64) -> bool {
        (self.code - code).abs() < 0.001
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_a_problem_body() {
        let body = json!({ "code": 404.1, "message": "Not found." });
        let problem = Problem::from_value(&body).unwrap();
        assert!(problem.is_code(404.1));
        assert_eq!(problem.message, "Not found.");
    }

    #[test]
    fn rejects_bodies_without_the_problem_shape() {
        assert_eq!(Problem::from_value(&json!(null)), None);
        assert_eq!(Problem::from_value(&json!("oops")), None);
        assert_eq!(Problem::from_value(&json!({ "message": "no code" })), None);
        assert_eq!(
            Problem::from_value(&json!({ "code": "404.1", "message": "stringly" })),
            None
        );
        assert_eq!(Problem::from_value(&json!({ "code": 500.1 })), None);
    }

    #[test]
    fn code_comparison_tolerates_float_noise() {
        let problem = Problem { code: 401.2, message: String::new() };
        assert!(problem.is_code(401.2));
        assert!(!problem.is_code(401.3));
    }
}
