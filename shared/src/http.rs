//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::Serialize;

/// Create a JSON response with the given status code and body.
pub fn json_response<T: Serialize>(
    status: u16,
    body: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body)?))?)
}

/// Create a JSON response carrying the permissive CORS headers expected by
/// the browser-facing submission endpoint.
///
/// Only the submission handler attaches these; the subscription handler
/// responds through [`json_response`].
pub fn cors_response<T: Serialize>(
    status: u16,
    body: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "OPTIONS, POST")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::from(serde_json::to_string(body)?))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageResponse;

    #[test]
    fn test_json_response_has_no_cors_headers() {
        let response = json_response(200, &MessageResponse::new("ok")).unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.headers().get("Access-Control-Allow-Origin").is_none());
    }

    #[test]
    fn test_cors_response_headers() {
        let response = cors_response(500, &MessageResponse::new("nope")).unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert_eq!(
            response.headers().get("Access-Control-Allow-Methods").unwrap(),
            "OPTIONS, POST"
        );
        assert_eq!(
            response.headers().get("Access-Control-Allow-Headers").unwrap(),
            "Content-Type"
        );
    }
}
