//! Security headers and request screening

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::types::{ApiError, ResponseEnvelope};

/// Reject suspicious paths, then add security headers to the response
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    if let Err(e) = validate_request_path(request.uri().path()) {
        return e.into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    // Directory records must never be cached
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        );
    }

    response
}

/// Screen a request path for traversal and injection attempts
pub fn validate_request_path(path: &str) -> Result<(), ApiError> {
    if path.contains("..") || path.contains("//") {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            ResponseEnvelope::error("Invalid path: path traversal detected"),
        ));
    }

    if path.contains('\0') {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            ResponseEnvelope::error("Invalid request: prohibited characters"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn test_validate_request_path_ok() {
        assert!(validate_request_path("/users/42").is_ok());
        assert!(validate_request_path("/groups").is_ok());
    }

    #[test]
    fn test_validate_request_path_traversal() {
        assert!(validate_request_path("/users/../auth/login").is_err());
        assert!(validate_request_path("/users//42").is_err());
        assert!(validate_request_path("/users/42\0").is_err());
    }

    #[tokio::test]
    async fn test_headers_added() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(security_headers_middleware));

        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(
            headers[header::CACHE_CONTROL],
            "no-store, no-cache, must-revalidate"
        );
    }
}
