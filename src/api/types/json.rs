//! JSON extractor that reports malformed bodies in the envelope format

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::response::ResponseEnvelope;

/// Wrapper around `axum::Json` whose rejection is an [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::new(
                rejection.status(),
                ResponseEnvelope::error(rejection_message(&rejection)),
            )),
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => {
            format!("Invalid JSON syntax: {}", err.body_text())
        }
        JsonRejection::MissingJsonContentType(_) => {
            "Missing Content-Type header. Expected 'application/json'.".to_string()
        }
        JsonRejection::BytesRejection(err) => {
            format!("Failed to read request body: {}", err.body_text())
        }
        _ => "Invalid JSON request".to_string(),
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Login {
        login_id: String,
    }

    fn request(body: &str, content_type: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let req = request(r#"{"login_id":"alice"}"#, Some("application/json"));
        let Json(login) = Json::<Login>::from_request(req, &()).await.unwrap();
        assert_eq!(login.login_id, "alice");
    }

    #[tokio::test]
    async fn test_syntax_error_is_enveloped() {
        let req = request("{not json", Some("application/json"));
        let err = Json::<Login>::from_request(req, &()).await.unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.body.msg_desc.unwrap().starts_with("Invalid JSON syntax"));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = request(r#"{"login_id":"alice"}"#, None);
        let err = Json::<Login>::from_request(req, &()).await.unwrap_err();

        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_missing_field() {
        let req = request("{}", Some("application/json"));
        let err = Json::<Login>::from_request(req, &()).await.unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
