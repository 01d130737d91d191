//! Unit tests for the error taxonomy and its HTTP mapping.

use axum::http::StatusCode;

use nutriscan_dashboard::http::error::ApiError;
use nutriscan_dashboard::AppError;

#[test]
fn display_prefixes_each_domain() {
    assert_eq!(AppError::Config("x".into()).to_string(), "config: x");
    assert_eq!(AppError::Store("x".into()).to_string(), "store: x");
    assert_eq!(AppError::Template("x".into()).to_string(), "template: x");
    assert_eq!(AppError::External("x".into()).to_string(), "external: x");
    assert_eq!(AppError::NotFound("x".into()).to_string(), "not found: x");
    assert_eq!(
        AppError::ArtifactMissing("x".into()).to_string(),
        "artifact missing: x"
    );
    assert_eq!(AppError::Io("x".into()).to_string(), "io: x");
}

#[test]
fn toml_errors_convert_to_config() {
    let err = toml::from_str::<toml::Value>("not = = toml").unwrap_err();
    let app: AppError = err.into();
    assert!(matches!(app, AppError::Config(_)));
}

#[test]
fn io_errors_convert_to_io() {
    let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let app: AppError = err.into();
    assert!(matches!(app, AppError::Io(_)));
}

#[test]
fn not_found_maps_to_404() {
    let err = ApiError(AppError::NotFound("session".into()));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.code(), "not_found");
}

#[test]
fn artifact_missing_maps_to_404() {
    let err = ApiError(AppError::ArtifactMissing("notebook".into()));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.code(), "artifact_missing");
}

#[test]
fn external_maps_to_502() {
    let err = ApiError(AppError::External("timeout".into()));
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(err.code(), "external_call_failure");
}

#[test]
fn store_and_template_map_to_500() {
    assert_eq!(
        ApiError(AppError::Store("corrupt".into())).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        ApiError(AppError::Store("corrupt".into())).code(),
        "store_unavailable"
    );
    assert_eq!(
        ApiError(AppError::Template("bad".into())).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        ApiError(AppError::Template("bad".into())).code(),
        "template_render_error"
    );
}
