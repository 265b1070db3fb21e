//! Tests for db::repository::error.

use gym_lottery::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

#[test]
fn test_error_context_chaining() {
    let ctx = ErrorContext::new("insert_registration")
        .with_entity("registration")
        .with_entity_id("S100")
        .with_details("draw_time=1742180400")
        .retryable();

    assert_eq!(ctx.operation.as_deref(), Some("insert_registration"));
    assert_eq!(ctx.entity.as_deref(), Some("registration"));
    assert_eq!(ctx.entity_id.as_deref(), Some("S100"));
    assert_eq!(ctx.details.as_deref(), Some("draw_time=1742180400"));
    assert!(ctx.retryable);
}

#[test]
fn test_error_context_default_is_empty() {
    let ctx = ErrorContext::default();
    assert!(ctx.operation.is_none());
    assert!(ctx.entity.is_none());
    assert!(ctx.entity_id.is_none());
    assert!(ctx.details.is_none());
    assert!(!ctx.retryable);
    assert_eq!(ctx.to_string(), "[]");
}

#[test]
fn test_error_context_display() {
    let display = ErrorContext::new("execute_draw")
        .with_entity("draw_window")
        .with_entity_id(1_742_180_400)
        .retryable()
        .to_string();

    assert!(display.contains("operation=execute_draw"));
    assert!(display.contains("entity=draw_window"));
    assert!(display.contains("id=1742180400"));
    assert!(display.contains("retryable=true"));
}

#[test]
fn test_error_messages_name_their_kind() {
    let cases = [
        (
            RepositoryError::connection_with_context("pool exhausted", ErrorContext::new("checkout")),
            "Connection error",
        ),
        (RepositoryError::query("bad column"), "Query error"),
        (RepositoryError::not_found("no such result"), "Not found"),
        (
            RepositoryError::conflict_with_context("already registered", ErrorContext::default()),
            "Conflict",
        ),
        (RepositoryError::configuration("missing url"), "Configuration error"),
        (RepositoryError::internal("bad position"), "Internal error"),
        (RepositoryError::transaction("rolled back"), "Transaction error"),
    ];

    for (err, kind) in cases {
        assert!(err.to_string().contains(kind), "{} lacks {}", err, kind);
    }
}

#[test]
fn test_retryable_kinds() {
    assert!(RepositoryError::connection_with_context("temp failure", ErrorContext::default())
        .is_retryable());
    assert!(!RepositoryError::not_found("missing").is_retryable());
    assert!(!RepositoryError::conflict_with_context("dup", ErrorContext::default()).is_retryable());
    assert!(!RepositoryError::query("plain query failure").is_retryable());
    let serialization = RepositoryError::QueryError {
        message: "serialization failure".to_string(),
        context: ErrorContext::new("execute_draw").retryable(),
    };
    assert!(serialization.is_retryable());
}

#[test]
fn test_conflict_detection() {
    let err = RepositoryError::conflict_with_context(
        "duplicate key",
        ErrorContext::new("insert_registration").with_details("constraint=registrations_student_window_key"),
    );
    assert!(err.is_conflict());
    assert!(!RepositoryError::internal("x").is_conflict());
    assert_eq!(
        err.context().details.as_deref(),
        Some("constraint=registrations_student_window_key")
    );
}

#[test]
fn test_with_operation_overrides_context() {
    let err = RepositoryError::connection_with_context("refused", ErrorContext::new("pool"))
        .with_operation("perform_weekly_draw");
    assert_eq!(err.context().operation.as_deref(), Some("perform_weekly_draw"));
    assert!(err.is_retryable());
    assert!(err.to_string().contains("operation=perform_weekly_draw"));
}

#[test]
fn test_repository_result_alias() {
    let ok: RepositoryResult<u64> = Ok(3);
    assert_eq!(ok.unwrap(), 3);
    let err: RepositoryResult<u64> = Err(RepositoryError::not_found("gone"));
    assert!(matches!(err, Err(RepositoryError::NotFound { .. })));
}
