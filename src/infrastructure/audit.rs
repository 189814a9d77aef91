//! Audit trail for administrative operations
//!
//! Events are emitted as structured `tracing` records under the `audit`
//! target and counted in `admin_operations_total`.

use std::future::Future;

use tracing::{info, warn};

use crate::domain::{Actor, AuditEvent, DomainError, Group, User};
use crate::infrastructure::observability::record_admin_operation;

/// Record a successful operation
pub fn record(event: AuditEvent, actor: &Actor, object_id: u64) {
    info!(
        target: "audit",
        event = event.as_str(),
        actor = actor.login_id(),
        actor_id = actor.audit_id(),
        object_id,
        "Administrative operation completed"
    );
    record_admin_operation(event.as_str(), "success");
}

/// Record a failed operation and hand the error back
pub fn record_failure(event: AuditEvent, actor: &Actor, error: DomainError) -> DomainError {
    warn!(
        target: "audit",
        event = event.as_str(),
        actor = actor.login_id(),
        actor_id = actor.audit_id(),
        object_id = error.object_id(),
        code = error.code().name(),
        "Administrative operation failed"
    );
    record_admin_operation(event.as_str(), error.code().name());
    error
}

/// Records whose id is written to the audit trail
pub trait AuditSubject {
    fn audit_object_id(&self) -> u64;
}

impl AuditSubject for User {
    fn audit_object_id(&self) -> u64 {
        self.id().value()
    }
}

impl AuditSubject for Group {
    fn audit_object_id(&self) -> u64 {
        self.id().value()
    }
}

/// Await a mutation and audit its outcome
pub async fn audited<T, F>(event: AuditEvent, actor: &Actor, fut: F) -> Result<T, DomainError>
where
    T: AuditSubject,
    F: Future<Output = Result<T, DomainError>>,
{
    match fut.await {
        Ok(subject) => {
            record(event, actor, subject.audit_object_id());
            Ok(subject)
        }
        Err(e) => Err(record_failure(event, actor, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_failure_returns_error() {
        let err = record_failure(
            AuditEvent::DeactivateUser,
            &Actor::system(),
            DomainError::not_found("User '42' not found").with_object_id(42),
        );

        assert_eq!(err.object_id(), Some(42));
    }

    #[tokio::test]
    async fn test_audited_passes_result_through() {
        use crate::domain::{UserId, UserStatus};

        let actor = Actor::system();
        let user = User::new(UserId::new(5), "eve", "eve@example.com", "Eve", "h", None);

        let ok = audited(AuditEvent::CreateUser, &actor, async { Ok(user) }).await;
        assert_eq!(ok.unwrap().status(), UserStatus::Unapproved);

        let err: Result<User, _> = audited(AuditEvent::UpdateUser, &actor, async {
            Err(DomainError::conflict("stale"))
        })
        .await;
        assert!(matches!(err, Err(DomainError::Conflict { .. })));
    }
}
