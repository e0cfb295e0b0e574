//! Bounded persistence calls
//!
//! The persistence collaborator is an opaque async call. Every call the core
//! makes goes through [`with_timeout`], which maps expiry to
//! `DomainError::Timeout`. There is no retry here; retry policy belongs to
//! the persistence client.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::shared::types::DomainError;

pub async fn with_timeout<T, F>(
    timeout: Duration,
    operation_name: &str,
    operation: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = operation_name,
                timeout_ms = timeout.as_millis() as u64,
                "Persistence call timed out"
            );
            Err(DomainError::Timeout(operation_name.to_string()))
        }
    }
}
