use thiserror::Error;

use super::order::PaymentStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid payment status transition: {from} -> {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures of the transactional email collaborator. `NotConfigured` is a
/// soft condition: the triggering state change has already happened and must
/// not be rolled back because mail cannot go out.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Email sender is not configured: {0}")]
    NotConfigured(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    #[error("Email provider rejected the message: {0}")]
    Provider(String),
    #[error("Email transport failure: {0}")]
    Transport(String),
}
