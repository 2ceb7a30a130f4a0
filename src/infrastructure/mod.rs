pub mod models;
pub mod order_repo;
pub mod resend_mailer;
pub mod status_cache;
