/// Outbound services
///
/// - `email`: Password reset mail over SMTP, or to the log
/// - `storage`: Image uploads to Supabase Storage

pub mod email;
pub mod storage;
