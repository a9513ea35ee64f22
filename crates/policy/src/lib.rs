//! Checks on the embedded documents found inside resource attributes:
//! IAM policy JSON and API Gateway access log formats.

pub mod iam;
pub mod log_format;

pub use iam::{OneOrMany, PolicyDocument, Principal, Statement};
pub use log_format::is_json_log_format;
