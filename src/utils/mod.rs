pub mod errors;

pub use errors::{AuthError, EngineError, ErrorCode, ErrorReport, LoadTarget};
