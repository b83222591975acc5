pub mod http;
pub mod retry;
pub mod traits;

// Re-export commonly used types
pub use http::{ApiError, HttpCourseBackend};
pub use retry::RetryPolicy;
pub use traits::{CourseBackend, CredentialProvider, StaticCredentials};
