//! EnrollmentProvider port - Interface for course enrollment.

use async_trait::async_trait;

use crate::domain::foundation::CourseId;
use crate::domain::fulfillment::AdapterError;

/// Port for enrolling a learner into a course.
///
/// Enrollment must be idempotent on the provider side: repeating the call
/// for an already-enrolled learner is expected during retries and must
/// not fail.
#[async_trait]
pub trait EnrollmentProvider: Send + Sync {
    /// Enrolls the given email into the given course.
    async fn enroll(&self, course_id: &CourseId, email: &str) -> Result<(), AdapterError>;
}
