use studylife_types::error::RepositoryError;
use studylife_types::profile::ProfileFields;

/// Trait for per-user profile document persistence.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in studylife-infra.
pub trait ProfileStore: Send + Sync {
    /// Merge the present fields of `fields` into the user's document,
    /// creating it if needed. Absent fields are left untouched.
    fn save(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Load the user's document. Returns `None` if no document exists.
    fn load(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ProfileFields>, RepositoryError>> + Send;
}
