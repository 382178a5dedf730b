/// Unified error type for the pagination core.
///
/// Token decode variants are recoverable: a controller that receives an
/// unreadable token falls back to default state. Everything else surfaces
/// to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A condition was built with a field but no values.
    #[error("a condition needs at least one value")]
    EmptyCondition,

    /// A pager was constructed without a table identity.
    #[error("a pager needs a table identity")]
    MissingIdentity,

    /// The requested sort field is not in the permission list.
    #[error("sorting not allowed for field {0}")]
    SortNotPermitted(String),

    #[error("invalid state token: invalid base64url encoding")]
    TokenInvalidBase64,

    #[error("invalid state token: malformed JSON")]
    TokenInvalidJson,

    #[error("invalid state token: unsupported version")]
    TokenInvalidVersion,

    #[error("invalid state token: page must be positive")]
    TokenInvalidPage,

    /// The token decoded fine but was issued for another pager.
    #[error("state token was issued for {found}, expected {expected}")]
    TokenIdentityMismatch { expected: String, found: String },

    /// Failure from the delegated data source, propagated unchanged.
    #[error("data source error: {0}")]
    Source(#[from] anyhow::Error),
}
