use thiserror::Error;

/// Why a single HTTP exchange failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum RequestFailure {
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("request failed ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RequestFailure {
    pub(crate) fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }

    pub(crate) fn decode(e: impl std::fmt::Display) -> Self {
        Self::Decode(e.to_string())
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        if status == 401 {
            Self::Unauthorized
        } else {
            Self::Status { status, body }
        }
    }
}

/// Failures of the four users-resource operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ApiError {
    #[error("login failed: {0}")]
    Auth(#[source] RequestFailure),
    #[error("listing users failed: {0}")]
    Fetch(#[source] RequestFailure),
    #[error("updating user failed: {0}")]
    Update(#[source] RequestFailure),
    #[error("deleting user failed: {0}")]
    Delete(#[source] RequestFailure),
}

impl ApiError {
    /// Flat banner text. Transport detail is logged, never shown.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Auth(_) => "Invalid email or password",
            Self::Fetch(_) => "Failed to fetch users",
            Self::Update(_) => "Failed to update user",
            Self::Delete(_) => "Failed to delete user",
        }
    }

    pub fn failure(&self) -> &RequestFailure {
        match self {
            Self::Auth(f) | Self::Fetch(f) | Self::Update(f) | Self::Delete(f) => f,
        }
    }

    /// A 401 on a protected call means the stored token is no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        !matches!(self, Self::Auth(_)) && *self.failure() == RequestFailure::Unauthorized
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;
