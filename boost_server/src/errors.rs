use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use boost_engine::{AccountError, BoosterError, CatalogError, OrderFlowError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Conflict. {0}")]
    Conflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

/// Database errors are logged here and reported to the client without detail.
fn backend_error(e: String) -> ServerError {
    error!("💻️ Database error: {e}");
    ServerError::BackendError("Database error".into())
}

impl From<CatalogError> for ServerError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => backend_error(s),
            CatalogError::GameNotFound(_) | CatalogError::RankNotFound(_) | CatalogError::ServiceTypeNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            CatalogError::SlugAlreadyExists(_) => Self::Conflict(e.to_string()),
            CatalogError::GameInactive(_) | CatalogError::RankGameMismatch { .. } | CatalogError::InvalidPagination(_) => {
                Self::InvalidRequest(e.to_string())
            },
        }
    }
}

impl From<BoosterError> for ServerError {
    fn from(e: BoosterError) -> Self {
        match e {
            BoosterError::DatabaseError(s) => backend_error(s),
            BoosterError::BoosterNotFound(_) => Self::NoRecordFound(e.to_string()),
            BoosterError::ProfileAlreadyExists { .. } | BoosterError::BoosterInUse(_) => Self::Conflict(e.to_string()),
            BoosterError::NotOwner(_) | BoosterError::AdminOnly(_) => Self::InsufficientPermissions(e.to_string()),
            BoosterError::InvalidProfile(_) | BoosterError::EmptyUpdate | BoosterError::InvalidPagination(_) => {
                Self::InvalidRequest(e.to_string())
            },
            BoosterError::Catalog(e) => e.into(),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::DatabaseError(s) => backend_error(s),
            OrderFlowError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::OrderNotPending(_) |
            OrderFlowError::ConcurrentModification(_) |
            OrderFlowError::CannotCancel { .. } |
            OrderFlowError::AlreadyReviewed(_) => Self::Conflict(e.to_string()),
            OrderFlowError::Forbidden(_) |
            OrderFlowError::NoBoosterProfile(_) |
            OrderFlowError::BoosterNotVerified(_) |
            OrderFlowError::SelfAcceptance => Self::InsufficientPermissions(e.to_string()),
            OrderFlowError::InvalidTransition { .. } |
            OrderFlowError::InvalidOrder(_) |
            OrderFlowError::InvalidReview(_) |
            OrderFlowError::InvalidPagination(_) => Self::InvalidRequest(e.to_string()),
            OrderFlowError::Catalog(e) => e.into(),
            OrderFlowError::Booster(e) => e.into(),
        }
    }
}

impl From<AccountError> for ServerError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::DatabaseError(s) => backend_error(s),
            AccountError::InvalidProfile(_) => Self::InvalidRequest(e.to_string()),
            AccountError::UsernameTaken(_) => Self::Conflict(e.to_string()),
        }
    }
}
