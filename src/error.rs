use actix_web::{body, http::StatusCode, HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error")]
    Database(#[source] DbErr),
}

impl LedgerError {
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::InvalidState(_) => "INVALID_STATE",
            LedgerError::Conflict(_) => "CONFLICT",
            LedgerError::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Unique violations become `Conflict`, foreign key violations `InvalidState`
impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                LedgerError::Conflict(format!("record already exists ({detail})"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                LedgerError::InvalidState(format!("record is still referenced ({detail})"))
            }
            _ => LedgerError::Database(err),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: &'a str,
    message: String,
}

impl ResponseError for LedgerError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        if let LedgerError::Database(err) = self {
            error!("database failure: {err}");
        }

        HttpResponse::build(self.status_code())
            .json(ErrorBody {
                success: false,
                code: self.code(),
                message: self.to_string(),
            })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Validation(_) | LedgerError::InvalidState(_) => StatusCode::BAD_REQUEST,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::MessageBody as _;

    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(LedgerError::NotFound("".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(LedgerError::Validation("".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(LedgerError::InvalidState("".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(LedgerError::Conflict("".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            LedgerError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_carries_code() {
        let response = LedgerError::InvalidState("payslip is paid".into()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().try_into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_STATE");
        assert_eq!(json["message"], "payslip is paid");
    }

    #[test]
    fn test_plain_db_error_is_not_a_conflict() {
        let err: LedgerError = DbErr::Custom("connection reset".into()).into();
        assert!(matches!(err, LedgerError::Database(_)));
    }
}
