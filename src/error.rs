use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::{serde_json, Json},
    Request,
};
use thiserror::Error;

use crate::logging::RequestId;
use crate::model::api::ErrorBody;
use crate::Config;

pub type Result<T> = std::result::Result<T, Error>;

/// What a caller lacks when they are refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// At least one trusted badge category.
    Trust,
    /// A badge with the given id.
    Badge(&'static str),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Forbidden {
        message: String,
        requirement: Requirement,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("You have already voted on this")]
    AlreadyVoted { existing_option: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// E.g. `Error::not_found("Election", id)` gives "Election not found: <id>".
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{kind} not found: {id}"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::BadRequest(_) | Self::AlreadyVoted { .. } => Status::BadRequest,
            Self::Forbidden { .. } => Status::Forbidden,
            Self::NotFound(_) => Status::NotFound,
            Self::Io(_) | Self::Json(_) => Status::InternalServerError,
        }
    }

    /// Convert into the wire body, hiding internal detail unless allowed.
    pub fn into_body(self, expose_internal: bool) -> ErrorBody {
        let internal = self.status() == Status::InternalServerError;
        let message = if internal && !expose_internal {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let mut body = ErrorBody::new(message);
        match self {
            Self::AlreadyVoted { existing_option } => body.existing_vote = Some(existing_option),
            Self::Forbidden {
                requirement: Requirement::Trust,
                ..
            } => body.required_trust = Some(true),
            Self::Forbidden {
                requirement: Requirement::Badge(badge),
                ..
            } => body.required_badge = Some(badge.to_string()),
            _ => {}
        }
        body
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let id = RequestId::of(req);
        if status == Status::InternalServerError {
            error!("  rsp{id} failed: {self:?}");
        } else {
            warn!("  rsp{id} refused: {self}");
        }
        let expose = req
            .rocket()
            .state::<Config>()
            .map(Config::expose_internal_errors)
            .unwrap_or(false);
        (status, Json(self.into_body(expose))).respond_to(req)
    }
}
