//! Status code classification and callback dispatch.
//!
//! # Design
//! Classification is a pure lookup keyed on the status code alone. Only 200
//! counts as success; 201, 204 and every other code outside the table
//! become `UNKNOWN_ERROR`.

use crate::handler::ResponseHandler;
use crate::types::ResultMessage;

/// The statuses the client distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    BadRequest,
    Unauthorized,
    NotFound,
    InternalError,
    Unavailable,
    GatewayTimeout,
    Unknown(u16),
}

impl StatusClass {
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => StatusClass::Ok,
            400 => StatusClass::BadRequest,
            401 => StatusClass::Unauthorized,
            404 => StatusClass::NotFound,
            500 => StatusClass::InternalError,
            503 => StatusClass::Unavailable,
            504 => StatusClass::GatewayTimeout,
            other => StatusClass::Unknown(other),
        }
    }

    /// `title` of the error message; `None` for success.
    pub fn title(&self) -> Option<&'static str> {
        match self {
            StatusClass::Ok => None,
            StatusClass::BadRequest => Some("HTTP_BAD_REQUEST"),
            StatusClass::Unauthorized => Some("HTTP_UNAUTHORIZED"),
            StatusClass::NotFound => Some("HTTP_NOT_FOUND"),
            StatusClass::InternalError => Some("HTTP_INTERNAL_ERROR"),
            StatusClass::Unavailable => Some("HTTP_UNAVAILABLE"),
            StatusClass::GatewayTimeout => Some("HTTP_GATEWAY_TIMEOUT"),
            StatusClass::Unknown(_) => Some("UNKNOWN_ERROR"),
        }
    }

    /// Fire the hook registered for this class, if any.
    pub fn notify(&self, handler: &dyn ResponseHandler) {
        match self {
            StatusClass::BadRequest => handler.on_bad_request(),
            StatusClass::Unauthorized => handler.on_unauthorized(),
            StatusClass::NotFound => handler.on_not_found(),
            StatusClass::InternalError => handler.on_internal_error(),
            StatusClass::Unavailable => handler.on_unavailable(),
            StatusClass::GatewayTimeout => handler.on_gateway_timeout(),
            StatusClass::Ok | StatusClass::Unknown(_) => {}
        }
    }
}

/// Classify a status. Returns `None` for 200, otherwise notifies `handler`
/// and returns the error message carrying `reason`.
pub fn classify(
    code: u16,
    reason: &str,
    handler: Option<&dyn ResponseHandler>,
) -> Option<ResultMessage> {
    let class = StatusClass::from_code(code);
    let title = class.title()?;
    if let Some(handler) = handler {
        class.notify(handler);
    }
    Some(ResultMessage::error(title, reason))
}
