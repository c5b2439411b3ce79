//! HTTP handlers, grouped by resource.
//!
//! Handlers are thin: they parse ids, call the engine and convert the result
//! into a JSON body. Callers identify themselves with explicit member ids.

use crate::error::ApiError;
use crate::extract::Json;

pub mod deeds;
pub mod groups;
pub mod health;
pub mod rounds;
pub mod templates;
pub mod users;

pub type ApiResult<T> = Result<Json<T>, ApiError>;
