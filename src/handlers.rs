pub mod organisations;
pub mod prospects;
pub mod users;

use uuid::Uuid;

use crate::common::error::AppError;

// Path identifiers are parsed by hand so a malformed one gets the JSON error body.
pub(crate) fn parse_uid(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid uid '{raw}'")))
}
