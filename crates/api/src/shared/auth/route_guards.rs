use crate::error::SchedulerError;
use actix_web::HttpRequest;
use reminder_scheduler_domain::ID;

pub const ORGANIZATION_HEADER: &str = "x-organization-id";
pub const USER_HEADER: &str = "x-user-id";

/// The identity of the client making the request. Every reminder query
/// is scoped to the `organization_id` of the `Caller`.
#[derive(Debug, Clone)]
pub struct Caller {
    pub organization_id: ID,
    pub user_id: ID,
}

fn parse_id_header(http_req: &HttpRequest, header: &str) -> Result<ID, SchedulerError> {
    let value = http_req
        .headers()
        .get(header)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| SchedulerError::Unauthorized(format!("Missing the `{}` header", header)))?;

    value.parse::<ID>().map_err(|_| {
        SchedulerError::Unauthorized(format!(
            "The `{}` header: {} is not a valid id",
            header, value
        ))
    })
}

/// Identifies the `Caller` from the request headers
pub fn protect_route(http_req: &HttpRequest) -> Result<Caller, SchedulerError> {
    Ok(Caller {
        organization_id: parse_id_header(http_req, ORGANIZATION_HEADER)?,
        user_id: parse_id_header(http_req, USER_HEADER)?,
    })
}
