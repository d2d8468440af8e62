mod route_guards;

pub use route_guards::{protect_route, Caller, ORGANIZATION_HEADER, USER_HEADER};
