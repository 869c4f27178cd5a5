//! Request middleware, applied outermost first:
//! request id, IP rate limit, tenant resolution, authorization, user
//! rate limit.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod tenant;
