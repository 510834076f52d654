pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, IpRateLimiter};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use security_headers::security_headers_middleware;
