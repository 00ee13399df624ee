pub mod rate_service;
pub use rate_service::{RateError, RateService};

pub mod rate_service_impl;
pub use rate_service_impl::JsonRateService;

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, IssuedOtp, UserInfo, UserSummary};

pub mod auth_service_impl;
pub use auth_service_impl::JsonAuthService;
