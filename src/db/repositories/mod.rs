pub mod rates;
pub mod users;
