mod history;
mod rates;
mod users;

pub use history::cmd_history;
pub use rates::cmd_rates;
pub use users::cmd_users;
