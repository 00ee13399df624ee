pub mod rate;
pub use rate::{Rate, RateHistoryEntry, RateInput};

pub mod user;
pub use user::{Role, UserKind, UserRecord};
