/// Baseline rate table seeded into empty storage, in canonical display order.
/// Material rates are per-kg prices, the rest are percentages or flat charges.
pub const DEFAULT_RATES: &[(&str, f64)] = &[
    ("ldpe", 105.0),
    ("hdpe", 112.0),
    ("pp", 118.0),
    ("natural", 0.0),
    ("transparent", 0.0),
    ("white", 6.0),
    ("black", 5.0),
    ("blue", 7.0),
    ("green", 7.0),
    ("red", 8.0),
    ("yellow", 8.0),
    ("printing_single", 4.0),
    ("printing_double", 7.0),
    ("transport", 3.0),
    ("gst", 18.0),
    ("profit", 10.0),
];

pub mod users {

    pub const PROTECTED_USER_IDS: &[&str] = &["admin", "employee"];

    pub const BOOTSTRAP_ADMIN_ID: &str = "admin";

    pub const BOOTSTRAP_ADMIN_NAME: &str = "Administrator";

    /// Initial password for the seeded admin account, stored hashed.
    pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin";

    pub const DEFAULT_EMPLOYEE_ID: &str = "employee";

    pub const DEFAULT_EMPLOYEE_NAME: &str = "Employee";
}

pub mod otp {

    /// Codes older than this are rejected even when they match.
    pub const TTL_MS: i64 = 5 * 60 * 1000;

    pub const CODE_MIN: u32 = 100_000;

    pub const CODE_MAX: u32 = 999_999;
}

pub mod limits {

    /// Oldest history entries are dropped beyond this count.
    pub const HISTORY_CAP: usize = 50;

    pub const DEFAULT_HISTORY_LIMIT: usize = 5;
}
