use std::env;

/// Startup seeding configuration
///
/// The seed runs once against an empty transactions collection and also
/// provisions the three default dashboard accounts when they are absent.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Path to the JSON file with seed transactions
    pub data_path: String,
    pub admin_email: String,
    pub admin_password: String,
    pub analyst_email: String,
    pub analyst_password: String,
    pub viewer_email: String,
    pub viewer_password: String,
}

impl SeedConfig {
    pub fn from_env() -> Self {
        SeedConfig {
            data_path: env::var("SEED_DATA_PATH").unwrap_or_else(|_| "transactions.json".to_string()),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@financial.com".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
            analyst_email: env::var("ANALYST_EMAIL")
                .unwrap_or_else(|_| "analyst@financial.com".to_string()),
            analyst_password: env::var("ANALYST_PASSWORD").unwrap_or_else(|_| "analyst123".to_string()),
            viewer_email: env::var("VIEWER_EMAIL")
                .unwrap_or_else(|_| "viewer@financial.com".to_string()),
            viewer_password: env::var("VIEWER_PASSWORD").unwrap_or_else(|_| "viewer123".to_string()),
        }
    }
}
