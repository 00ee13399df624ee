//! User account command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_users(config: &Config) -> anyhow::Result<()> {
    let store = Store::open(&config.general.data_dir);
    let users = store.load_users(&config.security).await?;

    println!("User Accounts ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        println!("• {} ({})", user.name, user.id);
        match user.kind.active_otp() {
            Some((_, created_at)) => println!(
                "  Role: {} | OTP issued {}",
                user.role(),
                created_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!("  Role: {}", user.role()),
        }
    }

    Ok(())
}
