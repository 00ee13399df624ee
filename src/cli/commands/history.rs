use crate::config::Config;
use crate::db::Store;

pub async fn cmd_history(config: &Config, limit: usize) -> anyhow::Result<()> {
    let store = Store::open(&config.general.data_dir);
    let history = store.rate_history().await;

    if history.is_empty() {
        println!("No rate changes recorded.");
        return Ok(());
    }

    let shown = history.len().min(limit);
    println!("Rate Changes (last {shown}):");
    println!("{:-<70}", "");

    for entry in history.iter().take(limit) {
        println!(
            "• #{} by {} ({})",
            entry.id, entry.changed_by_name, entry.changed_by_id
        );
        println!(
            "  {} | snapshot of {} rates before the change",
            entry.changed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.rates_snapshot.len()
        );
    }

    Ok(())
}
