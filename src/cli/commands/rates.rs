//! Rate table command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_rates(config: &Config) -> anyhow::Result<()> {
    let store = Store::open(&config.general.data_dir);
    let rates = store.current_rates().await;

    println!("Current Rates ({} total)", rates.len());
    println!("{:-<70}", "");

    for rate in rates {
        println!("{:>4}  {:<24} {:>10.2}", rate.id, rate.key, rate.value);
    }

    println!();
    println!("Update rates through the web API: PUT /api/rates");

    Ok(())
}
