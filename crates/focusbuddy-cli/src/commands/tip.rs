use focusbuddy_core::{Config, TipProvider};

use super::{entitlement_gate, CliResult};

/// Premium subscribers get generated tips, everyone else the built-in list.
pub async fn run(count: usize) -> CliResult {
    let config = Config::load_or_default();
    let provider = TipProvider::from_config(&config.tips)?;
    let premium = entitlement_gate()?.has_premium_access();

    let tips = if premium {
        provider.get_multiple_tips(count).await
    } else {
        let mut tips = Vec::with_capacity(count);
        for _ in 0..count {
            tips.push(provider.tip_for(false).await);
        }
        tips
    };

    for tip in tips {
        println!("{}", serde_json::to_string(&tip)?);
    }
    Ok(())
}
