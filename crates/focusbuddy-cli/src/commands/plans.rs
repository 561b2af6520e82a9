use focusbuddy_core::SUBSCRIPTION_PLANS;

use super::CliResult;

pub fn run(json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string_pretty(SUBSCRIPTION_PLANS)?);
        return Ok(());
    }

    for plan in SUBSCRIPTION_PLANS {
        let marker = if plan.popular { "  (most popular)" } else { "" };
        let price = if plan.is_free() {
            plan.price_label()
        } else {
            format!("{}/month", plan.price_label())
        };
        println!("{:<8} {price:>12}{marker}", plan.id.as_str());
        for feature in plan.features {
            println!("    - {feature}");
        }
    }
    Ok(())
}
