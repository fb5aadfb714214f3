use super::ui;
use crate::core::FxContext;
use anyhow::Result;

/// Switches the base currency and waits for matching rates.
pub async fn run(ctx: &FxContext, code: &str) -> Result<()> {
    let handle = ctx.set_base_currency(code).await?;
    ui::wait_for_refresh(handle).await;

    let base = ctx.base_currency();
    println!(
        "Base currency set to {} ({})",
        ui::style_text(base.code, ui::StyleType::TotalLabel),
        base.symbol
    );
    if ctx.is_stale() {
        println!("{}", ui::stale_notice(base.code));
    }
    Ok(())
}
