use super::ui;
use crate::core::FxContext;
use anyhow::{Result, bail};

pub struct Conversion {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub converted: f64,
    /// True when no usable rate was found and the amount passed through.
    pub unconverted: bool,
}

impl Conversion {
    pub fn compute(ctx: &FxContext, amount: f64, from: &str, to: Option<&str>) -> Result<Self> {
        let from = from.trim().to_uppercase();
        let to = to
            .map(|t| t.trim().to_uppercase())
            .unwrap_or_else(|| ctx.base_currency().code.to_string());
        if from.is_empty() || to.is_empty() {
            bail!("Currency codes must not be empty");
        }
        if !amount.is_finite() {
            bail!("Amount must be a finite number");
        }

        let converted = ctx.convert(amount, &from, Some(&to));
        let unconverted = from != to
            && ctx
                .snapshot()
                .is_none_or(|s| s.rate(&from).is_none() || s.rate(&to).is_none());
        Ok(Self {
            from,
            to,
            amount,
            converted,
            unconverted,
        })
    }

    pub fn display(&self, ctx: &FxContext) -> String {
        let target = if self.to == ctx.base_currency().code {
            ctx.format(self.converted, Some(&self.to))
        } else {
            ctx.format_raw(self.converted, &self.to)
        };
        let mut output = format!(
            "{} = {}",
            ctx.format_raw(self.amount, &self.from),
            ui::style_text(&target, ui::StyleType::TotalValue)
        );
        if self.unconverted {
            output.push('\n');
            output.push_str(&ui::style_text(
                &format!("No rate available for {} -> {}; amount shown unconverted.", self.from, self.to),
                ui::StyleType::Error,
            ));
        }
        output
    }
}

pub async fn run(ctx: &FxContext, amount: f64, from: &str, to: Option<&str>) -> Result<()> {
    ui::wait_for_refresh(ctx.ensure_fresh()).await;
    let conversion = Conversion::compute(ctx, amount, from, to)?;
    println!("{}", conversion.display(ctx));
    Ok(())
}
