//! Locale aware money formatting for the catalog currencies.

use crate::core::currency::{CurrencyDescriptor, find_currency};

struct LocaleStyle {
    group: &'static str,
    decimal: char,
    symbol_after: bool,
}

fn locale_style(locale: &str) -> Option<LocaleStyle> {
    match locale {
        "en-US" => Some(LocaleStyle {
            group: ",",
            decimal: '.',
            symbol_after: false,
        }),
        "de-DE" => Some(LocaleStyle {
            group: ".",
            decimal: ',',
            symbol_after: true,
        }),
        // ka-GE groups with a no-break space
        "ka-GE" => Some(LocaleStyle {
            group: "\u{a0}",
            decimal: ',',
            symbol_after: true,
        }),
        _ => None,
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

fn format_with_locale(amount: f64, currency: &CurrencyDescriptor) -> Option<String> {
    if !amount.is_finite() {
        return None;
    }
    let style = locale_style(currency.locale)?;
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.')?;
    let number = format!(
        "{}{}{}",
        group_digits(int_part, style.group),
        style.decimal,
        frac_part
    );
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    Some(if style.symbol_after {
        format!("{sign}{number}\u{a0}{}", currency.symbol)
    } else {
        format!("{sign}{}{number}", currency.symbol)
    })
}

/// Formats an amount already expressed in `currency`.
///
/// Falls back to the bare symbol and two decimals when the locale has no
/// known pattern.
pub fn format_money(amount: f64, currency: &CurrencyDescriptor) -> String {
    format_with_locale(amount, currency)
        .unwrap_or_else(|| format!("{}{:.2}", currency.symbol, amount))
}

/// Formats an amount in its own currency, which may be outside the catalog.
pub fn format_raw(amount: f64, code: &str) -> String {
    find_currency(code)
        .and_then(|c| format_with_locale(amount, c))
        .unwrap_or_else(|| format!("{} {:.2}", code.to_uppercase(), amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_locales() {
        let usd = find_currency("USD").unwrap();
        let eur = find_currency("EUR").unwrap();
        let gel = find_currency("GEL").unwrap();

        assert_eq!(format_money(1234.5, usd), "$1,234.50");
        assert_eq!(format_money(1234567.891, eur), "1.234.567,89\u{a0}€");
        assert_eq!(format_money(999.999, gel), "1\u{a0}000,00\u{a0}₾");
        assert_eq!(format_money(-42.0, usd), "-$42.00");
        assert_eq!(format_money(-0.001, usd), "$0.00");
    }

    #[test]
    fn test_unknown_locale_falls_back_to_symbol() {
        let odd = CurrencyDescriptor {
            code: "XTS",
            locale: "xx-XX",
            symbol: "¤",
        };
        assert_eq!(format_money(12.346, &odd), "¤12.35");
    }

    #[test]
    fn test_raw_format_for_unknown_code() {
        assert_eq!(format_raw(10.0, "jpy"), "JPY 10.00");
        assert_eq!(format_raw(10.0, "USD"), "$10.00");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("1", ","), "1");
        assert_eq!(group_digits("123", ","), "123");
        assert_eq!(group_digits("1234", ","), "1,234");
        assert_eq!(group_digits("123456", ","), "123,456");
    }
}
