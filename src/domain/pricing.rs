use bigdecimal::{BigDecimal, RoundingMode};

/// The brand ships free within Germany; everywhere else pays a flat fee.
pub const FREE_SHIPPING_COUNTRY: &str = "Germany";

const FLAT_SHIPPING_FEE: i64 = 40;
const TAX_RATE_PERCENT: i64 = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    pub shipping: BigDecimal,
    pub taxes: BigDecimal,
    pub total: BigDecimal,
}

/// Compute shipping, taxes and the grand total for a cart subtotal shipped to
/// `country`. Taxes are 19% of the subtotal, rounded half-up to cents.
pub fn quote(subtotal: &BigDecimal, country: &str) -> Totals {
    let shipping = if country == FREE_SHIPPING_COUNTRY {
        BigDecimal::from(0)
    } else {
        BigDecimal::from(FLAT_SHIPPING_FEE)
    };
    let taxes = (subtotal * BigDecimal::from(TAX_RATE_PERCENT) / BigDecimal::from(100))
        .with_scale_round(2, RoundingMode::HalfUp);
    let total = subtotal + &shipping + &taxes;
    Totals {
        shipping,
        taxes,
        total,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn germany_ships_free() {
        let totals = quote(&dec("110"), "Germany");
        assert_eq!(totals.shipping, dec("0"));
        assert_eq!(totals.taxes, dec("20.90"));
        assert_eq!(totals.total, dec("130.90"));
    }

    #[test]
    fn other_countries_pay_the_flat_fee() {
        let totals = quote(&dec("110"), "France");
        assert_eq!(totals.shipping, dec("40"));
        assert_eq!(totals.taxes, dec("20.90"));
        assert_eq!(totals.total, dec("170.90"));
    }

    #[test]
    fn taxes_round_half_up_to_cents() {
        // 33.33 * 0.19 = 6.3327
        let totals = quote(&dec("33.33"), "Germany");
        assert_eq!(totals.taxes, dec("6.33"));
        // 19.50 * 0.19 = 3.705
        let totals = quote(&dec("19.50"), "Germany");
        assert_eq!(totals.taxes, dec("3.71"));
    }

    #[test]
    fn zero_subtotal_quotes_zero_taxes() {
        let totals = quote(&dec("0"), "Spain");
        assert_eq!(totals.taxes, dec("0.00"));
        assert_eq!(totals.total, dec("40.00"));
    }
}
