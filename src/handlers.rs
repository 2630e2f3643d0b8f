pub mod advances;
pub mod bonifications;
pub mod charges;
pub mod earnings;
pub mod expenses;
pub mod reports;
pub mod transactions;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::ValidationError;

// Validadores compartilhados pelos payloads

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("exclusive_min".into(), &0.0);
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

/// Intervalo fechado obrigatório `[from, to]`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// Primeiro dia (YYYY-MM-DD)
    pub from: NaiveDate,
    /// Último dia, inclusive
    pub to: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_validators() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(1, 2)).is_ok());
    }
}
