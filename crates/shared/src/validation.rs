//! Common validation utilities used by request DTOs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidationError;

/// Maximum number of members listed on a group travel request.
pub const MAX_GROUP_MEMBERS: usize = 50;

/// Decimal places stored for money columns (`NUMERIC(14, 2)`).
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a money column holds: 999 999 999 999.99.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, MONEY_SCALE)
}

fn amount_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Checks that an amount fits a money column without rounding.
pub fn validate_amount_bounds(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(amount_error(
            "amount_scale",
            format!("Amount cannot have more than {} decimal places", MONEY_SCALE),
        ));
    }
    if amount.abs() > max_amount() {
        return Err(amount_error(
            "amount_too_large",
            format!("Amount cannot exceed {}", max_amount()),
        ));
    }
    Ok(())
}

/// Validates that a monetary amount is strictly positive and storable.
pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if !amount.is_sign_positive() || amount.is_zero() {
        return Err(amount_error(
            "amount_positive",
            "Amount must be greater than zero".to_string(),
        ));
    }
    validate_amount_bounds(amount)
}

/// Validates that a monetary amount is zero or more and storable.
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(amount_error(
            "amount_non_negative",
            "Amount cannot be negative".to_string(),
        ));
    }
    validate_amount_bounds(amount)
}

/// Sums amounts without overflowing, rejecting totals a money column cannot hold.
pub fn checked_total<'a, I>(amounts: I) -> Result<Decimal, ValidationError>
where
    I: IntoIterator<Item = &'a Decimal>,
{
    let total = amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))
        .ok_or_else(|| amount_error("total_overflow", "Total amount is too large".to_string()))?;

    if total.abs() > max_amount() {
        return Err(amount_error(
            "total_too_large",
            format!("Total amount cannot exceed {}", max_amount()),
        ));
    }
    Ok(total)
}

/// Validates that a travel period does not end before it starts.
pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> Result<(), ValidationError> {
    if to >= from {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_range");
        err.message = Some("Travel end date cannot be before the start date".into());
        Err(err)
    }
}

/// Validates a list of group member names: bounded size, no blank names.
pub fn validate_group_members(members: &[String]) -> Result<(), ValidationError> {
    if members.len() > MAX_GROUP_MEMBERS {
        let mut err = ValidationError::new("group_members_count");
        err.message = Some(format!("At most {} group members allowed", MAX_GROUP_MEMBERS).into());
        return Err(err);
    }
    if members.iter().any(|m| m.trim().is_empty()) {
        let mut err = ValidationError::new("group_member_blank");
        err.message = Some("Group member names cannot be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a fiscal year label such as `2024/25` or `2081-82`.
pub fn validate_fiscal_year(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() >= 4
        && value.len() <= 9
        && value.chars().take(4).all(|c| c.is_ascii_digit())
        && value
            .chars()
            .skip(4)
            .all(|c| c.is_ascii_digit() || c == '/' || c == '-');
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("fiscal_year");
        err.message = Some("Fiscal year must look like 2024 or 2024/25".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount(&dec!(0.01)).is_ok());
        assert!(validate_positive_amount(&dec!(15000)).is_ok());
        assert!(validate_positive_amount(&dec!(0)).is_err());
        assert!(validate_positive_amount(&dec!(-5)).is_err());
    }

    #[test]
    fn test_amounts_must_fit_money_column() {
        assert!(validate_positive_amount(&dec!(999999999999.99)).is_ok());
        assert!(validate_positive_amount(&dec!(10.500)).is_ok());

        let err = validate_positive_amount(&dec!(0.001)).unwrap_err();
        assert_eq!(err.code, "amount_scale");
        assert!(validate_positive_amount(&dec!(10.005)).is_err());
        assert!(validate_non_negative_amount(&dec!(0.005)).is_err());

        let err = validate_positive_amount(&dec!(1000000000000)).unwrap_err();
        assert_eq!(err.code, "amount_too_large");
        assert!(validate_positive_amount(&dec!(99999999999999999)).is_err());
        assert!(validate_non_negative_amount(&dec!(1000000000000.00)).is_err());
    }

    #[test]
    fn test_checked_total() {
        let amounts = [dec!(450.50), dec!(300)];
        assert_eq!(checked_total(&amounts).unwrap(), dec!(750.50));
        assert_eq!(checked_total(&[] as &[Decimal]).unwrap(), Decimal::ZERO);

        let at_limit = [dec!(999999999999.98), dec!(0.01)];
        assert_eq!(checked_total(&at_limit).unwrap(), max_amount());

        let over = [dec!(999999999999.99), dec!(0.01)];
        assert_eq!(checked_total(&over).unwrap_err().code, "total_too_large");

        let huge = [Decimal::MAX, Decimal::MAX];
        assert_eq!(checked_total(&huge).unwrap_err().code, "total_overflow");
    }

    #[test]
    fn test_validate_non_negative_amount() {
        assert!(validate_non_negative_amount(&dec!(0)).is_ok());
        assert!(validate_non_negative_amount(&dec!(2000)).is_ok());
        let err = validate_non_negative_amount(&dec!(-0.5)).unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Amount cannot be negative");
    }

    #[test]
    fn test_validate_date_range() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();
        assert!(validate_date_range(from, to).is_ok());
        assert!(validate_date_range(from, from).is_ok());
        assert!(validate_date_range(to, from).is_err());
    }

    #[test]
    fn test_validate_group_members() {
        assert!(validate_group_members(&[]).is_ok());
        assert!(validate_group_members(&["Asha".to_string(), "Bikash".to_string()]).is_ok());
        assert!(validate_group_members(&["  ".to_string()]).is_err());

        let too_many: Vec<String> = (0..=MAX_GROUP_MEMBERS).map(|i| format!("m{i}")).collect();
        assert!(validate_group_members(&too_many).is_err());
    }

    #[test]
    fn test_validate_fiscal_year() {
        assert!(validate_fiscal_year("2024").is_ok());
        assert!(validate_fiscal_year("2024/25").is_ok());
        assert!(validate_fiscal_year("2081-82").is_ok());
        assert!(validate_fiscal_year("FY24").is_err());
        assert!(validate_fiscal_year("2024/2025/26").is_err());
    }
}
