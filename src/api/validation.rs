use super::ApiError;
use crate::models::ProductFilter;

const CATEGORY_MIN_LEN: usize = 1;
const CATEGORY_MAX_LEN: usize = 50;

pub fn validate_price_bound(name: &str, value: Option<f64>) -> Result<Option<f64>, ApiError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(ApiError::validation(format!(
            "Invalid {name}: {v}. Must be greater than 0"
        ))),
        other => Ok(other),
    }
}

pub fn validate_category(category: Option<&str>) -> Result<Option<&str>, ApiError> {
    let Some(category) = category else {
        return Ok(None);
    };

    let len = category.chars().count();
    if !(CATEGORY_MIN_LEN..=CATEGORY_MAX_LEN).contains(&len) {
        return Err(ApiError::validation(format!(
            "Category must be between {CATEGORY_MIN_LEN} and {CATEGORY_MAX_LEN} characters"
        )));
    }

    Ok(Some(category))
}

pub fn validate_product_filter(filter: &ProductFilter) -> Result<(), ApiError> {
    validate_category(filter.category.as_deref())?;
    let min = validate_price_bound("min_price", filter.min_price)?;
    let max = validate_price_bound("max_price", filter.max_price)?;

    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(ApiError::validation(
            "min_price cannot be greater than max_price",
        ));
    }

    Ok(())
}

pub fn validate_key(kind: &str, key: &str) -> Result<(), ApiError> {
    if key.trim().is_empty() {
        return Err(ApiError::validation(format!("{kind} key cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_price_bound() {
        assert!(validate_price_bound("min_price", None).is_ok());
        assert!(validate_price_bound("min_price", Some(0.01)).is_ok());
        assert!(validate_price_bound("min_price", Some(0.0)).is_err());
        assert!(validate_price_bound("min_price", Some(-5.0)).is_err());
        assert!(validate_price_bound("min_price", Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category(None).is_ok());
        assert!(validate_category(Some("Home")).is_ok());
        assert!(validate_category(Some("")).is_err());
        assert!(validate_category(Some(&"c".repeat(51))).is_err());
    }

    #[test]
    fn test_validate_product_filter() {
        let ok = ProductFilter {
            category: Some("Books".to_string()),
            min_price: Some(1.0),
            max_price: Some(10.0),
        };
        assert!(validate_product_filter(&ok).is_ok());

        let inverted = ProductFilter {
            category: None,
            min_price: Some(10.0),
            max_price: Some(1.0),
        };
        assert!(validate_product_filter(&inverted).is_err());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("Product", "product_abc").is_ok());
        assert!(validate_key("Product", "  ").is_err());
    }
}
