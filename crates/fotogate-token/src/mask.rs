//! Display masking for token values.
//!
//! Full token values never appear in logs or admin listings; everything
//! user-visible goes through [`mask_token`].

/// Placeholder for values too short to mask meaningfully.
const MASKED_PLACEHOLDER: &str = "tok_***";

/// Produce a display form that reveals only a short prefix and suffix.
///
/// Values longer than 6 characters render as `tok_ABC***789`; anything
/// shorter collapses to a constant placeholder so the mask never echoes
/// most of a short value back.
pub fn mask_token(value: &str) -> String {
    if value.len() <= 6 {
        return MASKED_PLACEHOLDER.to_string();
    }
    let prefix: String = value.chars().take(3).collect();
    let suffix: String = value
        .chars()
        .rev()
        .take(3)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("tok_{prefix}***{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_long_value() {
        assert_eq!(mask_token("ABC123DEF456GHI789"), "tok_ABC***789");
    }

    #[test]
    fn test_short_values_collapse_to_placeholder() {
        assert_eq!(mask_token("ABC123"), "tok_***");
        assert_eq!(mask_token("A"), "tok_***");
        assert_eq!(mask_token(""), "tok_***");
    }

    #[test]
    fn test_mask_never_contains_middle() {
        let value = "ABC123DEF456GHI789JKL";
        let masked = mask_token(value);
        assert!(!masked.contains("123DEF456GHI789"));
        assert_eq!(masked, "tok_ABC***JKL");
    }
}
