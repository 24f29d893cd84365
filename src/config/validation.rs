use super::schema::{Config, WeightRange};

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    validate_range(
        "bounds.milestone_weight",
        &config.bounds.milestone_weight,
        &mut errors,
    );
    validate_range(
        "bounds.contribution_weight",
        &config.bounds.contribution_weight,
        &mut errors,
    );

    if let Some(ref path) = config.state_path {
        if path.as_os_str().is_empty() {
            errors.push("state_path: must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_range(key: &str, range: &WeightRange, errors: &mut Vec<String>) {
    if !range.min.is_finite() || !range.max.is_finite() {
        errors.push(format!("{}: min and max must be finite numbers", key));
        return;
    }
    if range.min <= 0.0 {
        errors.push(format!("{}.min: must be positive, got {}", key, range.min));
    }
    if range.min > range.max {
        errors.push(format!(
            "{}: min ({}) must not exceed max ({})",
            key, range.min, range.max
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_non_positive_min() {
        let mut config = Config::default();
        config.bounds.milestone_weight.min = 0.0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("bounds.milestone_weight.min"));
    }

    #[test]
    fn test_inverted_range() {
        let mut config = Config::default();
        config.bounds.contribution_weight = WeightRange { min: 2.0, max: 1.0 };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("bounds.contribution_weight"));
        assert!(errors[0].contains("must not exceed"));
    }

    #[test]
    fn test_non_finite_range() {
        let mut config = Config::default();
        config.bounds.milestone_weight.max = f64::INFINITY;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("finite"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = Config::default();
        config.bounds.milestone_weight.min = -1.0; // Error 1
        config.bounds.contribution_weight = WeightRange { min: 3.0, max: 0.5 }; // Error 2
        config.state_path = Some(PathBuf::new()); // Error 3
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
