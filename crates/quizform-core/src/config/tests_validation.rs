//! Validation-focused tests for configuration

#[cfg(test)]
mod validation_tests {
    use crate::config::Config;
    use crate::Result;

    #[test]
    fn test_ttl_range() {
        let mut config = Config::default();
        config.form.snapshot_ttl_secs = 59;
        assert!(config.validate().is_err());
        config.form.snapshot_ttl_secs = 86_401;
        assert!(config.validate().is_err());
        config.form.snapshot_ttl_secs = 60;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debounce_range() {
        let mut config = Config::default();
        config.form.answer_debounce_ms = 2001;
        let message = config.validate().err().map(|e| e.to_string());
        assert!(message.is_some_and(|m| m.contains("0-2000")));
    }

    #[test]
    fn test_prefix_must_be_alphanumeric() {
        let mut config = Config::default();
        config.form.id_prefix = "my-prefix".to_string();
        assert!(config.validate().is_err());
        config.form.id_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_answer_value_must_be_positive() {
        let mut config = Config::default();
        config.scoring.max_answer_value = Some(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversions() -> Result<()> {
        let mut config = Config::default();
        config.scoring.max_answer_value = Some(2.0);
        config.form.snapshot_ttl_secs = 120;
        config.validation.contact_text_ascii_only = false;

        let scoring = config.scoring_config()?;
        assert_eq!(scoring.map(|s| s.max_answer_value()), Some(2.0));

        let schema = config.schema_config();
        assert_eq!(schema.id_prefix, "qsf");
        assert!(!schema.contact_text_ascii_only);

        if let Some(scoring) = scoring {
            let settings = config.session_settings(scoring);
            assert_eq!(settings.snapshot_ttl, chrono::Duration::seconds(120));
        }
        assert_eq!(config.answer_debounce().as_millis(), 50);
        Ok(())
    }
}
