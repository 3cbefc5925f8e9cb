//! Default and merge tests for configuration

#[cfg(test)]
mod default_tests {
    use crate::config::{Config, FormConfig, ScoringSettings, StorageConfig, ValidationConfig};

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.form.id_prefix, "qsf");
        assert_eq!(config.form.storage_key, "quiz_scoring_forms_form");
        assert_eq!(config.form.snapshot_ttl_secs, 600);
        assert_eq!(config.form.answer_debounce_ms, 50);
        assert_eq!(config.scoring.max_answer_value, None);
        assert_eq!(config.validation.required_message, "This field is required");
        assert!(config.validation.contact_text_ascii_only);
        assert_eq!(config.storage.outbox_dir, ".quizform/outbox");
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_merge_prefers_changed_values() {
        let global = Config {
            form: FormConfig {
                snapshot_ttl_secs: 900,
                ..FormConfig::default()
            },
            scoring: ScoringSettings {
                max_answer_value: Some(4.0),
            },
            ..Config::default()
        };
        let project = Config {
            form: FormConfig {
                id_prefix: "acme".to_string(),
                ..FormConfig::default()
            },
            ..Config::default()
        };

        let merged = global.merge(project);
        assert_eq!(merged.form.id_prefix, "acme");
        assert_eq!(merged.form.snapshot_ttl_secs, 900);
        assert_eq!(merged.scoring.max_answer_value, Some(4.0));
    }

    #[test]
    fn test_merge_can_turn_off_ascii_check() {
        let project = Config {
            validation: ValidationConfig {
                contact_text_ascii_only: false,
                ..ValidationConfig::default()
            },
            storage: StorageConfig {
                snapshot_dir: "/tmp/snaps".to_string(),
                ..StorageConfig::default()
            },
            ..Config::default()
        };
        let merged = Config::default().merge(project);
        assert!(!merged.validation.contact_text_ascii_only);
        assert_eq!(merged.storage.snapshot_dir, "/tmp/snaps");
    }
}
