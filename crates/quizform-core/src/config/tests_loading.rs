//! Loading-focused tests for configuration
//!
//! File parsing, layering and environment overrides.

#[cfg(test)]
mod loading_tests {
    use std::collections::HashMap;

    use serial_test::serial;

    use crate::config::{load_config_from, load_toml_file, project_config_path, Config};
    use crate::{Error, Result};

    fn write(dir: &std::path::Path, name: &str, content: &str) -> Result<std::path::PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write(dir.path(), "config.toml", "[form]\nanswer_debounce_ms = 120\n")?;
        let config = load_toml_file(&path)?;
        assert_eq!(config.form.answer_debounce_ms, 120);
        assert_eq!(config.form.id_prefix, "qsf");
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write(dir.path(), "bad.toml", "[form\nid_prefix = ")?;
        assert!(matches!(load_toml_file(&path), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_directory_path_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(matches!(load_toml_file(dir.path()), Err(Error::Io(_))));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_project_overrides_global() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let global = write(
            dir.path(),
            "global.toml",
            "[form]\nid_prefix = \"glob\"\nsnapshot_ttl_secs = 120\n",
        )?;
        let project = write(dir.path(), "project.toml", "[form]\nid_prefix = \"proj\"\n")?;

        let config = load_config_from(Some(&global), &project)?;
        assert_eq!(config.form.id_prefix, "proj");
        assert_eq!(config.form.snapshot_ttl_secs, 120);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_missing_files_give_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = load_config_from(None, &dir.path().join("absent.toml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    #[serial]
    fn test_invalid_layer_fails_validation() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let project = write(dir.path(), "project.toml", "[form]\nsnapshot_ttl_secs = 5\n")?;
        assert!(matches!(
            load_config_from(None, &project),
            Err(Error::InvalidConfig(_))
        ));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_env_var_overrides_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let project = write(dir.path(), "project.toml", "[form]\nid_prefix = \"proj\"\n")?;

        std::env::set_var("QUIZFORM_ID_PREFIX", "env");
        let result = load_config_from(None, &project);
        std::env::remove_var("QUIZFORM_ID_PREFIX");

        assert_eq!(result?.form.id_prefix, "env");
        Ok(())
    }

    #[test]
    fn test_env_lookup_parses_typed_values() -> Result<()> {
        let vars = HashMap::from([
            ("QUIZFORM_ANSWER_DEBOUNCE_MS", "0"),
            ("QUIZFORM_MAX_ANSWER_VALUE", "3"),
            ("QUIZFORM_CONTACT_TEXT_ASCII_ONLY", "false"),
            ("QUIZFORM_OUTBOX_DIR", "/var/outbox"),
        ]);
        let config =
            Config::default().apply_env_from(|key| vars.get(key).map(|v| (*v).to_string()))?;
        assert_eq!(config.form.answer_debounce_ms, 0);
        assert_eq!(config.scoring.max_answer_value, Some(3.0));
        assert!(!config.validation.contact_text_ascii_only);
        assert_eq!(config.storage.outbox_dir, "/var/outbox");
        Ok(())
    }

    #[test]
    fn test_env_lookup_rejects_garbage() {
        let result = Config::default().apply_env_from(|key| {
            (key == "QUIZFORM_SNAPSHOT_TTL_SECS").then(|| "ten minutes".to_string())
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_project_config_path() -> Result<()> {
        let path = project_config_path()?;
        assert!(path.ends_with(".quizform/config.toml"));
        Ok(())
    }
}
