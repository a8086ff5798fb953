//! Tests for loading the bot configuration from disk.

use std::io::Write;
use tictactoe_bot::BotConfig;

#[test]
fn test_loads_partial_file_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
bot_name = "Arena"
rng_seed = 99
leaderboard_size = 5
"#
    )
    .unwrap();

    let config = BotConfig::from_file(file.path()).unwrap();
    assert_eq!(config.bot_name(), "Arena");
    assert_eq!(*config.rng_seed(), Some(99));
    assert_eq!(*config.leaderboard_size(), 5);
    assert_eq!(*config.medium_optimal_rate(), 0.7);
    assert_eq!(config.log_filter(), "info");
}

#[test]
fn test_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "invite_code_length = 2").unwrap();

    let err = BotConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("invite_code_length"));
}

#[test]
fn test_rejects_malformed_toml() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "bot_name = ").unwrap();

    let err = BotConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = BotConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}
