//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! test fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Loads seed.csv and config.toml when the fixture has them
//! 3. Replays the script through a facade backed by the in-memory ledger
//! 4. Compares the balance output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path scenarios
//! - Server-side grants picked up by reconciliation
//! - Ledger outages and recovery
//! - Lifecycle-driven reconciliation, with and without teardown
//! - Malformed script rows
//! - Edge cases (negative amounts, empty scripts, seed-only runs)
//!
//! Each fixture is replayed twice: with the provider's default user and with
//! an explicit user id.

#[cfg(test)]
mod tests {
    use currency_facade::config::FacadeConfig;
    use currency_facade::io::read_seed_csv;
    use currency_facade::runner::{RunOptions, ScriptRunner};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// Build runner options from the optional files of a fixture directory
    fn fixture_options(fixture_dir: &Path, user_id: &str) -> RunOptions {
        let seed_path = fixture_dir.join("seed.csv");
        let seed = if seed_path.exists() {
            read_seed_csv(&seed_path)
                .unwrap_or_else(|e| panic!("Failed to read seed {}: {}", seed_path.display(), e))
        } else {
            Default::default()
        };

        let config_path = fixture_dir.join("config.toml");
        let config = if config_path.exists() {
            FacadeConfig::load(&config_path).unwrap_or_else(|e| {
                panic!("Failed to read config {}: {}", config_path.display(), e)
            })
        } else {
            FacadeConfig::default()
        };

        RunOptions {
            publisher_id: "e2e-publisher".to_string(),
            user_id: user_id.to_string(),
            seed,
            config,
        }
    }

    /// Run a test fixture by replaying input.csv and comparing with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Input or expected files cannot be read
    /// - Output doesn't match expected
    fn run_test_fixture(fixture_name: &str, user_id: &str) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let fixture_dir = Path::new(&fixture_dir);
        let input_path = fixture_dir.join("input.csv");
        let expected_path = fixture_dir.join("expected.csv");

        assert!(
            input_path.exists(),
            "Input file not found: {}",
            input_path.display()
        );
        assert!(
            expected_path.exists(),
            "Expected file not found: {}",
            expected_path.display()
        );

        let runner = ScriptRunner::new(fixture_options(fixture_dir, user_id));

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        runner
            .run(&input_path, &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to replay script: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));

        let expected_output = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read expected file {}: {}",
                expected_path.display(),
                e
            )
        });

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (user: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, user_id, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both user configurations
    #[rstest]
    #[case("happy_path")]
    #[case("server_grant")]
    #[case("outage_keeps_cache")]
    #[case("outage_recovery")]
    #[case("unreported_currency")]
    #[case("lifecycle_events")]
    #[case("teardown_disabled")]
    #[case("no_follow_up_reconcile")]
    #[case("malformed_data")]
    #[case("negative_amounts")]
    #[case("empty_script")]
    #[case("seed_only")]
    fn test_fixtures(#[case] fixture: &str, #[values("", "player-1")] user_id: &str) {
        run_test_fixture(fixture, user_id);
    }

    #[test]
    fn test_malformed_rows_are_counted() {
        let runner = ScriptRunner::default();
        let mut output = Vec::new();

        let summary = runner
            .run(Path::new("tests/fixtures/malformed_data/input.csv"), &mut output)
            .unwrap();

        assert_eq!(summary.rows_skipped, 5);
        assert_eq!(summary.steps_applied, 3);
        assert_eq!(summary.updates_failed, 0);
    }

    #[test]
    fn test_outage_reports_failed_updates() {
        let fixture_dir = Path::new("tests/fixtures/outage_keeps_cache");
        let runner = ScriptRunner::new(fixture_options(fixture_dir, ""));
        let mut output = Vec::new();

        let summary = runner
            .run(&fixture_dir.join("input.csv"), &mut output)
            .unwrap();

        // initial reconciliation only; the follow-up and explicit one fail
        assert_eq!(summary.updates_succeeded, 1);
        assert_eq!(summary.updates_failed, 2);
    }
}
