// End-to-end tests of the tabstat and generate_sample binaries

use predicates::prelude::*;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/renfe_small.csv");

fn tabstat() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("tabstat")
}

/// Default weather query reproduces the hand-computed posteriors
#[test]
fn test_bayes_prints_posteriors() {
    tabstat()
        .arg("bayes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Prediction results:"))
        .stdout(predicate::str::contains("Probability match is played: 7.69%"))
        .stdout(predicate::str::contains("Probability match is cancelled: 92.31%"));
}

#[test]
fn test_bayes_custom_query() {
    // Sunny/High/Weak: Yes = 0.5*0.4*0.6*0.8 = 0.096, No = 0.5*0.4*0.6*0.2 = 0.024
    tabstat()
        .args(["bayes", "--outlook", "Sunny", "--humidity", "High", "--wind", "Weak"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Probability match is played: 80.00%"));
}

#[test]
fn test_bayes_unseen_value_fails() {
    tabstat()
        .args(["bayes", "--outlook", "Snow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("zero probability"));
}

#[test]
fn test_fares_text_report() {
    tabstat()
        .args(["fares", "--input", FIXTURE])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loading and preparing data..."))
        .stdout(predicate::str::contains("1. Overall price statistics:"))
        .stdout(predicate::str::contains("95% confidence interval: ["))
        .stdout(predicate::str::contains("Turista:\nMean price:"))
        .stdout(predicate::str::contains("Ticket count: 6"))
        .stdout(predicate::str::contains("Minimum price: 21.95 €"))
        .stdout(predicate::str::contains("Maximum price: 107.70 €"))
        .stdout(predicate::str::contains("Premium tickets: 2 of 10"))
        .stdout(predicate::str::contains("Flexible tickets: 3 of 10"))
        .stdout(predicate::str::contains("Price range: 85.75 €"));
}

#[test]
fn test_fares_json_report() {
    let output = tabstat()
        .args(["fares", "--input", FIXTURE, "--format", "json", "--top", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["overall"]["count"], 10);
    assert_eq!(json["by_class"]["Turista"]["count"], 6);
    assert_eq!(json["by_class"]["Preferente"]["count"], 2);
    assert!(json["by_class"].get("").is_none());

    let busiest = json["busiest_routes"].as_array().unwrap();
    assert_eq!(busiest.len(), 2);
    // MADRID-BARCELONA and MADRID-SEVILLA tie at 3; route order breaks it.
    assert_eq!(busiest[0]["destination"], "BARCELONA");
    assert_eq!(busiest[0]["count"], 3);
    assert_eq!(busiest[1]["destination"], "SEVILLA");
}

#[test]
fn test_fares_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("report.toml");
    std::fs::write(&config, "confidence = 0.9\n").unwrap();

    tabstat()
        .args(["fares", "--input", FIXTURE, "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("90% confidence interval"));
}

#[test]
fn test_fares_config_with_bad_confidence_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("report.toml");
    std::fs::write(&config, "confidence = 1.5\n").unwrap();

    tabstat()
        .args(["fares", "--input", FIXTURE, "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("confidence level must lie in (0, 1)"));
}

#[test]
fn test_fares_infinite_price_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tickets.csv");
    let fixture = std::fs::read_to_string(FIXTURE).unwrap();
    std::fs::write(&input, fixture.replacen(",38.55,", ",inf,", 1)).unwrap();

    tabstat()
        .args(["fares", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("price 'inf' is not a finite number"));
}

#[test]
fn test_fares_missing_file() {
    tabstat()
        .args(["fares", "--input", "/nonexistent/renfe_small.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading /nonexistent/renfe_small.csv"));
}

/// Generated samples load back through both CSV and Parquet
#[test]
fn test_generated_sample_round_trips_through_report() {
    let dir = tempfile::tempdir().unwrap();

    for name in ["sample.csv", "sample.parquet"] {
        let path = dir.path().join(name);
        assert_cmd::cargo::cargo_bin_cmd!("generate_sample")
            .arg(&path)
            .args(["--rows", "200"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 200 tickets"));

        let output = tabstat()
            .args(["fares", "--format", "json", "--input"])
            .arg(&path)
            .output()
            .unwrap();
        assert!(output.status.success(), "report on {name} failed");

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let count = json["overall"]["count"].as_u64().unwrap();
        assert!(count > 150 && count <= 200, "{name}: {count} priced tickets");
    }
}
