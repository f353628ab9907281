use csv::Trim;
use money_requests::engine::BalanceRecord;
use serde::Deserialize;
use serde_json::Value;
use std::{fs, path::Path, path::PathBuf, process::Command};
use tempfile::tempdir;

const BIN: &str = env!("CARGO_BIN_EXE_money_requests");

#[derive(Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Outcome {
    row: u64,
    kind: String,
    status: String,
    detail: String,
}

fn read_outcomes(data: &[u8]) -> Vec<Outcome> {
    let mut rdr = csv::ReaderBuilder::new().trim(Trim::All).from_reader(data);
    let mut res: Vec<Outcome> = rdr.deserialize().map(|r| r.unwrap()).collect();
    res.sort();
    res
}

fn stored_entries(path: &Path) -> Vec<Value> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap(),
        Err(_) => vec![],
    }
}

#[test]
fn test_integration() {
    let files_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/files");

    for entry in fs::read_dir(&files_dir)
        .expect("cannot read files_dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
    {
        let case_dir = entry.path();
        let input_path = case_dir.join("input.csv");
        let expected_output_path = case_dir.join("output.csv");

        assert!(input_path.exists());
        assert!(expected_output_path.exists());

        let work_dir = tempdir().unwrap();
        let output = Command::new(BIN)
            .current_dir(work_dir.path())
            .env("RUST_LOG", "warn")
            .arg("requests")
            .arg(&input_path)
            .output()
            .expect("failed to execute binary");

        assert!(output.status.success(), "{case_dir:?}");

        let generated = read_outcomes(&output.stdout);
        let expected = read_outcomes(&fs::read(&expected_output_path).unwrap());
        assert_eq!(generated.len(), expected.len(), "{case_dir:?}");

        for (got, want) in generated.iter().zip(&expected) {
            assert_eq!((got.row, &got.kind, &got.status), (want.row, &want.kind, &want.status));
            // An empty expected detail is a signature or a parser message.
            if !want.detail.is_empty() {
                assert_eq!(got.detail, want.detail, "{case_dir:?} row {}", got.row);
            }
        }

        let saved = |kind: &str| {
            expected
                .iter()
                .filter(|o| o.kind == kind && o.status == "saved")
                .count()
        };

        let deposits = stored_entries(&work_dir.path().join("deposits.json"));
        assert_eq!(deposits.len(), saved("deposit"), "{case_dir:?}");
        for deposit in &deposits {
            assert_eq!(deposit["deposit_signature"].as_str().unwrap().len(), 64);
        }

        let transfers = stored_entries(&work_dir.path().join("transfers.json"));
        assert_eq!(transfers.len(), saved("transfer"), "{case_dir:?}");
        for transfer in &transfers {
            assert_eq!(transfer["transfer_code"].as_str().unwrap().len(), 32);
        }

        let details: Vec<&str> = generated
            .iter()
            .filter(|o| o.status == "saved")
            .map(|o| o.detail.as_str())
            .collect();
        for stored in deposits.iter().map(|d| &d["deposit_signature"]) {
            assert!(details.contains(&stored.as_str().unwrap()));
        }
        for stored in transfers.iter().map(|t| &t["transfer_code"]) {
            assert!(details.contains(&stored.as_str().unwrap()));
        }
    }
}

#[test]
fn test_that_store_paths_come_from_environment() {
    let work_dir = tempdir().unwrap();
    let input = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/files/deposits/input.csv");
    let target = work_dir.path().join("custom_deposits.json");

    let output = Command::new(BIN)
        .current_dir(work_dir.path())
        .env("RUST_LOG", "off")
        .env("MONEY_DEPOSITS_FILE", &target)
        .arg("requests")
        .arg(&input)
        .output()
        .expect("failed to execute binary");

    assert!(output.status.success());
    assert_eq!(stored_entries(&target).len(), 2);
    assert!(!work_dir.path().join("deposits.json").exists());
}

#[test]
fn test_balance_command() {
    let work_dir = tempdir().unwrap();
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/transactions.json");
    fs::copy(&fixture, work_dir.path().join("transactions.json")).unwrap();

    let iban = "ES1234567890123456789012";
    let output = Command::new(BIN)
        .current_dir(work_dir.path())
        .env("RUST_LOG", "off")
        .args(["balance", iban])
        .output()
        .expect("failed to execute binary");

    assert!(output.status.success());
    let printed: BalanceRecord = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed.iban, iban);
    assert_eq!(printed.balance, 300.5);

    let written: BalanceRecord = serde_json::from_str(
        &fs::read_to_string(work_dir.path().join(format!("balance_{iban}.json"))).unwrap(),
    )
    .unwrap();
    assert_eq!(written, printed);
}

#[test]
fn test_balance_command_reports_unknown_iban() {
    let work_dir = tempdir().unwrap();
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/transactions.json");
    fs::copy(&fixture, work_dir.path().join("transactions.json")).unwrap();

    let output = Command::new(BIN)
        .current_dir(work_dir.path())
        .env("RUST_LOG", "off")
        .args(["balance", "ES0000000000000000000000"])
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("IBAN not found in transactions"));
}

#[test]
fn test_that_missing_arguments_fail() {
    let output = Command::new(BIN)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to execute binary");
    assert!(!output.status.success());
}
