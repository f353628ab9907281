use anyhow::{Context, Result, bail};
use csv::Trim;
use money_requests::Config;
use money_requests::engine::{BalanceCalculator, InputRecord};
use serde::Serialize;
use simple_logger::SimpleLogger;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: money_requests requests <file.csv> | balance <IBAN>";

/// One stdout row per processed request; `row` counts data rows from 1
#[derive(Serialize, Debug)]
struct Outcome {
    row: u64,
    kind: &'static str,
    status: &'static str,
    detail: String,
}

fn main() -> Result<()> {
    SimpleLogger::new().env().init()?;

    log::debug!("Application started");
    let config = Config::from_env();

    let mut args = env::args().skip(1);
    match (args.next().as_deref(), args.next()) {
        (Some("requests"), Some(file_path)) => {
            let path = PathBuf::from(file_path);
            log::debug!("Extracted filepath from args: {path:?}");
            process_requests_from_filepath(&path, &config)?;
        }
        (Some("balance"), Some(iban)) => {
            print_balance(&iban, &config)?;
        }
        _ => bail!(USAGE),
    }

    log::debug!("Application finished");
    Ok(())
}

fn process_requests_from_filepath(filepath: &Path, config: &Config) -> Result<()> {
    let file = File::open(filepath).with_context(|| format!("cannot open {filepath:?}"))?;
    let mut rdr = csv::ReaderBuilder::new().trim(Trim::All).from_reader(file);
    let mut wtr = csv::Writer::from_writer(std::io::stdout());

    log::debug!("Started deserialising requests");
    for (index, result) in rdr.deserialize::<InputRecord>().enumerate() {
        let row = index as u64 + 1;
        let outcome = match result {
            Ok(record) => process_record(row, &record, config),
            Err(e) => {
                log::warn!("Error deserializing row {row}: {e}");
                Outcome {
                    row,
                    kind: "unknown",
                    status: "rejected",
                    detail: e.to_string(),
                }
            }
        };
        wtr.serialize(&outcome)?;
    }

    log::debug!("Request processing done -> Flushing to stdout");
    wtr.flush()?;
    Ok(())
}

fn process_record(row: u64, record: &InputRecord, config: &Config) -> Outcome {
    log::debug!("Converting InputRecord into request: {record:?}");
    let kind = record.typ.as_str();
    let saved = record.to_request().and_then(|request| {
        request.save(config)?;
        Ok(request.fingerprint())
    });

    match saved {
        Ok(fingerprint) => Outcome {
            row,
            kind,
            status: "saved",
            detail: fingerprint,
        },
        Err(e) => {
            log::warn!("Error processing {kind} request at row {row}: {e}");
            Outcome {
                row,
                kind,
                status: "rejected",
                detail: e.to_string(),
            }
        }
    }
}

fn print_balance(iban: &str, config: &Config) -> Result<()> {
    let calculator = BalanceCalculator::from_config(config);
    let record = calculator.compute(iban)?;
    let path = calculator.write(&record)?;
    log::debug!("Balance file written: {path:?}");

    println!("{}", serde_json::to_string(&record)?);
    Ok(())
}
