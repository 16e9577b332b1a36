//! Ledger import tests
//!
//! The importer re-reads the commission source only when its content
//! checksum changes, skips malformed rows without aborting the batch, and
//! upserts by (agent_code, month, year).

use advance_portal_core_rs::ledger::import::{refresh_from_path, RefreshOutcome};
use advance_portal_core_rs::{CommissionLedger, Month, MonthKey};
use std::io::Write;

fn mar() -> MonthKey {
    MonthKey::new(Month::Mar, 2026)
}

const HEADER: &str = "agent_code,agent_name,amount,month,year,tel_no,email,unit,agency,region\n";

fn write_source(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("commissions.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{}{}", HEADER, body).unwrap();
    path
}

#[test]
fn test_import_from_file_and_checksum_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(
        &dir,
        "A100,Jane Wanjiru,30000,Mar,2026,0700000000,jane@example.com,Unit 4,Upper Hill,Nairobi\n",
    );

    let mut ledger = CommissionLedger::new();
    let outcome = refresh_from_path(&mut ledger, &path).unwrap();
    assert_eq!(outcome, RefreshOutcome::Applied { rows: 1, skipped: 0 });

    let record = ledger.lookup("A100", mar()).unwrap();
    assert_eq!(record.amount(), Some(3_000_000));
    assert_eq!(record.agency(), Some("Upper Hill"));

    // Unchanged file content: refresh is a no-op
    let outcome = refresh_from_path(&mut ledger, &path).unwrap();
    assert_eq!(outcome, RefreshOutcome::Unchanged);
}

#[test]
fn test_changed_content_reimports_and_upserts_by_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "A100,Jane Wanjiru,30000,Mar,2026,,,,,\n");

    let mut ledger = CommissionLedger::new();
    refresh_from_path(&mut ledger, &path).unwrap();
    assert_eq!(ledger.lookup("A100", mar()).unwrap().amount(), Some(3_000_000));

    // Commission run restates Jane's March amount and adds April
    let path = write_source(
        &dir,
        "A100,Jane Wanjiru,45000,Mar,2026,,,,,\nA100,Jane Wanjiru,20000,Apr,2026,,,,,\n",
    );
    let outcome = refresh_from_path(&mut ledger, &path).unwrap();
    assert_eq!(outcome, RefreshOutcome::Applied { rows: 2, skipped: 0 });

    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.lookup("A100", mar()).unwrap().amount(), Some(4_500_000));
    assert_eq!(
        ledger
            .lookup("A100", MonthKey::new(Month::Apr, 2026))
            .unwrap()
            .amount(),
        Some(2_000_000)
    );
}

#[test]
fn test_malformed_rows_never_corrupt_clean_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(
        &dir,
        "A100,Jane Wanjiru,30000,Mar,2026,,,,,\n\
         A300,Bad Month,1000,Marzo,2026,,,,,\n\
         A400,Bad Year,1000,Mar,twenty,,,,,\n\
         A500,Kamau N.,60000.50,Mar,2026,,,,,\n",
    );

    let mut ledger = CommissionLedger::new();
    let outcome = refresh_from_path(&mut ledger, &path).unwrap();
    assert_eq!(outcome, RefreshOutcome::Applied { rows: 2, skipped: 2 });

    assert_eq!(ledger.lookup("A100", mar()).unwrap().amount(), Some(3_000_000));
    assert_eq!(ledger.lookup("A500", mar()).unwrap().amount(), Some(6_000_050));
    assert!(ledger.lookup("A300", mar()).is_err());
    assert!(ledger.lookup("A400", mar()).is_err());
}

#[test]
fn test_blank_amount_imports_as_incomplete_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "A200,Otieno O.,,Mar,2026,,,,,\n");

    let mut ledger = CommissionLedger::new();
    refresh_from_path(&mut ledger, &path).unwrap();

    // The record exists, so eligibility must report DataIncomplete
    assert!(ledger.lookup("A200", mar()).is_ok());
    assert!(ledger.eligible_amount("A200", mar()).is_err());
}

#[test]
fn test_missing_source_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = CommissionLedger::new();
    let missing = dir.path().join("nowhere.csv");
    assert!(refresh_from_path(&mut ledger, &missing).is_err());
}
