//! File input and report artifact tests.

use std::fs;
use std::time::Duration;

use tempfile::tempdir;

use mailvet_core::{
    read_candidates, write_valid_emails, AppError, Candidate, Report, RunReport, Stats, Status,
    VerificationMode, VerificationResult,
};

fn result(raw: &str, status: Status) -> VerificationResult {
    VerificationResult {
        candidate: Candidate::new(raw),
        status,
        reason: Some("scripted".to_string()),
        elapsed: Duration::from_millis(7),
    }
}

fn sample_run() -> RunReport {
    RunReport {
        results: vec![
            result("a@x.com", Status::Valid),
            result("b@x.com", Status::MailboxRejected),
        ],
        stats: Stats {
            valid: 1,
            mailbox_rejected: 1,
            total: 2,
            ..Stats::default()
        },
        elapsed: Duration::from_secs(3),
    }
}

#[test]
fn csv_inputs_take_the_first_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("list.csv");
    fs::write(&path, "a@x.com,Alice\n# comment line\n\nb@y.com,Bob\n").unwrap();

    let candidates = read_candidates(&path).unwrap();
    assert_eq!(candidates, ["a@x.com", "b@y.com"]);
}

#[test]
fn message_files_are_scanned_for_addresses() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("thread.eml");
    fs::write(
        &path,
        "From: Alice <alice@corp.example>\n\
         To: bob@corp.example, carol@other.example\n\
         \n\
         Please loop in bob@corp.example before Friday.\n",
    )
    .unwrap();

    let candidates = read_candidates(&path).unwrap();
    assert_eq!(
        candidates,
        [
            "alice@corp.example",
            "bob@corp.example",
            "carol@other.example",
            "bob@corp.example",
        ]
    );
}

#[test]
fn missing_input_files_are_io_errors() {
    let dir = tempdir().unwrap();
    let error = read_candidates(&dir.path().join("absent.csv")).err().unwrap();
    assert!(matches!(error, AppError::Io(_)));
}

#[test]
fn valid_emails_csv_lists_only_deliverable_addresses() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("valid_emails.csv");
    let results = vec![
        result("a@x.com", Status::Valid),
        result("b@x.com", Status::MailboxRejected),
        result("c@x.com", Status::Valid),
        result("d@x.com", Status::Timeout),
    ];

    write_valid_emails(&path, &results).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Email\na@x.com\nc@x.com\n"
    );
}

#[test]
fn json_report_carries_stats_and_results() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    let run = sample_run();
    let report = Report::new(VerificationMode::Smtp, &run);

    report.write_json(&path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(value["mode"], "smtp");
    assert_eq!(value["stats"]["valid"], 1);
    assert_eq!(value["stats"]["total"], 2);
    assert_eq!(value["deliverability_rate"], 0.5);
    assert_eq!(value["results"][0]["candidate"]["normalized"], "a@x.com");
    assert_eq!(value["results"][0]["status"], "valid");
    assert_eq!(value["results"][0]["latency_ms"], 7);
}

#[test]
fn text_report_is_readable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.txt");
    let run = sample_run();
    let report = Report::new(VerificationMode::Smtp, &run);

    report.write_text(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("Verification summary"));
    assert!(text.contains("a@x.com"));
    assert!(text.contains("mailbox-rejected"));
    assert!(text.contains("50.0%"));
}
