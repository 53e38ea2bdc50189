use std::io::{self, BufRead, BufWriter, Write};
use std::process::ExitCode;

use fsrs_scheduler::config::Config;
use fsrs_scheduler::logging::{init_tracing, LogSettings};
use fsrs_scheduler::response::{json_ok, ErrorResponse};
use fsrs_scheduler::{submit_review_json, Scheduler};

/// Reads one review submission per stdin line and answers with one JSON line on stdout.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    // Subscriber first, so fallbacks reported while reading the config are visible.
    let _log_guard = init_tracing(&LogSettings::from_env());
    let config = Config::from_env();

    let scheduler = match Scheduler::new(config.scheduler) {
        Ok(scheduler) => scheduler,
        Err(err) => {
            tracing::error!(error = %err, "scheduler configuration rejected");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        request_retention = scheduler.config().request_retention,
        maximum_interval = scheduler.config().maximum_interval,
        fuzz = scheduler.config().enable_fuzz,
        "fsrs-review ready"
    );

    match run(&scheduler, io::stdin().lock(), io::stdout().lock()) {
        Ok(processed) => {
            tracing::info!(processed, "input exhausted, shutting down");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "I/O failure");
            ExitCode::FAILURE
        }
    }
}

fn run(scheduler: &Scheduler, input: impl BufRead, output: impl Write) -> io::Result<u64> {
    let mut out = BufWriter::new(output);
    let mut processed = 0u64;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let rendered = match submit_review_json(scheduler, &line) {
            Ok(outcome) => serde_json::to_string(&json_ok(outcome)),
            Err(err) => {
                tracing::warn!(line = index + 1, error = %err, "review submission rejected");
                serde_json::to_string(&ErrorResponse::from(&err))
            }
        }
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(out, "{rendered}")?;
        out.flush()?;
        processed += 1;
    }

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_answers_each_line() {
        let scheduler = Scheduler::default();
        let input = concat!(
            r#"{"rating":"good","reviewedAt":"2026-02-09T10:00:00Z"}"#,
            "\n\n",
            r#"{"rating":"manual","reviewedAt":"2026-02-09T10:00:00Z"}"#,
            "\n",
            "not json\n",
        );
        let mut output = Vec::new();
        let processed = run(&scheduler, input.as_bytes(), &mut output).unwrap();
        assert_eq!(processed, 3);

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["success"], true);
        assert_eq!(lines[0]["data"]["card"]["state"], "learning");
        assert_eq!(lines[1]["code"], "VALIDATION_ERROR");
        assert_eq!(lines[2]["code"], "BAD_REQUEST");
    }
}
