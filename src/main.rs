use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod decision;
mod input;
mod paths;
mod policy;
mod scan;
mod transcript;

use decision::Decision;
use input::HookInput;

const LOG_ENV: &str = "QA_GATE_LOG";

/// Log to stderr only; stdout carries the hook response.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .compact()
        .init();
}

/// Always exits 0. The decision travels in the JSON payload, and every
/// failure allows the stop so the hook can never wedge a session.
fn main() -> ExitCode {
    init_tracing();

    let mut raw = String::new();
    let decision = match io::stdin().read_to_string(&mut raw) {
        Ok(_) => evaluate(&raw, std::env::var_os(config::CONFIG_ENV).map(PathBuf::from)),
        Err(e) => {
            tracing::warn!("failed to read hook input: {e}");
            Decision::Allow
        }
    };

    if let Err(e) = decision.emit(&mut io::stdout().lock()) {
        tracing::warn!("failed to write hook response: {e:#}");
    }

    ExitCode::SUCCESS
}

/// Decide whether the session may stop, given the raw hook input.
fn evaluate(raw: &str, config_override: Option<PathBuf>) -> Decision {
    let Some(input) = HookInput::parse(raw) else {
        return Decision::Allow;
    };
    let session = input.session_id.as_deref().unwrap_or("unknown");

    // Claude is already continuing because of an earlier block; don't loop
    if input.stop_hook_active {
        tracing::debug!(session, "stop hook already active, allowing stop");
        return Decision::Allow;
    }

    let Some(transcript_path) = input.transcript_path() else {
        tracing::debug!(session, "no transcript path, allowing stop");
        return Decision::Allow;
    };

    let config = config::resolve(input.cwd.as_deref(), config_override);
    let records = transcript::read_records(transcript_path);
    let flags = scan::scan(&records, &config);
    let missing = policy::missing_actions(&flags, &config.require);

    if missing.is_empty() {
        tracing::debug!(session, "all required actions observed");
    } else {
        tracing::info!(session, missing = missing.len(), "blocking stop");
    }

    Decision::from_missing(missing)
}
