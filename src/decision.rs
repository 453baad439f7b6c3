use anyhow::Result;
use serde::Serialize;
use std::io::Write;

const REASON_HEADER: &str = "Before completing, please:";

/// Outcome of a hook run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Print nothing; Claude may stop
    Allow,
    /// Keep Claude working until these actions are done
    Block { missing: Vec<String> },
}

/// JSON written to stdout when blocking
#[derive(Debug, Serialize)]
struct BlockResponse<'a> {
    decision: &'static str,
    reason: &'a str,
}

impl Decision {
    pub fn from_missing(missing: Vec<String>) -> Self {
        if missing.is_empty() {
            Decision::Allow
        } else {
            Decision::Block { missing }
        }
    }

    /// Header line followed by one bullet per missing action
    pub fn reason(&self) -> Option<String> {
        match self {
            Decision::Allow => None,
            Decision::Block { missing } => {
                let mut reason = String::from(REASON_HEADER);
                for item in missing {
                    reason.push_str("\n- ");
                    reason.push_str(item);
                }
                Some(reason)
            }
        }
    }

    /// Write the hook response. Nothing is written for `Allow`.
    pub fn emit(&self, out: &mut impl Write) -> Result<()> {
        if let Some(reason) = self.reason() {
            let response = BlockResponse {
                decision: "block",
                reason: &reason,
            };
            serde_json::to_writer(&mut *out, &response)?;
            writeln!(out)?;
            out.flush()?;
        }
        Ok(())
    }
}
