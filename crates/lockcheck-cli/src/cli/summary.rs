//! End-of-run summary printed to stdout.

use lockcheck_core::pipeline::{PipelineOutcome, StageSummary};
use std::fmt::Write as _;

fn stage_line(s: &StageSummary) -> Option<String> {
    if s.skipped {
        return Some(format!("{}: skipped", s.stage));
    }
    let counts = s.counts?;
    let mut line = format!(
        "{}: {} total, {} ok, {} failed",
        s.stage,
        counts.total,
        counts.succeeded(),
        counts.failed
    );
    if counts.not_started > 0 {
        let _ = write!(line, ", {} not started", counts.not_started);
    }
    Some(line)
}

/// One line per pooled or skipped stage, then every failed dependency.
pub fn render_summary(outcome: &PipelineOutcome) -> String {
    let mut out = String::new();
    for line in outcome.stages.iter().filter_map(stage_line) {
        let _ = writeln!(out, "{}", line);
    }
    if outcome.failure_count() > 0 {
        let _ = writeln!(out, "\n{} failed dependencies:", outcome.failure_count());
        for (_, f) in outcome.failures() {
            let _ = writeln!(out, "  {} [{}]: {}", f.key, f.kind.as_str(), f.message);
        }
    }
    out
}
