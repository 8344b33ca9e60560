use crate::model::EvalOutput;
use crate::report::progress::{ProgressEvent, ProgressSink};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[must_use]
pub fn format_progress_line(eval_name: &str, done: usize, total: usize) -> String {
    format!("[{}] Evaluating record {}/{}...", eval_name, done, total)
}

pub fn emit_progress_line(line: &str) {
    eprintln!("{}", line);
}

const MIN_GAP: Duration = Duration::from_millis(200);

/// Records between two lines: every record up to 10, then every tenth of the run.
pub(crate) fn progress_step(total: usize) -> usize {
    (total / 10).max(1)
}

/// Decides which completions get a line. The first and last always do; the
/// others only on a step boundary at least [`MIN_GAP`] after the previous line.
#[derive(Debug)]
struct ProgressGate {
    step: usize,
    last_line: Option<Instant>,
}

impl ProgressGate {
    fn new(total: usize) -> Self {
        Self {
            step: progress_step(total),
            last_line: None,
        }
    }

    fn admit(&mut self, ev: ProgressEvent, now: Instant) -> bool {
        let on_step = ev.done == 1 || ev.done % self.step == 0;
        let spaced = self
            .last_line
            .map_or(true, |t| now.saturating_duration_since(t) >= MIN_GAP);
        let admit = ev.done == ev.total || (on_step && spaced);
        if admit {
            self.last_line = Some(now);
        }
        admit
    }
}

/// Stderr progress for one evaluation, or `None` for runs of 0 or 1 record.
pub fn default_progress_sink(eval_name: &str, total: usize) -> Option<ProgressSink> {
    if total <= 1 {
        return None;
    }
    let eval_name = eval_name.to_string();
    let gate = Mutex::new(ProgressGate::new(total));
    Some(Arc::new(move |ev: ProgressEvent| {
        let admitted = gate
            .lock()
            .expect("progress gate poisoned")
            .admit(ev, Instant::now());
        if admitted {
            emit_progress_line(&format_progress_line(&eval_name, ev.done, ev.total));
        }
    }))
}

pub fn print_eval_summary(outputs: &[EvalOutput]) {
    eprintln!();
    for out in outputs {
        eprintln!(
            "{} on {} ({} records)",
            out.eval_name, out.dataset_name, out.num_records
        );
        for score in &out.dataset_scores {
            eprintln!("  {:<32} {:.4}", score.name, score.value);
        }
        if let Some(path) = &out.output_path {
            eprintln!("  records: {}", path.display());
        }
    }
}
