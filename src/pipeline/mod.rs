// Outreach pipelines — the batch passes the binary runs on a schedule.
//
// `initial` enrolls new leads by sending the first message and creating
// their records. `followup` walks every tracked record and sends whichever
// follow-up stage is due. Both follow the same shape: load the store, work
// through recipients one paced send at a time, checkpoint, save.

pub mod followup;
pub mod initial;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a pass over `len` items, or a hidden one.
pub(crate) fn progress_bar(len: usize, label: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    let template = format!("  {label} [{{bar:30}}] {{pos}}/{{len}} ({{eta}})");
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}
