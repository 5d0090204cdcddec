//! Terminal rendering of notifications and upload progress.

use reportdrop_notify::{NotificationSink, Severity};
use reportdrop_upload::{SlotSnapshot, UploadEvent};

/// Prints notifications to stderr.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        eprintln!("[{}] {title}", tag(severity));
        for line in message.lines() {
            eprintln!("    {line}");
        }
    }
}

fn tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warn",
        Severity::Error => "error",
        Severity::Success => "ok",
    }
}

/// One progress line per event, or `None` for events not worth printing.
pub fn render_event(event: &UploadEvent) -> Option<String> {
    match event {
        UploadEvent::Started { key, total_chunks } => {
            Some(format!("{key}: uploading ({total_chunks} chunk(s))"))
        }
        UploadEvent::Progress {
            key,
            chunk_index,
            total_chunks,
            progress,
        } => Some(format!(
            "{key}: chunk {}/{total_chunks} {progress}%",
            chunk_index + 1
        )),
        UploadEvent::Completed { key } => Some(format!("{key}: done")),
        UploadEvent::Failed { .. } | UploadEvent::Aborted { .. } => None,
    }
}

/// Final per-slot status table.
pub fn render_snapshots(snapshots: &[SlotSnapshot]) -> String {
    let mut out = String::new();
    for s in snapshots {
        let file = s.file_name.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "{:<16} {:<10} {:>3}%  {file}\n",
            s.key,
            format!("{:?}", s.status).to_lowercase(),
            s.progress
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportdrop_protocol::SlotStatus;

    #[test]
    fn progress_line_is_one_based() {
        let line = render_event(&UploadEvent::Progress {
            key: "labor".into(),
            chunk_index: 1,
            total_chunks: 3,
            progress: 67,
        });
        assert_eq!(line.as_deref(), Some("labor: chunk 2/3 67%"));
    }

    #[test]
    fn snapshot_table_lists_each_slot() {
        let table = render_snapshots(&[SlotSnapshot {
            key: "labor".into(),
            label: "Daily Labor Report".into(),
            file_name: Some("labor.csv".into()),
            file_size: Some(10),
            status: SlotStatus::Uploaded,
            progress: 100,
            loading: false,
        }]);
        assert!(table.contains("uploaded"));
        assert!(table.contains("100%"));
        assert!(table.contains("labor.csv"));
    }
}
