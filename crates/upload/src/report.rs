//! Maps upload results to user-facing notifications.

use reportdrop_notify::{NotificationSink, Severity};
use reportdrop_transfer::FileHandle;

use crate::batch::BatchCoordinator;
use crate::error::UploadError;
use crate::registry::FileRegistry;
use crate::transport::ChunkTransport;
use crate::types::{BatchMetadata, BatchReport};

/// Emits the notifications for a finished batch.
///
/// At most one notification per kind: a success summary, an error listing
/// the files that failed, and a warning listing the files that were
/// cancelled. Labels are newline-joined.
pub fn notify_batch(report: &BatchReport, sink: &dyn NotificationSink) {
    let attempted = report.succeeded.len() + report.failed.len();

    if !report.succeeded.is_empty() {
        let message = if report.failed.is_empty() {
            "All files uploaded successfully.".to_string()
        } else {
            format!(
                "{} of {attempted} files uploaded successfully.",
                report.succeeded.len()
            )
        };
        sink.notify(Severity::Success, "Upload Complete", &message);
    }

    let (aborted, failed): (Vec<_>, Vec<_>) = report.failed.iter().partition(|f| f.aborted);

    if !failed.is_empty() {
        let title = if report.succeeded.is_empty() {
            "Upload Failed"
        } else {
            "Partial Upload Failure"
        };
        let labels: Vec<&str> = failed.iter().map(|f| f.label.as_str()).collect();
        let message = format!(
            "The following files failed to upload:\n{}",
            labels.join("\n")
        );
        sink.notify(Severity::Error, title, &message);
    }

    if !aborted.is_empty() {
        let labels: Vec<&str> = aborted.iter().map(|f| f.label.as_str()).collect();
        let message = format!(
            "{}\n{}",
            UploadError::Aborted.display_message(),
            labels.join("\n")
        );
        sink.notify(Severity::Warning, UploadError::Aborted.title(), &message);
    }
}

/// Emits the notification for an error raised before or outside a batch.
pub fn notify_error(err: &UploadError, sink: &dyn NotificationSink) {
    sink.notify(Severity::Error, err.title(), &err.display_message());
}

/// [`FileRegistry::assign`], notifying the user when the file is rejected.
pub fn assign_and_notify(
    registry: &FileRegistry,
    key: &str,
    file: FileHandle,
    sink: &dyn NotificationSink,
) -> Result<(), UploadError> {
    registry
        .assign(key, file)
        .inspect_err(|e| notify_error(e, sink))
}

/// [`BatchCoordinator::submit_all`] followed by the matching notifications.
pub async fn submit_and_notify(
    coordinator: &BatchCoordinator,
    transport: &dyn ChunkTransport,
    metadata: &BatchMetadata,
    sink: &dyn NotificationSink,
) -> Result<BatchReport, UploadError> {
    match coordinator.submit_all(transport, metadata).await {
        Ok(report) => {
            notify_batch(&report, sink);
            Ok(report)
        }
        Err(e) => {
            notify_error(&e, sink);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, csv_file};
    use crate::types::{FailedSlot, UploadedSlot};
    use chrono::NaiveDate;
    use reportdrop_notify::NotificationQueue;
    use reportdrop_protocol::ReportType;
    use std::sync::Arc;

    fn ok(label: &str) -> UploadedSlot {
        UploadedSlot {
            key: label.to_lowercase(),
            label: label.into(),
        }
    }

    fn failed(label: &str, aborted: bool) -> FailedSlot {
        FailedSlot {
            key: label.to_lowercase(),
            label: label.into(),
            error: "x".into(),
            aborted,
        }
    }

    #[test]
    fn all_success_single_notification() {
        let q = NotificationQueue::new();
        let report = BatchReport {
            succeeded: vec![ok("A"), ok("B")],
            failed: vec![],
        };
        notify_batch(&report, &q);
        let items = q.snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].severity, Severity::Success);
        assert_eq!(items[0].title, "Upload Complete");
    }

    #[test]
    fn partial_failure_emits_both() {
        let q = NotificationQueue::new();
        let report = BatchReport {
            succeeded: vec![ok("A")],
            failed: vec![failed("B", false), failed("C", false)],
        };
        notify_batch(&report, &q);
        let items = q.snapshot();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].severity, Severity::Success);
        assert_eq!(items[0].message, "1 of 3 files uploaded successfully.");
        assert_eq!(items[1].severity, Severity::Error);
        assert_eq!(items[1].title, "Partial Upload Failure");
        assert_eq!(
            items[1].message,
            "The following files failed to upload:\nB\nC"
        );
    }

    #[test]
    fn total_failure_has_no_success() {
        let q = NotificationQueue::new();
        let report = BatchReport {
            succeeded: vec![],
            failed: vec![failed("A", false)],
        };
        notify_batch(&report, &q);
        let items = q.snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Upload Failed");
    }

    #[test]
    fn cancelled_files_reported_as_canceled() {
        let q = NotificationQueue::new();
        let report = BatchReport {
            succeeded: vec![],
            failed: vec![failed("A", true), failed("B", true)],
        };
        notify_batch(&report, &q);
        let items = q.snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].severity, Severity::Warning);
        assert_eq!(items[0].title, "Canceled");
        assert_eq!(items[0].message, "Upload was canceled by the user.\nA\nB");
    }

    #[test]
    fn rejected_assignment_notifies() {
        let q = NotificationQueue::new();
        let reg = FileRegistry::default();
        let bad = FileHandle::new("report.txt", "text/plain", b"x".to_vec());
        assert!(assign_and_notify(&reg, "labor", bad, &q).is_err());
        let items = q.snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Invalid File Type");

        assert!(assign_and_notify(&reg, "labor", csv_file("ok.csv", 1), &q).is_ok());
        assert_eq!(q.len(), 1);
    }

    #[tokio::test]
    async fn batch_with_failing_second_file() {
        let reg = Arc::new(
            FileRegistry::new(vec![
                ReportType::new("one", "Report One"),
                ReportType::new("two", "Report Two"),
                ReportType::new("three", "Report Three"),
            ])
            .unwrap(),
        );
        for key in ["one", "two", "three"] {
            reg.assign(key, csv_file(&format!("{key}.csv"), 6)).unwrap();
        }
        let transport = MockTransport::new();
        transport.fail_at("two", 0, "HTTP 500");
        let coordinator = BatchCoordinator::new(Arc::clone(&reg)).with_chunk_size(4);
        let q = NotificationQueue::new();
        let meta = BatchMetadata::for_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        submit_and_notify(&coordinator, &transport, &meta, &q)
            .await
            .unwrap();

        let items = q.snapshot();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].severity, Severity::Success);
        assert_eq!(items[1].severity, Severity::Error);
        assert!(items[1].message.contains("Report Two"));
        assert!(!items[1].message.contains("Report One"));
    }

    #[tokio::test]
    async fn precondition_failure_notifies_once() {
        let coordinator = BatchCoordinator::new(Arc::new(FileRegistry::default()));
        let q = NotificationQueue::new();
        let result = submit_and_notify(
            &coordinator,
            &MockTransport::new(),
            &BatchMetadata::default(),
            &q,
        )
        .await;
        assert!(result.is_err());
        let items = q.snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Date Required");
        assert_eq!(
            items[0].message,
            "Please select a report date before uploading."
        );
    }
}
