//! Multi-item delete with per-item outcome counting.

use tracing::{info, warn};

use crate::client::BackendClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkDeleteReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkDeleteReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Operator-facing summary lines: a success line and/or a failure line,
    /// each only when its count is nonzero.
    pub fn messages(&self) -> (Option<String>, Option<String>) {
        let ok = (self.succeeded > 0).then(|| {
            format!(
                "Successfully deleted {} classification{}!",
                self.succeeded,
                plural(self.succeeded)
            )
        });
        let err = (self.failed > 0).then(|| {
            format!(
                "Failed to delete {} classification{}.",
                self.failed,
                plural(self.failed)
            )
        });
        (ok, err)
    }
}

fn plural(n: usize) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

/// Delete every filename in order.  A failure never stops the batch.
pub async fn bulk_delete<I, S>(client: &BackendClient, filenames: I) -> BulkDeleteReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = BulkDeleteReport::default();
    for filename in filenames {
        let filename = filename.as_ref();
        match client.delete_classification(filename).await {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                warn!("[bulk] delete {} failed: {}", filename, e);
                report.failed += 1;
            }
        }
    }
    info!(
        "[bulk] deleted {}/{} classifications",
        report.succeeded,
        report.total()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_for_partial_failure() {
        let report = BulkDeleteReport {
            succeeded: 2,
            failed: 1,
        };
        let (ok, err) = report.messages();
        assert_eq!(ok.as_deref(), Some("Successfully deleted 2 classifications!"));
        assert_eq!(err.as_deref(), Some("Failed to delete 1 classification."));
    }

    #[test]
    fn test_messages_omit_zero_counts() {
        let report = BulkDeleteReport {
            succeeded: 1,
            failed: 0,
        };
        let (ok, err) = report.messages();
        assert_eq!(ok.as_deref(), Some("Successfully deleted 1 classification!"));
        assert!(err.is_none());
        assert_eq!(BulkDeleteReport::default().messages(), (None, None));
    }
}
