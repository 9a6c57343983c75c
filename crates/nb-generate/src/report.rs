//! Run summary.

/// Outcome of a page task that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageStatus {
    /// Output file written.
    Rendered,
    /// Page is not published; content was fetched or checked but not rendered.
    Skipped,
}

/// A page task that failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageFailure {
    /// Dashless page id.
    pub page_id: String,
    pub message: String,
}

/// Counts and failures of one `generate` run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub total: usize,
    /// Pages fetched from the source in this run.
    pub updated: usize,
    pub published: usize,
    pub rendered: usize,
    pub skipped: usize,
    pub failures: Vec<PageFailure>,
}

impl GenerateReport {
    /// Process exit code: 0 when every page task succeeded.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.failures.is_empty())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn record(&mut self, page_id: &str, outcome: Result<PageStatus, String>) {
        match outcome {
            Ok(PageStatus::Rendered) => self.rendered += 1,
            Ok(PageStatus::Skipped) => self.skipped += 1,
            Err(message) => self.failures.push(PageFailure {
                page_id: page_id.to_owned(),
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_exit_code() {
        let mut report = GenerateReport::default();
        report.record("a", Ok(PageStatus::Rendered));
        report.record("b", Ok(PageStatus::Skipped));
        assert_eq!(report.exit_code(), 0);
        assert_eq!((report.rendered, report.skipped), (1, 1));

        report.record("c", Err("boom".to_owned()));
        assert_eq!(report.exit_code(), 1);
        assert_eq!(
            report.failures,
            vec![PageFailure {
                page_id: "c".to_owned(),
                message: "boom".to_owned()
            }]
        );
    }
}
