use super::result::{Outcome, RequestResult};

/// Outcome counts over a finished run's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub total: u64,
    pub responses: u64,
    /// Responses outside 2xx. Counted within `responses`.
    pub non_success_status: u64,
    pub failures: u64,
    /// Failures caused by a timeout. Counted within `failures`.
    pub timeouts: u64,
    pub cancelled: u64,
}

impl RunTally {
    pub fn record(&mut self, result: &RequestResult) {
        self.total = self.total.saturating_add(1);
        match &result.outcome {
            Outcome::Response(record) => {
                self.responses = self.responses.saturating_add(1);
                if !record.status.is_success() {
                    self.non_success_status = self.non_success_status.saturating_add(1);
                }
            }
            Outcome::Failed(err) => {
                self.failures = self.failures.saturating_add(1);
                if err.is_timeout() {
                    self.timeouts = self.timeouts.saturating_add(1);
                }
            }
            Outcome::Cancelled => {
                self.cancelled = self.cancelled.saturating_add(1);
            }
        }
    }

    #[must_use]
    pub fn from_results<'res, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'res RequestResult>,
    {
        let mut tally = Self::default();
        for result in results {
            tally.record(result);
        }
        tally
    }
}
