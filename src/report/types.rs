/// Observable signals of a single run: informational notices and, at most,
/// one failure message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatus {
    notices: Vec<String>,
    failure: Option<String>,
}

impl RunStatus {
    /// A run that failed before producing any notices.
    pub fn failed(message: impl Into<String>) -> RunStatus {
        let mut status = RunStatus::default();
        status.set_failed(message);
        status
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    /// Mark the run failed. Execution continues; the first message wins.
    pub fn set_failed(&mut self, message: impl Into<String>) {
        if self.failure.is_none() {
            self.failure = Some(message.into());
        }
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}
