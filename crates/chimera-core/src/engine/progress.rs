/// Progress events emitted by long-running engine phases.
///
/// A phase contains zero or more tasks; a task counts discrete steps such as
/// ligand atoms scanned or overlap integrals evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { label: String, total: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.callback.is_none()
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn silent_reporter_drops_events() {
        let reporter = ProgressReporter::new();
        assert!(reporter.is_silent());
        reporter.report(Progress::PhaseFinish);
    }

    #[test]
    fn callback_receives_events_in_order() {
        let events = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|e| {
                events.lock().unwrap().push(e);
            }));
            reporter.report(Progress::PhaseStart { name: "Distances" });
            reporter.report(Progress::TaskStart {
                label: "2lueA".to_string(),
                total: 3,
            });
            reporter.report(Progress::TaskIncrement);
        }
        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], Progress::PhaseStart { name: "Distances" });
        assert_eq!(events[2], Progress::TaskIncrement);
    }
}
