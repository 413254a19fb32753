//! Download sink that records tasks instead of writing anything.

use std::cell::RefCell;
use std::path::PathBuf;

use feedgrab_core::sink::{DownloadId, DownloadReceipt, DownloadSink, DownloadSource, DownloadTask, SinkError};

#[derive(Default)]
pub struct RecordingSink {
    tasks: RefCell<Vec<DownloadTask>>,
    /// URL substrings the sink refuses with HTTP 403.
    refuse: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing(patterns: &[&str]) -> Self {
        Self {
            tasks: RefCell::default(),
            refuse: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn tasks(&self) -> Vec<DownloadTask> {
        self.tasks.borrow().clone()
    }

    pub fn destinations(&self) -> Vec<PathBuf> {
        self.tasks.borrow().iter().map(|t| t.destination.clone()).collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.tasks
            .borrow()
            .iter()
            .filter_map(|t| match &t.source {
                DownloadSource::Url(u) => Some(u.clone()),
                DownloadSource::Captured(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl DownloadSink for RecordingSink {
    async fn submit(&self, task: DownloadTask) -> Result<DownloadReceipt, SinkError> {
        if let DownloadSource::Url(url) = &task.source {
            if self.refuse.iter().any(|p| url.contains(p.as_str())) {
                return Err(SinkError::Http {
                    url: url.clone(),
                    status: 403,
                });
            }
        }
        let bytes = match &task.source {
            DownloadSource::Url(_) => 0,
            DownloadSource::Captured(m) => m.bytes.len() as u64,
        };
        let path = task.destination.clone();
        let mut tasks = self.tasks.borrow_mut();
        tasks.push(task);
        Ok(DownloadReceipt {
            id: DownloadId(tasks.len() as u64),
            path,
            bytes,
        })
    }
}
