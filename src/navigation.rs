//! Navigation capability: what a marker click does.

use crate::Result;

/// Performs a full-page navigation, replacing the current view
pub trait Navigator {
    fn navigate(&mut self, url: &str) -> Result<()>;
}

/// Logs the target URL; the default for hosts without a browser
#[derive(Debug, Default)]
pub struct LogNavigator {
    last: Option<String>,
}

impl LogNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl Navigator for LogNavigator {
    fn navigate(&mut self, url: &str) -> Result<()> {
        log::info!("navigating to {}", url);
        self.last = Some(url.to_string());
        Ok(())
    }
}

/// Records every navigation in order
#[derive(Debug, Default, Clone)]
pub struct RecordingNavigator {
    pub visited: Vec<String>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.visited.push(url.to_string());
        Ok(())
    }
}
