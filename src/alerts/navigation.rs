use crate::error::{NotifyError, Result};
use crate::settings::Settings;

/// Opens a ScrumFlow view in response to an alert being activated.
pub trait Navigator: Send + Sync {
    fn open_project(&self, project_id: &str) -> Result<()>;
}

/// Opens the web client's project page in the default browser.
pub struct BrowserNavigator {
    app_base_url: String,
}

impl BrowserNavigator {
    pub fn new(app_base_url: impl Into<String>) -> Self {
        Self {
            app_base_url: app_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.app_base_url.clone())
    }

    pub fn project_url(&self, project_id: &str) -> String {
        format!("{}/projects/{}", self.app_base_url, project_id)
    }
}

impl Navigator for BrowserNavigator {
    fn open_project(&self, project_id: &str) -> Result<()> {
        let url = self.project_url(project_id);
        tracing::info!("Opening project view: {}", url);
        webbrowser::open(&url).map_err(|e| NotifyError::Navigation(format!("{}: {}", url, e)))
    }
}
