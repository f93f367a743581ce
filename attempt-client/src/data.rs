use crate::prelude::*;
use attempt_session::mock::MockBackend;
use attempt_session::Collaborators;
use clap::ArgEnum;
use std::sync::Arc;

/// Where the questions come from and where the code goes.
#[derive(Debug, Clone, Copy, ArgEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Http,
    Mock,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "localhost")]
    pub base_url: String,
    /// Bearer token of the student.
    #[serde(default)]
    pub token: Option<String>,
}

fn localhost() -> String {
    "http://localhost:5001".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: localhost(),
            token: None,
        }
    }
}

/// An opened data source.
pub struct Opened {
    pub collaborators: Collaborators,
    /// Set for the mock source, so the submission can be dumped afterwards.
    pub mock: Option<Arc<MockBackend>>,
}

cfg_if! {
    if #[cfg(feature = "http")] {
        fn open_http(cfg: &HttpConfig) -> Result<Opened> {
            let backend = Arc::new(crate::data_http::HttpBackend::new(cfg));
            Ok(Opened {
                collaborators: Collaborators::from_backend(backend),
                mock: None,
            })
        }
    } else {
        fn open_http(_cfg: &HttpConfig) -> Result<Opened> {
            Err(Error::Disabled("HTTP backend"))
        }
    }
}

pub fn open(source: DataSource, test_id: &str, http: &HttpConfig) -> Result<Opened> {
    match source {
        DataSource::Http => {
            info!("using HTTP backend at {}", http.base_url);
            open_http(http)
        }
        DataSource::Mock => {
            let backend = crate::data_mock::load(test_id)?;
            Ok(Opened {
                collaborators: Collaborators::from_backend(backend.clone()),
                mock: Some(backend),
            })
        }
    }
}
