// Session credentials: the raw cookie header value copied from a logged-in
// browser session. Loaded once at startup and never modified afterwards.

use std::io;
use std::path::Path;

use tracing::warn;

/// Opaque cookie string used to authenticate every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    cookie: String,
}

impl Credentials {
    /// Sanitize a raw cookie string. Surrounding whitespace and any embedded
    /// line breaks are removed so the value can't smuggle extra headers.
    pub fn new(raw: &str) -> Self {
        let cookie = raw.trim().chars().filter(|c| *c != '\r' && *c != '\n').collect();
        Credentials { cookie }
    }

    /// Read the cookie file. A missing file only produces a warning and empty
    /// credentials; requests will then be rejected by the remote side.
    pub fn load(path: &Path) -> io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Credentials::new(&raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "cookie file not found, requests will likely be unauthorized"
                );
                Ok(Credentials::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn is_empty(&self) -> bool {
        self.cookie.is_empty()
    }
}

// Never print the cookie itself.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &format_args!("<{} bytes>", self.cookie.len()))
            .finish()
    }
}
