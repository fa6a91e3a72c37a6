use serde::Deserialize;

/// Body of `POST /api/send`, as JSON or urlencoded form
#[derive(Debug, Clone, Deserialize)]
pub struct SendForm {
    /// IP address of the console
    pub address: String,
    /// File in the data directory to install
    pub name: String,
}

impl SendForm {
    pub fn is_complete(&self) -> bool {
        !self.address.trim().is_empty() && !self.name.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub name: String,
}
