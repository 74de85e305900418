// Bulk import via multipart upload.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::MonitorClient;
use crate::error::Error;
use crate::models::ImportSummary;

impl MonitorClient {
    /// Upload a file listing endpoints to register.
    ///
    /// `POST /apis/upload` with the contents in multipart field `file`. The
    /// service owns the file format and reports how many entries it added
    /// and how many it skipped.
    pub async fn bulk_import(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ImportSummary, Error> {
        debug!(file_name, bytes = contents.len(), "uploading import file");
        let part = Part::bytes(contents)
            .file_name(file_name.to_owned())
            .mime_str("text/plain")?;
        let form = Form::new().part("file", part);
        let url = self.url("apis/upload")?;
        self.post_multipart(url, form).await
    }
}
