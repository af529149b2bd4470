use crate::ServiceError;

/// Where attachments go and which ones are accepted.
#[derive(Debug, Clone)]
pub struct AttachmentPolicy {
    pub bucket: String,
    /// Leading key segment, e.g. `wr` in `wr/<folder>/<name><ext>`.
    pub prefix: String,
    /// Public URL base, ending in `/`.
    pub public_host: String,
    pub content_type: String,
    /// Lowercase.
    pub allowed_folders: Vec<String>,
    /// Lowercase, with the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            bucket: "image-wreg".into(),
            prefix: "wr".into(),
            public_host: "https://storage.googleapis.com/".into(),
            content_type: "image/png".into(),
            allowed_folders: vec!["todo_attachment".into()],
            allowed_extensions: vec![".jpeg".into(), ".jpg".into(), ".png".into()],
        }
    }
}

impl AttachmentPolicy {
    /// Case-insensitive.
    pub fn check_folder(&self, folder: &str) -> Result<(), ServiceError> {
        let lower = folder.to_lowercase();
        if self.allowed_folders.iter().any(|f| *f == lower) {
            Ok(())
        } else {
            Err(ServiceError::BadRequest(format!(
                "invalid bucket name '{folder}'"
            )))
        }
    }

    /// Case-insensitive. `extension` includes the leading dot.
    pub fn check_extension(&self, extension: &str) -> Result<(), ServiceError> {
        let lower = extension.to_lowercase();
        if self.allowed_extensions.iter().any(|e| *e == lower) {
            Ok(())
        } else {
            Err(ServiceError::BadRequest(format!(
                "invalid file extension '{extension}'"
            )))
        }
    }

    pub fn object_key(&self, folder: &str, name_param: &str, extension: &str) -> String {
        format!("{}/{folder}/{name_param}{extension}", self.prefix)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}{}/{key}", self.public_host, self.bucket)
    }
}

/// Extension of a file name including the leading dot, or empty when there
/// is none. Only the final component counts.
pub fn extension_of(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(i) => &base[i..],
        None => "",
    }
}
