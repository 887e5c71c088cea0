use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ImageStore;
use crate::domain::product::ImageUpload;

pub const UPLOAD_URL_PREFIX: &str = "/uploads/";

/// Keeps product images as files in one directory, addressed by
/// `/uploads/<file name>`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, url: &str) -> Result<PathBuf, DomainError> {
        let name = url
            .strip_prefix(UPLOAD_URL_PREFIX)
            .filter(|name| {
                !name.is_empty()
                    && !name.contains(|c: char| c == '/' || c == '\\')
                    && !name.starts_with('.')
            })
            .ok_or_else(|| DomainError::Internal(format!("'{url}' is not a stored image")))?;
        Ok(self.dir.join(name))
    }
}

impl ImageStore for LocalImageStore {
    fn store(&self, upload: &ImageUpload) -> Result<String, DomainError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| DomainError::Internal(format!("cannot create upload dir: {e}")))?;
        let name = format!("{}.{}", Uuid::new_v4(), upload.kind.extension());
        fs::write(self.dir.join(&name), &upload.bytes)
            .map_err(|e| DomainError::Internal(format!("cannot write image: {e}")))?;
        Ok(format!("{UPLOAD_URL_PREFIX}{name}"))
    }

    fn delete(&self, url: &str) -> Result<(), DomainError> {
        match fs::remove_file(self.path_for(url)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Internal(format!("cannot delete {url}: {e}"))),
        }
    }
}
