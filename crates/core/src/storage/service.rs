//! Evidence storage service implementation using Apache OpenDAL.

use chrono::NaiveDate;
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// A workbook persisted to object storage.
#[derive(Debug, Clone)]
pub struct StoredEvidence {
    /// Storage key within the bucket/container.
    pub storage_key: String,
    /// Publicly reachable URL for the stored file.
    pub file_url: String,
    /// Sanitized filename as stored.
    pub file_name: String,
}

/// Storage service for evidence workbooks.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };
        Ok(operator)
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Generate the storage key for an evidence workbook.
    ///
    /// Format: `cashups/{user_id}/{date_key}/{report_id}/{sanitized_filename}`
    #[must_use]
    pub fn evidence_key(
        user_id: Uuid,
        date_key: NaiveDate,
        report_id: Uuid,
        filename: &str,
    ) -> String {
        format!(
            "cashups/{user_id}/{}/{report_id}/{}",
            date_key.format("%Y-%m-%d"),
            sanitize_filename(filename)
        )
    }

    /// Persist an evidence workbook and return where it landed.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the write fails.
    pub async fn store_evidence(
        &self,
        user_id: Uuid,
        date_key: NaiveDate,
        report_id: Uuid,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredEvidence, StorageError> {
        self.validate_upload(content_type, bytes.len() as u64)?;

        let key = Self::evidence_key(user_id, date_key, report_id, filename);
        self.operator.write(&key, bytes).await?;

        Ok(StoredEvidence {
            file_url: self.url_for(&key),
            file_name: sanitize_filename(filename),
            storage_key: key,
        })
    }

    /// Public URL for a stored key.
    #[must_use]
    pub fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            key
        )
    }

    /// Read a stored file back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buf = self.operator.read(key).await?;
        Ok(buf.to_vec())
    }

    /// Delete a file from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Sanitize filename for storage keys.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

    fn local_service() -> StorageService {
        let config = StorageConfig::new(
            StorageProvider::local_fs("./test-storage"),
            "http://localhost:3000/files",
        );
        StorageService::from_config(config).expect("should create service")
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cashup.xlsx"), "cashup.xlsx");
        assert_eq!(
            sanitize_filename("till report (1).xlsx"),
            "till_report__1_.xlsx"
        );
        assert_eq!(sanitize_filename("test@#$%.xlsx"), "test____.xlsx");
    }

    #[test]
    fn test_evidence_key_layout() {
        let user_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("valid uuid");
        let report_id =
            Uuid::parse_str("6ba7b811-9dad-11d1-80b4-00c04fd430c8").expect("valid uuid");
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");

        let key = StorageService::evidence_key(user_id, date, report_id, "cashup.xlsx");
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], "cashups");
        assert_eq!(parts[1], user_id.to_string());
        assert_eq!(parts[2], "2025-03-14");
        assert_eq!(parts[3], report_id.to_string());
        assert_eq!(parts[4], "cashup.xlsx");
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let config = StorageConfig::new(
            StorageProvider::local_fs("./test-storage"),
            "http://localhost:3000/files/",
        );
        let service = StorageService::from_config(config).expect("should create service");
        assert_eq!(
            service.url_for("cashups/a/b"),
            "http://localhost:3000/files/cashups/a/b"
        );
    }

    #[test]
    fn test_validate_upload_size() {
        let config = StorageConfig::new(
            StorageProvider::local_fs("./test-storage"),
            "http://localhost:3000/files",
        )
        .with_max_file_size(1024);
        let service = StorageService::from_config(config).expect("should create service");

        assert!(service.validate_upload(XLSX_MIME, 512).is_ok());
        let err = service.validate_upload(XLSX_MIME, 2048).unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    #[test]
    fn test_validate_upload_mime_type() {
        let service = local_service();

        assert!(service.validate_upload(XLSX_MIME, 1024).is_ok());
        assert!(service.validate_upload("application/vnd.ms-excel", 1024).is_ok());

        let err = service.validate_upload("text/html", 1024).unwrap_err();
        assert!(matches!(err, StorageError::InvalidMimeType { .. }));
    }
}
