use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use sha2::{Digest, Sha256};

/// Largest upload the service accepts.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Stores analysed leaf images under content-addressed keys.
#[derive(Clone)]
pub struct S3Service {
    client: Client,
    bucket_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum S3ServiceError {
    #[error("S3 error: {0}")]
    S3(String),
    #[error("Unsupported image type: {0}")]
    InvalidFormat(String),
    #[error("File too large")]
    FileTooLarge,
}

impl S3Service {
    pub fn new(client: Client, bucket_name: String) -> Self {
        Self {
            client,
            bucket_name,
        }
    }

    pub fn calculate_image_hash(image_data: &[u8]) -> String {
        hex::encode(Sha256::digest(image_data))
    }

    pub fn generate_s3_key(image_hash: &str, file_extension: &str) -> String {
        format!("images/{}.{}", image_hash, file_extension)
    }

    pub fn extract_file_extension(mime_type: &str) -> Result<&'static str, S3ServiceError> {
        match mime_type {
            "image/jpeg" | "image/jpg" => Ok("jpg"),
            "image/png" => Ok("png"),
            "image/webp" => Ok("webp"),
            "image/gif" => Ok("gif"),
            "image/bmp" => Ok("bmp"),
            other => Err(S3ServiceError::InvalidFormat(other.to_string())),
        }
    }

    pub fn validate_image_size(image_data: &[u8]) -> Result<(), S3ServiceError> {
        if image_data.len() > MAX_IMAGE_BYTES {
            return Err(S3ServiceError::FileTooLarge);
        }
        Ok(())
    }

    pub async fn exists(&self, s3_key: &str) -> bool {
        self.client
            .head_object()
            .bucket(&self.bucket_name)
            .key(s3_key)
            .send()
            .await
            .is_ok()
    }

    pub async fn upload_image(
        &self,
        image_data: &[u8],
        s3_key: &str,
        mime_type: &str,
    ) -> Result<(), S3ServiceError> {
        S3Service::validate_image_size(image_data)?;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(s3_key)
            .body(ByteStream::from(image_data.to_vec()))
            .content_type(mime_type)
            .send()
            .await
            .map_err(|e| S3ServiceError::S3(e.to_string()))?;

        log::debug!("Uploaded s3://{}/{}", self.bucket_name, s3_key);
        Ok(())
    }
}
