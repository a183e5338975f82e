//! Uploads domain - file validation and blob storage uploads

pub mod errors;
pub mod naming;
pub mod profiles;
pub mod uploader;
pub mod validator;

pub use errors::UploadError;
pub use profiles::{profile, UploadProfile};
pub use uploader::{
    blob_name_from_url, BlobUploader, UploadOptions, UploadOutcome, UploadRequest, UploadedBlob,
};
pub use validator::{validate_file, FileCandidate, ValidationResult};
