use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported image type: {0} (expected png, jpg, jpeg, gif or bmp)")]
    UnsupportedExtension(String),
    #[error("image path has no file name: {0}")]
    MissingFileName(String),
    #[error("image already uploaded as {existing}")]
    DuplicateImage { existing: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
