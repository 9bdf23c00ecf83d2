use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unexpected container structure: wrong mimetype, missing
    /// mandatory manifest node, unreadable archive.
    #[error("invalid HWPX package: {0}")]
    Format(String),

    /// An IR value has no writer.
    #[error("unsupported element: {0}")]
    UnsupportedElement(String),

    /// An image references a binary item that is not in the supplied map.
    #[error("missing binary item: {0}")]
    MissingAsset(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }
}

pub(crate) fn open_file(path: &std::path::Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            Error::Io(io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        }
        _ => Error::Io(e),
    })
}
