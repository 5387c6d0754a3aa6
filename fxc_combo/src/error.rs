use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("error reading shader source {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file {path:?} is included recursively")]
    CircularInclude { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("combo {name:?} range {range:?} is not of the form \"MIN..MAX\"")]
    MalformedRange { name: String, range: String },

    #[error("duplicate static combo {name:?}")]
    DuplicateStatic { name: String },

    #[error("duplicate dynamic combo {name:?}")]
    DuplicateDynamic { name: String },

    #[error("centroid TEXCOORD{index} does not fit in a 32 bit mask")]
    CentroidOutOfRange { index: String },
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("combination count overflows a 64 bit integer at combo {name:?}")]
    Overflow { name: String },
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("no recognized shader model suffix in shader name {name:?}")]
    UnrecognizedSuffix { name: String },
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error("error reading shader list {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} line {line} does not reference a .fxc, .vsh, or .psh file: {text:?}")]
    UnrecognizedEntry {
        path: PathBuf,
        line: usize,
        text: String,
    },
}

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("error flattening shader source")]
    Source(#[from] SourceError),

    #[error("error extracting combo annotations")]
    Extract(#[from] ExtractError),

    #[error("error computing the combo index layout")]
    Index(#[from] IndexError),

    #[error("error inferring the target profile")]
    Profile(#[from] ProfileError),
}
