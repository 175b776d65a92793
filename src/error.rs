use std::{fmt, io};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while parsing a scene file or one of the files it
/// references. Records where in the input the error occurred; `line` and
/// `column` both start at 1 and are computed by the tokenizer when the
/// error is created.
#[derive(Debug)]
pub struct Error {
    pub filename: String,
    pub offset: u64,
    pub line: u64,
    pub column: u64,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            filename: String::new(),
            offset: 0,
            line: 0,
            column: 0,
            kind,
        }
    }

    pub fn has_line_and_column(&self) -> bool {
        self.line > 0 && self.column > 0
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filename.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(
                f,
                "[{}, line {}, column {}] {}",
                self.filename, self.line, self.column, self.kind
            )
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err))
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    // I/O errors.
    #[error("failed to open '{0}'")]
    FileOpen(String),

    #[error("failed to include '{0}' (full path: '{1}')")]
    IncludeOpen(String, String),

    #[error("read error: {0}")]
    Io(#[from] io::Error),

    // Lexical errors.
    #[error("string literal is not terminated")]
    UnterminatedString,

    #[error("string literal exceeds the input buffer size (maximum length = {0})")]
    StringTooLong(usize),

    #[error("expected {0}")]
    ExpectedToken(&'static str),

    #[error("identifier is too long (maximum length = {0})")]
    IdentifierTooLong(usize),

    // Structural errors.
    #[error("unknown directive")]
    UnknownDirective,

    #[error("{0} is not allowed in the {1} section")]
    DirectiveNotAllowed(&'static str, &'static str),

    #[error("failed to parse required arguments for {0}")]
    InvalidArguments(&'static str),

    #[error("unclosed '['")]
    UnclosedBracket,

    #[error("exceeded maximum transform stack size")]
    TransformStackOverflow,

    #[error("exceeded maximum attribute stack size")]
    AttributeStackOverflow,

    #[error("cannot pop the last transform set off the stack")]
    TransformStackUnderflow,

    #[error("cannot pop the last attribute set off the stack")]
    AttributeStackUnderflow,

    #[error("coordinate system '{0}' has not been defined")]
    UnknownCoordinateSystem(String),

    #[error("previous ObjectBegin has not been closed yet")]
    NestedObject,

    #[error("ObjectEnd without a matching ObjectBegin")]
    UnmatchedObjectEnd,

    #[error("ObjectInstance is not allowed inside an object definition")]
    InstanceInObject,

    #[error("maximum include depth exceeded")]
    IncludeDepthExceeded,

    #[error("the current transform is not invertible")]
    NonInvertibleTransform,

    // Parameter errors.
    #[error("failed to parse parameter")]
    InvalidParameter,

    #[error("wrong number of values for '{name}' with type {type_name}, expected a multiple of {components}")]
    WrongComponentCount {
        name: String,
        type_name: &'static str,
        components: u32,
    },

    #[error("required parameter '{0}' is missing or invalid")]
    MissingParameter(&'static str),

    #[error("invalid value for parameter '{0}'")]
    InvalidParameterValue(&'static str),

    #[error("unknown or invalid {0} type")]
    InvalidEnumValue(&'static str),

    #[error("invalid density grid for heterogeneous medium '{0}'")]
    InvalidDensityGrid(String),

    #[error("failed to parse sampled spectrum data")]
    InvalidSpectrumData,

    // PLY errors.
    #[error("'{0}' is not a PLY file")]
    PlyInvalidMagic(String),

    #[error("invalid PLY header in '{0}'")]
    PlyInvalidHeader(String),

    #[error("unknown property type in PLY header")]
    PlyUnknownPropertyType,

    #[error("negative list count in PLY data")]
    PlyNegativeCount,

    #[error("malformed value in PLY data")]
    PlyInvalidValue,

    #[error("unexpected end of PLY data")]
    PlyUnexpectedEof,

    #[error("PLY mesh '{0}' has no vertex positions or no face indices")]
    PlyMissingMeshData(String),

    #[error("PLY face references a vertex out of range")]
    PlyIndexOutOfRange,

    #[error("shape cannot be converted to a triangle mesh")]
    NotTriangulatable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let mut err = Error::new(ErrorKind::UnknownDirective);
        err.filename = "scene.pbrt".to_string();
        err.line = 3;
        err.column = 11;
        assert_eq!(
            err.to_string(),
            "[scene.pbrt, line 3, column 11] unknown directive"
        );
    }

    #[test]
    fn location_known_only_after_set() {
        let err = Error::new(ErrorKind::UnterminatedString);
        assert!(!err.has_line_and_column());
    }
}
