//! Fatal parse errors. Non-fatal conditions go through [`crate::diagnostics`].

use thiserror::Error;

use crate::mesh::Attribute;

/// Why a face corner could not be resolved.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FaceIssue {
    #[error("index 0 is invalid, OBJ indices are 1-based")]
    ZeroIndex,
    #[error("references a {0} but none were declared")]
    EmptyPool(Attribute),
    #[error("{attribute} index {index} out of bounds (len={len})")]
    OutOfRange {
        attribute: Attribute,
        index: i64,
        len: usize,
    },
    #[error("invalid index '{0}'")]
    InvalidIndex(String),
    #[error("corner '{0}' has no position index")]
    MissingPosition(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum AssetError {
    #[error("Malformed face on line {line}: {issue}")]
    MalformedFace { line: usize, issue: FaceIssue },
    #[error("Missing {what} on line {line}")]
    MissingValue { line: usize, what: &'static str },
    #[error("Failed to parse {what} '{token}' on line {line}")]
    InvalidNumber {
        line: usize,
        what: &'static str,
        token: String,
    },
    #[error("newmtl without a name on line {line}")]
    MissingMaterialName { line: usize },
    #[error("Too many unique vertices for u32 indices ({count})")]
    TooManyVertices { count: usize },
}

pub type AssetResult<T> = Result<T, AssetError>;

/// Parse a required numeric field of a directive.
pub(crate) fn parse_f32(value: Option<&str>, line: usize, what: &'static str) -> AssetResult<f32> {
    let token = value.ok_or(AssetError::MissingValue { line, what })?;
    token.parse::<f32>().map_err(|_| AssetError::InvalidNumber {
        line,
        what,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f32_reports_line_and_field() {
        assert_eq!(parse_f32(Some("1.5"), 3, "x coordinate"), Ok(1.5));
        assert_eq!(
            parse_f32(None, 7, "y coordinate"),
            Err(AssetError::MissingValue { line: 7, what: "y coordinate" })
        );
        let err = parse_f32(Some("abc"), 2, "shininess").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse shininess 'abc' on line 2");
    }

    #[test]
    fn face_error_message() {
        let err = AssetError::MalformedFace {
            line: 4,
            issue: FaceIssue::EmptyPool(Attribute::Normal),
        };
        assert_eq!(
            err.to_string(),
            "Malformed face on line 4: references a normal but none were declared"
        );
    }
}
