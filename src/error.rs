//! 에러 타입 정의 모듈
//!
//! jhits에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 파싱 에러, 문서 구조 에러, 입출력 에러 세 갈래로 나뉘며 모두 즉시 실행을 중단시킵니다.

use serde_json::Value;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// jhits에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// 입력 파일이 존재하지 않음
    #[error("입력 파일을 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력 파일 읽기 실패
    #[error("파일을 읽을 수 없습니다 ({file}): {reason}")]
    ReadError { file: PathBuf, reason: String },

    /// JSON 파싱 실패
    #[error("JSON 파싱 실패 ({file}): {reason}")]
    ParseError { file: PathBuf, reason: String },

    /// `hits.hits[]._source` 구조 위반
    #[error("문서 구조 오류 ({path}): {reason}")]
    StructureError { path: String, reason: String },

    /// 출력 파일이 이미 존재 (Error 모드에서)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패: {reason}")]
    WriteError { reason: String },
}

impl TranscodeError {
    /// 필수 필드 누락 에러 생성
    pub fn missing_field(path: impl Into<String>) -> Self {
        TranscodeError::StructureError {
            path: path.into(),
            reason: "필수 필드가 없습니다".to_string(),
        }
    }

    /// 타입 불일치 에러 생성
    pub fn unexpected_type(path: impl Into<String>, expected: &str, found: &Value) -> Self {
        TranscodeError::StructureError {
            path: path.into(),
            reason: format!(
                "{} 타입이어야 하지만 {} 타입입니다",
                expected,
                json_type_name(found)
            ),
        }
    }

    /// 문서 구조 에러인지 확인
    pub fn is_structural(&self) -> bool {
        matches!(self, TranscodeError::StructureError { .. })
    }
}

impl From<io::Error> for TranscodeError {
    fn from(e: io::Error) -> Self {
        TranscodeError::WriteError {
            reason: e.to_string(),
        }
    }
}

/// JSON 값의 타입 이름
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// jhits 결과 타입 별칭
pub type Result<T> = std::result::Result<T, TranscodeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unexpected_type_message() {
        let error = TranscodeError::unexpected_type("hits.hits", "array", &json!({"a": 1}));
        let msg = error.to_string();
        assert!(msg.contains("hits.hits"));
        assert!(msg.contains("array 타입이어야 하지만 object 타입입니다"));
        assert!(error.is_structural());
    }

    #[test]
    fn test_io_error_maps_to_write_error() {
        let error: TranscodeError = io::Error::new(io::ErrorKind::Other, "disk full").into();
        assert!(matches!(error, TranscodeError::WriteError { .. }));
        assert!(!error.is_structural());
    }
}
