//! 벌크 결과 봉투(envelope) 해석 모듈
//!
//! `{"hits": {"hits": [{"_source": ...}, ...]}}` 형태에서 히트 목록과
//! 각 히트의 `_source` 페이로드를 꺼냅니다. 그 밖의 필드는 읽지 않습니다.

use serde_json::Value;

use crate::error::{Result, TranscodeError};

/// 바깥/안쪽 히트 필드 이름
pub const HITS_FIELD: &str = "hits";

/// 페이로드 필드 이름
pub const SOURCE_FIELD: &str = "_source";

/// 루트 문서를 가리키는 경로
pub const ROOT_PATH: &str = "$";

/// 안쪽 히트 배열 경로
pub const HIT_LIST_PATH: &str = "hits.hits";

/// 문서에서 `hits.hits` 배열을 꺼냄
///
/// 두 단계 모두 존재하고 타입이 맞아야 하며, 그렇지 않으면 문서 전체가 실패합니다.
pub fn extract_hits(document: &Value) -> Result<&[Value]> {
    let root = document
        .as_object()
        .ok_or_else(|| TranscodeError::unexpected_type(ROOT_PATH, "object", document))?;

    let outer = root
        .get(HITS_FIELD)
        .ok_or_else(|| TranscodeError::missing_field(HITS_FIELD))?;
    let outer = outer
        .as_object()
        .ok_or_else(|| TranscodeError::unexpected_type(HITS_FIELD, "object", outer))?;

    let inner = outer
        .get(HITS_FIELD)
        .ok_or_else(|| TranscodeError::missing_field(HIT_LIST_PATH))?;
    inner
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| TranscodeError::unexpected_type(HIT_LIST_PATH, "array", inner))
}

/// 히트 하나에서 `_source` 페이로드를 꺼냄
///
/// # Arguments
/// * `hit` - `hits.hits` 배열의 원소
/// * `index` - 배열 내 위치 (에러 경로에 사용)
pub fn extract_source(hit: &Value, index: usize) -> Result<&Value> {
    let fields = hit
        .as_object()
        .ok_or_else(|| TranscodeError::unexpected_type(hit_path(index), "object", hit))?;

    fields
        .get(SOURCE_FIELD)
        .ok_or_else(|| TranscodeError::missing_field(format!("{}.{}", hit_path(index), SOURCE_FIELD)))
}

/// `hits.hits[index]` 형태의 경로 문자열
pub fn hit_path(index: usize) -> String {
    format!("{}[{}]", HIT_LIST_PATH, index)
}
