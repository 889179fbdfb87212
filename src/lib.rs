//! jhits - BULK SEARCH RESULT TO JSONL
//!
//! 검색 엔진 벌크 결과 문서에서 각 히트의 `_source` 페이로드를 꺼내
//! 한 줄에 하나씩 JSONL (JSON Lines) 파일로 기록하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 📄 **순서 보존**: 입력 히트 순서 그대로, 페이로드 키 순서도 그대로 출력
//! - 🛡️ **원자적 쓰기**: 실패하면 출력 파일을 남기지 않음
//! - 🌊 **스트리밍 모드**: 문서 전체를 메모리에 올리지 않고 히트 단위로 처리
//! - 🩹 **lenient 모드**: 잘못된 히트를 건너뛰고 개수를 보고
//! - ✅ **유효성 검사**: 출력 없이 문서 구조만 검사
//! - 📊 **상세 통계**: 히트 수, 입출력 용량, 처리 시간 표시
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법
//! jhits -i access-log-raw.json -o access-log.json
//!
//! # 대용량 파일
//! jhits -i huge.json -o out.jsonl --streaming
//!
//! # 유효성 검사만
//! jhits -i access-log-raw.json --validate-only
//! ```

pub mod cli;
pub mod envelope;
pub mod error;
pub mod output;
pub mod stats;
pub mod stream;
pub mod transcoder;

// Re-exports for convenient access
pub use cli::{Args, WriteMode};
pub use envelope::{extract_hits, extract_source};
pub use error::{Result, TranscodeError};
pub use output::OutputSink;
pub use stats::{format_bytes, SkippedHit, Statistics};
pub use stream::for_each_hit;
pub use transcoder::{convert, load_document, transcode_document, transcode_file, TranscodeOptions};
