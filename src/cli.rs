//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::transcoder::TranscodeOptions;

/// 출력 파일이 이미 있을 때의 동작
///
/// 기존 내용 뒤에 덧붙이는 모드는 제공하지 않습니다.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum WriteMode {
    /// 기존 파일이 있으면 새 내용으로 교체
    #[default]
    Overwrite,
    /// 기존 파일이 있으면 에러
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// jhits CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "jhits",
    author = "YourName <your@email.com>",
    version,
    about = "BULK SEARCH RESULT TO JSONL - 검색 결과 _source 페이로드를 JSONL로 추출하는 CLI 도구",
    long_about = r#"
BULK SEARCH RESULT TO JSONL
===========================

검색 엔진 벌크 결과 문서({"hits": {"hits": [...]}})에서
각 히트의 _source 값을 한 줄씩 JSONL 파일로 추출합니다.

특징:
  • 페이로드 키 순서 보존, 입력 순서 그대로 출력
  • 실패 시 출력 파일을 남기지 않는 원자적 쓰기
  • 대용량 입력을 위한 스트리밍 모드
  • 잘못된 히트를 건너뛰는 lenient 모드 (선택)

예제:
  jhits -i access-log-raw.json -o access-log.json
  jhits -i dump.json -o out.jsonl --mode error
  jhits -i huge.json -o out.jsonl --streaming
  jhits -i dump.json --validate-only
  jhits -i dump.json -o out.jsonl --lenient --log skipped.log
"#
)]
pub struct Args {
    /// 벌크 결과 JSON 파일 경로
    #[arg(short, long, default_value = "access-log-raw.json")]
    pub input: PathBuf,

    /// 생성될 JSONL 파일 경로
    #[arg(short, long, default_value = "access-log.json")]
    pub output: PathBuf,

    /// 출력 파일이 이미 있을 때의 동작
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 잘못된 히트를 건너뛰고 개수를 보고 (기본: 즉시 실패)
    #[arg(long)]
    pub lenient: bool,

    /// 문서 전체를 메모리에 올리지 않고 히트를 하나씩 처리
    #[arg(long)]
    pub streaming: bool,

    /// 문서 구조 검사만 수행 (출력 파일 없음)
    #[arg(long)]
    pub validate_only: bool,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 건너뛴 히트 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl Args {
    /// 인자를 변환 옵션으로 변환
    pub fn transcode_options(&self) -> TranscodeOptions {
        TranscodeOptions::new()
            .with_lenient(self.lenient)
            .with_streaming(self.streaming)
            .with_validate_only(self.validate_only)
    }
}
