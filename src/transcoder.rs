//! 벌크 결과 변환 모듈
//!
//! 입력 문서를 읽고 각 히트의 `_source`를 한 줄짜리 JSON으로 기록합니다.

use indicatif::ProgressBar;
use memmap2::Mmap;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path;

use crate::cli::WriteMode;
use crate::envelope::{extract_hits, extract_source};
use crate::error::{Result, TranscodeError};
use crate::output::OutputSink;
use crate::stats::Statistics;
use crate::stream;

/// 변환 옵션
#[derive(Debug, Clone, Default)]
pub struct TranscodeOptions {
    /// 잘못된 히트를 건너뛰고 기록 (기본: 즉시 실패)
    pub lenient: bool,
    /// 문서 전체 대신 히트 단위로 파싱
    pub streaming: bool,
    /// 유효성 검사만 수행
    pub validate_only: bool,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl TranscodeOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            mmap_threshold: 10 * 1024 * 1024, // 10MB
            ..Default::default()
        }
    }

    /// lenient 모드 설정
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// 스트리밍 모드 설정
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// 유효성 검사 모드 설정
    pub fn with_validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, mmap_threshold: u64) -> Self {
        self.mmap_threshold = mmap_threshold;
        self
    }
}

/// 입력 파일을 변환해 출력 파일로 저장
///
/// 출력은 임시 파일에 기록되고 성공했을 때만 `output`으로 옮겨집니다.
/// `validate_only`이면 출력 파일을 만들지 않습니다.
pub fn convert(
    input: &Path,
    output: &Path,
    mode: WriteMode,
    options: &TranscodeOptions,
    stats: &mut Statistics,
    progress: &ProgressBar,
) -> Result<()> {
    if options.validate_only {
        return transcode_file(input, &mut io::sink(), options, stats, progress);
    }

    let mut sink = OutputSink::create(output, mode)?;
    transcode_file(input, sink.writer(), options, stats, progress)?;
    sink.commit()
}

/// 입력 파일 하나를 writer로 변환
pub fn transcode_file<W: Write>(
    input: &Path,
    writer: &mut W,
    options: &TranscodeOptions,
    stats: &mut Statistics,
    progress: &ProgressBar,
) -> Result<()> {
    let file_size = input_size(input)?;
    stats.input_bytes = file_size;

    if options.streaming {
        stream::transcode_stream_file(input, file_size, writer, options, stats, progress)
    } else {
        let document = load_document(input, options.mmap_threshold)?;
        transcode_document(&document, writer, options, stats, progress)
    }
}

/// 메모리에 올린 문서를 writer로 변환
///
/// 히트 목록을 한 번 꺼낸 뒤 순서대로 `_source`를 기록하고, 끝나면 writer를 flush합니다.
pub fn transcode_document<W: Write>(
    document: &Value,
    writer: &mut W,
    options: &TranscodeOptions,
    stats: &mut Statistics,
    progress: &ProgressBar,
) -> Result<()> {
    let hits = extract_hits(document)?;
    progress.set_length(hits.len() as u64);

    for (index, hit) in hits.iter().enumerate() {
        emit_hit(hit, index, writer, options, stats)?;
        progress.inc(1);
    }

    writer.flush()?;
    Ok(())
}

/// 히트 하나의 페이로드를 한 줄로 기록
pub(crate) fn emit_hit<W: Write>(
    hit: &Value,
    index: usize,
    writer: &mut W,
    options: &TranscodeOptions,
    stats: &mut Statistics,
) -> Result<()> {
    stats.record_hit();

    let payload = match extract_source(hit, index) {
        Ok(payload) => payload,
        Err(e) if options.lenient && e.is_structural() => {
            stats.record_skipped(index, e.to_string());
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let mut line = serde_json::to_vec(payload).map_err(|e| TranscodeError::WriteError {
        reason: format!("hits.hits[{}] 직렬화 실패: {}", index, e),
    })?;
    line.push(b'\n');

    writer.write_all(&line)?;
    stats.record_written(line.len() as u64);

    Ok(())
}

/// 입력 문서 전체를 파싱
///
/// `mmap_threshold` 이상인 파일은 메모리 매핑으로 읽습니다.
pub fn load_document(path: &Path, mmap_threshold: u64) -> Result<Value> {
    if input_size(path)? >= mmap_threshold {
        parse_with_mmap(path)
    } else {
        parse_with_reader(path)
    }
}

/// 입력 파일 크기 확인
pub(crate) fn input_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TranscodeError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => TranscodeError::ReadError {
                file: path.to_path_buf(),
                reason: e.to_string(),
            },
        })
}

/// 입력 파일 열기
pub(crate) fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| TranscodeError::ReadError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 입력 파일 메모리 매핑
pub(crate) fn map_input(path: &Path) -> Result<Mmap> {
    let file = open_input(path)?;

    // 변환 중 입력 파일이 바뀌지 않는다는 전제
    unsafe {
        Mmap::map(&file).map_err(|e| TranscodeError::ReadError {
            file: path.to_path_buf(),
            reason: format!("메모리 매핑 실패: {}", e),
        })
    }
}

/// 버퍼 리더를 사용한 JSON 파싱
fn parse_with_reader(path: &Path) -> Result<Value> {
    let reader = BufReader::new(open_input(path)?);
    serde_json::from_reader(reader).map_err(|e| parse_error(path, e))
}

/// 메모리 매핑을 사용한 JSON 파싱 (대용량 파일용)
fn parse_with_mmap(path: &Path) -> Result<Value> {
    let mmap = map_input(path)?;
    serde_json::from_slice(&mmap).map_err(|e| parse_error(path, e))
}

/// serde_json 에러를 파싱/읽기 에러로 변환
fn parse_error(path: &Path, e: serde_json::Error) -> TranscodeError {
    if e.is_io() {
        TranscodeError::ReadError {
            file: path.to_path_buf(),
            reason: e.to_string(),
        }
    } else {
        TranscodeError::ParseError {
            file: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(document: &Value, options: &TranscodeOptions) -> (Result<()>, String, Statistics) {
        let mut out = Vec::new();
        let mut stats = Statistics::new();
        let result = transcode_document(
            document,
            &mut out,
            options,
            &mut stats,
            &ProgressBar::hidden(),
        );
        (result, String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_example_document() {
        let doc = json!({"hits": {"hits": [
            {"_source": {"a": 1}, "_id": "x"},
            {"_source": {"b": 2}}
        ]}});

        let (result, out, stats) = run(&doc, &TranscodeOptions::new());
        result.unwrap();
        assert_eq!(out, "{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(stats.written_lines, 2);
        assert_eq!(stats.bytes_written, out.len() as u64);
    }

    #[test]
    fn test_preserves_key_order() {
        let doc: Value =
            serde_json::from_str(r#"{"hits":{"hits":[{"_source":{"z":1,"a":2,"m":{"y":0,"b":1}}}]}}"#)
                .unwrap();

        let (result, out, _) = run(&doc, &TranscodeOptions::new());
        result.unwrap();
        assert_eq!(out, "{\"z\":1,\"a\":2,\"m\":{\"y\":0,\"b\":1}}\n");
    }

    #[test]
    fn test_multiline_strings_stay_on_one_line() {
        let doc = json!({"hits": {"hits": [{"_source": {"msg": "line1\nline2"}}]}});

        let (result, out, _) = run(&doc, &TranscodeOptions::new());
        result.unwrap();
        assert_eq!(out.lines().count(), 1);
        assert_eq!(out, "{\"msg\":\"line1\\nline2\"}\n");
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let doc = json!({"hits": {"hits": [{"_source": 1}, {"not_source": 1}, {"_source": 3}]}});

        let (result, _, stats) = run(&doc, &TranscodeOptions::new());
        match result.unwrap_err() {
            TranscodeError::StructureError { path, .. } => assert_eq!(path, "hits.hits[1]._source"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stats.total_hits, 2);
    }

    #[test]
    fn test_lenient_skips_malformed_hits() {
        let doc = json!({"hits": {"hits": [{"_source": 1}, {"not_source": 1}, "bad", {"_source": 3}]}});

        let options = TranscodeOptions::new().with_lenient(true);
        let (result, out, stats) = run(&doc, &options);
        result.unwrap();

        assert_eq!(out, "1\n3\n");
        assert_eq!(stats.total_hits, 4);
        assert_eq!(stats.skipped_count(), 2);
        assert_eq!(stats.skipped[0].index, 1);
        assert_eq!(stats.skipped[1].index, 2);
    }

    #[test]
    fn test_lenient_keeps_envelope_errors_fatal() {
        let options = TranscodeOptions::new().with_lenient(true);
        let (result, out, _) = run(&json!({"hits": {}}), &options);
        assert!(result.unwrap_err().is_structural());
        assert!(out.is_empty());
    }

    #[test]
    fn test_options_builder() {
        let options = TranscodeOptions::new()
            .with_lenient(true)
            .with_streaming(true)
            .with_validate_only(false)
            .with_mmap_threshold(0);

        assert!(options.lenient);
        assert!(options.streaming);
        assert!(!options.validate_only);
        assert_eq!(options.mmap_threshold, 0);
        assert_eq!(TranscodeOptions::new().mmap_threshold, 10 * 1024 * 1024);
    }
}
