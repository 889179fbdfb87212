//! 스트리밍 변환 모듈
//!
//! 문서 전체를 `Value`로 만들지 않고 `hits.hits` 배열을 따라가며 히트를 하나씩
//! 넘겨줍니다. 최대 메모리는 대략 히트 하나 크기로 제한됩니다.
//!
//! 구조 에러의 경로는 전체 문서 모드와 같습니다 (`$`, `hits`, `hits.hits`,
//! `hits.hits[i]._source`).

use indicatif::ProgressBar;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::de::{IoRead, Read, SliceRead};
use serde_json::error::Category;
use serde_json::Value;
use std::fmt;
use std::io::{BufReader, Write};
use std::path::Path;

use crate::envelope::{HITS_FIELD, HIT_LIST_PATH, ROOT_PATH};
use crate::error::{Result, TranscodeError};
use crate::stats::Statistics;
use crate::transcoder::{emit_hit, map_input, open_input, TranscodeOptions};

/// 입력 파일을 스트리밍으로 변환
pub fn transcode_stream_file<W: Write>(
    input: &Path,
    file_size: u64,
    writer: &mut W,
    options: &TranscodeOptions,
    stats: &mut Statistics,
    progress: &ProgressBar,
) -> Result<()> {
    if file_size >= options.mmap_threshold {
        let mmap = map_input(input)?;
        transcode_stream(SliceRead::new(&mmap), input, writer, options, stats, progress)
    } else {
        let reader = BufReader::new(open_input(input)?);
        transcode_stream(IoRead::new(reader), input, writer, options, stats, progress)
    }
}

/// 임의의 JSON 입력을 스트리밍으로 변환
pub fn transcode_stream<'de, R, W>(
    read: R,
    origin: &Path,
    writer: &mut W,
    options: &TranscodeOptions,
    stats: &mut Statistics,
    progress: &ProgressBar,
) -> Result<()>
where
    R: Read<'de>,
    W: Write,
{
    for_each_hit(read, origin, |index, hit| {
        emit_hit(&hit, index, &mut *writer, options, &mut *stats)?;
        progress.inc(1);
        Ok(())
    })?;

    writer.flush()?;
    Ok(())
}

/// `hits.hits`의 각 원소를 순서대로 콜백에 넘김
///
/// 콜백이 에러를 돌려주면 파싱을 멈추고 그 에러를 그대로 반환합니다.
/// 문서 끝 뒤에 남은 내용이 있으면 파싱 에러입니다.
///
/// # Returns
/// 방문한 히트 수
pub fn for_each_hit<'de, R, F>(read: R, origin: &Path, on_hit: F) -> Result<usize>
where
    R: Read<'de>,
    F: FnMut(usize, Value) -> Result<()>,
{
    let mut de = serde_json::Deserializer::new(read);
    let mut state = StreamState {
        on_hit,
        path: ROOT_PATH,
        visited: 0,
        failure: None,
    };

    let outcome = RootSeed(&mut state)
        .deserialize(&mut de)
        .and_then(|()| de.end());

    match outcome {
        Ok(()) => Ok(state.visited),
        Err(e) => Err(match state.failure.take() {
            Some(failure) => failure,
            None => classify(e, state.path, origin),
        }),
    }
}

/// serde_json 에러를 에러 분류에 맞게 변환
fn classify(e: serde_json::Error, path: &str, origin: &Path) -> TranscodeError {
    match e.classify() {
        Category::Data => TranscodeError::StructureError {
            path: path.to_string(),
            reason: e.to_string(),
        },
        Category::Io => TranscodeError::ReadError {
            file: origin.to_path_buf(),
            reason: e.to_string(),
        },
        Category::Syntax | Category::Eof => TranscodeError::ParseError {
            file: origin.to_path_buf(),
            reason: e.to_string(),
        },
    }
}

struct StreamState<F> {
    on_hit: F,
    path: &'static str,
    visited: usize,
    failure: Option<TranscodeError>,
}

impl<F> StreamState<F> {
    /// 실제 에러를 보관하고 파서를 멈출 serde 에러를 만듦
    fn fail<E: de::Error>(&mut self, err: TranscodeError) -> E {
        let msg = err.to_string();
        self.failure = Some(err);
        E::custom(msg)
    }
}

/// 루트 객체: `hits` 외의 필드는 건너뜀
struct RootSeed<'s, F>(&'s mut StreamState<F>);

/// 바깥 `hits` 객체: 안쪽 `hits` 외의 필드는 건너뜀
struct OuterHitsSeed<'s, F>(&'s mut StreamState<F>);

/// 안쪽 `hits` 배열
struct HitListSeed<'s, F>(&'s mut StreamState<F>);

impl<'de, 's, F> DeserializeSeed<'de> for RootSeed<'s, F>
where
    F: FnMut(usize, Value) -> Result<()>,
{
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, 's, F> Visitor<'de> for RootSeed<'s, F>
where
    F: FnMut(usize, Value) -> Result<()>,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("`hits` 필드를 가진 JSON 객체")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        let state = self.0;
        let mut seen = false;

        while let Some(key) = map.next_key::<String>()? {
            if key != HITS_FIELD {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            if seen {
                return Err(de::Error::duplicate_field(HITS_FIELD));
            }
            seen = true;

            state.path = HITS_FIELD;
            map.next_value_seed(OuterHitsSeed(&mut *state))?;
            state.path = ROOT_PATH;
        }

        if !seen {
            return Err(state.fail(TranscodeError::missing_field(HITS_FIELD)));
        }
        Ok(())
    }
}

impl<'de, 's, F> DeserializeSeed<'de> for OuterHitsSeed<'s, F>
where
    F: FnMut(usize, Value) -> Result<()>,
{
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, 's, F> Visitor<'de> for OuterHitsSeed<'s, F>
where
    F: FnMut(usize, Value) -> Result<()>,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("`hits` 배열을 가진 객체")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        let state = self.0;
        let mut seen = false;

        while let Some(key) = map.next_key::<String>()? {
            if key != HITS_FIELD {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            if seen {
                return Err(de::Error::duplicate_field(HITS_FIELD));
            }
            seen = true;

            state.path = HIT_LIST_PATH;
            map.next_value_seed(HitListSeed(&mut *state))?;
            state.path = HITS_FIELD;
        }

        if !seen {
            return Err(state.fail(TranscodeError::missing_field(HIT_LIST_PATH)));
        }
        Ok(())
    }
}

impl<'de, 's, F> DeserializeSeed<'de> for HitListSeed<'s, F>
where
    F: FnMut(usize, Value) -> Result<()>,
{
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, 's, F> Visitor<'de> for HitListSeed<'s, F>
where
    F: FnMut(usize, Value) -> Result<()>,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("히트 배열")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        let state = self.0;

        while let Some(hit) = seq.next_element::<Value>()? {
            let index = state.visited;
            state.visited += 1;

            if let Err(err) = (state.on_hit)(index, hit) {
                return Err(state.fail(err));
            }
        }
        Ok(())
    }
}
