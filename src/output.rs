//! 출력 파일 모듈
//!
//! 대상 경로와 같은 폴더의 임시 파일에 기록한 뒤, 성공했을 때만 대상 경로로
//! 이름을 바꿉니다. `commit` 없이 drop되면 임시 파일은 삭제되고 대상 경로는 그대로 남습니다.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::cli::WriteMode;
use crate::error::{Result, TranscodeError};

/// 원자적 JSONL 출력 싱크
#[derive(Debug)]
pub struct OutputSink {
    target: PathBuf,
    mode: WriteMode,
    writer: BufWriter<NamedTempFile>,
}

impl OutputSink {
    /// 출력 싱크 생성
    ///
    /// # Arguments
    /// * `target` - 최종 출력 파일 경로
    /// * `mode` - 대상이 이미 있을 때의 동작
    pub fn create(target: &Path, mode: WriteMode) -> Result<Self> {
        check_output_mode(target, mode)?;

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".jhits-").suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }

        let temp = builder
            .tempfile_in(dir)
            .map_err(|e| TranscodeError::WriteError {
                reason: format!("임시 파일 생성 실패 ({}): {}", dir.display(), e),
            })?;

        Ok(Self {
            target: target.to_path_buf(),
            mode,
            writer: BufWriter::new(temp),
        })
    }

    /// 라인을 기록할 writer
    pub fn writer(&mut self) -> &mut BufWriter<NamedTempFile> {
        &mut self.writer
    }

    /// 버퍼를 비우고 임시 파일을 대상 경로로 옮김
    pub fn commit(self) -> Result<()> {
        let temp = self
            .writer
            .into_inner()
            .map_err(|e| TranscodeError::from(e.into_error()))?;
        temp.as_file().sync_all()?;

        let persisted = match self.mode {
            WriteMode::Overwrite => temp.persist(&self.target),
            WriteMode::Error => temp.persist_noclobber(&self.target),
        };

        persisted.map(|_| ()).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                TranscodeError::OutputExists {
                    path: self.target.clone(),
                }
            } else {
                TranscodeError::WriteError {
                    reason: format!("{:?}로 이동 실패: {}", self.target, e.error),
                }
            }
        })
    }
}

/// 출력 모드 확인
fn check_output_mode(target: &Path, mode: WriteMode) -> Result<()> {
    if mode == WriteMode::Error && target.exists() {
        return Err(TranscodeError::OutputExists {
            path: target.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_commit_writes_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.jsonl");

        let mut sink = OutputSink::create(&target, WriteMode::Overwrite).unwrap();
        writeln!(sink.writer(), "{{\"a\":1}}").unwrap();
        assert!(!target.exists());

        sink.commit().unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"a\":1}\n");
    }

    #[test]
    fn test_drop_without_commit_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.jsonl");

        {
            let mut sink = OutputSink::create(&target, WriteMode::Overwrite).unwrap();
            writeln!(sink.writer(), "partial").unwrap();
        }

        assert!(!target.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_overwrite_replaces_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.jsonl");
        fs::write(&target, "stale line\nstale line\n").unwrap();

        let mut sink = OutputSink::create(&target, WriteMode::Overwrite).unwrap();
        writeln!(sink.writer(), "1").unwrap();
        sink.commit().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "1\n");
    }

    #[test]
    fn test_error_mode_rejects_existing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.jsonl");
        fs::write(&target, "keep\n").unwrap();

        let result = OutputSink::create(&target, WriteMode::Error);
        assert!(matches!(result, Err(TranscodeError::OutputExists { .. })));
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep\n");
    }
}
