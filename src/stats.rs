//! 통계 및 유틸리티 모듈
//!
//! 변환 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::path::Path;
use std::time::{Duration, Instant};

/// 건너뛴 히트 정보 (lenient 모드)
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedHit {
    /// `hits.hits` 배열 내 위치
    pub index: usize,
    /// 건너뛴 이유
    pub reason: String,
}

/// 변환 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 입력 파일 크기
    pub input_bytes: u64,
    /// 방문한 히트 수
    pub total_hits: usize,
    /// 출력한 라인 수
    pub written_lines: usize,
    /// 쓴 총 바이트 (개행 포함)
    pub bytes_written: u64,
    /// 건너뛴 히트 목록
    pub skipped: Vec<SkippedHit>,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 히트 방문 기록
    pub fn record_hit(&mut self) {
        self.total_hits += 1;
    }

    /// 라인 출력 기록
    pub fn record_written(&mut self, bytes: u64) {
        self.written_lines += 1;
        self.bytes_written += bytes;
    }

    /// 건너뛴 히트 기록
    pub fn record_skipped(&mut self, index: usize, reason: String) {
        self.skipped.push(SkippedHit { index, reason });
    }

    /// 건너뛴 히트 수 반환
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 변환 통계 요약 출력
    pub fn print_summary(&self, output: &Path) {
        let skipped = self.skipped_count();

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 변환 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 히트:    {}",
            "📋".bright_cyan(),
            self.total_hits
        );
        println!(
            "  {} 출력 라인:    {}",
            "✅".bright_green(),
            self.written_lines.to_string().green()
        );

        if skipped > 0 {
            println!(
                "  {} 건너뜀:       {}",
                "⚠️".bright_yellow(),
                skipped.to_string().yellow()
            );
        }

        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.input_bytes)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.bytes_written)
        );
        println!("  {} 출력 파일:    {:?}", "📄".bright_green(), output);
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }

    /// 유효성 검사 통계 요약 출력
    pub fn print_validation_summary(&self) {
        let skipped = self.skipped_count();

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 🔍 유효성 검사 결과".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 히트:    {}",
            "📋".bright_cyan(),
            self.total_hits
        );
        println!(
            "  {} 유효:         {}",
            "✅".bright_green(),
            self.written_lines.to_string().green()
        );

        if skipped > 0 {
            println!(
                "  {} 무효:         {}",
                "❌".bright_red(),
                skipped.to_string().red()
            );
        } else {
            println!("  {} 무효:         {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.input_bytes)
        );
        println!(
            "  {} 검사 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use jhits::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
