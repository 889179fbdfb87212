//! jhits - BULK SEARCH RESULT TO JSONL
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use jhits::{
    cli::Args,
    stats::{SkippedHit, Statistics},
    transcoder::convert,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // 입력 파일 확인
    validate_input(&args)?;

    // 헤더 출력
    print_header(&args);

    let options = args.transcode_options();
    let mut stats = Statistics::new();
    let pb = create_progress_bar(args.streaming)?;

    if args.validate_only {
        println!("\n{}", "🔍 유효성 검사 중...".bright_cyan());
    } else {
        println!("\n{}", "⚡ 변환 중...".bright_cyan());
    }

    let outcome = convert(&args.input, &args.output, args.mode, &options, &mut stats, &pb);
    pb.finish_and_clear();

    if let Err(e) = outcome {
        println!(
            "\n{} 변환 실패, 출력 파일을 만들지 않았습니다.",
            "❌".bright_red()
        );
        return Err(e).context(format!("{:?} 변환 실패", args.input));
    }

    // 건너뛴 히트 출력
    print_skipped(&stats.skipped, args.verbose);

    // 로그 파일 작성
    if let Some(ref log_path) = args.log {
        write_skip_log(log_path, &args.input, &stats.skipped)?;
    }

    if args.validate_only {
        stats.print_validation_summary();

        if stats.skipped_count() == 0 {
            println!("\n{} 문서 구조가 유효합니다!\n", "✅".bright_green());
        } else {
            println!(
                "\n{} {} 개의 히트에 오류가 있습니다.\n",
                "⚠️".bright_yellow(),
                stats.skipped_count().to_string().red()
            );
        }
    } else {
        stats.print_summary(&args.output);
        println!("\n{} 저장 완료: {:?}\n", "✅".bright_green(), args.output);
    }

    Ok(())
}

/// 입력 경로 유효성 검사
fn validate_input(args: &Args) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("입력 파일이 존재하지 않습니다: {:?}", args.input);
    }

    if !args.input.is_file() {
        anyhow::bail!("입력 경로가 파일이 아닙니다: {:?}", args.input);
    }

    Ok(())
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🚀 BULK SEARCH RESULT TO JSONL".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 파일: {:?}", "📂".bright_cyan(), args.input);

    if !args.validate_only {
        println!("  {} 출력 파일: {:?}", "📄".bright_green(), args.output);
        println!("  {} 모드: {}", "⚙️".bright_yellow(), args.mode);
    }

    if args.streaming {
        println!("  {} {}", "🌊".bright_cyan(), "스트리밍 모드".cyan());
    }

    if args.lenient {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "lenient 모드 (잘못된 히트 건너뜀)".yellow()
        );
    }

    if args.validate_only {
        println!("  {} {}", "🔍".bright_cyan(), "유효성 검사 모드".cyan());
    }

    if args.verbose {
        if let Some(ref log) = args.log {
            println!("  {} 로그 파일: {:?}", "📝".bright_white(), log);
        }
    }

    println!("{}", "═".repeat(50).bright_blue());
}

/// 진행률 바 생성
///
/// 스트리밍 모드에서는 전체 히트 수를 미리 알 수 없으므로 스피너를 사용합니다.
fn create_progress_bar(streaming: bool) -> Result<ProgressBar> {
    let pb = if streaming {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} hits {msg}")
                .context("진행률 템플릿 오류")?,
        );
        pb
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("진행률 템플릿 오류")?
                .progress_chars("█▓▒░"),
        );
        pb
    };
    Ok(pb)
}

/// 건너뛴 히트 목록 출력
fn print_skipped(skipped: &[SkippedHit], verbose: bool) {
    if skipped.is_empty() {
        return;
    }

    println!("\n{}", "⚠️ 건너뛴 히트:".bright_yellow());
    for hit in skipped {
        println!("  {} hits.hits[{}]", "•".yellow(), hit.index);
        if verbose {
            println!("    {}", hit.reason.dimmed());
        }
    }
}

/// 건너뛴 히트 로그 파일 작성
fn write_skip_log(log_path: &Path, input: &Path, skipped: &[SkippedHit]) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("로그 파일을 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "jhits 건너뛴 히트 로그")?;
    writeln!(log_file, "입력 파일: {:?}", input)?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "건너뛴 히트 수: {}", skipped.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for hit in skipped {
        writeln!(log_file, "\n위치: hits.hits[{}]", hit.index)?;
        writeln!(log_file, "이유: {}", hit.reason)?;
    }

    println!("\n{} 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
