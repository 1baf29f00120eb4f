use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use uuid::Uuid;

use video_captioner_rust::check_dependencies;
use video_captioner_rust::media::FfmpegToolchain;
use video_captioner_rust::model::WhisperModel;
use video_captioner_rust::pipeline;
use video_captioner_rust::session;
use video_captioner_rust::stt::WhisperCppTranscriber;
use video_captioner_rust::style::StyleInput;

mod server;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Video file to caption (one-shot mode)
    video: Option<PathBuf>,

    /// Run in web server mode
    #[arg(long)]
    server: bool,

    /// Port to run server on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Directory holding per-session working data
    #[arg(long, default_value = "temp")]
    workspace_root: PathBuf,

    /// Whisper model size (tiny, base, small, medium, large)
    #[arg(long, default_value = "base")]
    model: String,

    /// Recognition language
    #[arg(long, default_value = "en")]
    language: String,

    /// Caption font size (16-48)
    #[arg(long)]
    font_size: Option<i64>,

    /// Caption color as RRGGBB hex
    #[arg(long)]
    font_color: Option<String>,

    /// Output path for the captioned video
    #[arg(long)]
    output: Option<PathBuf>,

    /// External process timeout in seconds
    #[arg(long, default_value_t = 600)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // Check dependencies (ffmpeg, whisper.cpp)
    if let Err(e) = check_dependencies() {
        eprintln!("Error checking dependencies: {}", e);
        std::process::exit(1);
    }

    let model = WhisperModel::from_input(&args.model)
        .ok_or_else(|| anyhow::anyhow!("Unknown model '{}'.", args.model))?;
    let process_timeout = Duration::from_secs(args.timeout);

    if args.server {
        server::start_server(
            args.port,
            args.workspace_root,
            model,
            &args.language,
            process_timeout,
        )
        .await?;
        return Ok(());
    }

    // One-shot mode
    let Some(video) = args.video else {
        eprintln!("No video given. Pass a video file, or --server to run the service.");
        std::process::exit(2);
    };
    if !video.exists() {
        eprintln!("Video not found: {}", video.display());
        std::process::exit(1);
    }

    let toolchain = FfmpegToolchain::new(process_timeout);
    let transcriber = WhisperCppTranscriber::new(model, &args.language).await?;
    let workspace = session::session_dir(
        &args.workspace_root,
        &Uuid::new_v4().simple().to_string(),
    )?;

    println!("Extracting audio and transcribing...");
    let srt_path =
        pipeline::extract_and_transcribe(&toolchain, &transcriber, &video, &workspace).await?;
    println!("Subtitles written to {}", srt_path.display());

    let style = StyleInput {
        font_size: args.font_size.map(serde_json::Value::from),
        font_color: args.font_color.clone(),
    };
    let output = args.output.unwrap_or_else(|| {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        video.with_file_name(format!("{}_captioned.mp4", stem))
    });

    println!("Burning subtitles to video...");
    pipeline::burn(&toolchain, &video, &srt_path, &style, &output).await?;
    println!("Captioned video saved to {}", output.display());

    Ok(())
}
