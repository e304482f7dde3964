use std::process;
use tracing_subscriber::EnvFilter;
use voice_cover_core::{
    set_progress_callback, CoverConfig, CoverPipeline, CoverProgress, ProviderConfig,
    ReplicateClient, Stage,
};

fn main() {
    init_tracing();

    match run() {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials are read once here and travel inside the client.
    let provider = ProviderConfig::from_env()?;
    let config = CoverConfig::from_env()?;

    setup_progress_callback();

    eprintln!("🚀 Starting AI Cover Generation for: {}", config.source_track.display());
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("Voice:  {}", config.voice_sample.display());
    eprintln!("Output: {}", config.output.display());
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let client = ReplicateClient::from_config(&provider)?;
    let pipeline = CoverPipeline::new(client, config)?;
    let result = pipeline.run()?;

    eprintln!();
    println!(
        "🎉 SUCCESS! Your song is ready: {} ({:.1}s)",
        result.output_path.display(),
        result.duration.as_secs_f32()
    );

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn setup_progress_callback() {
    set_progress_callback(|progress| match progress {
        CoverProgress::Stage(stage) => {
            let phase = match stage {
                Stage::Separating => "\n--- Phase 1: Separating Vocals & Instrumental ---",
                Stage::Converting => "\n--- Phase 2: Converting Vocals to Your Voice ---",
                Stage::FinalMixing => "\n--- Phase 3: Mixing Final Track ---",
                _ => "",
            };
            if !phase.is_empty() {
                eprintln!("{}", phase);
            }
            eprintln!("⏳ {}", stage);
        }
        CoverProgress::Download { file, done, total } => {
            if total > 0 {
                let percent = (done as f64 / total as f64 * 100.0).round() as u64;
                eprint!(
                    "\r📥 {}: {:>3}% ({:.2} MB / {:.2} MB)",
                    file,
                    percent,
                    done as f64 / 1_000_000.0,
                    total as f64 / 1_000_000.0
                );
                if done >= total {
                    eprintln!();
                }
            } else {
                eprint!("\r📥 {}: {:.2} MB", file, done as f64 / 1_000_000.0);
            }
        }
        CoverProgress::Finished => {}
    });
}
