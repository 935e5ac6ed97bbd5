use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialogcast_core::{
    DialogueAudio, DialoguePipeline, DialogueRequest, PipelineConfig, Progress, ProgressCallback,
    providers_from_config, render_srt, render_text,
};
use dialogcast_speech::{ProviderKind, ScriptLine, SpeakerVoices};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dialogcast")]
#[command(about = "DialogCast CLI - Voice two-speaker dialogue scripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a script into one MP3 file
    Synth {
        /// Path to the script JSON file
        #[arg(short, long)]
        script: PathBuf,

        /// Where to write the assembled MP3
        #[arg(short, long)]
        output: PathBuf,

        /// Transcript destination (.srt, .txt, otherwise JSON)
        #[arg(short, long)]
        transcript: Option<PathBuf>,

        /// Pipeline configuration TOML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Language hint passed to every provider, e.g. en-US
        #[arg(short, long)]
        language: Option<String>,

        /// Voice for speaker A (requires --voice-b)
        #[arg(long, requires = "voice_b")]
        voice_a: Option<String>,

        /// Voice for speaker B (requires --voice-a)
        #[arg(long, requires = "voice_a")]
        voice_b: Option<String>,

        /// Restrict the voice override to one provider
        #[arg(long, requires = "voice_a")]
        voice_provider: Option<ProviderKind>,
    },
    /// List the provider cascade and which providers have credentials
    Providers {
        /// Pipeline configuration TOML
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Script files are either a bare array of lines or a request object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Lines(Vec<ScriptLine>),
    Request(DialogueRequest),
}

impl From<ScriptFile> for DialogueRequest {
    fn from(file: ScriptFile) -> Self {
        match file {
            ScriptFile::Lines(lines) => DialogueRequest::new(lines),
            ScriptFile::Request(request) => request,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth {
            script,
            output,
            transcript,
            config,
            language,
            voice_a,
            voice_b,
            voice_provider,
        } => {
            let voices = match (voice_a, voice_b) {
                (Some(a), Some(b)) => {
                    let voices = SpeakerVoices::new(a, b);
                    Some(match voice_provider {
                        Some(provider) => voices.for_provider(provider),
                        None => voices,
                    })
                }
                _ => None,
            };
            let options = SynthOptions {
                script,
                output,
                transcript,
                config,
                language,
                voices,
            };
            synthesize(options).await?;
        }
        Commands::Providers { config } => {
            list_providers(config.as_deref())?;
        }
    }

    Ok(())
}

struct SynthOptions {
    script: PathBuf,
    output: PathBuf,
    transcript: Option<PathBuf>,
    config: Option<PathBuf>,
    language: Option<String>,
    voices: Option<SpeakerVoices>,
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn load_script(path: &Path) -> Result<DialogueRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&content).with_context(|| format!("Invalid script {}", path.display()))
}

fn parse_script(content: &str) -> Result<DialogueRequest> {
    let file: ScriptFile = serde_json::from_str(content)?;
    Ok(file.into())
}

async fn synthesize(options: SynthOptions) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let mut request = load_script(&options.script)?;
    if options.language.is_some() {
        request.language = options.language;
    }
    if options.voices.is_some() {
        request.voices = options.voices;
    }

    let pipeline =
        DialoguePipeline::from_config(config).context("Failed to build the pipeline")?;
    let configured = pipeline.cascade().configured();
    if configured.is_empty() {
        anyhow::bail!(
            "No speech provider has credentials; set one of {}",
            ProviderKind::DEFAULT_CASCADE
                .iter()
                .map(|p| p.credential_env())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    log::info!("Configured providers: {configured:?}");

    let progress: ProgressCallback = Arc::new(|Progress { completed, total }| {
        eprint!("\rSynthesized {completed}/{total} lines");
        let _ = std::io::stderr().flush();
        if completed == total {
            eprintln!();
        }
    });

    let result = pipeline
        .run(request, Some(progress))
        .await
        .context("Synthesis failed")?;

    std::fs::write(&options.output, &result.audio)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;
    log::info!(
        "Wrote {} bytes to {}",
        result.audio.len(),
        options.output.display()
    );

    if let Some(path) = &options.transcript {
        let rendered = render_transcript(path, &result)?;
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote transcript to {}", path.display());
    }

    println!(
        "{}: {} segments, ~{:.1}s, assembled by {:?}",
        options.output.display(),
        result.segments.len(),
        result.total_duration_seconds,
        result.assembly
    );
    for (provider, count) in &result.provider_usage {
        println!("  {provider}: {count}");
    }

    Ok(())
}

fn render_transcript(path: &Path, result: &DialogueAudio) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let rendered = match extension.as_deref() {
        Some("srt") => render_srt(&result.transcript),
        Some("txt") => render_text(&result.transcript),
        _ => serde_json::to_string_pretty(result).context("Failed to encode transcript")?,
    };
    Ok(rendered)
}

fn list_providers(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let providers = providers_from_config(&config).context("Failed to build providers")?;

    println!("Cascade (cheapest first):");
    for (position, provider) in providers.iter().enumerate() {
        let kind = provider.kind();
        let state = if provider.is_configured() {
            "configured"
        } else {
            "missing credential"
        };
        println!(
            "  {}. {:<12} {:<18} ({})",
            position + 1,
            kind.to_string(),
            state,
            kind.credential_env()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogcast_core::{AssemblyStrategy, TranscriptEntry};
    use dialogcast_speech::Speaker;
    use std::collections::BTreeMap;

    #[test]
    fn test_script_as_array() {
        let request = parse_script(
            r#"[{"speaker":"A","text":"Hello"},{"speaker":"guest","text":"Hi","emotion":"amused"}]"#,
        )
        .unwrap();
        assert_eq!(request.lines.len(), 2);
        assert_eq!(request.lines[1].speaker, Speaker::B);
        assert!(request.language.is_none());
    }

    #[test]
    fn test_script_as_object() {
        let request = parse_script(
            r#"{"lines":[{"speaker":"host","text":"Hello"}],"language":"de-DE"}"#,
        )
        .unwrap();
        assert_eq!(request.lines.len(), 1);
        assert_eq!(request.language.as_deref(), Some("de-DE"));
    }

    #[test]
    fn test_invalid_script() {
        assert!(parse_script(r#"{"text":"no lines"}"#).is_err());
    }

    #[test]
    fn test_transcript_format_follows_extension() {
        let result = DialogueAudio {
            audio: vec![1, 2, 3],
            segments: vec![],
            total_duration_seconds: 1.2,
            provider_usage: BTreeMap::new(),
            transcript: vec![TranscriptEntry {
                speaker: Speaker::A,
                speaker_name: "Host".into(),
                text: "Hello there friend".into(),
                start_time: 0.0,
                end_time: 1.2,
            }],
            assembly: AssemblyStrategy::Passthrough,
        };

        let srt = render_transcript(Path::new("out.SRT"), &result).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:01,200"));

        let text = render_transcript(Path::new("out.txt"), &result).unwrap();
        assert_eq!(text, "[00:00] Host: Hello there friend\n");

        let json = render_transcript(Path::new("out.json"), &result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["assembly"], "passthrough");
        assert!(value.get("audio").is_none());
    }

    #[test]
    fn test_config_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dialogcast.toml");
        std::fs::write(&path, "batch_size = 2\nproviders = [\"openai\"]\n").unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.providers, vec![ProviderKind::OpenAI]);
        assert_eq!(load_config(None).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_cli_parses_voice_override() {
        let cli = Cli::try_parse_from([
            "dialogcast",
            "synth",
            "--script",
            "s.json",
            "--output",
            "o.mp3",
            "--voice-a",
            "alloy",
            "--voice-b",
            "nova",
            "--voice-provider",
            "openai",
        ])
        .unwrap();
        match cli.command {
            Commands::Synth {
                voice_provider, ..
            } => assert_eq!(voice_provider, Some(ProviderKind::OpenAI)),
            _ => panic!("Expected synth"),
        }
        assert!(
            Cli::try_parse_from([
                "dialogcast", "synth", "-s", "s.json", "-o", "o.mp3", "--voice-a", "alloy",
            ])
            .is_err()
        );
    }
}
