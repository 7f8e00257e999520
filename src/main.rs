use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret as _;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use lucky_gateway::chat::{ChatOrchestrator, Conversation, Message};
use lucky_gateway::providers::{
    HuggingFaceProvider, OpenRouterProvider, ProviderChain, TogetherProvider,
};
use lucky_gateway::stt::{AssemblyAiTranscriber, LocalRecognizer, TranscriptionPipeline};
use lucky_gateway::surface::{Identity, LocalIdentity, Notifier, TerminalNotifier};
use lucky_gateway::voice::{CaptureSource, MicSource, Recorder, StopCause, mean_magnitude};
use lucky_gateway::{Config, Error};

/// Suggestions offered before the first user turn
const CHAT_SUGGESTIONS: [&str; 3] = [
    "What can you help me with?",
    "Tell me about yourself",
    "How does AI work?",
];

/// Lucky - voice and chat gateway for the Lucky AI assistant
#[derive(Parser)]
#[command(name = "lucky", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for hosts without audio hardware)
    #[arg(long, env = "LUCKY_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send a single message and print the reply
    Send {
        /// Message text
        text: String,
    },
    /// Run a WAV file through the transcription pipeline
    Transcribe {
        /// Path to a WAV file
        file: PathBuf,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,lucky_gateway=info",
        1 => "info,lucky_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load();

    match cli.command {
        Some(Command::Send { text }) => send_once(&config, &text).await,
        Some(Command::Transcribe { file }) => transcribe_file(&config, &file).await,
        Some(Command::TestMic { duration }) => test_mic(duration),
        None => chat_repl(&config, !cli.disable_voice).await,
    }
}

/// Assemble the fixed-order completion chain from configured keys
///
/// Backends without a key are skipped with a warning; the declared order of
/// the remaining backends is preserved.
fn build_chain(config: &Config) -> anyhow::Result<ProviderChain> {
    let mut chain = ProviderChain::new();

    if let Some(key) = &config.api_keys.huggingface {
        chain.push(Box::new(HuggingFaceProvider::new(
            key.expose_secret().to_string(),
            &config.completion,
        )));
    } else {
        tracing::warn!("HF_API_KEY not set, skipping Hugging Face backend");
    }

    if let Some(key) = &config.api_keys.openrouter {
        chain.push(Box::new(OpenRouterProvider::new(
            key.expose_secret().to_string(),
            &config.completion,
        )));
    } else {
        tracing::warn!("OPENROUTER_API_KEY not set, skipping OpenRouter backend");
    }

    if let Some(key) = &config.api_keys.together {
        chain.push(Box::new(TogetherProvider::new(
            key.expose_secret().to_string(),
            &config.completion,
        )));
    } else {
        tracing::warn!("TOGETHER_API_KEY not set, skipping Together backend");
    }

    if chain.is_empty() {
        anyhow::bail!("no completion backend configured; set at least one API key");
    }

    Ok(chain)
}

/// Assemble the transcription pipeline: local recognizer first, remote
/// polling backend second (when a key is configured)
fn build_pipeline(config: &Config) -> TranscriptionPipeline {
    let mut pipeline =
        TranscriptionPipeline::new().with(Box::new(LocalRecognizer::new(&config.stt.local)));

    if let Some(key) = &config.api_keys.assemblyai {
        pipeline.push(Box::new(AssemblyAiTranscriber::new(
            key.expose_secret().to_string(),
            &config.stt.remote,
        )));
    } else {
        tracing::warn!("ASSEMBLYAI_API_KEY not set, remote transcription disabled");
    }

    pipeline
}

#[allow(clippy::future_not_send)]
async fn send_once(config: &Config, text: &str) -> anyhow::Result<()> {
    let orchestrator = ChatOrchestrator::new(build_chain(config)?);
    let mut conversation = Conversation::with_greeting(&config.greeting);

    let reply = orchestrator.send(&mut conversation, text).await;
    println!("{}", reply.content);
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn transcribe_file(config: &Config, file: &Path) -> anyhow::Result<()> {
    let wav = std::fs::read(file)?;
    let pipeline = build_pipeline(config);

    let text = pipeline.run(&wav).await?;
    println!("{text}");
    Ok(())
}

/// Record from the default input device and report level statistics
fn test_mic(duration: u64) -> anyhow::Result<()> {
    let mut source = MicSource::new();
    source.acquire()?;

    println!("Recording for {duration}s...");
    std::thread::sleep(Duration::from_secs(duration));

    source.release();
    let samples = source.take_all();
    let energy = mean_magnitude(&samples);

    #[allow(clippy::cast_precision_loss)]
    let seconds = samples.len() as f32 / source.sample_rate() as f32;
    println!("Captured {} samples ({seconds:.1}s), mean level {energy:.4}", samples.len());

    if energy < 0.001 {
        println!("Warning: input level is very low; check the microphone");
    }
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn chat_repl(config: &Config, voice_enabled: bool) -> anyhow::Result<()> {
    let orchestrator = ChatOrchestrator::new(build_chain(config)?);
    let pipeline = build_pipeline(config);
    let notifier = TerminalNotifier;
    let identity = LocalIdentity::new(config.display_name.clone());

    let mut conversation = Conversation::with_greeting(&config.greeting);

    if let Some(user) = identity.current_user() {
        println!("Signed in as {}", user.display_name);
    }
    render(&conversation.messages()[0]);
    println!("Try: {}", CHAT_SUGGESTIONS.join(" | "));
    println!("Commands: /regen /reset /voice /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt("you> ").await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/reset" => {
                conversation.reset(&config.greeting);
                render(&conversation.messages()[0]);
            }
            "/regen" => match orchestrator.regenerate(&mut conversation).await {
                Ok(reply) => render(&reply),
                Err(e) => notifier.notify("Cannot regenerate", &e.to_string()),
            },
            "/voice" => {
                if voice_enabled {
                    voice_turn(
                        config,
                        &orchestrator,
                        &pipeline,
                        &notifier,
                        &mut conversation,
                        &mut lines,
                    )
                    .await;
                } else {
                    notifier.notify("Voice disabled", "run without --disable-voice to use voice");
                }
            }
            text => {
                let reply = orchestrator.send(&mut conversation, text).await;
                render(&reply);
            }
        }
    }

    Ok(())
}

/// One press-to-stop voice turn: record, transcribe, send
#[allow(clippy::future_not_send)]
async fn voice_turn(
    config: &Config,
    orchestrator: &ChatOrchestrator,
    pipeline: &TranscriptionPipeline,
    notifier: &TerminalNotifier,
    conversation: &mut Conversation,
    lines: &mut Lines<BufReader<Stdin>>,
) {
    let mut recorder = Recorder::new(Box::new(MicSource::new()), config.recorder.clone());

    if let Err(e) = recorder.start() {
        // permission and device failures must surface specifically
        match &e {
            Error::PermissionDenied(_) => notifier.notify("Microphone permission denied", &e.to_string()),
            _ => notifier.notify("Microphone unavailable", &e.to_string()),
        }
        return;
    }

    println!("Recording... press Enter to stop (auto-stops on silence)");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let cause = tokio::select! {
        cause = recorder.monitor(&mut stop_rx) => cause,
        _ = lines.next_line() => {
            stop_tx.send(true).ok();
            StopCause::Manual
        }
    };
    tracing::debug!(?cause, "recording finished");

    match recorder.stop_and_transcribe(pipeline).await {
        Ok(text) if text.trim().is_empty() => {
            notifier.notify("Nothing heard", "the recording produced no words");
        }
        Ok(text) => {
            println!("you (voice)> {text}");
            let reply = orchestrator.send(conversation, &text).await;
            render(&reply);
        }
        Err(e) => notifier.notify("Transcription failed", &e.to_string()),
    }
}

/// Render one message to the terminal
fn render(message: &Message) {
    let who = if message.is_assistant() { "lucky" } else { "you" };
    println!("{who}> {}", message.content);
}

/// Print a prompt without a trailing newline
async fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}
