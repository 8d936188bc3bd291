//! quotes-rs: random quotes with history, clipboard copy and narration.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotes_rs::{config, desktop, presenter, provider, session, speech};

#[derive(Parser, Debug)]
#[command(name = "quotes-rs", about = "Random quotes in your terminal")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Narration voice (overrides speech.voice)
    #[arg(long)]
    voice: Option<String>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so they stay out of the rendered quote
    let filter = if args.verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info")
    } else {
        EnvFilter::new("warn,quotes_rs=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("quotes-rs starting");

    let mut config = config::Config::load(args.config.as_deref());
    if let Some(voice) = args.voice {
        config.speech.voice = voice;
    }
    info!("Quote endpoint: {}", config.quotes.endpoint);

    let collaborators = session::Collaborators {
        provider: Arc::new(provider::HttpQuoteProvider::new(&config.quotes)?),
        probe: Arc::new(provider::TcpProbe::new(&config.network)),
        speaker: Arc::new(speech::CommandSpeaker::new(&config.speech)),
        browser: Arc::new(desktop::SystemBrowser),
    };

    let (session, completions) = session::QuoteSession::new(&config, collaborators);
    let feedback = desktop::CopyFeedback::new(config.feedback.notifications);

    presenter::TerminalPresenter::new(session, completions, feedback)
        .run()
        .await
}
