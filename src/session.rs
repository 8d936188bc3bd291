//! Quote session: history navigation, fetch lifecycle and the speech toggle.
//!
//! Fetch:  IDLE → IN_FLIGHT → IDLE
//! Speech: IDLE → SPEAKING → IDLE (natural exit or interrupt)
//!
//! Network requests and narrations run as spawned tasks. Each one reports
//! back exactly once through the completion channel handed out by
//! [`QuoteSession::new`]; the owner feeds those into
//! [`QuoteSession::complete`]. An interrupted narration reports nothing.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::desktop::Browser;
use crate::error::FetchError;
use crate::provider::{ConnectivityProbe, QuoteProvider};
use crate::quote::{self, ParsedQuote, QuoteEntry};
use crate::speech::Speaker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Speaking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechIcon {
    Play,
    Stop,
}

/// Everything a presentation layer needs to draw the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub quote: String,
    pub author: String,
    pub previous_visible: bool,
    pub speech_icon: SpeechIcon,
    pub fetching: bool,
}

/// Result of a spawned collaborator call.
#[derive(Debug)]
pub enum Completion {
    Fetched(Result<ParsedQuote, FetchError>),
    NarrationEnded { id: u64 },
}

/// Follow-up the presentation layer should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    ClosePopover,
    Terminate,
}

pub struct Collaborators {
    pub provider: Arc<dyn QuoteProvider>,
    pub probe: Arc<dyn ConnectivityProbe>,
    pub speaker: Arc<dyn Speaker>,
    pub browser: Arc<dyn Browser>,
}

/// Single-use handle on the active narration.
struct SpeechHandle {
    id: u64,
    interrupt: oneshot::Sender<()>,
}

impl SpeechHandle {
    fn interrupt(self) {
        // The narration task may already be gone; nothing to stop then.
        let _ = self.interrupt.send(());
    }
}

pub struct QuoteSession {
    history: Vec<QuoteEntry>,
    cursor: usize,
    quote: String,
    author: String,
    previous_visible: bool,
    fetch: FetchState,
    speech: Option<SpeechHandle>,
    narrations_started: u64,
    voice: String,
    homepage_url: String,
    collaborators: Collaborators,
    completions: mpsc::UnboundedSender<Completion>,
    view: watch::Sender<View>,
}

impl QuoteSession {
    pub fn new(
        config: &Config,
        collaborators: Collaborators,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (completions, completions_rx) = mpsc::unbounded_channel();
        let (view, _) = watch::channel(View {
            quote: quote::GREETING_QUOTE.into(),
            author: quote::GREETING_AUTHOR.into(),
            previous_visible: false,
            speech_icon: SpeechIcon::Play,
            fetching: false,
        });

        let session = Self {
            history: Vec::new(),
            cursor: 0,
            quote: quote::GREETING_QUOTE.into(),
            author: quote::GREETING_AUTHOR.into(),
            previous_visible: false,
            fetch: FetchState::Idle,
            speech: None,
            narrations_started: 0,
            voice: config.speech.voice.clone(),
            homepage_url: config.homepage.url.clone(),
            collaborators,
            completions,
            view,
        };

        (session, completions_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view.subscribe()
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[QuoteEntry] {
        &self.history
    }

    pub fn previous_visible(&self) -> bool {
        self.previous_visible
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch
    }

    pub fn speech_state(&self) -> SpeechState {
        if self.speech.is_some() {
            SpeechState::Speaking
        } else {
            SpeechState::Idle
        }
    }

    /// Reset to the greeting and load the first quote. "Previous" stays
    /// hidden for that first quote.
    pub fn initialize(&mut self) {
        self.history.clear();
        self.cursor = 0;
        self.quote = quote::GREETING_QUOTE.into();
        self.author = quote::GREETING_AUTHOR.into();

        self.advance();
        self.previous_visible = false;
        self.publish();
    }

    /// Step forward through history, fetching a new quote past its end.
    pub fn advance(&mut self) {
        if self.fetch == FetchState::InFlight {
            debug!("Fetch already in flight, ignoring advance");
            return;
        }

        self.previous_visible = true;
        self.cursor = (self.cursor + 1).min(self.history.len());

        if self.cursor < self.history.len() {
            self.show(self.cursor);
            debug!("Advanced to history entry {}/{}", self.cursor + 1, self.history.len());
        } else {
            self.start_fetch();
        }

        self.publish();
    }

    pub fn retreat(&mut self) {
        if self.cursor == 0 {
            return;
        }

        self.cursor -= 1;
        self.show(self.cursor);
        if self.cursor == 0 {
            self.previous_visible = false;
        }
        debug!("Retreated to history entry {}/{}", self.cursor + 1, self.history.len());

        self.publish();
    }

    /// Clipboard line for the quote on screen.
    pub fn copy_current_quote(&self) -> String {
        quote::format_line(&self.quote, &self.author)
    }

    pub fn toggle_speech(&mut self) {
        match self.speech.take() {
            Some(handle) => {
                handle.interrupt();
                info!("Speech: SPEAKING → IDLE (interrupted)");
            }
            None => self.start_speech(),
        }

        self.publish();
    }

    pub fn quit(&mut self) -> HostRequest {
        if let Some(handle) = self.speech.take() {
            handle.interrupt();
            info!("Interrupted narration before quitting");
            self.publish();
        }

        HostRequest::Terminate
    }

    pub fn open_homepage(&self) -> HostRequest {
        if let Err(e) = self.collaborators.browser.open(&self.homepage_url) {
            warn!("Failed to open {}: {e}", self.homepage_url);
        }

        HostRequest::ClosePopover
    }

    /// Apply the outcome of a spawned fetch or narration.
    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched(result) => self.finish_fetch(result),
            Completion::NarrationEnded { id } => self.finish_narration(id),
        }

        self.publish();
    }

    fn show(&mut self, index: usize) {
        let QuoteEntry { text, author } = self.history[index].clone();
        self.quote = text;
        self.author = author;
    }

    fn start_fetch(&mut self) {
        self.fetch = FetchState::InFlight;
        info!("Fetch: IDLE → IN_FLIGHT");

        let provider = Arc::clone(&self.collaborators.provider);
        let probe = Arc::clone(&self.collaborators.probe);
        let completions = self.completions.clone();

        tokio::spawn(async move {
            let result = fetch_quote(provider.as_ref(), probe.as_ref()).await;
            let _ = completions.send(Completion::Fetched(result));
        });
    }

    fn finish_fetch(&mut self, result: Result<ParsedQuote, FetchError>) {
        self.fetch = FetchState::Idle;

        match result {
            Ok(parsed) => {
                self.quote = parsed.text;
                if let Some(author) = parsed.author {
                    self.author = author;
                }
                self.history.push(QuoteEntry {
                    text: self.quote.clone(),
                    author: self.author.clone(),
                });
                self.cursor = self.history.len();
                // The very first quote has nothing older to step back to.
                self.previous_visible = self.history.len() > 1;
                info!("Fetch: IN_FLIGHT → IDLE (quote #{} by {})", self.history.len(), self.author);
            }
            Err(FetchError::Decode(reason)) => {
                warn!("Failed to decode quote payload: {reason}");
                self.quote = quote::DECODE_FAILURE_QUOTE.into();
                self.author = quote::APP_AUTHOR.into();
            }
            Err(FetchError::Unreachable) => {
                warn!("Quote fetch failed with no network connection");
                self.quote = quote::OFFLINE_QUOTE.into();
                self.author = quote::APP_AUTHOR.into();
            }
            Err(e) => {
                warn!("{e}, keeping current quote");
            }
        }
    }

    fn start_speech(&mut self) {
        let text = self.copy_current_quote();
        let narration = match self.collaborators.speaker.launch(&text, &self.voice) {
            Ok(narration) => narration,
            Err(e) => {
                warn!("{e}");
                return;
            }
        };

        self.narrations_started += 1;
        let id = self.narrations_started;
        let (interrupt, interrupted) = oneshot::channel();
        let completions = self.completions.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                // Also fires if the handle is dropped. Leaving the select
                // drops the narration, which stops the process.
                _ = interrupted => debug!("Narration {id} interrupted"),
                () = narration => {
                    let _ = completions.send(Completion::NarrationEnded { id });
                }
            }
        });

        self.speech = Some(SpeechHandle { id, interrupt });
        info!("Speech: IDLE → SPEAKING");
    }

    fn finish_narration(&mut self, id: u64) {
        match &self.speech {
            Some(handle) if handle.id == id => {
                self.speech = None;
                info!("Speech: SPEAKING → IDLE (finished)");
            }
            _ => debug!("Ignoring end of stale narration {id}"),
        }
    }

    fn publish(&self) {
        let next = View {
            quote: self.quote.clone(),
            author: self.author.clone(),
            previous_visible: self.previous_visible,
            speech_icon: match self.speech_state() {
                SpeechState::Idle => SpeechIcon::Play,
                SpeechState::Speaking => SpeechIcon::Stop,
            },
            fetching: self.fetch == FetchState::InFlight,
        };

        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn fetch_quote(
    provider: &dyn QuoteProvider,
    probe: &dyn ConnectivityProbe,
) -> Result<ParsedQuote, FetchError> {
    let body = match provider.fetch().await {
        Ok(body) => body,
        Err(e) => {
            return if probe.is_connected().await {
                Err(e)
            } else {
                Err(FetchError::Unreachable)
            };
        }
    };

    quote::parse_body(&body)
}
