//! In-process collaborators for session and presenter tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::desktop::Browser;
use crate::error::{FetchError, SpeechError};
use crate::provider::{BoxFuture, ConnectivityProbe, QuoteProvider};
use crate::session::Collaborators;
use crate::speech::{Narration, Speaker};

pub(crate) type Response = Result<Vec<u8>, FetchError>;

/// Provider payload carrying the two fields the API sends.
pub(crate) fn body(text: &str, author: &str) -> Response {
    Ok(format!(r#"{{"quoteText":"{text}","quoteAuthor":"{author}"}}"#).into_bytes())
}

/// Hands out queued responses in order, then network errors.
pub(crate) struct ScriptedProvider {
    pub(crate) responses: Mutex<VecDeque<Response>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuoteProvider for ScriptedProvider {
    fn fetch(&self) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Network("script exhausted".into())))
        })
    }
}

pub(crate) struct FakeProbe(pub(crate) AtomicBool);

impl FakeProbe {
    pub(crate) fn online() -> Self {
        Self(AtomicBool::new(true))
    }
}

impl ConnectivityProbe for FakeProbe {
    fn is_connected(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move { self.0.load(Ordering::SeqCst) })
    }
}

#[derive(Default)]
pub(crate) struct FakeSpeaker {
    pub(crate) broken: AtomicBool,
    launches: Mutex<Vec<(String, String)>>,
    finishers: Mutex<Vec<Option<oneshot::Sender<()>>>>,
}

impl FakeSpeaker {
    pub(crate) fn launches(&self) -> Vec<(String, String)> {
        self.launches.lock().unwrap().clone()
    }

    /// Let narration `index` exit on its own.
    pub(crate) fn finish(&self, index: usize) {
        if let Some(tx) = self.finishers.lock().unwrap()[index].take() {
            let _ = tx.send(());
        }
    }
}

impl Speaker for FakeSpeaker {
    fn launch(&self, text: &str, voice: &str) -> Result<Narration, SpeechError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(SpeechError::Launch {
                command: "say".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }

        self.launches.lock().unwrap().push((text.into(), voice.into()));
        let (tx, rx) = oneshot::channel::<()>();
        self.finishers.lock().unwrap().push(Some(tx));
        Ok(Box::pin(async move {
            let _ = rx.await;
        }))
    }
}

#[derive(Default)]
pub(crate) struct FakeBrowser {
    pub(crate) opened: Mutex<Vec<String>>,
}

impl Browser for FakeBrowser {
    fn open(&self, url: &str) -> Result<(), String> {
        self.opened.lock().unwrap().push(url.into());
        Ok(())
    }
}

/// Concrete fakes next to the type-erased bundle the session takes.
pub(crate) struct Fakes {
    pub(crate) provider: Arc<ScriptedProvider>,
    pub(crate) probe: Arc<FakeProbe>,
    pub(crate) speaker: Arc<FakeSpeaker>,
    pub(crate) browser: Arc<FakeBrowser>,
}

impl Fakes {
    pub(crate) fn new(responses: Vec<Response>) -> Self {
        Self {
            provider: Arc::new(ScriptedProvider::new(responses)),
            probe: Arc::new(FakeProbe::online()),
            speaker: Arc::new(FakeSpeaker::default()),
            browser: Arc::new(FakeBrowser::default()),
        }
    }

    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            provider: self.provider.clone(),
            probe: self.probe.clone(),
            speaker: self.speaker.clone(),
            browser: self.browser.clone(),
        }
    }
}
