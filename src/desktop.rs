//! Desktop glue: opening the homepage, writing to the clipboard and
//! the optional "copied" notification.
//!
//! The clipboard goes through a long-lived arboard handle and falls back
//! to the platform's command-line tool (`pbcopy` or `xclip`).

use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Opens a URL in the user's browser.
pub trait Browser: Send + Sync {
    fn open(&self, url: &str) -> Result<(), String>;
}

pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> Result<(), String> {
        let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };

        Command::new(opener)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("Failed to run {opener}: {e}"))?;

        debug!("Opened {url} with {opener}");
        Ok(())
    }
}

/// Something that can take ownership of the clipboard contents.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), String>;
}

impl ClipboardSink for arboard::Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        arboard::Clipboard::set_text(self, text).map_err(|e| format!("Failed to set clipboard: {e}"))
    }
}

/// Which route a copy took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyRoute {
    Held,
    Command,
}

/// Clipboard owner kept alive for the whole run.
///
/// On X11 the selection is served by the process that set it, so the
/// handle must outlive each copy. It is opened on first use and reopened
/// after a failure; while it cannot be opened, copies go through the
/// command-line tool.
pub struct Clipboard<S: ClipboardSink = arboard::Clipboard> {
    held: Option<S>,
    opener: fn() -> Result<S, String>,
    fallback: fn(&str) -> Result<(), String>,
}

impl Clipboard {
    pub fn system() -> Self {
        Self::with(open_arboard, copy_with_command)
    }
}

impl<S: ClipboardSink> Clipboard<S> {
    pub fn with(opener: fn() -> Result<S, String>, fallback: fn(&str) -> Result<(), String>) -> Self {
        Self {
            held: None,
            opener,
            fallback,
        }
    }

    /// Replace the clipboard contents with `text`.
    pub fn copy(&mut self, text: &str) -> Result<CopyRoute, String> {
        if self.held.is_none() {
            match (self.opener)() {
                Ok(sink) => self.held = Some(sink),
                Err(e) => warn!("{e}, falling back to command-line clipboard"),
            }
        }

        if let Some(sink) = self.held.as_mut() {
            match sink.set_text(text) {
                Ok(()) => {
                    debug!("Copied {} characters via held clipboard", text.len());
                    return Ok(CopyRoute::Held);
                }
                Err(e) => {
                    warn!("{e}, falling back to command-line clipboard");
                    self.held = None;
                }
            }
        }

        (self.fallback)(text)?;
        Ok(CopyRoute::Command)
    }
}

fn open_arboard() -> Result<arboard::Clipboard, String> {
    arboard::Clipboard::new().map_err(|e| format!("Failed to open clipboard: {e}"))
}

fn copy_with_command(text: &str) -> Result<(), String> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("pbcopy", &[])
    } else {
        ("xclip", &["-selection", "clipboard"])
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn {program}: {e}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| format!("Failed to write to {program}: {e}"))?;
    }

    let status = child.wait().map_err(|e| format!("{program} failed: {e}"))?;
    if !status.success() {
        return Err(format!("{program} exited with {status}"));
    }

    debug!("Copied {} characters via {program}", text.len());
    Ok(())
}

/// Tells the user a quote landed on the clipboard, when enabled.
pub struct CopyFeedback {
    notifications: bool,
}

impl CopyFeedback {
    pub fn new(notifications: bool) -> Self {
        Self { notifications }
    }

    pub fn copied(&self, line: &str) {
        if !self.notifications {
            return;
        }

        if let Err(e) = notify_rust::Notification::new()
            .appname("Quotes")
            .summary("Quote copied")
            .body(line.trim_end())
            .timeout(3000)
            .show()
        {
            warn!("Failed to show notification: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static OPENS: RefCell<usize> = const { RefCell::new(0) };
        static FALLBACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    struct RecordingSink {
        texts: Vec<String>,
        broken: bool,
    }

    impl ClipboardSink for RecordingSink {
        fn set_text(&mut self, text: &str) -> Result<(), String> {
            if self.broken {
                return Err("selection owner lost".into());
            }
            self.texts.push(text.into());
            Ok(())
        }
    }

    fn open_working() -> Result<RecordingSink, String> {
        OPENS.with(|n| *n.borrow_mut() += 1);
        Ok(RecordingSink {
            texts: Vec::new(),
            broken: false,
        })
    }

    fn open_broken_sink() -> Result<RecordingSink, String> {
        OPENS.with(|n| *n.borrow_mut() += 1);
        Ok(RecordingSink {
            texts: Vec::new(),
            broken: true,
        })
    }

    fn open_failing() -> Result<RecordingSink, String> {
        OPENS.with(|n| *n.borrow_mut() += 1);
        Err("no display".into())
    }

    fn record_fallback(text: &str) -> Result<(), String> {
        FALLBACK.with(|f| f.borrow_mut().push(text.into()));
        Ok(())
    }

    fn reset() {
        OPENS.with(|n| *n.borrow_mut() = 0);
        FALLBACK.with(|f| f.borrow_mut().clear());
    }

    fn opens() -> usize {
        OPENS.with(|n| *n.borrow())
    }

    fn fallback_texts() -> Vec<String> {
        FALLBACK.with(|f| f.borrow().clone())
    }

    #[test]
    fn handle_is_opened_once_and_kept() {
        reset();
        let mut clipboard = Clipboard::with(open_working, record_fallback);

        assert_eq!(clipboard.copy("a - b\n"), Ok(CopyRoute::Held));
        assert_eq!(clipboard.copy("c - d\n"), Ok(CopyRoute::Held));

        assert_eq!(opens(), 1);
        let held = clipboard.held.as_ref().expect("handle kept between copies");
        assert_eq!(held.texts, vec!["a - b\n".to_string(), "c - d\n".to_string()]);
        assert!(fallback_texts().is_empty());
    }

    #[test]
    fn unopenable_clipboard_uses_command_and_retries_later() {
        reset();
        let mut clipboard = Clipboard::with(open_failing, record_fallback);

        assert_eq!(clipboard.copy("first"), Ok(CopyRoute::Command));
        assert_eq!(clipboard.copy("second"), Ok(CopyRoute::Command));

        assert_eq!(opens(), 2);
        assert_eq!(fallback_texts(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn failed_write_drops_handle_and_falls_back() {
        reset();
        let mut clipboard = Clipboard::with(open_broken_sink, record_fallback);

        assert_eq!(clipboard.copy("quote"), Ok(CopyRoute::Command));
        assert!(clipboard.held.is_none());
        assert_eq!(fallback_texts(), vec!["quote".to_string()]);
    }

    #[test]
    fn fallback_error_is_reported() {
        fn refuse(_: &str) -> Result<(), String> {
            Err("xclip missing".into())
        }
        let mut clipboard = Clipboard::with(open_failing, refuse);

        assert_eq!(clipboard.copy("quote"), Err("xclip missing".to_string()));
    }
}
