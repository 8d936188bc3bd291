//! Terminal front end for the quote session.
//!
//! Reads one action per line from stdin, forwards it to the session and
//! redraws whenever the session publishes a new view. Closing the
//! "popover" (after opening the homepage) hides the quote until the next
//! line of input.

use std::fmt::Write as _;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::desktop::{Clipboard, CopyFeedback};
use crate::session::{Completion, HostRequest, QuoteSession, SpeechIcon, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Previous,
    Copy,
    Speak,
    Homepage,
    Quit,
    Redraw,
}

impl Action {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "n" | "next" => Some(Self::Next),
            "p" | "prev" | "previous" => Some(Self::Previous),
            "c" | "copy" => Some(Self::Copy),
            "s" | "say" | "stop" => Some(Self::Speak),
            "h" | "home" | "homepage" => Some(Self::Homepage),
            "q" | "quit" | "exit" => Some(Self::Quit),
            "" => Some(Self::Redraw),
            _ => None,
        }
    }
}

pub struct TerminalPresenter {
    session: QuoteSession,
    completions: mpsc::UnboundedReceiver<Completion>,
    clipboard: Clipboard,
    feedback: CopyFeedback,
    open: bool,
}

impl TerminalPresenter {
    pub fn new(
        session: QuoteSession,
        completions: mpsc::UnboundedReceiver<Completion>,
        feedback: CopyFeedback,
    ) -> Self {
        Self {
            session,
            completions,
            clipboard: Clipboard::system(),
            feedback,
            open: true,
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.run_with(stdin, &mut io::stdout()).await?;
        Ok(())
    }

    /// Drive the session from `input` lines until quit or end of input.
    pub async fn run_with<R, W>(mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: io::Write,
    {
        let mut view = self.session.subscribe();
        self.session.initialize();
        write!(out, "{}", render(&view.borrow_and_update()))?;
        out.flush()?;

        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Input closed, quitting");
                        self.session.quit();
                        break;
                    };
                    match Action::parse(&line) {
                        Some(action) => {
                            if self.dispatch(action, out)? == Some(HostRequest::Terminate) {
                                break;
                            }
                        }
                        None => writeln!(out, "Unknown action `{}`", line.trim())?,
                    }
                }
                Some(completion) = self.completions.recv() => {
                    self.session.complete(completion);
                }
                changed = view.changed() => {
                    if changed.is_err() {
                        warn!("Session view channel closed");
                        break;
                    }
                    let snapshot = view.borrow_and_update().clone();
                    if self.open {
                        write!(out, "{}", render(&snapshot))?;
                    }
                }
            }
            out.flush()?;
        }

        info!("Goodbye");
        Ok(())
    }

    fn dispatch<W: io::Write>(
        &mut self,
        action: Action,
        out: &mut W,
    ) -> io::Result<Option<HostRequest>> {
        if !self.open && action != Action::Quit {
            self.open = true;
            write!(out, "{}", render(&self.session.subscribe().borrow()))?;
            return Ok(None);
        }

        match action {
            Action::Next => self.session.advance(),
            Action::Previous => self.session.retreat(),
            Action::Speak => self.session.toggle_speech(),
            Action::Copy => self.copy(out)?,
            Action::Redraw => write!(out, "{}", render(&self.session.subscribe().borrow()))?,
            Action::Homepage => {
                if self.session.open_homepage() == HostRequest::ClosePopover {
                    self.open = false;
                    writeln!(out, "(closed, press Enter to reopen)")?;
                }
            }
            Action::Quit => return Ok(Some(self.session.quit())),
        }

        Ok(None)
    }

    fn copy<W: io::Write>(&mut self, out: &mut W) -> io::Result<()> {
        let line = self.session.copy_current_quote();
        match self.clipboard.copy(&line) {
            Ok(_) => {
                writeln!(out, "Copied to clipboard")?;
                self.feedback.copied(&line);
            }
            Err(e) => warn!("Copy failed: {e}"),
        }
        Ok(())
    }
}

/// Text block drawn for one view.
pub fn render(view: &View) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", view.quote);
    let _ = writeln!(out, "    - {}", view.author);
    if view.fetching {
        let _ = writeln!(out, "(fetching a new quote...)");
    }

    let mut controls = vec!["[n]ext"];
    if view.previous_visible {
        controls.push("[p]revious");
    }
    controls.push("[c]opy");
    controls.push(match view.speech_icon {
        SpeechIcon::Play => "[s]ay",
        SpeechIcon::Stop => "[s]top",
    });
    controls.extend(["[h]omepage", "[q]uit"]);
    let _ = writeln!(out, "{}", controls.join("  "));

    out
}
