//! Line-oriented terminal interaction.
//!
//! Menus and prompts only ever need two primitives: print a line, read a
//! line. A read that hits end of input or is interrupted yields `None`,
//! which every caller treats as "the user declined".

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often a waiting prompt checks the interrupt flag.
const INTERRUPT_POLL: Duration = Duration::from_millis(100);

/// Minimal terminal surface used by the selector and interactive flows.
pub trait Terminal {
    /// Show `prompt` and read one line without its trailing newline.
    /// Returns `None` on end of input or interruption.
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn print_line(&mut self, line: &str) -> io::Result<()>;

    /// Ask a yes/no question. Only `y` (any case) counts as yes.
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.print_line(&format!("{} - y/n?", question))?;
        let answer = self.prompt_line("> ")?;
        Ok(answer.is_some_and(|a| a.trim().eq_ignore_ascii_case("y")))
    }
}

type ReadLine = Box<dyn FnMut(&mut String) -> io::Result<usize> + Send>;

/// Background reader answering one line per request.
///
/// Lines are only read on request, so nothing competes with a child
/// process (the external editor) for stdin between prompts.
struct LineReader {
    requests: Sender<()>,
    lines: Receiver<io::Result<Option<String>>>,
}

impl LineReader {
    fn spawn(mut read_line: ReadLine) -> Self {
        let (requests, request_rx) = mpsc::channel::<()>();
        let (line_tx, lines) = mpsc::channel();

        thread::spawn(move || {
            while request_rx.recv().is_ok() {
                let mut line = String::new();
                let result = loop {
                    match read_line(&mut line) {
                        Ok(0) => break Ok(None),
                        Ok(_) => break Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => break Err(e),
                    }
                };
                if line_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self { requests, lines }
    }
}

/// Terminal backed by the process's stdin and stdout.
///
/// `interrupted` is shared with the Ctrl+C handler. Once it is set, the
/// waiting prompt and every later one return `None`.
pub struct StdTerminal {
    interrupted: Arc<AtomicBool>,
    reader: LineReader,
    read_pending: bool,
}

impl StdTerminal {
    pub fn new(interrupted: Arc<AtomicBool>) -> Self {
        Self::with_source(interrupted, Box::new(|buf: &mut String| io::stdin().read_line(buf)))
    }

    fn with_source(interrupted: Arc<AtomicBool>, source: ReadLine) -> Self {
        Self {
            interrupted,
            reader: LineReader::spawn(source),
            read_pending: false,
        }
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl Terminal for StdTerminal {
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if self.is_interrupted() {
            return Ok(None);
        }

        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        if !self.read_pending {
            if self.reader.requests.send(()).is_err() {
                return Ok(None);
            }
            self.read_pending = true;
        }

        loop {
            match self.reader.lines.recv_timeout(INTERRUPT_POLL) {
                Ok(result) => {
                    self.read_pending = false;
                    let line = result?;
                    if line.is_none() {
                        // EOF (Ctrl+D)
                        writeln!(stdout)?;
                    }
                    return Ok(line);
                }
                Err(RecvTimeoutError::Timeout) if self.is_interrupted() => {
                    writeln!(stdout)?;
                    return Ok(None);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }

    fn print_line(&mut self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", line)
    }
}
