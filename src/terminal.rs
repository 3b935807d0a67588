//! Terminal display and input handling

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, stdout, BufWriter, Stdout, Write};
use std::time::{Duration, Instant};

/// Terminal display handler with buffered output
pub struct TerminalDisplay {
    width: u16,
    height: u16,
    last_resize_check: Instant,
    buffer: BufWriter<Stdout>,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;

        let (width, height) = terminal::size()?;
        // Leave room for the status line
        let adjusted_height = height.saturating_sub(2);

        Ok(Self {
            width,
            height: adjusted_height,
            last_resize_check: Instant::now(),
            buffer: BufWriter::new(stdout),
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    /// Poll the terminal size, at most every 100ms. Returns true when it
    /// changed.
    pub fn check_resize(&mut self) -> bool {
        if self.last_resize_check.elapsed() < Duration::from_millis(100) {
            return false;
        }
        self.last_resize_check = Instant::now();

        if let Ok((new_width, new_height)) = terminal::size() {
            let new_height = new_height.saturating_sub(2);
            if new_width != self.width || new_height != self.height {
                self.width = new_width;
                self.height = new_height;
                return true;
            }
        }
        false
    }

    /// Draw a frame plus a status line, positioning the cursor explicitly
    /// per row so oversized lines cannot corrupt the rows below them.
    pub fn draw(&mut self, frame: &str, status: &str) -> io::Result<()> {
        // Hide cursor, disable line wrap
        write!(self.buffer, "\x1b[?25l\x1b[?7l")?;

        for (i, line) in frame.lines().enumerate() {
            write!(self.buffer, "\x1b[{};1H{}", i + 1, line)?;
        }

        // Clear whatever a previous, larger frame left behind
        write!(self.buffer, "\x1b[J")?;

        let status_row = frame.lines().count() + 1;
        write!(self.buffer, "\x1b[{};1H\x1b[K{}", status_row, status)?;

        // Restore cursor and line wrap
        write!(self.buffer, "\x1b[?25h\x1b[?7h")?;
        self.buffer.flush()
    }

    pub fn poll_input(&self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                return Ok(Some(key_event));
            }
        }
        Ok(None)
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = self.buffer.flush();
        let _ = execute!(stdout(), LeaveAlternateScreen);
    }
}

/// Key actions for the interactive renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    LightUp,
    LightDown,
    CameraForward,
    CameraBack,
    ToggleNormalMode,
    Reset,
    Pause,
}

/// Parse keyboard input into actions
pub fn parse_key_event(event: KeyEvent) -> Action {
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up => Action::LightUp,
        KeyCode::Down => Action::LightDown,
        KeyCode::Char('[') => Action::CameraBack,
        KeyCode::Char(']') => Action::CameraForward,
        KeyCode::Char('n') => Action::ToggleNormalMode,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char(' ') => Action::Pause,
        _ => Action::None,
    }
}
