use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use crossterm::{
    cursor::{Hide, MoveTo, MoveToNextLine, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use tracing::warn;

use crate::{
    error::{Error, Result},
    sim::{self, Controller, Mode, Shared, StopFlag},
};

const STATUS_LINES: u16 = 3;
const POLL: Duration = Duration::from_millis(50);

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Rect {
    w: u16,
    h: u16,
}

impl Rect {
    #[inline]
    pub fn new(width: u16, height: u16) -> Self {
        Rect { w: width, h: height }
    }

    pub fn term_size() -> Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Rect::new(width, height))
    }

    #[inline]
    pub fn fits(&self, inner: &Rect) -> bool {
        inner.w <= self.w && inner.h <= self.h
    }
}

/// Where the load and save keys read from and write to.
#[derive(Clone, Debug)]
pub struct Files {
    pub load: Option<PathBuf>,
    pub save: PathBuf,
}

impl Files {
    fn load_path(&self) -> &PathBuf {
        self.load.as_ref().unwrap_or(&self.save)
    }
}

/// Terminal frontend. Holds no cell state of its own; every frame is drawn
/// from the controller.
pub struct App {
    shared: Shared,
    stop: StopFlag,
    files: Files,
    cursor: (isize, isize),
    status: String,
    should_exit: bool,
}

impl App {
    pub fn new(controller: Controller, files: Files) -> Self {
        App {
            shared: sim::share(controller),
            stop: StopFlag::default(),
            files,
            cursor: (0, 0),
            status: String::from("e: edit  p: play  q: quit"),
            should_exit: false,
        }
    }

    #[inline]
    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    #[inline]
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn shared(&self) -> &Shared {
        &self.shared
    }

    /// Applies one key press to the controller.
    pub fn hotkey(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                self.should_exit = true;
            }
            return;
        }

        let mut c = sim::lock(&self.shared);
        let (rows, cols) = (c.grid().rows() as isize, c.grid().cols() as isize);
        let status = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_exit = true;
                None
            }
            KeyCode::Char('p') => Some(match c.mode() {
                Mode::Playing => {
                    c.stop_play();
                    "Paused".to_string()
                }
                _ if c.start_play() => "Playing".to_string(),
                _ => "Finish editing first".to_string(),
            }),
            KeyCode::Char('e') => Some(match c.mode() {
                Mode::Editing => {
                    c.finish_edit();
                    "Edit finished".to_string()
                }
                _ if c.start_edit() => "Editing: arrows move, space toggles".to_string(),
                _ => "Stop playing first".to_string(),
            }),
            KeyCode::Up => {
                self.cursor = wrap_cursor(self.cursor, (-1, 0), rows, cols);
                None
            }
            KeyCode::Down => {
                self.cursor = wrap_cursor(self.cursor, (1, 0), rows, cols);
                None
            }
            KeyCode::Left => {
                self.cursor = wrap_cursor(self.cursor, (0, -1), rows, cols);
                None
            }
            KeyCode::Right => {
                self.cursor = wrap_cursor(self.cursor, (0, 1), rows, cols);
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let (r, col) = self.cursor;
                (!c.toggle_cell(r, col)).then(|| "Press e to edit".to_string())
            }
            KeyCode::Char('c') => {
                c.clear_all();
                Some("Cleared".to_string())
            }
            KeyCode::Char('n') => {
                (!c.step()).then(|| "Finish editing first".to_string())
            }
            KeyCode::Char(ch @ '1'..='4') => {
                let level = ch as u8 - b'0';
                Some(match c.set_speed(level) {
                    Ok(()) => format!("Speed {level}"),
                    Err(e) => e.to_string(),
                })
            }
            KeyCode::Char('j') => {
                c.slower();
                Some(format!("Speed {}", c.speed()))
            }
            KeyCode::Char('k') => {
                c.faster();
                Some(format!("Speed {}", c.speed()))
            }
            KeyCode::Char('s') if c.mode() != Mode::Idle => {
                Some("Stop playing and finish editing before saving".to_string())
            }
            KeyCode::Char('s') => {
                let path = &self.files.save;
                Some(match c.save(path) {
                    Ok(()) => format!("Saved to {}", path.display()),
                    Err(e) => format!("Save failed: {e}"),
                })
            }
            KeyCode::Char('l') if c.is_playing() => Some("Stop playing before loading".to_string()),
            KeyCode::Char('l') => {
                let path = self.files.load_path();
                Some(match c.load(path) {
                    Ok(()) => format!("Loaded {}", path.display()),
                    Err(e) => format!("Load failed: {e}"),
                })
            }
            _ => None,
        };
        drop(c);

        if let Some(s) = status {
            self.status = s;
        }
    }

    /// Renders the grid and the status lines as text, one `\r\n` per line.
    pub fn frame(&self) -> String {
        let c = sim::lock(&self.shared);
        let grid = c.grid();
        let editing = c.is_editing();
        let mut s = String::with_capacity((grid.cols() + 2) * (grid.rows() + STATUS_LINES as usize));

        for (i, row) in grid.data().iter().enumerate() {
            for (j, &alive) in row.iter().enumerate() {
                let at_cursor = editing && self.cursor == (i as isize, j as isize);
                s.push(match (alive, at_cursor) {
                    (true, false) => '#',
                    (false, false) => ' ',
                    (true, true) => '@',
                    (false, true) => '+',
                });
            }
            s.push_str("\r\n");
        }
        s.push_str(&"-".repeat(grid.cols()));
        s.push_str("\r\n");
        s.push_str(&format!(
            "{:<8} speed {}  gen {}  alive {}\r\n",
            c.mode(),
            c.speed(),
            c.generation(),
            grid.population()
        ));
        s.push_str(&self.status);
        s
    }
}

fn wrap_cursor((r, c): (isize, isize), (dr, dc): (isize, isize), rows: isize, cols: isize) -> (isize, isize) {
    ((r + dr).rem_euclid(rows), (c + dc).rem_euclid(cols))
}

/// Terminal area needed for a `rows` x `cols` grid plus the status lines.
fn required_size(rows: usize, cols: usize) -> Result<Rect> {
    let too_big = || Error::Terminal(format!("a {rows}x{cols} grid cannot fit in any terminal"));
    let w = u16::try_from(cols).map_err(|_| too_big())?;
    let h = u16::try_from(rows)
        .ok()
        .and_then(|h| h.checked_add(STATUS_LINES))
        .ok_or_else(too_big)?;
    Ok(Rect::new(w, h))
}

pub fn run(mut a: App) -> Result<()> {
    let needed = {
        let c = sim::lock(&a.shared);
        required_size(c.grid().rows(), c.grid().cols())?
    };
    if !Rect::term_size()?.fits(&needed) {
        return Err(Error::Terminal(format!(
            "terminal must be at least {}x{}",
            needed.w, needed.h
        )));
    }

    runup()?;
    let d = draw(&mut a);
    shutdown()?;
    d
}

fn runup() -> Result<()> {
    execute!(io::stderr(), EnterAlternateScreen, SetTitle("Life on a torus"), Hide)?;
    enable_raw_mode()?;
    execute!(io::stdout(), Clear(ClearType::All))?;
    Ok(())
}

fn shutdown() -> Result<()> {
    execute!(io::stderr(), LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;
    Ok(())
}

fn draw(a: &mut App) -> Result<()> {
    let ticker = sim::spawn_ticker(Arc::clone(&a.shared), a.stop.clone())?;

    let res = event_loop(a);

    a.stop.stop();
    if ticker.join().is_err() {
        warn!("tick thread panicked");
    }
    res
}

fn event_loop(a: &mut App) -> Result<()> {
    let mut out = io::stdout();
    while !a.should_exit() {
        queue!(out, MoveTo(0, 0))?;
        for line in a.frame().split("\r\n") {
            queue!(out, Print(line), Clear(ClearType::UntilNewLine), MoveToNextLine(1))?;
        }
        out.flush()?;

        if event::poll(POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    a.hotkey(key);
                }
            }
        }
    }
    Ok(())
}
