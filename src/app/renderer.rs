use std::{
    io::{Stdout, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, TryRecvError},
    },
    time::Duration,
};

use crossterm::{
    cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::app::{AnimationEvent, UserActionEvent};
use crate::maze::{CellKey, Direction};

/// Terminal columns per painted block.
pub(crate) const CELL_WIDTH: u16 = 2;
/// The block every display position is painted with, colored by background.
const BLOCK: &str = "  ";

const CARVED: Color = Color::White;
const UNCARVED: Color = Color::DarkGrey;
const START: Color = Color::Blue;
const END: Color = Color::DarkYellow;
const VISITED: Color = Color::Red;
const ROUTE: Color = Color::Green;

#[derive(Debug)]
pub(crate) enum RendererStatus {
    Completed,
    Cancelled,
}

/// Per-event sleep interval, calibrated so a full animation takes roughly
/// the same wall time at any maze size, and halved/doubled by the speed
/// keys within fixed bounds.
pub(crate) struct RefreshScale {
    interval: Duration,
}

impl RefreshScale {
    const MIN: Duration = Duration::from_micros(50);
    const MAX: Duration = Duration::from_millis(200);

    pub fn calibrated(size: u8) -> Self {
        // Carve, visit and trace each touch on the order of size^2 cells.
        let events = 3 * size as u32 * size as u32;
        let interval = (Duration::from_secs(8) / events).clamp(Self::MIN, Self::MAX);
        RefreshScale { interval }
    }

    pub fn current(&self) -> Duration {
        self.interval
    }

    pub fn speed_up(&mut self) {
        self.interval = (self.interval / 2).max(Self::MIN);
    }

    pub fn slow_down(&mut self) {
        self.interval = (self.interval * 2).min(Self::MAX);
    }
}

/// Paints animation events into the terminal, one block per event.
///
/// The maze maps onto a (2N-1)x(2N-1) display lattice: cell (row, col) sits
/// at display position (2*row, 2*col) and the odd positions between cells
/// are the walls, painted only when a passage opens through them. A status
/// line sits on the row below the lattice.
pub(crate) struct Renderer {
    stdout: Stdout,
    size: Option<u8>,
    start: Option<CellKey>,
    end: Option<CellKey>,
    refresh: RefreshScale,
}

impl Renderer {
    pub fn new(size: u8) -> Self {
        Renderer {
            stdout: std::io::stdout(),
            size: None,
            start: None,
            end: None,
            refresh: RefreshScale::calibrated(size),
        }
    }

    /// Drains animation events until the producer hangs up, sleeping the
    /// refresh interval between events and applying user actions between
    /// them. Returns whether the run completed or was cancelled.
    pub fn render(
        &mut self,
        events: Receiver<AnimationEvent>,
        actions: Receiver<UserActionEvent>,
        cancel: &AtomicBool,
        done: &AtomicBool,
    ) -> std::io::Result<RendererStatus> {
        queue!(self.stdout, terminal::Clear(ClearType::All), cursor::Hide)?;
        self.stdout.flush()?;

        loop {
            // Apply whatever the user pressed since the last event.
            loop {
                match actions.try_recv() {
                    Ok(UserActionEvent::SpeedUp) => self.refresh.speed_up(),
                    Ok(UserActionEvent::SlowDown) => self.refresh.slow_down(),
                    Ok(UserActionEvent::Resize) => {
                        if !self.fits_terminal()? {
                            cancel.store(true, Ordering::Release);
                        }
                    }
                    Ok(UserActionEvent::Cancel) => {
                        cancel.store(true, Ordering::Release);
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }

            if cancel.load(Ordering::Acquire) {
                return Ok(RendererStatus::Cancelled);
            }

            match events.recv() {
                // Producer dropped its sender: the animation is complete.
                Err(_) => break,
                Ok(event) => {
                    if !self.render_event(&event)? {
                        cancel.store(true, Ordering::Release);
                        return Ok(RendererStatus::Cancelled);
                    }
                    std::thread::sleep(self.refresh.current());
                }
            }
        }

        // Park the cursor below the status line before handing back.
        if let Some(size) = self.size {
            queue!(self.stdout, cursor::MoveTo(0, 2 * size as u16), cursor::Show)?;
            self.stdout.flush()?;
        }
        done.store(true, Ordering::Release);
        Ok(RendererStatus::Completed)
    }

    /// Paints one event. Returns Ok(false) when the terminal cannot hold
    /// the maze, which cancels the run.
    fn render_event(&mut self, event: &AnimationEvent) -> std::io::Result<bool> {
        match event {
            AnimationEvent::Layout { size, start, end } => {
                self.size = Some(*size);
                self.start = Some(*start);
                self.end = Some(*end);
                if !self.fits_terminal()? {
                    return Ok(false);
                }

                let lattice = 2 * *size as u16 - 1;
                for row in 0..lattice {
                    for col in 0..lattice {
                        let color = if row % 2 == 0 && col % 2 == 0 {
                            UNCARVED
                        } else {
                            Color::Black
                        };
                        self.block(col * CELL_WIDTH, row, color)?;
                    }
                }
                self.paint_marker(*start, START)?;
                self.paint_marker(*end, END)?;
                self.stdout.flush()?;
            }
            AnimationEvent::Phase { label } => self.status(label)?,
            AnimationEvent::Carve { key, arrival } => self.paint_cell(*key, *arrival, CARVED)?,
            AnimationEvent::Visit { key, arrival } => self.paint_cell(*key, *arrival, VISITED)?,
            AnimationEvent::Trace { key, arrival } => self.paint_cell(*key, *arrival, ROUTE)?,
        }
        Ok(true)
    }

    /// Paint the display block of maze cell `key`, plus the wall gap toward
    /// `arrival` when present. Start and end keep their marker colors; the
    /// gap is painted either way so the corridor stays connected.
    fn paint_cell(
        &mut self,
        key: CellKey,
        arrival: Option<Direction>,
        color: Color,
    ) -> std::io::Result<()> {
        let Some(size) = self.size else {
            return Ok(());
        };
        let (row, col) = (key / size as u16, key % size as u16);
        let (x, y) = (col * 2 * CELL_WIDTH, row * 2);

        if Some(key) != self.start && Some(key) != self.end {
            self.block(x, y, color)?;
        }
        if let Some(direction) = arrival {
            let (gap_x, gap_y) = match direction {
                Direction::Up => (x, y - 1),
                Direction::Down => (x, y + 1),
                Direction::Left => (x - CELL_WIDTH, y),
                Direction::Right => (x + CELL_WIDTH, y),
            };
            self.block(gap_x, gap_y, color)?;
        }
        self.stdout.flush()
    }

    fn paint_marker(&mut self, key: CellKey, color: Color) -> std::io::Result<()> {
        let Some(size) = self.size else {
            return Ok(());
        };
        let (row, col) = (key / size as u16, key % size as u16);
        self.block(col * 2 * CELL_WIDTH, row * 2, color)
    }

    fn block(&mut self, x: u16, y: u16, color: Color) -> std::io::Result<()> {
        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            debug_assert_eq!(
                BLOCK.width(),
                CELL_WIDTH as usize,
                "each block must occupy exactly two character widths"
            );
        }
        queue!(
            self.stdout,
            cursor::MoveTo(x, y),
            style::PrintStyledContent(BLOCK.on(color))
        )
    }

    /// Rewrites the status line below the lattice, truncated to what the
    /// terminal can show.
    fn status(&mut self, label: &str) -> std::io::Result<()> {
        let Some(size) = self.size else {
            return Ok(());
        };
        let width = terminal::size()?.0;
        let (text, _) = label.unicode_truncate(width as usize);
        queue!(
            self.stdout,
            cursor::MoveTo(0, 2 * size as u16 - 1),
            terminal::Clear(ClearType::UntilNewLine),
            style::PrintStyledContent(text.to_string().with(Color::Cyan))
        )?;
        self.stdout.flush()
    }

    /// Whether the terminal can hold the lattice plus the status line. On a
    /// misfit, replaces the screen with a resize notice.
    fn fits_terminal(&mut self) -> std::io::Result<bool> {
        let Some(size) = self.size else {
            return Ok(true);
        };
        let needed_cols = (2 * size as u16 - 1) * CELL_WIDTH;
        let needed_rows = 2 * size as u16;
        let (width, height) = terminal::size()?;
        if width < needed_cols || height < needed_rows {
            let notice = format!(
                "Terminal is too small for a {size}x{size} maze ({needed_cols}x{needed_rows} needed). Press Esc to exit.\r\n"
            );
            queue!(
                self.stdout,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                style::PrintStyledContent(notice.with(Color::Yellow).attribute(Attribute::Bold))
            )?;
            self.stdout.flush()?;
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_scale_stays_within_bounds() {
        let mut scale = RefreshScale::calibrated(255);
        assert!(scale.current() >= RefreshScale::MIN);
        for _ in 0..64 {
            scale.speed_up();
        }
        assert_eq!(scale.current(), RefreshScale::MIN);
        for _ in 0..64 {
            scale.slow_down();
        }
        assert_eq!(scale.current(), RefreshScale::MAX);
    }
}
