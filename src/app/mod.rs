mod renderer;

use std::{
    io::{Stdout, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError, Sender},
    },
    time::Duration,
};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{self, KeyCode},
    queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    app::renderer::{CELL_WIDTH, Renderer, RendererStatus},
    generate::generate,
    maze::{CellKey, Direction, Maze, StartPolicy},
    solvers::{Solver, solve},
    trace::FnSink,
};

/// Events crossing the compute -> render channel, in push order. The carve,
/// visit and trace variants are the core's visitation records tagged with
/// the animation stage they belong to.
#[derive(Debug, Clone)]
pub(crate) enum AnimationEvent {
    /// A fresh all-walled maze with its marker cells.
    Layout { size: u8, start: CellKey, end: CellKey },
    /// Status-line change between animation stages.
    Phase { label: String },
    /// A passage was carved into `key` during generation.
    Carve { key: CellKey, arrival: Option<Direction> },
    /// A search examined `key`.
    Visit { key: CellKey, arrival: Option<Direction> },
    /// One step of the final path replay.
    Trace { key: CellKey, arrival: Option<Direction> },
}

enum UserInputEvent {
    KeyPress(event::KeyEvent),
    Resize,
}

#[derive(Debug)]
pub(crate) enum UserActionEvent {
    /// Increase animation speed
    SpeedUp,
    /// Decrease animation speed
    SlowDown,
    /// Terminal resize
    Resize,
    /// Cancel rendering
    Cancel,
}

pub struct App {
    /// Timeout for receiving input events, a.k.a. how often the main loop
    /// checks the render done flag
    input_recv_timeout: Duration,
    /// Timeout for polling input events in the input thread
    event_poll_timeout: Duration,
}

impl Default for App {
    fn default() -> Self {
        Self {
            input_recv_timeout: Duration::from_millis(100),
            event_poll_timeout: Duration::from_millis(100),
        }
    }
}

impl App {
    /// Available start/end placements
    const POLICIES: [StartPolicy; 2] = [StartPolicy::Fixed, StartPolicy::Random];
    /// Available search strategies
    const SOLVERS: [Solver; 3] = [Solver::Dfs, Solver::Bfs, Solver::Bidirectional];

    /// Set a panic hook to restore terminal state on panic, even if the
    /// panic occurs in another thread.
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Main application loop: gather the run settings, then animate one
    /// generate-and-solve run until it completes or the user cancels.
    pub fn run(&self, stdout: &mut Stdout) -> std::io::Result<()> {
        let size = match App::ask_maze_size(stdout)? {
            Some(size) => size,
            None => {
                return Ok(());
            }
        };

        let policy = match App::select_from_menu(
            stdout,
            "Select start/end placement (use arrow keys and Enter, or Esc to exit):",
            &App::POLICIES,
        )? {
            Some(policy) => {
                stdout.execute(style::PrintStyledContent(
                    format!("Selected placement: {}\r\n", policy)
                        .with(Color::Green)
                        .attribute(Attribute::Bold),
                ))?;
                policy
            }
            None => {
                return Ok(());
            }
        };

        let solver = match App::select_from_menu(
            stdout,
            "Select search strategy (use arrow keys and Enter, or Esc to exit):",
            &App::SOLVERS,
        )? {
            Some(solver) => {
                stdout.execute(style::PrintStyledContent(
                    format!("Selected solver: {}\r\n", solver)
                        .with(Color::Green)
                        .attribute(Attribute::Bold),
                ))?;
                solver
            }
            None => {
                return Ok(());
            }
        };

        queue!(
            stdout,
            style::PrintStyledContent(
                "Controls:\r\n"
                    .with(Color::Yellow)
                    .attribute(Attribute::Bold)
            ),
            style::PrintStyledContent("  ↑/↓: Speed up/slow down animation\r\n".with(Color::Cyan)),
            style::PrintStyledContent("  Esc: Exit\r\n\r\n".with(Color::Cyan)),
        )?;
        stdout.flush()?;

        // Flag set by the render thread when the animation has fully drained.
        let render_done = Arc::new(AtomicBool::new(false));
        // Flag set on Esc; every thread watches it.
        let render_cancel = Arc::new(AtomicBool::new(false));

        let (input_tx, input_rx) = std::sync::mpsc::channel::<UserInputEvent>();
        let poll_timeout = self.event_poll_timeout;
        let done_for_input = render_done.clone();
        let cancel_for_input = render_cancel.clone();
        let input_thread = std::thread::spawn(move || -> std::io::Result<()> {
            App::listen_to_user_input(input_tx, poll_timeout, &done_for_input, &cancel_for_input)
        });

        // Unbounded on purpose: the compute thread must never stall on a
        // slow renderer, only the renderer paces itself.
        let (event_tx, event_rx) = std::sync::mpsc::channel::<AnimationEvent>();
        let (action_tx, action_rx) = std::sync::mpsc::channel::<UserActionEvent>();

        let cancel_for_render = render_cancel.clone();
        let done_for_render = render_done.clone();
        let render_thread = std::thread::spawn(move || {
            let mut renderer = Renderer::new(size);
            renderer.render(event_rx, action_rx, &cancel_for_render, &done_for_render)
        });

        let compute_thread =
            std::thread::spawn(move || -> bool { App::compute(size, policy, solver, event_tx) });

        // Main thread forwards user input to the renderer while it runs.
        self.app_loop(input_rx, action_tx, render_done, render_cancel);

        let _ = input_thread.join();
        let found = compute_thread.join().expect("Compute thread panicked");
        let status = render_thread.join().expect("Render thread panicked")?;

        if let RendererStatus::Cancelled = status {
            tracing::info!("Rendering was cancelled by user.");
            return Ok(());
        }

        let msg = if found {
            "Path found! "
        } else {
            "No path found. "
        };
        stdout.execute(style::PrintStyledContent(
            msg.with(Color::Green).attribute(Attribute::Bold),
        ))?;
        stdout.execute(style::PrintStyledContent(
            "Press Esc to exit...\r\n"
                .with(Color::Blue)
                .attribute(Attribute::Bold),
        ))?;
        App::wait_for_esc()?;
        Ok(())
    }

    /// Profiling mode: run the full compute path without a terminal,
    /// draining events at channel speed.
    pub fn profile(
        &self,
        size: u8,
        solver: Solver,
        iterations: Option<usize>,
    ) -> std::io::Result<()> {
        let (event_tx, event_rx) = std::sync::mpsc::channel::<AnimationEvent>();

        // Discard every event; profiling measures the compute path alone.
        let drain_thread = std::thread::spawn(move || while event_rx.recv().is_ok() {});

        let compute_thread = std::thread::spawn(move || {
            for _ in 0..iterations.unwrap_or(1) {
                App::compute(size, StartPolicy::Fixed, solver, event_tx.clone());
            }
        });

        compute_thread.join().expect("Compute thread panicked");
        drain_thread.join().expect("Drain thread panicked");
        Ok(())
    }

    /// Build a maze, carve it, solve it, and stream every stage into the
    /// renderer channel. Returns whether the target was reached.
    fn compute(
        size: u8,
        policy: StartPolicy,
        solver: Solver,
        events: Sender<AnimationEvent>,
    ) -> bool {
        let mut maze = match Maze::new(size, policy, None) {
            Ok(maze) => maze,
            Err(error) => {
                tracing::error!(%error, "maze construction rejected");
                return false;
            }
        };
        let _ = events.send(AnimationEvent::Layout {
            size,
            start: maze.start(),
            end: maze.end(),
        });

        let _ = events.send(AnimationEvent::Phase {
            label: "Carving passages (randomized Prim)".to_string(),
        });
        let mut carve_sink = FnSink(|key, arrival| {
            let _ = events.send(AnimationEvent::Carve { key, arrival });
        });
        generate(&mut maze, None, &mut carve_sink);

        let _ = events.send(AnimationEvent::Phase {
            label: format!("Searching with {}", solver),
        });
        let mut visit_sink = FnSink(|key, arrival| {
            let _ = events.send(AnimationEvent::Visit { key, arrival });
        });
        let path = match solve(&maze, solver, maze.start(), maze.end(), &mut visit_sink) {
            Ok(path) => path,
            Err(error) => {
                tracing::error!(%error, "solver rejected its keys");
                return false;
            }
        };

        let found = !path.is_empty() || maze.start() == maze.end();
        let _ = events.send(AnimationEvent::Phase {
            label: format!("Replaying the path ({} steps)", path.len()),
        });
        for step in &path {
            let _ = events.send(AnimationEvent::Trace {
                key: step.key,
                arrival: step.arrival,
            });
        }
        tracing::info!(found, steps = path.len(), "animation computed");
        found
        // The events sender drops here, which ends the render loop.
    }

    /// Forward user input to the renderer until it reports done.
    fn app_loop(
        &self,
        input_rx: Receiver<UserInputEvent>,
        action_tx: Sender<UserActionEvent>,
        render_done: Arc<AtomicBool>,
        render_cancel: Arc<AtomicBool>,
    ) {
        tracing::info!("Started main app loop");
        loop {
            if render_done.load(Ordering::Acquire) {
                break;
            }

            let action = match input_rx.recv_timeout(self.input_recv_timeout) {
                // Timed out: go around and check the done flag again.
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
                Ok(UserInputEvent::Resize) => Some(UserActionEvent::Resize),
                Ok(UserInputEvent::KeyPress(key_event)) => match key_event.code {
                    KeyCode::Esc => {
                        tracing::debug!("[app loop] Esc pressed, notifying renderer");
                        action_tx.send(UserActionEvent::Cancel).ok();
                        render_cancel.store(true, Ordering::Release);
                        break;
                    }
                    KeyCode::Up => Some(UserActionEvent::SpeedUp),
                    KeyCode::Down => Some(UserActionEvent::SlowDown),
                    _ => None,
                },
            };

            if let Some(action) = action
                && action_tx.send(action).is_err()
            {
                // Render thread has exited
                break;
            }
        }
        tracing::info!("Exiting main app loop");
    }

    /// Listen for user input events (key presses and resize)
    /// This function runs in a separate thread, and is the only place where
    /// user input is read while the animation runs.
    fn listen_to_user_input(
        input_tx: Sender<UserInputEvent>,
        poll_timeout: Duration,
        render_done: &AtomicBool,
        render_cancel: &AtomicBool,
    ) -> std::io::Result<()> {
        loop {
            if render_done.load(Ordering::Acquire) || render_cancel.load(Ordering::Acquire) {
                return Ok(());
            }

            // Poll with a timeout so the flags above are rechecked.
            if !event::poll(poll_timeout)? {
                continue;
            }

            let input_event = match event::read()? {
                event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                    UserInputEvent::KeyPress(key_event)
                }
                event::Event::Resize(_, _) => UserInputEvent::Resize,
                _ => continue,
            };

            let should_exit = matches!(
                input_event,
                UserInputEvent::KeyPress(event::KeyEvent {
                    code: KeyCode::Esc,
                    ..
                })
            );

            if input_tx.send(input_event).is_err() {
                // Receiver has been dropped, exit the thread
                return Ok(());
            }

            if should_exit {
                tracing::debug!("[input loop] Esc pressed, exiting");
                return Ok(());
            }
        }
    }

    /// Wait for the user to press the Esc key.
    fn wait_for_esc() -> std::io::Result<()> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if code == KeyCode::Esc && kind == event::KeyEventKind::Press {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Largest side length whose display lattice plus status line fits a
    /// terminal of the given dimensions.
    fn max_maze_size(term_width: u16, term_height: u16) -> u8 {
        let lattice_cols = term_width / CELL_WIDTH;
        let from_width = (lattice_cols + 1) / 2; // 2N - 1 lattice columns
        let from_height = term_height / 2; // 2N - 1 rows plus the status line
        from_width.min(from_height).clamp(1, u8::MAX as u16) as u8
    }

    /// Ask for the maze side length, validated live against what the
    /// terminal can display. Returns None if the user exits with Esc.
    fn ask_maze_size(stdout: &mut Stdout) -> std::io::Result<Option<u8>> {
        stdout.execute(style::PrintStyledContent(
            "Enter the maze size. Enter accepts the largest that fits the terminal, Esc exits.\r\n"
                .with(Color::Blue),
        ))?;

        let validate = |input: &str| {
            let max_size = match terminal::size() {
                Ok((width, height)) => App::max_maze_size(width, height),
                Err(_) => u8::MAX,
            };
            if input.trim().is_empty() {
                return Ok(max_size);
            }
            let error_msg = format!("Please enter a number between 1 and {}.", max_size);
            input
                .parse::<u8>()
                .map_err(|_| error_msg.clone())
                .and_then(|n| {
                    if (1..=max_size).contains(&n) {
                        Ok(n)
                    } else {
                        Err(error_msg)
                    }
                })
        };

        let size = match App::prompt_with_validation(stdout, "Size: ", validate)? {
            Some(size) => size,
            None => return Ok(None),
        };
        stdout.execute(style::PrintStyledContent(
            format!("Size set to {}\r\n", size)
                .with(Color::Green)
                .attribute(Attribute::Bold),
        ))?;
        Ok(Some(size))
    }

    /// Line-edit a value with live validation and feedback. Returns None if
    /// the user cancels with Esc, Some of the validated value on Enter.
    fn prompt_with_validation<F, T>(
        stdout: &mut Stdout,
        prompt: &str,
        validate: F,
    ) -> std::io::Result<Option<T>>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        queue!(stdout, cursor::Hide, cursor::SavePosition)?;
        stdout.flush()?;

        let mut input = String::new();

        let accepted = loop {
            // Re-render the prompt line with the input colored by validity.
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;
            stdout.queue(style::PrintStyledContent(
                prompt.with(Color::Cyan).attribute(Attribute::Bold),
            ))?;

            let validation = validate(input.trim());
            let input_color = if validation.is_ok() {
                Color::Green
            } else {
                Color::Red
            };
            queue!(
                stdout,
                style::PrintStyledContent(input.clone().with(input_color)),
                style::Print("\r\n")
            )?;
            if let Err(message) = &validation {
                stdout.queue(style::PrintStyledContent(
                    message.clone().with(Color::DarkGrey).attribute(Attribute::Dim),
                ))?;
            }
            stdout.flush()?;

            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if kind != event::KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Enter => {
                        if let Ok(value) = validation {
                            break Some(value);
                        }
                        // Invalid input stays on screen for another edit.
                    }
                    KeyCode::Char(c) if !c.is_whitespace() && !c.is_control() => {
                        input.push(c);
                    }
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Esc => break None,
                    _ => {}
                }
            }
        };

        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;
        Ok(accepted)
    }

    /// Present a menu and let the user pick with the arrow keys. Returns
    /// None if the user cancels with Esc.
    fn select_from_menu<T: std::fmt::Display + Copy>(
        stdout: &mut Stdout,
        prompt: &str,
        options: &[T],
    ) -> std::io::Result<Option<T>> {
        if options.is_empty() {
            return Ok(None);
        }

        queue!(stdout, cursor::Hide, cursor::SavePosition)?;

        let mut selected = 0;

        let choice = loop {
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;
            stdout.queue(style::PrintStyledContent(prompt.with(Color::Yellow)))?;

            for (i, option) in options.iter().enumerate() {
                if i == selected {
                    stdout.queue(style::SetAttribute(Attribute::Reverse))?;
                }
                stdout.queue(style::Print(format!("\r\n{}", option)))?;
                if i == selected {
                    stdout.queue(style::SetAttribute(Attribute::NoReverse))?;
                }
            }
            stdout.queue(style::Print("\r\n"))?;
            stdout.flush()?;

            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if kind != event::KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Up => {
                        selected = match selected {
                            0 => options.len() - 1,
                            _ => selected - 1,
                        };
                    }
                    KeyCode::Down => {
                        selected = if selected >= options.len() - 1 {
                            0
                        } else {
                            selected + 1
                        };
                    }
                    KeyCode::Enter => break Some(options[selected]),
                    KeyCode::Esc => break None,
                    _ => {}
                }
            }
        };

        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_maze_size_accounts_for_lattice_and_status_line() {
        // An 80x24 terminal: 40 lattice columns -> N <= 20 by width, but
        // only 24 rows -> N <= 12 by height.
        assert_eq!(App::max_maze_size(80, 24), 12);
        // Degenerate terminals still propose a 1-cell maze.
        assert_eq!(App::max_maze_size(0, 0), 1);
    }
}
