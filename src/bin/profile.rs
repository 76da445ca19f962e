use mazeway::{app::App, solvers::Solver};

fn main() -> std::io::Result<()> {
    let app = App::default();

    let mut args = std::env::args();
    args.next(); // Skip executable name
    let size = args.next().and_then(|s| s.parse::<u8>().ok()).unwrap_or(64);
    let num_iters = args.next().and_then(|s| s.parse::<usize>().ok());
    app.profile(size, Solver::Bfs, num_iters)?;
    Ok(())
}
