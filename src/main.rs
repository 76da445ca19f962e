use mazeway::app::App;

fn main() -> std::io::Result<()> {
    // The terminal stays in raw mode for the whole run, so logs go to a
    // file through a non-blocking writer.
    let file_appender = tracing_appender::rolling::never(".", "mazeway.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = App::default().run(&mut stdout);
    App::restore_terminal(&mut stdout)?;
    result
}
