use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
};

use typeboard::{
    app::{run_session, SessionError},
    config::{Config, ConfigOverrides, ConfigStore, FileConfigStore},
    controller,
    leaderboard::LeaderboardStore,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    session::TypingSession,
};

/// typing speed test with a persisted leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a fixed sample text as fast as you can. Each finished run is scored in characters per minute and second and saved to a JSON leaderboard."
)]
pub struct Cli {
    /// text to type instead of the configured one
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// leaderboard file to read and append to
    #[clap(short = 'l', long)]
    leaderboard: Option<PathBuf>,

    /// countdown shown while typing, in seconds (display only)
    #[clap(short = 's', long)]
    countdown_secs: Option<u64>,

    /// config file to use instead of the platform default
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            text: self.prompt.clone(),
            leaderboard_path: self.leaderboard.clone(),
            countdown_secs: self.countdown_secs,
        }
    }

    fn resolve_config(&self) -> Config {
        let store = self.config_store();
        store.init_if_missing();
        store.load().with_overrides(&self.overrides())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init();

    let config = cli.resolve_config();
    let store = LeaderboardStore::open(&config.leaderboard_path);
    let mut stdout = io::stdout();

    loop {
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        let name = controller::prompt_name(&mut stdin().lock(), &mut stdout)?;

        let mut session = TypingSession::new(&config.text);
        match type_text(&mut session, config.countdown_secs as f64) {
            Ok(()) => {}
            Err(SessionError::Interrupted) => {
                tracing::info!("typing session interrupted, exiting");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        let score = session.score(name);
        store.add(score.record.clone());
        store.show();
        controller::print_summary(&mut stdout, &score)?;

        if !controller::ask_continue(&mut stdin().lock(), &mut stdout, &config.affirmative)? {
            break;
        }
    }

    stdout.flush()?;
    Ok(())
}

/// Run one session full screen, restoring the terminal however it ends.
fn type_text(session: &mut TypingSession, countdown_secs: f64) -> Result<(), SessionError> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(err.into());
    }

    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(err.into());
        }
    };

    let result = {
        let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
        run_session(&mut terminal, &runner, session, countdown_secs)
    };

    let restored = restore_terminal(&mut terminal);
    result?;
    restored?;
    Ok(())
}

fn restore_terminal<B: Backend + Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
