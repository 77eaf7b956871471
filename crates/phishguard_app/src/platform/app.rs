use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use phishguard_core::{
    AppState, AppViewModel, ConfidenceDisplay, ModelId, Msg, Phase, ThemeStore,
};
use phishguard_engine::ClientSettings;
use phishguard_logging::{guard_info, guard_warn, LevelFilter};

use super::cli::Cli;
use super::effects::EffectRunner;
use super::persistence::{load_preferences, save_preferences, Preferences};
use super::render::{render, render_models, Palette};
use super::session::Session;

const LOG_FILE: &str = "./phishguard.log";

/// Slack on top of the client timeout before the session gives up waiting.
const DEADLINE_GRACE: Duration = Duration::from_secs(5);

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    phishguard_logging::initialize(cli.log.into(), level, Path::new(LOG_FILE));

    let stored = load_preferences(&cli.prefs);
    let model = cli.model.unwrap_or(stored.model);
    let settings = ClientSettings {
        endpoint: cli.endpoint.clone().unwrap_or_else(|| stored.endpoint.clone()),
        ..ClientSettings::default()
    };
    guard_info!("Using prediction service at {}", settings.endpoint);

    let display = if cli.reported_confidence {
        ConfidenceDisplay::Reported
    } else {
        ConfidenceDisplay::LegitimateBoost
    };
    let deadline = settings.request_timeout + DEADLINE_GRACE;
    let runner = EffectRunner::new(settings).context("failed to start prediction engine")?;
    let session = Session::new(AppState::with_confidence_display(display), runner, deadline);

    let colour = io::stdout().is_terminal();
    let theme = cli.theme.unwrap_or(stored.theme);

    if cli.urls.is_empty() {
        let mut prompt = Prompt::new(session, model, theme, colour, cli.prefs, stored);
        prompt.run()?;
        Ok(ExitCode::SUCCESS)
    } else {
        run_batch(session, &cli.urls, model, palette(theme, colour))
    }
}

fn palette(theme: phishguard_core::Theme, colour: bool) -> Palette {
    if colour {
        Palette::for_theme(theme)
    } else {
        Palette::plain()
    }
}

fn run_batch(
    mut session: Session,
    urls: &[String],
    model: ModelId,
    palette: Palette,
) -> anyhow::Result<ExitCode> {
    let stdout = io::stdout();
    let mut failures = 0usize;
    for url in urls {
        let mut out = stdout.lock();
        let view = session.submit(url, model.as_str(), |_| {});
        render(&mut out, &view, palette)?;
        writeln!(out)?;
        if view.phase == Phase::Failed {
            failures += 1;
        }
    }

    guard_info!("Checked {} url(s), {} failed", urls.len(), failures);
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Best effort: a failed progress line is logged and the request carries on.
fn draw_progress(out: &mut impl Write, view: &AppViewModel, palette: Palette) {
    if view.phase != Phase::Loading {
        return;
    }
    if let Err(err) = render(out, view, palette) {
        guard_warn!("Failed to draw progress line: {}", err);
    }
}

/// Interactive line-based front end.
struct Prompt {
    session: Session,
    model: ModelId,
    themes: ThemeStore,
    colour: bool,
    prefs_path: PathBuf,
    preferences: Arc<Mutex<Preferences>>,
}

impl Prompt {
    fn new(
        session: Session,
        model: ModelId,
        theme: phishguard_core::Theme,
        colour: bool,
        prefs_path: PathBuf,
        stored: Preferences,
    ) -> Self {
        let preferences = Arc::new(Mutex::new(stored));
        let mut themes = ThemeStore::new(theme);
        let saver = preferences.clone();
        let path = prefs_path.clone();
        themes.subscribe(move |theme| {
            if let Ok(mut prefs) = saver.lock() {
                prefs.theme = theme;
                save_preferences(&path, &prefs);
            }
        });

        Self {
            session,
            model,
            themes,
            colour,
            prefs_path,
            preferences,
        }
    }

    fn palette(&self) -> Palette {
        palette(self.themes.get(), self.colour)
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut out = io::stdout();
        writeln!(out, "PhishGuard: enter a URL to check, :help for commands.")?;

        let mut line = String::new();
        loop {
            write!(out, "[{}] url> ", self.model)?;
            out.flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(());
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if !self.handle(input, &mut out)? {
                return Ok(());
            }
        }
    }

    /// Returns false when the user asked to quit.
    fn handle(&mut self, input: &str, out: &mut impl Write) -> anyhow::Result<bool> {
        let palette = self.palette();
        let mut words = input.split_whitespace();
        match words.next() {
            Some(":quit") | Some(":q") => return Ok(false),
            Some(":help") => {
                writeln!(out, "  <url>         check a website")?;
                writeln!(out, "  :model <id>   switch classifier (lr, rf, dt)")?;
                writeln!(out, "  :models       list classifiers")?;
                writeln!(out, "  :theme        toggle light/dark")?;
                writeln!(out, "  :clear        clear the last result")?;
                writeln!(out, "  :quit         exit")?;
            }
            Some(":models") => render_models(out, self.model, palette)?,
            Some(":model") => match words.next().map(str::parse::<ModelId>) {
                Some(Ok(model)) => {
                    self.model = model;
                    self.remember_model(model);
                    writeln!(out, "Using {}", model.label())?;
                }
                Some(Err(err)) => writeln!(out, "{err}")?,
                None => render_models(out, self.model, palette)?,
            },
            Some(":theme") => {
                let theme = self.themes.toggle();
                writeln!(out, "Theme: {theme}")?;
            }
            Some(":clear") => {
                self.session.dispatch(Msg::Cleared);
            }
            Some(_) => {
                let model = self.model;
                let view = self.session.submit(input, model.as_str(), |view| {
                    draw_progress(&mut io::stdout(), view, palette);
                });
                render(out, &view, palette)?;
            }
            None => {}
        }
        Ok(true)
    }

    fn remember_model(&self, model: ModelId) {
        if let Ok(mut prefs) = self.preferences.lock() {
            prefs.model = model;
            save_preferences(&self.prefs_path, &prefs);
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn prompt_in(dir: &TempDir) -> Prompt {
        let runner = EffectRunner::new(ClientSettings {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..ClientSettings::default()
        })
        .expect("runner");
        let session = Session::new(AppState::new(), runner, Duration::from_secs(5));
        Prompt::new(
            session,
            ModelId::LogisticRegression,
            phishguard_core::Theme::Light,
            false,
            dir.path().join(".phishguard.ron"),
            Preferences::default(),
        )
    }

    fn run_line(prompt: &mut Prompt, input: &str) -> (bool, String) {
        let mut out = Vec::new();
        let keep_going = prompt.handle(input, &mut out).expect("handled");
        (keep_going, String::from_utf8(out).unwrap())
    }

    #[test]
    fn model_switch_is_remembered() {
        let dir = TempDir::new().unwrap();
        let mut prompt = prompt_in(&dir);

        let (keep_going, text) = run_line(&mut prompt, ":model dt");
        assert!(keep_going);
        assert_eq!(text, "Using Decision Tree\n");
        assert_eq!(prompt.model, ModelId::DecisionTree);

        let stored = load_preferences(&dir.path().join(".phishguard.ron"));
        assert_eq!(stored.model, ModelId::DecisionTree);
    }

    #[test]
    fn unknown_model_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut prompt = prompt_in(&dir);

        let (_, text) = run_line(&mut prompt, ":model svm");
        assert_eq!(text, "Unknown model 'svm'. Use lr, rf or dt.\n");
        assert_eq!(prompt.model, ModelId::LogisticRegression);
    }

    #[test]
    fn theme_toggle_is_persisted() {
        let dir = TempDir::new().unwrap();
        let mut prompt = prompt_in(&dir);

        let (_, text) = run_line(&mut prompt, ":theme");
        assert_eq!(text, "Theme: dark\n");

        let stored = load_preferences(&dir.path().join(".phishguard.ron"));
        assert_eq!(stored.theme, phishguard_core::Theme::Dark);
    }

    #[test]
    fn invalid_url_is_reported_without_request() {
        let dir = TempDir::new().unwrap();
        let mut prompt = prompt_in(&dir);

        let (keep_going, text) = run_line(&mut prompt, "not a url");
        assert!(keep_going);
        assert_eq!(
            text,
            "Error: Please enter a valid URL (e.g., https://example.com)\n"
        );
    }

    struct BrokenPipe {
        attempts: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn progress_write_failure_is_swallowed() {
        phishguard_logging::initialize_for_tests();
        let (state, _) = phishguard_core::update(
            AppState::new(),
            Msg::Submitted {
                url: "https://example.com".to_string(),
                model: "lr".to_string(),
            },
        );
        let mut out = BrokenPipe { attempts: 0 };

        draw_progress(&mut out, &state.view(), Palette::plain());
        assert!(out.attempts > 0);

        let mut idle = BrokenPipe { attempts: 0 };
        draw_progress(&mut idle, &AppState::new().view(), Palette::plain());
        assert_eq!(idle.attempts, 0);
    }

    #[test]
    fn quit_stops_the_prompt() {
        let dir = TempDir::new().unwrap();
        let mut prompt = prompt_in(&dir);

        assert!(!run_line(&mut prompt, ":quit").0);
        assert!(!run_line(&mut prompt, ":q").0);
    }
}
