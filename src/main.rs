use banana_runner::accounts::{AuthSession, LeaderboardEntry};
use banana_runner::challenges::{default_source, BananaPuzzle, PuzzleError, PuzzleSource};
use banana_runner::config::RunnerConfig;
use banana_runner::core::constants::HTTP_TIMEOUT_SECONDS;
use banana_runner::core::{advance, GameSession, SessionMode, TickEvent};
use banana_runner::input::handle_game_input;
use banana_runner::progression::{available_characters, Tier, UnlockState};
use banana_runner::scene::TrackScene;
use banana_runner::sync::{
    self, LocalCache, ProfileBackend, ScoreSync, SessionContext, SyncError, SyncOutcome,
    CACHE_FILENAME,
};
use banana_runner::ui::auth_form::{AuthFormScreen, AuthMode};
use banana_runner::ui::character_select::CharacterSelectScreen;
use banana_runner::ui::game_scene::render_game_scene;
use banana_runner::ui::home::{menu_items, HomeAction, HomeScreen, HomeSummary};
use banana_runner::ui::leaderboard::{format_entry, LeaderboardScreen, LeaderboardState};
use banana_runner::ui::draw_too_small;
use banana_runner::utils::build_info;
use banana_runner::utils::logging::{init_file_logging, init_stderr_logging};
use banana_runner::utils::persistence::data_path;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Input poll timeout per frame; matches the 16ms simulation tick.
const FRAME_POLL_MS: u64 = 16;
const MENU_POLL_MS: u64 = 50;
/// How long to wait for in-flight score submissions on exit.
const SHUTDOWN_SYNC_SECONDS: u64 = 3;

enum Screen {
    Home,
    Auth,
    Characters,
    Leaderboard,
    Game,
}

type AuthHandle = JoinHandle<Result<AuthSession, SyncError>>;
type LeaderboardHandle = JoinHandle<Result<Vec<LeaderboardEntry>, SyncError>>;
type PuzzleHandle = JoinHandle<Result<BananaPuzzle, PuzzleError>>;

fn main() -> io::Result<()> {
    // Handle CLI arguments
    let args: Vec<String> = std::env::args().collect();
    let mut force_offline = false;

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" | "-v" => {
                println!("{}", build_info::version_line());
                std::process::exit(0);
            }
            "--help" | "-h" => {
                println!("Banana Runner - Terminal Endless Runner\n");
                println!("Usage: banana-runner [command]\n");
                println!("Commands:");
                println!("  leaderboard  Print the top 10 scores");
                println!("  offline      Play without the account server");
                println!("  --version    Show version information");
                println!("  --help       Show this help message");
                std::process::exit(0);
            }
            "leaderboard" => {
                init_stderr_logging("warn");
                let config = RunnerConfig::load();
                std::process::exit(print_leaderboard(&config));
            }
            "offline" => force_offline = true,
            other => {
                eprintln!("Unknown command: {}", other);
                eprintln!("Run 'banana-runner --help' for usage.");
                std::process::exit(1);
            }
        }
    }

    let log_path = init_file_logging().ok();

    let mut config = RunnerConfig::load();
    if force_offline {
        config.offline = true;
    }

    let backend = match sync::connect(&config) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Could not open account storage: {}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
        }
    };
    info!(
        backend = backend.name(),
        api_url = %config.api_url,
        log = ?log_path,
        "banana runner starting"
    );

    let cache_path = data_path(CACHE_FILENAME).ok();
    let cache = cache_path
        .as_deref()
        .map(LocalCache::load)
        .unwrap_or_default();
    let mut score_sync = ScoreSync::new(Arc::clone(&backend), cache, cache_path);
    let mut context = score_sync.restored_context();
    if score_sync.flush_pending(&context) > 0 {
        info!("resubmitting scores queued by a previous session");
    }

    let puzzle_source: Arc<dyn PuzzleSource> = Arc::from(default_source(
        &config.puzzle_url,
        config.offline,
        HTTP_TIMEOUT_SECONDS,
    ));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend_ui = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_ui)?;

    let result = run(
        &mut terminal,
        &config,
        &backend,
        &puzzle_source,
        &mut score_sync,
        &mut context,
    );

    // Cleanup terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;

    if score_sync.in_flight() > 0 {
        println!("Saving scores...");
        for outcome in score_sync.wait_idle(Duration::from_secs(SHUTDOWN_SYNC_SECONDS)) {
            info!(?outcome, "sync settled on exit");
        }
    }

    println!("Goodbye!");
    result
}

/// The `leaderboard` command. Returns the process exit code.
fn print_leaderboard(config: &RunnerConfig) -> i32 {
    let backend = match sync::connect(config) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Could not open account storage: {}", e);
            return 1;
        }
    };
    match backend.leaderboard() {
        Ok(entries) if entries.is_empty() => {
            println!("No scores yet.");
            0
        }
        Ok(entries) => {
            println!("Banana Runner - Top Scores ({})\n", backend.name());
            for (i, entry) in entries.iter().enumerate() {
                println!("{}", format_entry(i + 1, entry));
            }
            0
        }
        Err(e) => {
            eprintln!("Failed to fetch leaderboard: {}", e);
            1
        }
    }
}

/// High score, unlocks and selected runner for whoever is playing.
fn player_stats(context: &SessionContext, score_sync: &ScoreSync) -> (u64, UnlockState, Tier) {
    match context.profile() {
        Some(profile) => (
            profile.high_score,
            profile.unlocked_characters,
            profile.selected_character,
        ),
        None => {
            let cache = score_sync.cache();
            (
                cache.high_score,
                cache.unlocked_characters,
                cache.selected_character,
            )
        }
    }
}

/// Turn sync outcomes into user-facing notices, updating the profile.
fn describe_outcomes(outcomes: Vec<SyncOutcome>, context: &mut SessionContext) -> Vec<String> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            SyncOutcome::Saved { score, receipt } => {
                if let Some(profile) = context.profile_mut() {
                    profile.high_score = profile.high_score.max(receipt.high_score);
                    profile.unlocked_characters.merge(&receipt.unlocked_characters);
                }
                Some(format!("Score {} saved.", score))
            }
            SyncOutcome::Queued { score, .. } => {
                Some(format!("Server unreachable; score {} kept for later.", score))
            }
            SyncOutcome::Rejected { score, error } => {
                Some(format!("Score {} not saved: {}", score, error))
            }
            SyncOutcome::Cached { .. } => None,
        })
        .collect()
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &RunnerConfig,
    backend: &Arc<dyn ProfileBackend>,
    puzzle_source: &Arc<dyn PuzzleSource>,
    score_sync: &mut ScoreSync,
    context: &mut SessionContext,
) -> io::Result<()> {
    let mut current_screen = Screen::Home;
    let mut home_screen = HomeScreen::new();
    let mut auth_screen = AuthFormScreen::new(AuthMode::Login);
    let mut select_screen = CharacterSelectScreen::new(Tier::DEFAULT);
    let mut leaderboard_screen = LeaderboardScreen::loading();

    let mut auth_handle: Option<AuthHandle> = None;
    let mut leaderboard_handle: Option<LeaderboardHandle> = None;

    if let Some(name) = context.username() {
        home_screen.status = Some(format!("Welcome back, {}!", name));
    }

    loop {
        // Background score submissions
        for notice in describe_outcomes(score_sync.poll(), context) {
            home_screen.status = Some(notice);
        }

        match current_screen {
            Screen::Home => {
                let items = menu_items(context.is_authenticated());
                let (high_score, _, character) = player_stats(context, score_sync);
                let summary = HomeSummary {
                    username: context.username(),
                    high_score,
                    character,
                    backend: backend.name(),
                };
                terminal.draw(|f| {
                    let area = f.size();
                    if !draw_too_small(f, area) {
                        home_screen.draw(f, area, &items, &summary);
                    }
                })?;

                if event::poll(Duration::from_millis(MENU_POLL_MS))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        match key.code {
                            KeyCode::Up => home_screen.move_up(),
                            KeyCode::Down => home_screen.move_down(items.len()),
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                            KeyCode::Enter => match home_screen.selected(&items) {
                                Some(HomeAction::Play) => current_screen = Screen::Game,
                                Some(HomeAction::Login) => {
                                    auth_screen = AuthFormScreen::new(AuthMode::Login);
                                    current_screen = Screen::Auth;
                                }
                                Some(HomeAction::Register) => {
                                    auth_screen = AuthFormScreen::new(AuthMode::Register);
                                    current_screen = Screen::Auth;
                                }
                                Some(HomeAction::Characters) => {
                                    select_screen = CharacterSelectScreen::new(character);
                                    current_screen = Screen::Characters;
                                }
                                Some(HomeAction::Leaderboard) => {
                                    leaderboard_screen = LeaderboardScreen::loading();
                                    let backend = Arc::clone(backend);
                                    leaderboard_handle =
                                        Some(std::thread::spawn(move || backend.leaderboard()));
                                    current_screen = Screen::Leaderboard;
                                }
                                Some(HomeAction::Logout) => {
                                    info!(user = ?context.username(), "logged out");
                                    *context = SessionContext::Anonymous;
                                    score_sync.remember_session(None);
                                    home_screen = HomeScreen::new();
                                    home_screen.status = Some("Logged out.".to_string());
                                }
                                Some(HomeAction::Quit) => break,
                                None => {}
                            },
                            _ => {}
                        }
                    }
                }
            }

            Screen::Auth => {
                // Check if the background login/register finished
                if let Some(handle) = auth_handle.take() {
                    if handle.is_finished() {
                        auth_screen.busy = false;
                        match handle.join() {
                            Ok(Ok(session)) => {
                                info!(user = %session.profile.username, "logged in");
                                let name = session.profile.username.clone();
                                score_sync.remember_session(Some(&session));
                                *context = SessionContext::Authenticated(session);
                                let pending = score_sync.flush_pending(context);
                                home_screen = HomeScreen::new();
                                home_screen.status = Some(if pending > 0 {
                                    format!("Welcome, {}! Sending {} saved score(s).", name, pending)
                                } else {
                                    format!("Welcome, {}!", name)
                                });
                                current_screen = Screen::Home;
                                continue;
                            }
                            Ok(Err(e)) => {
                                warn!(error = %e, "authentication failed");
                                auth_screen.validation_error = Some(e.to_string());
                            }
                            Err(_) => {
                                auth_screen.validation_error =
                                    Some("Request failed unexpectedly".to_string());
                            }
                        }
                    } else {
                        auth_handle = Some(handle);
                    }
                }

                terminal.draw(|f| {
                    let area = f.size();
                    if !draw_too_small(f, area) {
                        auth_screen.draw(f, area);
                    }
                })?;

                if event::poll(Duration::from_millis(MENU_POLL_MS))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press || auth_screen.busy {
                            continue;
                        }
                        match key.code {
                            KeyCode::Char(c) => auth_screen.handle_char_input(c),
                            KeyCode::Backspace => auth_screen.handle_backspace(),
                            KeyCode::Tab | KeyCode::Down => auth_screen.next_field(),
                            KeyCode::BackTab | KeyCode::Up => auth_screen.prev_field(),
                            KeyCode::Enter => {
                                if !auth_screen.on_last_field() {
                                    auth_screen.next_field();
                                } else if auth_screen.validate() {
                                    auth_screen.busy = true;
                                    let backend = Arc::clone(backend);
                                    let mode = auth_screen.mode;
                                    let username = auth_screen.username.trim().to_string();
                                    let email = auth_screen.email.trim().to_string();
                                    let password = auth_screen.password.clone();
                                    auth_handle = Some(std::thread::spawn(move || match mode {
                                        AuthMode::Login => backend.login(&username, &password),
                                        AuthMode::Register => {
                                            backend.register(&username, &email, &password)
                                        }
                                    }));
                                }
                            }
                            KeyCode::Esc => current_screen = Screen::Home,
                            _ => {}
                        }
                    }
                }
            }

            Screen::Characters => {
                let (high_score, unlocks, character) = player_stats(context, score_sync);
                let options = available_characters(&unlocks);

                terminal.draw(|f| {
                    let area = f.size();
                    if !draw_too_small(f, area) {
                        select_screen.draw(f, area, &options, character, high_score);
                    }
                })?;

                if event::poll(Duration::from_millis(MENU_POLL_MS))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        match key.code {
                            KeyCode::Up => select_screen.move_up(),
                            KeyCode::Down => select_screen.move_down(),
                            KeyCode::Enter => {
                                let tier = select_screen.highlighted();
                                match select_character(backend, score_sync, context, &unlocks, tier)
                                {
                                    Ok(()) => {
                                        home_screen.status =
                                            Some(format!("{} runner selected.", tier.name()));
                                        current_screen = Screen::Home;
                                    }
                                    Err(message) => select_screen.error = Some(message),
                                }
                            }
                            KeyCode::Esc => current_screen = Screen::Home,
                            _ => {}
                        }
                    }
                }
            }

            Screen::Leaderboard => {
                if let Some(handle) = leaderboard_handle.take() {
                    if handle.is_finished() {
                        leaderboard_screen.state = match handle.join() {
                            Ok(Ok(entries)) => LeaderboardState::Loaded(entries),
                            Ok(Err(e)) => LeaderboardState::Failed(e.to_string()),
                            Err(_) => LeaderboardState::Failed("Request failed".to_string()),
                        };
                    } else {
                        leaderboard_handle = Some(handle);
                    }
                }

                let highlight = context.username();
                terminal.draw(|f| {
                    let area = f.size();
                    if !draw_too_small(f, area) {
                        leaderboard_screen.draw(f, area, highlight);
                    }
                })?;

                if event::poll(Duration::from_millis(MENU_POLL_MS))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        match key.code {
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if leaderboard_handle.is_none() =>
                            {
                                leaderboard_screen = LeaderboardScreen::loading();
                                let backend = Arc::clone(backend);
                                leaderboard_handle =
                                    Some(std::thread::spawn(move || backend.leaderboard()));
                            }
                            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                                current_screen = Screen::Home
                            }
                            _ => {}
                        }
                    }
                }
            }

            Screen::Game => {
                run_game(terminal, config, puzzle_source, score_sync, context)?;
                current_screen = Screen::Home;
            }
        }
    }

    Ok(())
}

/// Apply a character choice locally and, when logged in, on the backend.
fn select_character(
    backend: &Arc<dyn ProfileBackend>,
    score_sync: &mut ScoreSync,
    context: &mut SessionContext,
    unlocks: &UnlockState,
    tier: Tier,
) -> Result<(), String> {
    if !unlocks.is_unlocked(tier) {
        return Err(format!(
            "{} unlocks at a high score of {}",
            tier.name(),
            tier.threshold()
        ));
    }
    if let SessionContext::Authenticated(session) = context {
        let selected = backend
            .select_character(&session.token, tier)
            .map_err(|e| e.to_string())?;
        session.profile.selected_character = selected;
        score_sync.remember_session(Some(&*session));
    } else {
        score_sync.remember_character(tier);
    }
    info!(tier = tier.name(), "runner selected");
    Ok(())
}

/// The game screen loop. Returns when the player goes back home.
fn run_game(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &RunnerConfig,
    puzzle_source: &Arc<dyn PuzzleSource>,
    score_sync: &mut ScoreSync,
    context: &mut SessionContext,
) -> io::Result<()> {
    let (high_score, unlocks, character) = player_stats(context, score_sync);
    let mut session = GameSession::new(config.clone(), high_score, unlocks, character);
    let mut scene = TrackScene::new(session.start_position);
    let mut rng = rand::thread_rng();
    let mut puzzle_handle: Option<PuzzleHandle> = None;
    let mut last_frame = Instant::now();

    loop {
        // Puzzle fetched in the background
        if let Some(handle) = puzzle_handle.take() {
            if handle.is_finished() {
                let fetched = handle
                    .join()
                    .unwrap_or_else(|_| Err(PuzzleError::Request("fetch thread panicked".into())));
                let waiting = session.mode == SessionMode::MiniGameForExtraLife;
                if let Some(challenge) = session
                    .active_challenge
                    .as_mut()
                    .filter(|c| waiting && c.is_loading())
                {
                    match fetched {
                        Ok(puzzle) => challenge.set_puzzle(puzzle),
                        Err(e) => challenge.set_load_error(e.to_string()),
                    }
                }
            } else {
                puzzle_handle = Some(handle);
            }
        }

        for notice in describe_outcomes(score_sync.poll(), context) {
            session.add_message(notice);
        }

        let username = context.username().map(str::to_string);
        terminal.draw(|frame| {
            let area = frame.size();
            if !draw_too_small(frame, area) {
                render_game_scene(frame, area, &session, &scene, username.as_deref());
            }
        })?;

        let mut events = Vec::new();
        let mut quit = false;
        if event::poll(Duration::from_millis(FRAME_POLL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let result = handle_game_input(key, &mut session, &mut scene);
                    events.extend(result.events);
                    quit = result.quit_to_home;
                }
            }
        }

        let dt_ms = last_frame.elapsed().as_millis() as u64;
        last_frame = Instant::now();
        events.extend(advance(&mut session, &mut scene, dt_ms, &mut rng).events);

        for event in &events {
            match event {
                TickEvent::ModeChanged {
                    to: SessionMode::MiniGameForExtraLife,
                    ..
                } => {
                    let source = Arc::clone(puzzle_source);
                    puzzle_handle = Some(std::thread::spawn(move || source.fetch()));
                }
                TickEvent::RunFinished(summary) => {
                    if let Some(profile) = context.profile_mut() {
                        profile.high_score = profile.high_score.max(summary.high_score);
                        profile.unlocked_characters.absorb_high_score(profile.high_score);
                    }
                    if let Some(SyncOutcome::Cached { high_score, .. }) =
                        score_sync.submit(context, summary)
                    {
                        info!(high_score, "guest score recorded");
                    }
                }
                _ => {}
            }
        }

        if quit {
            return Ok(());
        }
    }
}
