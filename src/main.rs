//! lector - speed reading for EPUB books

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use lector::extract::extract_chapters_with_report;
use lector::orp::render_aligned;
use lector::playback::{format_clock, reading_time};
use lector::store;
use lector::{BookStore, Document, EpubDocument, ReaderConfig, ReadingSession, TextView};

/// Column the focus letter is aligned to during playback.
const FOCUS_COLUMN: usize = 16;

/// Words skipped by the left and right arrows.
const SEEK_STEP: isize = 10;

/// Key poll interval while paused.
const IDLE_POLL: Duration = Duration::from_millis(250);

const KEY_HELP: &str = "space pause/resume  \u{2190}/\u{2192} back/forward 10 words  \u{2191}/\u{2193} faster/slower  [/] chapter  q quit";

#[derive(Parser)]
#[command(name = "lector")]
#[command(version, about = "Speed reading for EPUB books", long_about = None)]
#[command(after_help = "EXAMPLES:
    lector add book.epub          Add a book to the library
    lector list                   Show the library with progress
    lector read <ID> --wpm 450    Read a book word by word
                                  (space pauses, arrows seek and change speed,
                                  [ and ] change chapter, q saves and quits)
    lector info book.epub         Show chapters of an EPUB file")]
struct Cli {
    /// Library directory (defaults to $LECTOR_DATA_DIR or ./.lector)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import EPUB files into the library
    Add {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// List books, most recently added first
    List,
    /// Delete a book and its progress
    Remove { id: String },
    /// Show metadata and chapters of an EPUB file without importing it
    Info { file: PathBuf },
    /// Read a book word by word, resuming where you left off
    Read {
        id: String,
        /// Reading speed in words per minute
        #[arg(long)]
        wpm: Option<u32>,
        /// Start at this chapter (1-based)
        #[arg(long)]
        chapter: Option<usize>,
    },
    /// Print a chapter as text, marking the current word
    Text {
        id: String,
        /// Chapter to print (1-based); defaults to the current one
        #[arg(long)]
        chapter: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::debug!("{e}");
            eprintln!("error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command partly failed and already reported it.
fn run(cli: Cli) -> lector::Result<bool> {
    let mut config = match &cli.config {
        Some(path) => ReaderConfig::from_file(path)?,
        None => ReaderConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    match cli.command {
        Command::Info { file } => show_info(&file, &config).map(|()| true),
        Command::Add { files } => add_books(store::global(&config)?, &files, cli.quiet),
        Command::List => list(store::global(&config)?).map(|()| true),
        Command::Remove { id } => {
            if !lector::remove_book(store::global(&config)?, &id)? {
                return Err(lector::Error::BookNotFound(id));
            }
            if !cli.quiet {
                println!("removed {id}");
            }
            Ok(true)
        }
        Command::Read { id, wpm, chapter } => {
            if let Some(wpm) = wpm {
                config.default_wpm = wpm;
            }
            read(store::global(&config)?, &config, &id, chapter, cli.quiet).map(|()| true)
        }
        Command::Text { id, chapter } => print_text(store::global(&config)?, &id, chapter),
    }
}

fn add_books(store: &dyn BookStore, files: &[PathBuf], quiet: bool) -> lector::Result<bool> {
    let mut all_ok = true;
    for path in files {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let result = std::fs::read(path)
            .map_err(lector::Error::from)
            .and_then(|bytes| lector::import_book(store, bytes, &name));
        match result {
            Ok(record) if !quiet => println!("{}  {} ({})", record.id, record.title, record.author),
            Ok(_) => {}
            Err(e) => {
                log::debug!("{}: {e}", path.display());
                eprintln!("{}: {}", path.display(), e.user_message());
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

fn list(store: &dyn BookStore) -> lector::Result<()> {
    for record in lector::list_books(store)? {
        println!(
            "{}  {:>5.1}%  {} - {}",
            record.id, record.progress.percentage, record.title, record.author
        );
    }
    Ok(())
}

fn show_info(path: &Path, config: &ReaderConfig) -> lector::Result<()> {
    let mut doc = EpubDocument::open(std::fs::read(path)?)?;
    let meta = doc.metadata().clone();
    let (chapters, report) = extract_chapters_with_report(&mut doc);
    doc.close();

    println!("File: {}", path.display());
    println!("Title: {}", meta.title);
    if !meta.authors.is_empty() {
        println!("Authors: {}", meta.authors.join(", "));
    }
    if !meta.language.is_empty() {
        println!("Language: {}", meta.language);
    }
    println!("Chapters: {}", chapters.len());
    if !report.skipped.is_empty() {
        println!("Skipped units: {}", report.skipped.len());
    }

    let wpm = config.initial_wpm();
    let mut total_words = 0;
    for (i, chapter) in chapters.iter().enumerate() {
        total_words += chapter.word_count();
        println!(
            "  {:>3}. {} ({} words, {})",
            i + 1,
            chapter.title,
            chapter.word_count(),
            format_clock(reading_time(chapter.word_count(), wpm))
        );
    }
    println!("Reading time at {wpm} wpm: {}", format_clock(reading_time(total_words, wpm)));
    Ok(())
}

/// What a key press does while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderAction {
    Toggle,
    Seek(isize),
    Faster,
    Slower,
    PrevChapter,
    NextChapter,
    Quit,
}

fn key_action(key: KeyEvent) -> Option<ReaderAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let action = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => ReaderAction::Quit,
        KeyCode::Char(' ') => ReaderAction::Toggle,
        KeyCode::Left => ReaderAction::Seek(-SEEK_STEP),
        KeyCode::Right => ReaderAction::Seek(SEEK_STEP),
        KeyCode::Up => ReaderAction::Faster,
        KeyCode::Down => ReaderAction::Slower,
        KeyCode::Char('[') => ReaderAction::PrevChapter,
        KeyCode::Char(']') => ReaderAction::NextChapter,
        KeyCode::Char('q') | KeyCode::Esc => ReaderAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Apply `action` to the session. Returns false when reading should stop.
fn apply_action(session: &mut ReadingSession<'_>, action: ReaderAction, now: Duration) -> bool {
    match action {
        ReaderAction::Toggle => session.engine_mut().toggle(now),
        ReaderAction::Seek(delta) => session.engine_mut().seek_by(delta),
        ReaderAction::Faster => session.engine_mut().faster(now),
        ReaderAction::Slower => session.engine_mut().slower(now),
        ReaderAction::PrevChapter => {
            session.prev_chapter();
        }
        ReaderAction::NextChapter => {
            session.next_chapter();
        }
        ReaderAction::Quit => return false,
    }
    true
}

/// Raw terminal mode for the lifetime of the guard.
struct RawMode;

impl RawMode {
    fn enable() -> Option<Self> {
        if !io::stdin().is_terminal() {
            return None;
        }
        match terminal::enable_raw_mode() {
            Ok(()) => Some(RawMode),
            Err(e) => {
                log::debug!("no raw mode, keys disabled: {e}");
                None
            }
        }
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("failed to restore terminal: {e}");
        }
    }
}

fn read(
    store: &dyn BookStore,
    config: &ReaderConfig,
    id: &str,
    chapter: Option<usize>,
    quiet: bool,
) -> lector::Result<()> {
    let (record, book) = lector::open_stored_book(store, id)?;
    let mut session = ReadingSession::new(store, id, book, config);
    if let Some(n) = chapter
        && !session.go_to_chapter(n.saturating_sub(1))
    {
        log::warn!("no chapter {n}, starting at the saved position");
    }

    let mut out = io::stdout().lock();
    if !quiet {
        writeln!(out, "{} - {}", record.title, record.author)?;
    }

    let raw = RawMode::enable();
    if raw.is_some() && !quiet {
        write!(out, "{KEY_HELP}\r\n")?;
    }

    let start = Instant::now();
    session.engine_mut().play(start.elapsed());

    let mut shown_chapter = None;
    let mut shown = None;

    loop {
        session.tick(start.elapsed());
        let engine = session.engine();

        if !quiet && shown_chapter != Some(engine.chapter_index()) {
            shown_chapter = Some(engine.chapter_index());
            if let Some(current) = engine.current_chapter() {
                write!(
                    out,
                    "\r\n== {} ({}/{}, {} left)\r\n",
                    current.title,
                    engine.chapter_index() + 1,
                    engine.chapter_count(),
                    format_clock(engine.chapter_remaining())
                )?;
            }
        }
        let frame = (engine.position(), engine.is_playing(), engine.wpm());
        if shown != Some(frame) {
            shown = Some(frame);
            let word = engine.current_word().unwrap_or_default();
            write!(out, "\r\x1b[2K{}", render_aligned(word, FOCUS_COLUMN))?;
            if raw.is_some() && !engine.is_playing() {
                write!(out, "    [paused, {} wpm]", engine.wpm())?;
            }
            out.flush()?;
        }

        if raw.is_none() {
            // Without a terminal there is nothing to resume playback.
            if !engine.is_playing() {
                break;
            }
            let Some(deadline) = engine.next_deadline() else {
                break;
            };
            std::thread::sleep(deadline.saturating_sub(start.elapsed()));
            continue;
        }

        let timeout = engine
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| deadline.saturating_sub(start.elapsed()));
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && let Some(action) = key_action(key)
            && !apply_action(&mut session, action, start.elapsed())
        {
            break;
        }
    }

    drop(raw);
    writeln!(out)?;
    let progress = session.engine().progress();
    if !session.finish() {
        log::warn!("final progress for {id} was not saved");
    }
    if !quiet {
        writeln!(out, "{:.1}% read", progress.percentage)?;
    }
    Ok(())
}

/// Zero-based index of the 1-based chapter `requested`, if the book has it.
fn chapter_index(requested: usize, count: usize) -> Option<usize> {
    requested.checked_sub(1).filter(|&index| index < count)
}

fn print_text(store: &dyn BookStore, id: &str, chapter: Option<usize>) -> lector::Result<bool> {
    let (_, book) = lector::open_stored_book(store, id)?;
    let position = book.initial_position;
    let index = match chapter {
        None => position.chapter_index,
        Some(n) => match chapter_index(n, book.chapters.len()) {
            Some(index) => index,
            None => {
                log::warn!("{id}: no chapter {n} of {}", book.chapters.len());
                eprintln!("no chapter {n}: the book has {} chapters", book.chapters.len());
                return Ok(false);
            }
        },
    };
    let Some(current) = book.chapters.get(index) else {
        return Ok(false);
    };

    // Only the saved chapter has an active word.
    let active = if index == position.chapter_index {
        position.word_index
    } else {
        usize::MAX
    };

    let mut out = io::stdout().lock();
    writeln!(out, "# {}\n", current.title)?;
    for paragraph in TextView::new(&current.words, active).paragraphs() {
        let line: Vec<String> = paragraph
            .iter()
            .map(|word| match word.state {
                lector::text_view::WordState::Active => format!("[{}]", word.text),
                _ => word.text.to_string(),
            })
            .collect();
        writeln!(out, "{}\n", line.join(" "))?;
    }
    Ok(true)
}
