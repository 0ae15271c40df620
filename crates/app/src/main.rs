use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use academy_core::model::{
    ChecklistItemId, ChecklistItemKind, Course, Interaction, Lesson, LessonId, StepId,
};
use academy_core::{Advance, CodeValidationTable};
use services::{AppServices, Clock, LessonAccess, LessonTracker, UserProgressService};
use tracing_subscriber::EnvFilter;

mod bundled;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArg { name: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidToggle { raw: String },
    InvalidAnswer { raw: String },
    InvalidId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArg { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidToggle { raw } => write!(f, "expected on or off, got: {raw}"),
            ArgsError::InvalidAnswer { raw } => {
                write!(f, "quiz answers look like <question>=<answer>, got: {raw}")
            }
            ArgsError::InvalidId { raw } => write!(f, "invalid id: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Raised when a command targets a lesson the learner cannot open yet.
#[derive(Debug)]
struct LessonUnavailable {
    lesson: LessonId,
    access: LessonAccess,
}

impl fmt::Display for LessonUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.access {
            LessonAccess::ComingSoon => write!(f, "lesson {} is coming soon", self.lesson),
            _ => write!(
                f,
                "lesson {} is locked; complete the previous lesson first",
                self.lesson
            ),
        }
    }
}

impl std::error::Error for LessonUnavailable {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  academy courses                                   [--db <sqlite_url>]");
    eprintln!("  academy show   <lesson>                           [--db <sqlite_url>]");
    eprintln!("  academy code   <lesson> <step> <file|->           [--db <sqlite_url>]");
    eprintln!("  academy quiz   <lesson> <step> <question=answer>… [--db <sqlite_url>]");
    eprintln!("  academy check  <lesson> <step> <item> [on|off]    [--db <sqlite_url>]");
    eprintln!("  academy input  <lesson> <step> <item> <value>     [--db <sqlite_url>]");
    eprintln!("  academy next   <lesson>                           [--db <sqlite_url>]");
    eprintln!("  academy back   <lesson>                           [--db <sqlite_url>]");
    eprintln!("  academy reset  <lesson>                           [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://academy.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ACADEMY_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Courses,
    Show {
        lesson: LessonId,
    },
    Code {
        lesson: LessonId,
        step: StepId,
        source: String,
    },
    Quiz {
        lesson: LessonId,
        step: StepId,
        answers: HashMap<String, String>,
    },
    Check {
        lesson: LessonId,
        step: StepId,
        item: ChecklistItemId,
        completed: bool,
    },
    Input {
        lesson: LessonId,
        step: StepId,
        item: ChecklistItemId,
        value: String,
    },
    Next {
        lesson: LessonId,
    },
    Back {
        lesson: LessonId,
    },
    Reset {
        lesson: LessonId,
    },
}

impl Command {
    fn lesson(&self) -> Option<&LessonId> {
        match self {
            Command::Courses => None,
            Command::Show { lesson }
            | Command::Code { lesson, .. }
            | Command::Quiz { lesson, .. }
            | Command::Check { lesson, .. }
            | Command::Input { lesson, .. }
            | Command::Next { lesson }
            | Command::Back { lesson }
            | Command::Reset { lesson } => Some(lesson),
        }
    }
}

struct Args {
    db_url: String,
    command: Command,
}

/// Positional arguments in order, consumed front to back.
struct Positionals(std::collections::VecDeque<String>);

impl Positionals {
    fn take(&mut self, name: &'static str) -> Result<String, ArgsError> {
        self.0.pop_front().ok_or(ArgsError::MissingArg { name })
    }

    fn take_id<T: std::str::FromStr>(&mut self, name: &'static str) -> Result<T, ArgsError> {
        let raw = self.take(name)?;
        raw.parse().map_err(|_| ArgsError::InvalidId { raw })
    }

    fn finish(mut self) -> Result<(), ArgsError> {
        match self.0.pop_front() {
            Some(extra) => Err(ArgsError::UnknownArg(extra)),
            None => Ok(()),
        }
    }
}

impl Args {
    fn parse(subcommand: &str, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ACADEMY_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://academy.sqlite3".into(), normalize_sqlite_url);
        let mut positionals = std::collections::VecDeque::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push_back(arg),
            }
        }

        let command = parse_command(subcommand, Positionals(positionals))?;
        Ok(Self { db_url, command })
    }
}

fn parse_command(subcommand: &str, mut args: Positionals) -> Result<Command, ArgsError> {
    let command = match subcommand {
        "courses" => Command::Courses,
        "show" => Command::Show {
            lesson: args.take_id("lesson")?,
        },
        "code" => Command::Code {
            lesson: args.take_id("lesson")?,
            step: args.take_id("step")?,
            source: args.take("file")?,
        },
        "quiz" => {
            let lesson = args.take_id("lesson")?;
            let step = args.take_id("step")?;
            let mut answers = HashMap::new();
            for raw in args.0.drain(..) {
                let Some((question, answer)) = raw.split_once('=') else {
                    return Err(ArgsError::InvalidAnswer { raw });
                };
                answers.insert(question.trim().to_owned(), answer.trim().to_owned());
            }
            Command::Quiz {
                lesson,
                step,
                answers,
            }
        }
        "check" => {
            let lesson = args.take_id("lesson")?;
            let step = args.take_id("step")?;
            let item = args.take_id("item")?;
            let completed = match args.0.pop_front().as_deref() {
                None | Some("on") => true,
                Some("off") => false,
                Some(other) => {
                    return Err(ArgsError::InvalidToggle {
                        raw: other.to_owned(),
                    });
                }
            };
            Command::Check {
                lesson,
                step,
                item,
                completed,
            }
        }
        "input" => Command::Input {
            lesson: args.take_id("lesson")?,
            step: args.take_id("step")?,
            item: args.take_id("item")?,
            value: args.take("value")?,
        },
        "next" => Command::Next {
            lesson: args.take_id("lesson")?,
        },
        "back" => Command::Back {
            lesson: args.take_id("lesson")?,
        },
        "reset" => Command::Reset {
            lesson: args.take_id("lesson")?,
        },
        other => return Err(ArgsError::UnknownArg(other.to_owned())),
    };
    args.finish()?;
    Ok(command)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(source: &str) -> Result<String, std::io::Error> {
    if source == "-" {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        Ok(code)
    } else {
        std::fs::read_to_string(source)
    }
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn access_label(access: LessonAccess) -> &'static str {
    match access {
        LessonAccess::ComingSoon => "coming soon",
        LessonAccess::Completed => "completed",
        LessonAccess::Available => "available",
        LessonAccess::Locked => "locked",
    }
}

fn print_courses(services: &AppServices, user: &UserProgressService) {
    let catalog = services.catalog();
    for course in catalog.with_progress(user.progress()) {
        println!("{}  {}", course.id(), course.title());
        for line in course_details(&course) {
            println!("    {line}");
        }
        for lesson in course.lessons() {
            let access = catalog
                .lesson_access(lesson.id(), user.progress())
                .map_or("unknown", access_label);
            let current = if user.current_lesson_id() == Some(lesson.id()) {
                "*"
            } else {
                " "
            };
            println!(
                "  {current} {:<14} {:<12} {}{}",
                lesson.id(),
                access,
                lesson.title(),
                lesson_meta(lesson)
            );
        }
    }
}

fn course_details(course: &Course) -> Vec<String> {
    let mut lines = Vec::new();
    if !course.description().is_empty() {
        lines.push(course.description().to_owned());
    }
    if let Some(difficulty) = course.difficulty() {
        lines.push(format!("difficulty: {difficulty}"));
    }
    for prerequisite in course.prerequisites() {
        lines.push(format!(
            "requires: {} ({})",
            prerequisite.title, prerequisite.description
        ));
    }
    for resource in course.resources() {
        lines.push(format!("resource: {} <{}>", resource.title, resource.url));
    }
    lines
}

fn lesson_meta(lesson: &Lesson) -> String {
    match (lesson.difficulty(), lesson.time_to_complete()) {
        (Some(difficulty), Some(time)) => format!("  [{difficulty}, {time}]"),
        (Some(only), None) | (None, Some(only)) => format!("  [{only}]"),
        (None, None) => String::new(),
    }
}

fn print_lesson(tracker: &LessonTracker) {
    let state = tracker.state();
    let lesson = state.lesson();
    println!(
        "{} ({}%, {}/{} steps)",
        lesson.title(),
        state.progress_percent(),
        state.completed_step_count(),
        state.step_count()
    );

    for (index, step) in lesson.steps().iter().enumerate() {
        let marker = if index == state.current_index() { '>' } else { ' ' };
        let done = if state.is_step_completed(step.id()) { 'x' } else { ' ' };
        println!("{marker} [{done}] {:<14} {}", step.id(), step.title());
    }

    let step = state.current_step();
    println!();
    println!("── {} ──", step.title());
    if !step.content().is_empty() {
        println!("{}", step.content());
    }

    match step.interaction() {
        Interaction::ContentOnly => {}
        Interaction::Code(challenge) => {
            if step.presents_as_content_only() {
                return;
            }
            let code = state
                .code_for(step.id())
                .unwrap_or(challenge.default_code.as_str());
            println!();
            println!("```{}", challenge.language);
            println!("{}", code.trim_end());
            println!("```");
        }
        Interaction::Quiz(questions) => {
            for question in questions {
                println!();
                println!("{}: {}", question.id, question.prompt);
                for option in &question.options {
                    println!("    - {option}");
                }
            }
        }
        Interaction::Checklist(items) => {
            println!();
            for item in items {
                let done = if state.is_item_completed(step.id(), item.id()) {
                    'x'
                } else {
                    ' '
                };
                match item.kind() {
                    ChecklistItemKind::Checkbox => {
                        println!("  [{done}] {:<14} {}", item.id(), item.label());
                    }
                    ChecklistItemKind::Input => {
                        let value = state
                            .input_value(step.id(), item.id())
                            .or(item.placeholder())
                            .unwrap_or("");
                        println!("  [{done}] {:<14} {}: {value}", item.id(), item.label());
                    }
                }
            }
        }
    }

    if !state.can_advance() {
        println!();
        println!("(complete this step to continue)");
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

async fn open_for(
    services: &AppServices,
    user: &mut UserProgressService,
    lesson: &LessonId,
) -> Result<LessonTracker, Box<dyn std::error::Error>> {
    let access = services
        .catalog()
        .lesson_access(lesson, user.progress())
        .ok_or_else(|| services::CatalogError::LessonNotFound(lesson.clone()))?;
    if !access.can_open() {
        return Err(LessonUnavailable {
            lesson: lesson.clone(),
            access,
        }
        .into());
    }
    Ok(services.open_lesson(lesson, user).await?)
}

async fn execute(
    command: Command,
    services: &AppServices,
    user: &mut UserProgressService,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(lesson) = command.lesson().cloned() else {
        print_courses(services, user);
        return Ok(());
    };
    let mut tracker = open_for(services, user, &lesson).await?;

    match command {
        Command::Courses | Command::Show { .. } => {}
        Command::Code { step, source, .. } => {
            let code = read_source(&source)?;
            let valid = tracker.record_code_change(&step, code).await?;
            println!("{}", if valid { "✓ solution accepted" } else { "✗ not there yet" });
        }
        Command::Quiz { step, answers, .. } => {
            let score = tracker.submit_quiz_answers(&step, &answers).await?;
            let verdict = if score.passed() { "passed" } else { "needs 70%" };
            println!("{}/{} correct, {verdict}", score.correct, score.total);
        }
        Command::Check {
            step,
            item,
            completed,
            ..
        } => {
            tracker.toggle_checklist_item(&step, &item, completed).await?;
        }
        Command::Input {
            step, item, value, ..
        } => {
            tracker.set_checklist_input_value(&step, &item, value).await?;
            let verdict = if tracker.state().is_item_completed(&step, &item) {
                "✓ accepted"
            } else {
                "✗ not valid yet"
            };
            println!("{verdict}");
        }
        Command::Next { .. } => match tracker.advance(user).await? {
            Advance::Moved(_) => {}
            Advance::Blocked => println!("complete the current step first"),
            Advance::LessonComplete => {
                println!("lesson {lesson} complete");
                return Ok(());
            }
        },
        Command::Back { .. } => {
            if !tracker.previous().await? {
                println!("already at the first step");
            }
        }
        Command::Reset { .. } => {
            tracker.reset_lesson().await?;
            tracker.initialize().await?;
            println!("lesson {lesson} reset");
        }
    }

    println!();
    print_lesson(&tracker);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let subcommand = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => first,
    };

    let parsed = Args::parse(&subcommand, &mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let content = bundled::bundled_content()?;
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        Arc::new(content),
        CodeValidationTable::passport_defaults(),
        Clock::system(),
    )
    .await?;
    let mut user = services.user_progress().await;

    execute(parsed.command, &services, &mut user).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(words: &[&str]) -> Result<Command, ArgsError> {
        let positionals = words[1..].iter().map(|w| (*w).to_owned()).collect();
        parse_command(words[0], Positionals(positionals))
    }

    #[test]
    fn parses_quiz_answers() {
        let Command::Quiz { answers, step, .. } =
            parse(&["quiz", "passport-01", "05", "q1=redirectUri", "q2 = transact"]).unwrap()
        else {
            panic!("expected quiz");
        };
        assert_eq!(step, StepId::new("05"));
        assert_eq!(answers.get("q1").map(String::as_str), Some("redirectUri"));
        assert_eq!(answers.get("q2").map(String::as_str), Some("transact"));

        assert!(matches!(
            parse(&["quiz", "passport-01", "05", "q1"]),
            Err(ArgsError::InvalidAnswer { .. })
        ));
    }

    #[test]
    fn check_defaults_to_on() {
        assert!(matches!(
            parse(&["check", "passport-01", "06", "hub-account"]).unwrap(),
            Command::Check {
                completed: true,
                ..
            }
        ));
        assert!(matches!(
            parse(&["check", "passport-01", "06", "hub-account", "off"]).unwrap(),
            Command::Check {
                completed: false,
                ..
            }
        ));
        assert!(matches!(
            parse(&["check", "passport-01", "06", "hub-account", "maybe"]),
            Err(ArgsError::InvalidToggle { .. })
        ));
    }

    #[test]
    fn rejects_missing_and_extra_arguments() {
        assert!(matches!(
            parse(&["show"]),
            Err(ArgsError::MissingArg { name: "lesson" })
        ));
        assert!(matches!(
            parse(&["next", "passport-01", "extra"]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&["show", "  "]),
            Err(ArgsError::InvalidId { .. })
        ));
        assert!(matches!(parse(&["teleport"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn normalizes_relative_sqlite_paths() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.sqlite3".into()),
            "sqlite:///tmp/a.sqlite3"
        );
        let normalized = normalize_sqlite_url("sqlite:data/academy.sqlite3".into());
        assert!(normalized.starts_with("sqlite:///"));
        assert!(normalized.ends_with("data/academy.sqlite3"));
    }

    #[tokio::test]
    async fn course_listing_shows_metadata() {
        use services::ContentSource;

        let content = bundled::bundled_content().unwrap();
        let courses = content.list_courses().await.unwrap();
        let details = course_details(&courses[0]);
        assert!(details.iter().any(|l| l == "difficulty: Beginner"));
        assert!(details.iter().any(|l| l.starts_with("requires: ")));
        assert!(details
            .iter()
            .any(|l| l.starts_with("resource: ") && l.ends_with('>')));

        let setup = courses[0].lesson(&LessonId::new("passport-01")).unwrap();
        assert_eq!(lesson_meta(setup), "  [Beginner, 30 min]");
    }
}
