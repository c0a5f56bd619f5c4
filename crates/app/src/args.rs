use std::fmt;

use quiz_core::model::{
    AnnouncementId, AssignmentId, ClassId, Facet, FilterState, QuestionId, UploadDraft,
};
use services::api::{JoinKey, RegisterRequest};
use services::{DayWindow, HistoryFilter};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    MissingCommand,
    UnknownCommand(String),
    UnknownArg(String),
    Invalid { what: &'static str, source: quiz_core::Error },
    InvalidValue { what: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    HelpRequested,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::MissingCommand => write!(f, "no command given"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::Invalid { what, source } => write!(f, "invalid {what}: {source}"),
            ArgsError::InvalidValue { what, raw } => write!(f, "invalid {what}: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::HelpRequested => write!(f, "help requested"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn invalid(what: &'static str, err: impl Into<quiz_core::Error>) -> ArgsError {
    ArgsError::Invalid {
        what,
        source: err.into(),
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_arg(
    args: &mut impl Iterator<Item = String>,
    name: &'static str,
) -> Result<String, ArgsError> {
    match args.next() {
        Some(value) if value == "--help" || value == "-h" => Err(ArgsError::HelpRequested),
        Some(value) => Ok(value),
        None => Err(ArgsError::MissingArgument { name }),
    }
}

fn no_more(args: &mut impl Iterator<Item = String>) -> Result<(), ArgsError> {
    match args.next() {
        None => Ok(()),
        Some(arg) if arg == "--help" || arg == "-h" => Err(ArgsError::HelpRequested),
        Some(arg) => Err(ArgsError::UnknownArg(arg)),
    }
}

macro_rules! parse_id {
    ($args:expr, $ty:ty, $name:literal) => {{
        let raw = require_arg($args, $name)?;
        raw.parse::<$ty>().map_err(|e| invalid($name, e))?
    }};
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [--base-url <url>] [--db <sqlite_url>] [--verbose] <command> [args]");
    eprintln!();
    eprintln!("Account:");
    eprintln!("  login <email> <password>");
    eprintln!("  register <email> <password> <name>");
    eprintln!("  logout");
    eprintln!("  whoami");
    eprintln!();
    eprintln!("Questions:");
    eprintln!("  questions [filters] [--pages <n>]");
    eprintln!("  facets <grade|subject|category|topic> [filters]");
    eprintln!("  practice <question-id> [<choice>]            # choice is 0-based");
    eprintln!("  upload --question <text> --options <a,b,c> --answer <n> [--image <data>] [filters]");
    eprintln!("  filters: --grade <g> --subject <s> --category <c> --topic <t> --query <q>");
    eprintln!();
    eprintln!("Classes:");
    eprintln!("  classes");
    eprintln!("  class <class-id>");
    eprintln!("  join (--name <class-name> | --token <uuid>)");
    eprintln!("  leave <class-id>");
    eprintln!("  announcements [--class <class-id>]");
    eprintln!("  read <announcement-id>");
    eprintln!();
    eprintln!("Assignments:");
    eprintln!("  assignment <assignment-id>");
    eprintln!("  answer <assignment-id> <question-id> <choice>");
    eprintln!("  submit <assignment-id>");
    eprintln!();
    eprintln!("Progress:");
    eprintln!("  dashboard [--days 3|5|7]");
    eprintln!("  recommend");
    eprintln!("  history [--filter all|correct|wrong]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --base-url {}", services::api::DEFAULT_BASE_URL);
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BASE_URL, QUIZ_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    pub db_url: String,
    pub base_url: Option<String>,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub enum Command {
    Login { email: String, password: String },
    Register(RegisterRequest),
    Logout,
    Whoami,
    Questions { filters: FilterState, pages: u32 },
    Facets { facet: Facet, filters: FilterState },
    Practice { question: QuestionId, choice: Option<usize> },
    Upload(UploadDraft),
    Classes,
    Class(ClassId),
    Join(JoinKey),
    Leave(ClassId),
    Announcements { class: Option<ClassId> },
    Read(AnnouncementId),
    Assignment(AssignmentId),
    Answer { assignment: AssignmentId, question: QuestionId, choice: i32 },
    Submit(AssignmentId),
    Dashboard(DayWindow),
    Recommend,
    History(HistoryFilter),
}

#[derive(Debug, Clone)]
pub struct Cli {
    pub global: GlobalArgs,
    pub command: Command,
}

impl Cli {
    /// Global flags first, then the command and its arguments.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let mut global = GlobalArgs {
            db_url: std::env::var("QUIZ_DB_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url),
            base_url: None,
            verbose: false,
        };

        let command = loop {
            let Some(arg) = args.next() else {
                return Err(ArgsError::MissingCommand);
            };
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    global.db_url = normalize_sqlite_url(value);
                }
                "--base-url" => global.base_url = Some(require_value(&mut args, "--base-url")?),
                "--verbose" | "-v" => global.verbose = true,
                "--help" | "-h" => return Err(ArgsError::HelpRequested),
                flag if flag.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
                _ => break arg,
            }
        };

        let command = parse_command(&command, &mut args)?;
        Ok(Self { global, command })
    }
}

fn parse_command(
    name: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<Command, ArgsError> {
    let command = match name {
        "login" => {
            let email = require_arg(args, "email")?;
            let password = require_arg(args, "password")?;
            no_more(args)?;
            Command::Login { email, password }
        }
        "register" => {
            let email = require_arg(args, "email")?;
            let password = require_arg(args, "password")?;
            let name = require_arg(args, "name")?;
            no_more(args)?;
            Command::Register(RegisterRequest {
                email,
                password,
                name,
                ..RegisterRequest::default()
            })
        }
        "logout" => {
            no_more(args)?;
            Command::Logout
        }
        "whoami" => {
            no_more(args)?;
            Command::Whoami
        }
        "questions" => {
            let mut filters = FilterState::default();
            let mut pages = 1;
            while let Some(arg) = args.next() {
                if arg == "--pages" {
                    let raw = require_value(args, "--pages")?;
                    pages = raw
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidValue {
                            what: "--pages",
                            raw,
                        })?;
                } else {
                    parse_filter(&arg, args, &mut filters)?;
                }
            }
            Command::Questions { filters, pages }
        }
        "facets" => {
            let raw = require_arg(args, "facet")?;
            let facet: Facet = raw.parse().map_err(|e| invalid("facet", e))?;
            let mut filters = FilterState::default();
            while let Some(arg) = args.next() {
                parse_filter(&arg, args, &mut filters)?;
            }
            Command::Facets { facet, filters }
        }
        "practice" => {
            let question = parse_id!(args, QuestionId, "question-id");
            let choice = match args.next() {
                None => None,
                Some(raw) => Some(raw.parse::<usize>().map_err(|_| ArgsError::InvalidValue {
                    what: "choice",
                    raw,
                })?),
            };
            no_more(args)?;
            Command::Practice { question, choice }
        }
        "upload" => {
            let mut draft = UploadDraft::default();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--question" => draft.question = require_value(args, "--question")?,
                    "--options" => draft.options = require_value(args, "--options")?,
                    "--answer" => draft.answer = require_value(args, "--answer")?,
                    "--image" => draft.image = Some(require_value(args, "--image")?),
                    _ => parse_filter(&arg, args, &mut draft.facets)?,
                }
            }
            Command::Upload(draft)
        }
        "classes" => {
            no_more(args)?;
            Command::Classes
        }
        "class" => {
            let class = parse_id!(args, ClassId, "class-id");
            no_more(args)?;
            Command::Class(class)
        }
        "join" => {
            let flag = require_arg(args, "--name|--token")?;
            let key = match flag.as_str() {
                "--name" => JoinKey::ByName(require_value(args, "--name")?),
                "--token" => JoinKey::ByToken(require_value(args, "--token")?),
                _ => return Err(ArgsError::UnknownArg(flag)),
            };
            no_more(args)?;
            Command::Join(key)
        }
        "leave" => {
            let class = parse_id!(args, ClassId, "class-id");
            no_more(args)?;
            Command::Leave(class)
        }
        "announcements" => {
            let mut class = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--class" => {
                        let raw = require_value(args, "--class")?;
                        class = Some(raw.parse::<ClassId>().map_err(|e| invalid("class-id", e))?);
                    }
                    _ => return Err(ArgsError::UnknownArg(arg)),
                }
            }
            Command::Announcements { class }
        }
        "read" => {
            let id = parse_id!(args, AnnouncementId, "announcement-id");
            no_more(args)?;
            Command::Read(id)
        }
        "assignment" => {
            let id = parse_id!(args, AssignmentId, "assignment-id");
            no_more(args)?;
            Command::Assignment(id)
        }
        "answer" => {
            let assignment = parse_id!(args, AssignmentId, "assignment-id");
            let question = parse_id!(args, QuestionId, "question-id");
            let raw = require_arg(args, "choice")?;
            let choice = raw
                .parse::<i32>()
                .map_err(|_| ArgsError::InvalidValue { what: "choice", raw })?;
            no_more(args)?;
            Command::Answer {
                assignment,
                question,
                choice,
            }
        }
        "submit" => {
            let id = parse_id!(args, AssignmentId, "assignment-id");
            no_more(args)?;
            Command::Submit(id)
        }
        "dashboard" => {
            let mut window = DayWindow::default();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--days" => {
                        let raw = require_value(args, "--days")?;
                        window = raw
                            .parse::<usize>()
                            .ok()
                            .and_then(DayWindow::from_days)
                            .ok_or(ArgsError::InvalidValue { what: "--days", raw })?;
                    }
                    _ => return Err(ArgsError::UnknownArg(arg)),
                }
            }
            Command::Dashboard(window)
        }
        "recommend" => {
            no_more(args)?;
            Command::Recommend
        }
        "history" => {
            let mut filter = HistoryFilter::All;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--filter" => {
                        let raw = require_value(args, "--filter")?;
                        filter = match raw.to_ascii_lowercase().as_str() {
                            "all" => HistoryFilter::All,
                            "correct" => HistoryFilter::Correct,
                            "wrong" => HistoryFilter::Wrong,
                            _ => {
                                return Err(ArgsError::InvalidValue {
                                    what: "--filter",
                                    raw,
                                });
                            }
                        };
                    }
                    _ => return Err(ArgsError::UnknownArg(arg)),
                }
            }
            Command::History(filter)
        }
        "help" => return Err(ArgsError::HelpRequested),
        other => return Err(ArgsError::UnknownCommand(other.to_owned())),
    };
    Ok(command)
}

fn parse_filter(
    arg: &str,
    args: &mut impl Iterator<Item = String>,
    filters: &mut FilterState,
) -> Result<(), ArgsError> {
    let facet = match arg {
        "--grade" => Facet::Grade,
        "--subject" => Facet::Subject,
        "--category" => Facet::Category,
        "--topic" => Facet::Topic,
        "--query" => {
            filters.set_query(require_value(args, "--query")?);
            return Ok(());
        }
        "--help" | "-h" => return Err(ArgsError::HelpRequested),
        _ => return Err(ArgsError::UnknownArg(arg.to_owned())),
    };
    let flag = match facet {
        Facet::Grade => "--grade",
        Facet::Subject => "--subject",
        Facet::Category => "--category",
        Facet::Topic => "--topic",
    };
    filters.set(facet, Some(require_value(args, flag)?));
    Ok(())
}

pub fn normalize_sqlite_url(raw: String) -> String {
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
