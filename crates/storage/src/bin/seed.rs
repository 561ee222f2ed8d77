use std::fmt;

use honyaku_core::model::{Difficulty, Question, QuestionError, QuestionId};
use storage::sqlite::SqliteRepository;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    reset: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("HONYAKU_DB_URL").unwrap_or_else(|_| "sqlite:honyaku.sqlite3".into());
        let mut reset = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--reset" => {
                    reset = true;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, reset })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:honyaku.sqlite3)");
    eprintln!("  --reset                   Delete existing questions before seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  HONYAKU_DB_URL");
}

fn question_bank() -> Result<Vec<Question>, QuestionError> {
    let entries: Vec<(u64, &str, &str, Difficulty, &str, &str)> = vec![
        (
            1,
            "私は学生です。",
            "I am a student.",
            Difficulty::Easy,
            "daily-life",
            "introductions",
        ),
        (
            2,
            "あなたはコーヒーが好きですか？",
            "Do you like coffee?",
            Difficulty::Easy,
            "daily-life",
            "food",
        ),
        (
            3,
            "これはペンです。",
            "This is a pen.",
            Difficulty::Easy,
            "daily-life",
            "objects",
        ),
        (
            4,
            "猫が好きです。",
            "I like cats.",
            Difficulty::Easy,
            "daily-life",
            "animals",
        ),
        (
            5,
            "彼は昨日ここに来ました。",
            "He came here yesterday.",
            Difficulty::Normal,
            "daily-life",
            "past-tense",
        ),
        (
            6,
            "明日は雨が降るでしょう。",
            "It will rain tomorrow.",
            Difficulty::Normal,
            "weather",
            "future",
        ),
        (
            7,
            "彼女は毎朝七時に起きます。",
            "She gets up at seven every morning.",
            Difficulty::Normal,
            "daily-life",
            "routines",
        ),
        (
            8,
            "駅はどこですか？",
            "Where is the station?",
            Difficulty::Normal,
            "travel",
            "directions",
        ),
        (
            9,
            "もし時間があれば、映画を見に行きたいです。",
            "If I have time, I want to go see a movie.",
            Difficulty::Hard,
            "daily-life",
            "conditionals",
        ),
        (
            10,
            "この本を読んだことがありますか？",
            "Have you ever read this book?",
            Difficulty::Hard,
            "daily-life",
            "experience",
        ),
        (
            11,
            "日本に行ったことがないので、行ってみたいです。",
            "I have never been to Japan, so I want to go.",
            Difficulty::Hard,
            "travel",
            "experience",
        ),
        (
            12,
            "電車が遅れたので、会議に間に合いませんでした。",
            "The train was late, so I missed the meeting.",
            Difficulty::Hard,
            "work",
            "past-tense",
        ),
    ];

    let mut bank = Vec::with_capacity(entries.len());
    for (id, prompt, answer, difficulty, category, sub_category) in entries {
        let question = Question::new(QuestionId::new(id), prompt, answer, difficulty)?
            .with_category(category)
            .with_sub_category(sub_category);
        bank.push(question);
    }
    Ok(bank)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let repo = SqliteRepository::connect(&args.db_url).await?;
    repo.migrate().await?;

    if args.reset {
        let removed = repo.delete_all_questions().await?;
        println!("Removed {removed} existing questions from {}", args.db_url);
    }

    let bank = question_bank()?;
    let mut counts = [0_u32; 3];
    for question in &bank {
        repo.upsert_question(question).await?;
        counts[usize::from(question.difficulty().as_u8() - 1)] += 1;
    }

    println!(
        "Seeded {} questions ({} easy, {} normal, {} hard) into {}",
        bank.len(),
        counts[0],
        counts[1],
        counts[2],
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
