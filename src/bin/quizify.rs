use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal,
};
use quizify::clients::{ClientType, FlexibleClient, MockResponse};
use quizify::config::{QuizifyConfig, DEFAULT_TOPIC};
use quizify::interceptors::FileInterceptor;
use quizify::{Choice, InMemoryRetriever, QuizGenerator, QuizQuestion, QuizSession, Retriever};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ClientArg {
    Claude,
    Deepseek,
    Mock,
}

impl From<ClientArg> for ClientType {
    fn from(arg: ClientArg) -> Self {
        match arg {
            ClientArg::Claude => ClientType::Claude,
            ClientArg::Deepseek => ClientType::DeepSeek,
            ClientArg::Mock => ClientType::Mock,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Generate a multiple-choice quiz on a topic and take it in the terminal")]
#[command(after_help = "ENVIRONMENT VARIABLES:
    QUIZIFY_CLIENT          Default client (claude|deepseek|mock)
    QUIZIFY_MAX_ATTEMPTS    Generation attempts per question [default: 5]
    QUIZIFY_TRANSCRIPT_DIR  Save prompt/response transcripts here
    ANTHROPIC_API_KEY       API key for Claude client
    DEEPSEEK_API_KEY        API key for DeepSeek client

KEYS:
    a-d answer    n/Right next    p/Left previous    q/Esc quit")]
struct Args {
    /// Quiz topic [default: General Knowledge]
    #[arg(short, long)]
    topic: Option<String>,

    /// Number of questions to generate (at most 10)
    #[arg(short, long, default_value_t = 1)]
    num_questions: usize,

    /// Model client [default: QUIZIFY_CLIENT or auto-detect]
    #[arg(short, long, value_enum)]
    client: Option<ClientArg>,

    /// Grounding passage; repeat for several
    #[arg(long = "passage")]
    passages: Vec<String>,

    /// Append the question JSON schema to every prompt
    #[arg(long)]
    schema_guidance: bool,

    /// Directory for prompt/response transcripts
    #[arg(long)]
    transcripts: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizify=info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = QuizifyConfig::from_env();
    if let Some(client) = args.client {
        config.client = client.into();
    }
    config.generator.schema_guidance |= args.schema_guidance;
    let transcript_dir = args.transcripts.or(config.transcript_dir.take());

    let topic = args.topic.as_deref();
    let llm = match config.client {
        ClientType::Mock => demo_client(topic.unwrap_or_default(), args.num_questions),
        other => FlexibleClient::new_lazy(other),
    };
    let retriever: Arc<dyn Retriever> = Arc::new(InMemoryRetriever::new(args.passages));

    let mut generator = QuizGenerator::new(topic, args.num_questions, Some(retriever), llm)?
        .with_config(config.generator.clone());
    if let Some(dir) = transcript_dir {
        generator = generator.with_interceptor(Arc::new(FileInterceptor::new(dir)));
    }

    println!("Generating {} questions for topic: {}", generator.num_questions(), generator.topic());
    let report = generator
        .generate_quiz_with_report()
        .await
        .context("quiz generation failed")?;

    if report.bank.is_empty() {
        bail!("no quiz questions generated");
    }
    if !report.is_complete() {
        println!(
            "Only {} of {} questions could be generated.",
            report.bank.len(),
            report.requested
        );
    }

    let mut session = QuizSession::new();
    session.start(report.bank)?;
    run_quiz(&mut session)
}

fn run_quiz(session: &mut QuizSession) -> Result<()> {
    let mut feedback: Option<String> = None;
    loop {
        render(session, feedback.take())?;
        let key = match read_key()? {
            Some(key) => key,
            None => continue,
        };
        match key {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('n') | KeyCode::Right => {
                session.next()?;
            }
            KeyCode::Char('p') | KeyCode::Left => {
                session.previous()?;
            }
            KeyCode::Char(c @ ('a'..='d' | 'A'..='D')) => {
                let result = session.answer(&c.to_string())?;
                let verdict = if result.correct { "Correct!" } else { "Incorrect!" };
                feedback = Some(format!("{}\nExplanation: {}", verdict, result.explanation));
            }
            _ => {}
        }
    }
    Ok(())
}

fn render(session: &QuizSession, feedback: Option<String>) -> Result<()> {
    let (number, total) = session.position()?;
    let question = session.current()?;
    let mut out = io::stdout();
    writeln!(out, "\n{}/{}. {}", number, total, question.question)?;
    for label in question.choice_labels() {
        writeln!(out, "   {}", label)?;
    }
    if let Some(text) = feedback {
        writeln!(out, "{}", text)?;
    }
    write!(out, "[a-d] answer  [n] next  [p] previous  [q] quit > ")?;
    out.flush()?;
    Ok(())
}

/// Read one key press in raw mode.
fn read_key() -> Result<Option<KeyCode>> {
    terminal::enable_raw_mode()?;
    let key = event::read();
    terminal::disable_raw_mode()?;
    match key? {
        Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) => {
            println!();
            Ok(Some(code))
        }
        _ => Ok(None),
    }
}

/// Offline client answering with canned questions about `topic`.
fn demo_client(topic: &str, count: usize) -> FlexibleClient {
    let topic = if topic.trim().is_empty() { DEFAULT_TOPIC } else { topic.trim() };
    let responses = (1..=count)
        .map(|n| {
            let question = QuizQuestion {
                question: format!("Sample question {} about {}?", n, topic),
                choices: vec![
                    Choice::new("A", format!("The first fact about {}", topic)),
                    Choice::new("B", "An unrelated statement"),
                    Choice::new("C", "None of the above"),
                    Choice::new("D", "All of the above"),
                ],
                answer: "A".to_string(),
                explanation: format!("The mock client always marks A as correct for {}.", topic),
            };
            MockResponse::Success(serde_json::to_string(&question).unwrap_or_default())
        })
        .collect();
    FlexibleClient::mock_with_responses(responses).0
}
