use clap::Parser;
use colored::Colorize;
use docqa::config::ExtractionConfig;
use docqa::document::{Document, ExtractionCache, TextExtractor};
use docqa::error::PipelineError;
use docqa::providers::create_provider;
use docqa::qa::report;
use docqa::qa::{parse_questions, Orchestrator, QaMode, QaOptions};
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask questions about PDF and Word documents")]
struct Args {
    /// Documents to load (PDF or Word)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Questions, one per line; omit to start an interactive session
    #[arg(short, long)]
    questions: Option<String>,

    /// Read questions from a file, one per line
    #[arg(long, conflicts_with = "questions")]
    questions_file: Option<PathBuf>,

    /// LLM provider: openai or gemini
    #[arg(long, default_value = "openai")]
    provider: String,

    #[arg(short, long)]
    api_key: Option<String>,

    /// How document text is narrowed: keyword, chunked, or relevance
    #[arg(long, default_value = "keyword")]
    mode: QaMode,

    /// Chunk size in characters (chunked mode)
    #[arg(long, default_value_t = 5000)]
    chunk_size: usize,

    /// Cap on extracted characters per document; 0 keeps whole documents
    #[arg(long)]
    max_doc_chars: Option<usize>,

    /// Cap on in-flight LLM calls
    #[arg(long, default_value_t = 4)]
    max_concurrent: usize,

    /// Render answers as a three-column table
    #[arg(long)]
    table: bool,

    /// Emit the answer set as JSON instead of text
    #[arg(long, conflicts_with = "table")]
    json: bool,
}

#[derive(Clone, Copy)]
enum OutputFormat {
    List,
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    // Load and validate documents up front; indices are upload order
    let mut documents = Vec::new();
    for path in &args.files {
        let doc = Document::from_path(path)?;
        println!("📄 Loaded {} ({})", doc.name.bright_yellow(), doc.media_type.as_str());
        documents.push(doc);
    }

    let provider = create_provider(&args.provider, args.api_key.clone()).await?;
    println!(
        "🤖 Provider: {} ({})",
        args.provider.cyan(),
        provider.get_model_info().await?.cyan()
    );

    // Keyword and relevance modes cap extraction to bound the prompt;
    // chunked mode keeps whole documents and lets the chunker bound it.
    let max_chars = match args.max_doc_chars {
        Some(0) => None,
        Some(n) => Some(n),
        None if args.mode == QaMode::Chunked => None,
        None => ExtractionConfig::default().max_chars,
    };
    let extraction_config = ExtractionConfig {
        max_chars,
        ..ExtractionConfig::default()
    };
    let options = QaOptions {
        mode: args.mode,
        chunk_size: args.chunk_size.max(1),
        max_concurrent_requests: args.max_concurrent.max(1),
    };

    let mut orchestrator = Orchestrator::new(
        provider,
        TextExtractor::new(extraction_config),
        options,
    );
    let cache = ExtractionCache::default();

    let question_input = match (&args.questions, &args.questions_file) {
        (Some(inline), _) => Some(inline.clone()),
        (None, Some(path)) => Some(std::fs::read_to_string(path)?),
        (None, None) => None,
    };

    let format = if args.json {
        OutputFormat::Json
    } else if args.table {
        OutputFormat::Table
    } else {
        OutputFormat::List
    };

    match question_input {
        Some(input) => run_batch(&orchestrator, &documents, &cache, &input, format).await,
        None => run_session(&mut orchestrator, &documents, &cache, format).await,
    }
}

async fn run_batch(
    orchestrator: &Orchestrator,
    documents: &[Document],
    cache: &ExtractionCache,
    question_input: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let questions = parse_questions(question_input);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.set_message("Processing uploaded files and generating answers...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = orchestrator.answer_all(&questions, documents, cache).await;
    spinner.finish_and_clear();

    let names: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
    match result {
        Ok(set) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&set)?),
                OutputFormat::Table => {
                    println!("\n{}", "Answers:".bright_green());
                    println!("{}", report::render_table(&set, &names));
                }
                OutputFormat::List => {
                    println!("\n{}", "Answers:".bright_green());
                    println!("{}", report::render_list(&set, &names));
                }
            }
            Ok(())
        }
        Err(PipelineError::NoQuestions) => {
            println!("{}", "Please enter a question.".yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_session(
    orchestrator: &mut Orchestrator,
    documents: &[Document],
    cache: &ExtractionCache,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("\nType a question (blank line for help).");
    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("❓ ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                match input {
                    "" | "help" => print_help(),
                    "exit" | "quit" => break,
                    "docs" => {
                        for (index, doc) in documents.iter().enumerate() {
                            println!("  [{}] {}", index, doc.name.bright_yellow());
                        }
                    }
                    _ if input.starts_with("mode") => {
                        let requested = input.trim_start_matches("mode").trim();
                        if requested.is_empty() {
                            println!("Current mode: {}", orchestrator.mode().as_str().cyan());
                        } else {
                            match requested.parse::<QaMode>() {
                                Ok(mode) => {
                                    orchestrator.set_mode(mode);
                                    println!("🔄 Switched to {} mode", mode.as_str().cyan());
                                }
                                Err(e) => println!("{}", e.red()),
                            }
                        }
                    }
                    question => {
                        if let Err(e) = run_batch(orchestrator, documents, cache, question, format).await {
                            println!("{}", e.to_string().red());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

fn print_help() {
    println!("📚 Commands:");
    println!("  <question>        - Ask a question about the loaded documents");
    println!("  mode [m]          - Show or switch mode (keyword, chunked, relevance)");
    println!("  docs              - List loaded documents");
    println!("  help              - Show this help");
    println!("  exit              - Quit");
}
