use anyhow::Result;
use catalog_llm::{
    batch::{BatchOutcome, RunSession, run_batch},
    configs::AppConfig,
    credentials::is_valid_api_key,
    errors::AppError,
    logging,
    status::Status,
    translators::{DryRunTranslator, LlmTranslator, Translator},
    workbooks::{DEFAULT_OUTPUT_FILENAME, SaveOutcome, save_translations, write_template},
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    time::Instant,
};
use tokio::signal;

#[derive(Parser)]
#[command(name = "catalog-llm")]
#[command(
    about = "Translate product descriptions in a spreadsheet from English to Turkish HTML using LLM",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate the description column of a workbook
    Translate(TranslateArgs),
    /// Write a blank source workbook with the expected headers
    Template {
        #[arg(default_value = "TemplateForTranslation.xlsx")]
        output: PathBuf,
    },
}

#[derive(clap::Args)]
struct TranslateArgs {
    #[arg(help = "Path to the source workbook (code, description; first row is a header)")]
    input: PathBuf,

    #[arg(
        short,
        long,
        help = "Where to save the translated workbook (asked interactively if omitted)"
    )]
    output: Option<PathBuf>,

    #[arg(short, long, value_parser = check_file_exists, help = "Path to TOML configuration file")]
    config: Option<PathBuf>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, help = "OpenAI API key")]
    api_key: Option<String>,

    #[arg(short, long, help = "Dry run mode (no actual translation)")]
    dry_run: bool,
}

fn check_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("File '{}' not found", s))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("{}", Status::Failed(e.to_string()));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Template { output } => {
            logging::init("warn")?;
            write_template(&output)?;
            println!("📄 Template saved to {}", output.display());
        }
        Command::Translate(args) => {
            let config = AppConfig::load(args.config.as_deref())?;
            logging::init(&config.logging.level)?;
            translate(args, config).await?;
        }
    }

    Ok(())
}

async fn translate(args: TranslateArgs, config: AppConfig) -> Result<()> {
    let start_time = Instant::now();

    println!("🌍 Catalog Translator (English → Turkish)");
    println!("📋 Source: {}", args.input.display());

    let translator: Arc<dyn Translator> = if args.dry_run {
        println!("🔍 Mode: DRY RUN");
        Arc::new(DryRunTranslator)
    } else {
        let api_key = config.resolve_api_key(args.api_key.clone()).unwrap_or_default();
        if !is_valid_api_key(&api_key) {
            return Err(AppError::InvalidCredential.into());
        }
        println!("🤖 Model: {}", config.llm.model);
        Arc::new(LlmTranslator::new(
            &config.llm,
            &api_key,
            &config.output.placeholder,
        ))
    };

    let session = RunSession::new();
    let run = session.begin()?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rows ({msg})")?
            .progress_chars("█▓▒░"),
    );

    let file = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| args.input.display().to_string());
    pb.println(Status::Started { file }.to_string());

    let mut worker = {
        let translator = Arc::clone(&translator);
        let input = args.input.clone();
        let pb = pb.clone();
        tokio::spawn(async move { run_batch(&input, translator.as_ref(), &run, &pb).await })
    };

    let joined = tokio::select! {
        joined = &mut worker => joined,
        _ = signal::ctrl_c() => {
            if session.request_abort() {
                pb.println(Status::AbortRequested.to_string());
            }
            worker.await
        }
    };
    pb.finish_and_clear();

    let report = joined.map_err(|e| AppError::Unexpected(e.to_string()))??;

    let rows = match &report.outcome {
        BatchOutcome::Cancelled => {
            println!("{}", Status::Cancelled);
            return Ok(());
        }
        BatchOutcome::Completed(rows) => rows,
    };

    println!("📊 Summary");
    println!("✅ Translated: {} rows", report.translated_count());
    println!("❌ Failed: {} rows", report.failed_count());
    println!("⏭️  Skipped: {} source rows", report.skipped_rows.len());
    println!("⏱️ Duration: {:.2}s\n", start_time.elapsed().as_secs_f64());

    let destination = match args.output {
        Some(path) => Some(path),
        None => prompt_destination()?,
    };

    match save_translations(rows, destination.as_deref(), &config.output)? {
        SaveOutcome::Saved(saved_to) => println!("{}", Status::Completed { saved_to }),
        SaveOutcome::Declined => println!("{}", Status::SaveDeclined),
    }

    Ok(())
}

// Ctrl-C is claimed by the abort handler by now, so only an empty answer discards.
fn prompt_destination() -> Result<Option<PathBuf>> {
    print!(
        "💾 Save translated workbook as (e.g. {}; press Enter on an empty line to discard): ",
        DEFAULT_OUTPUT_FILENAME
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    Ok(parse_destination(&answer))
}

fn parse_destination(answer: &str) -> Option<PathBuf> {
    let answer = answer.trim();
    (!answer.is_empty()).then(|| PathBuf::from(answer))
}
