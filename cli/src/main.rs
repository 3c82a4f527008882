//! pdftrans CLI - paragraph-level PDF translation tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdftrans::eval::{back_translate_and_score, interpret, Evaluation};
use pdftrans::translate::{create_translator, EndpointTranslator, GlossaryColumns, Provider};
use pdftrans::{
    evaluate_paragraphs, reconstruct, split_units, Config, ErrorMode, ErrorPolicy,
    ExtractOptions, Glossary, LexicalScorer, PageSelection, PdfExtractor, Pipeline,
    QualityScores, Translator,
};

#[derive(Parser)]
#[command(name = "pdftrans")]
#[command(version)]
#[command(about = "Translate PDF documents paragraph by paragraph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a PDF into a text file
    Translate(TranslateArgs),

    /// Show the paragraphs and footnotes found in a PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Score a translation against a reference, or round-trip a text
    Evaluate {
        /// Candidate text (paragraphs separated by blank lines)
        #[arg(value_name = "CANDIDATE")]
        candidate: PathBuf,

        /// Reference text with the same number of paragraphs
        #[arg(value_name = "REFERENCE", required_unless_present = "round_trip")]
        reference: Option<PathBuf>,

        /// Translate each paragraph of CANDIDATE and back, scoring the round trip
        #[arg(long)]
        round_trip: bool,

        /// Translation endpoint used for --round-trip
        #[arg(long, env = "PDFTRANS_ENDPOINT")]
        endpoint: Option<String>,

        /// Language to round-trip through
        #[arg(long = "to", default_value = "Hindi")]
        target_language: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Inspect a glossary spreadsheet
    Glossary {
        /// Glossary file (xlsx, xls, ods)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Apply the glossary to this text and print the result
        #[arg(long)]
        apply: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct TranslateArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to <FILE stem>.<language>.txt)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target language
    #[arg(long = "to")]
    target_language: Option<String>,

    /// Translation provider
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,

    /// Base URL of the translation endpoint
    #[arg(long, env = "PDFTRANS_ENDPOINT")]
    endpoint: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    /// Sarvam API key
    #[arg(long, env = "SARVAM_API_KEY", hide_env_values = true)]
    sarvam_key: Option<String>,

    /// Model name (provider specific)
    #[arg(long)]
    model: Option<String>,

    /// Glossary spreadsheet applied before translation
    #[arg(long, value_name = "FILE")]
    glossary: Option<PathBuf>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Translate with this many worker threads (0 = one per CPU)
    #[arg(long, value_name = "N")]
    parallel: Option<usize>,

    /// What to do when a paragraph fails to translate
    #[arg(long, value_enum)]
    on_error: Option<PolicyArg>,

    /// Skip pages whose text cannot be decoded
    #[arg(long)]
    lenient: bool,
}

#[derive(Args)]
struct ColumnArgs {
    /// Header of the source-term column
    #[arg(long, default_value = "English")]
    source_column: String,

    /// Header of the target-term column
    #[arg(long, default_value = "Hindi")]
    target_column: String,

    /// Header of the transliteration column
    #[arg(long, default_value = "Transliteration")]
    transliteration_column: String,
}

impl From<ColumnArgs> for GlossaryColumns {
    fn from(args: ColumnArgs) -> Self {
        GlossaryColumns {
            source: args.source_column,
            target: args.target_column,
            transliteration: args.transliteration_column,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    /// Self-hosted translation endpoint
    Endpoint,
    /// Sarvam AI
    Sarvam,
    /// OpenAI chat completions
    Openai,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Endpoint => Provider::Endpoint,
            ProviderArg::Sarvam => Provider::Sarvam,
            ProviderArg::Openai => Provider::OpenAi,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Write a failure marker in place of the paragraph
    Marker,
    /// Leave the paragraph out
    Skip,
    /// Stop at the first failure
    Abort,
}

impl From<PolicyArg> for ErrorPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Marker => ErrorPolicy::Marker,
            PolicyArg::Skip => ErrorPolicy::Skip,
            PolicyArg::Abort => ErrorPolicy::Abort,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Translate(args) => cmd_translate(args),
        Commands::Extract {
            input,
            pages,
            json,
            output,
        } => cmd_extract(&input, pages.as_deref(), json, output.as_deref()),
        Commands::Evaluate {
            candidate,
            reference,
            round_trip,
            endpoint,
            target_language,
            json,
        } => {
            if round_trip {
                cmd_round_trip(&candidate, endpoint, &target_language, json)
            } else {
                match reference {
                    Some(reference) => cmd_evaluate(&candidate, &reference, json),
                    None => Err("a REFERENCE file is required without --round-trip".into()),
                }
            }
        }
        Commands::Glossary {
            input,
            columns,
            apply,
        } => cmd_glossary(&input, columns.into(), apply.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn parse_pages(pages: Option<&str>) -> Result<PageSelection, Box<dyn std::error::Error>> {
    match pages {
        Some(p) => Ok(PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?),
        None => Ok(PageSelection::All),
    }
}

/// Merge the optional config file with command-line flags.
fn build_config(args: &TranslateArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(provider) = args.provider {
        config.translator.provider = provider.into();
    }
    if let Some(language) = &args.target_language {
        config.pipeline.target_language = language.clone();
    }
    if let Some(model) = &args.model {
        config.translator.model = Some(model.clone());
    }

    let api_key = match config.translator.provider {
        Provider::Endpoint => None,
        Provider::Sarvam => args.sarvam_key.clone(),
        Provider::OpenAi => args.openai_key.clone(),
    };
    if api_key.is_some() {
        config.translator.api_key = api_key;
    }
    if config.translator.provider == Provider::Endpoint && args.endpoint.is_some() {
        config.translator.base_url = args.endpoint.clone();
    }

    if let Some(workers) = args.parallel {
        config.pipeline.parallel = true;
        config.pipeline.workers = workers;
    }
    if let Some(policy) = args.on_error {
        config.pipeline.error_policy = policy.into();
    }
    if let Some(path) = &args.glossary {
        config.glossary.path = Some(path.clone());
    }
    if args.pages.is_some() {
        config.extract.pages = args.pages.clone();
    }
    if args.lenient {
        config.extract.error_mode = ErrorMode::Lenient;
    }

    log::debug!("Translator settings: {:?}", config.translator);
    Ok(config)
}

fn cmd_translate(args: TranslateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    let extract_options = config.extract_options()?;
    let pipeline_options = config.pipeline_options()?;
    let translator = create_translator(&config.translator)?;

    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args.input.file_stem().unwrap_or_default().to_string_lossy();
        let language = pipeline_options.target_language.to_lowercase();
        args.input.with_file_name(format!("{}.{}.txt", stem, language))
    });

    if let Some(glossary) = &pipeline_options.glossary {
        println!("{} {} glossary entries", "Loaded".green(), glossary.len());
    }
    println!(
        "{} {} into {} via {}",
        "Translating".cyan().bold(),
        args.input.display(),
        pipeline_options.target_language,
        translator.name()
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("units");
    let bar = pb.clone();

    let pipeline = Pipeline::new(translator, pipeline_options).with_progress(move |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    });
    let report = pipeline.translate_document(&args.input, extract_options, &output)?;
    pb.finish_with_message("done");

    println!(
        "\n{} {} paragraph(s), {} footnote(s)",
        "Translated".green().bold(),
        report.paragraphs,
        report.footnotes
    );
    if !report.is_complete() {
        println!(
            "{} {} unit(s) failed",
            "Warning:".yellow().bold(),
            report.failures.len()
        );
        for failure in &report.failures {
            println!(
                "  {} {} {}: {}",
                "├─".dimmed(),
                failure.kind,
                failure.index + 1,
                failure.message
            );
        }
    }
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_extract(
    input: &Path,
    pages: Option<&str>,
    json: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient so one broken page does not hide the rest
    let options = ExtractOptions::new().lenient().with_pages(parse_pages(pages)?);
    let extraction = PdfExtractor::open_with_options(input, options)?.extract()?;
    let paragraphs = reconstruct(&extraction.body);

    let content = if json {
        serde_json::to_string_pretty(&serde_json::json!({
            "page_count": extraction.page_count,
            "discarded": extraction.discarded,
            "paragraphs": paragraphs,
            "footnotes": extraction.footnotes,
        }))?
    } else {
        let mut text = String::new();
        for paragraph in &paragraphs {
            text.push_str(&paragraph.text);
            text.push_str("\n\n");
        }
        for note in &extraction.footnotes {
            text.push_str(&note.label());
            text.push('\n');
            text.push_str(&note.text);
            text.push_str("\n\n");
        }
        text
    };

    if let Some(path) = output {
        fs::write(path, &content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn print_scores(title: &str, scores: &QualityScores) {
    println!("{}", title.cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (metric, value) in scores.iter() {
        println!("{}: {:.3}", metric.bold(), value);
    }

    let interpretation = interpret(scores);
    println!();
    if let Some(band) = interpretation.bleu {
        println!("{}: {}", "BLEU".bold(), band);
    }
    if let Some(band) = interpretation.rouge {
        println!("{}: {}", "ROUGE-L".bold(), band);
    }
    if let Some(band) = interpretation.ter {
        println!("{}: {}", "TER".bold(), band);
    }
    println!("{}: {}", "Overall".bold(), interpretation.overall);
}

fn cmd_evaluate(
    candidate: &Path,
    reference: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let candidates = split_units(&fs::read_to_string(candidate)?);
    let references = split_units(&fs::read_to_string(reference)?);
    let evaluation: Evaluation = evaluate_paragraphs(&LexicalScorer, &candidates, &references)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        println!("{} {} paragraph pair(s)\n", "Scored".green(), evaluation.pairs.len());
        print_scores("Average Scores", &evaluation.average);
    }

    Ok(())
}

fn cmd_round_trip(
    input: &Path,
    endpoint: Option<String>,
    target_language: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = endpoint.ok_or("--round-trip needs --endpoint or PDFTRANS_ENDPOINT")?;
    let translator = EndpointTranslator::new(endpoint)?;
    let paragraphs = split_units(&fs::read_to_string(input)?);

    let pb = ProgressBar::new(paragraphs.len() as u64);
    let mut results = Vec::with_capacity(paragraphs.len());
    for paragraph in &paragraphs {
        results.push(back_translate_and_score(
            &translator,
            &LexicalScorer,
            paragraph,
            target_language,
        )?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let average = QualityScores::mean(results.iter().map(|r| &r.scores));
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "pairs": results,
                "average": average,
            }))?
        );
    } else {
        print_scores("Back-Translation Scores", &average);
    }

    Ok(())
}

fn cmd_glossary(
    input: &Path,
    columns: GlossaryColumns,
    apply: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let glossary = Glossary::from_spreadsheet(input, &columns)?;

    println!("{}", "Glossary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Entries".bold(), glossary.len());
    for entry in glossary.entries().iter().take(10) {
        println!(
            "  {} {} / {} -> {}",
            "├─".dimmed(),
            entry.source,
            entry.transliteration,
            entry.target
        );
    }
    if glossary.len() > 10 {
        println!("  {} ... {} more", "└─".dimmed(), glossary.len() - 10);
    }

    if let Some(text) = apply {
        println!();
        println!("{}", glossary.apply(text));
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdftrans".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Paragraph-level PDF translation tool");
    println!();
    println!("Providers: endpoint, sarvam, openai");
    println!("License: MIT");
}
