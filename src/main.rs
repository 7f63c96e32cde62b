use anyhow::{Context as _, Result};
use clap::Parser;
use logicval::{Context, EngineConfig, TABLE_SEPARATOR};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "logicval")]
#[command(author, version, about = "Check whether logical sentences are tautologies", long_about = None)]
struct Cli {
	/// Sentences to validate, e.g. "[P] or not [P]"
	#[arg(value_name = "SENTENCE", required = true)]
	sentences: Vec<String>,

	/// Standing assumption (can be specified multiple times)
	#[arg(short, long = "assume", value_name = "SENTENCE")]
	assume: Vec<String>,

	/// Domain terms, comma separated
	#[arg(short, long, value_delimiter = ',')]
	domain: Vec<String>,

	/// Predicate invocation pinned to true, e.g. "is a fruit(apple)"
	#[arg(short = 'p', long = "assume-predicate", value_name = "INVOCATION")]
	assume_predicate: Vec<String>,

	/// Print the truth table of every sentence
	#[arg(short, long)]
	table: bool,

	/// Column separator for truth tables
	#[arg(short, long, default_value = TABLE_SEPARATOR)]
	separator: String,

	/// Engine configuration file (TOML)
	#[arg(short, long)]
	config: Option<PathBuf>,
}

fn build_context(cli: &Cli) -> Result<Context> {
	let config = match &cli.config {
		Some(path) => EngineConfig::load(path)?,
		None => EngineConfig::default(),
	};
	let mut context = Context::with_config(config);
	if !cli.domain.is_empty() {
		context
			.set_term_domain(&cli.domain)
			.context("Invalid domain")?;
	}
	for text in &cli.assume {
		context
			.assume(text)
			.with_context(|| format!("Invalid assumption: {}", text))?;
	}
	for text in &cli.assume_predicate {
		context
			.assume_predicate(text)
			.with_context(|| format!("Invalid predicate assumption: {}", text))?;
	}
	Ok(context)
}

// returns false if the sentence could not be evaluated
fn disp(context: &Context, sentence: &str, table: bool, separator: &str) -> bool {
	let evaluation = match context.evaluate(sentence, table) {
		Ok(evaluation) => evaluation,
		Err(err) => {
			eprintln!("{} in {:?}: {}", err.kind(), sentence, err);
			return false;
		}
	};
	if let Some(table) = &evaluation.table {
		let config = context.config();
		let labels = (config.true_label.as_str(), config.false_label.as_str());
		if let Err(err) = table.write_to(&mut std::io::stdout().lock(), separator, labels) {
			eprintln!("failed to print truth table: {}", err);
			return false;
		}
	}
	println!("{} is {}", sentence, evaluation.valid);
	println!();
	true
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let context = build_context(&cli)?;
	let mut failed = false;
	for sentence in &cli.sentences {
		failed |= !disp(&context, sentence, cli.table, &cli.separator);
	}
	if failed {
		std::process::exit(1);
	}
	Ok(())
}
