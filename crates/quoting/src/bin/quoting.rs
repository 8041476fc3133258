// ABOUTME: CLI binary for the conversations quoting normalizer.
// ABOUTME: Normalizes an HTML message body from a file or stdin and prints HTML, plain text or a quote report.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use conversations_quoting::{
    body_html, decode_input, html_to_text, quote_report, NormalizeReport, Normalizer, Options,
};
use scraper::Html;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Html,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "quoting")]
#[command(about = "Normalize mail client quoting into nested blockquotes")]
struct Args {
    /// HTML message body to read (default: stdin)
    #[arg()]
    file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "html")]
    format: Format,

    /// Print the JSON quote report instead of the body
    #[arg(long = "report")]
    report: bool,

    /// JSON options file; flags below override it
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Charset of the input (default: detect)
    #[arg(long = "charset")]
    charset: Option<String>,

    /// Quotes longer than this many lines are reported as collapsed
    #[arg(long = "hide-quote-length")]
    hide_quote_length: Option<usize>,

    #[arg(long = "no-outlook")]
    no_outlook: bool,

    #[arg(long = "no-hotmail")]
    no_hotmail: bool,

    #[arg(long = "no-misc")]
    no_misc: bool,

    #[arg(long = "no-forwarded")]
    no_forwarded: bool,

    #[arg(long = "no-fusion")]
    no_fusion: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,
}

impl Args {
    fn options(&self) -> anyhow::Result<Options> {
        let mut opts = match &self.config {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };
        opts.outlook &= !self.no_outlook;
        opts.hotmail &= !self.no_hotmail;
        opts.misc &= !self.no_misc;
        opts.forwarded &= !self.no_forwarded;
        opts.fusion &= !self.no_fusion;
        if let Some(lines) = self.hide_quote_length {
            opts.hide_quote_length = lines;
        }
        Ok(opts)
    }

    fn read_input(&self) -> anyhow::Result<Vec<u8>> {
        match &self.file {
            Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
            None => {
                let mut buf = Vec::new();
                io::stdin()
                    .read_to_end(&mut buf)
                    .context("reading stdin")?;
                Ok(buf)
            }
        }
    }
}

fn render(args: &Args, doc: &Html, opts: &Options) -> anyhow::Result<String> {
    if args.report {
        let report = quote_report(doc, opts.hide_quote_length);
        return serde_json::to_string_pretty(&report).context("serializing quote report");
    }
    Ok(match args.format {
        Format::Html => body_html(doc),
        Format::Text => html_to_text(doc),
    })
}

fn log_report(report: &NormalizeReport) {
    for detector in report.detectors() {
        log::info!("{} quoting converted", detector);
    }
    if report.fused > 0 {
        log::info!("fused {} blockquote(s)", report.fused);
    }
    for err in &report.inconsistencies {
        log::warn!("{}", err);
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let opts = args.options()?;
    let bytes = args.read_input()?;
    let html = decode_input(&bytes, args.charset.as_deref());

    let mut doc = Html::parse_document(&html);
    let normalizer = Normalizer::builder().options(opts.clone()).build();
    let report = normalizer.normalize(&mut doc);
    log_report(&report);

    render(args, &doc, &opts)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let start = Instant::now();
    let mut had_error = false;

    match run(&args) {
        Ok(output_str) => {
            if let Some(output_path) = &args.output {
                if let Err(e) = fs::write(output_path, &output_str) {
                    eprintln!("error writing to {:?}: {}", output_path, e);
                    had_error = true;
                }
            } else {
                println!("{}", output_str);
            }
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            had_error = true;
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", start.elapsed().as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
