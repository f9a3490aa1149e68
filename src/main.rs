//! folio - course book exporter

use std::fs::File;
use std::process::ExitCode;

use clap::Parser;

use folio::ContentDocument;
use folio::export::{
    DocxConfig, DocxExporter, Exporter, PdfConfig, PdfExporter, SharedViewConfig,
    SharedViewExporter,
};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Course book exporter", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio course.json course.pdf            Export to PDF
    folio course.json course.docx           Export to DOCX
    folio course.json course.html           Export the public shared page
    folio -i course.json                    Show document structure")]
struct Cli {
    /// Input file (persisted chapter JSON)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (.pdf, .docx, or .html)
    #[arg(value_name = "OUTPUT", required_unless_present = "info")]
    output: Option<String>,

    /// Document title (defaults to the first chapter title)
    #[arg(short, long)]
    title: Option<String>,

    /// Product name shown on the PDF title page
    #[arg(long, default_value = "Folio")]
    product_name: String,

    /// Show document structure without exporting
    #[arg(short, long)]
    info: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = if cli.info {
        show_info(&cli.input)
    } else {
        let output = cli.output.clone().expect("output required");
        convert(&cli, &output)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: &str) -> Result<ContentDocument, String> {
    let json = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    Ok(ContentDocument::from_json(&json))
}

fn show_info(path: &str) -> Result<(), String> {
    let doc = load(path)?;
    println!("File: {path}");
    println!("Chapters: {}", doc.len());
    for (i, chapter) in doc.chapters().iter().enumerate() {
        let kind = match chapter.kind() {
            folio::ChapterKind::Cover => "cover",
            folio::ChapterKind::Content => "content",
        };
        let quiz = if chapter.quiz().is_some() { ", quiz" } else { "" };
        println!("  {i}: {} ({kind}{quiz})", chapter.title);
    }
    Ok(())
}

fn convert(cli: &Cli, output: &str) -> Result<(), String> {
    let doc = load(&cli.input)?;

    let title = cli
        .title
        .clone()
        .or_else(|| doc.chapters().first().map(|c| c.title.clone()))
        .unwrap_or_else(|| "Untitled".to_string());

    let mut file = File::create(output).map_err(|e| format!("{output}: {e}"))?;

    let extension = output.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => PdfExporter::new()
            .with_config(PdfConfig::new(&title).with_product_name(&cli.product_name))
            .export(&doc, &mut file)
            .map_err(|e| e.to_string())?,
        "docx" => DocxExporter::new()
            .with_config(DocxConfig::new(&title))
            .export(&doc, &mut file)
            .map_err(|e| e.to_string())?,
        "html" | "htm" => SharedViewExporter::new()
            .with_config(SharedViewConfig::new(&title))
            .export(&doc, &mut file)
            .map_err(|e| e.to_string())?,
        other => return Err(format!("unsupported output format: .{other}")),
    }

    if !cli.quiet {
        println!("{} -> {output}", cli.input);
    }
    Ok(())
}
