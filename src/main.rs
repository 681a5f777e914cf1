use anyhow::Context;
use std::{env, fs, path::Path};

use pdfquiz::config::Config;
use pdfquiz::ingest::ingest_upload;
use pdfquiz::pdf::{
    process_pdf_upload, serialize_upload, DocumentAiOcr, EmbeddedTextExtractor, ProcessedUpload,
    UploadedFile,
};
use pdfquiz::quiz::{generate_quiz_from_text, LessonAgent, OpenAiQuizAgent};

const USAGE: &str = "Usage: pdfquiz upload <file.pdf> [--markdown]
       pdfquiz quiz <text-file>
       pdfquiz ingest <file.pdf>";

enum Command {
    Upload { path: String, markdown: bool },
    Quiz { path: String },
    Ingest { path: String },
}

fn parse_command(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let command = args.next().context("a command is required")?;
    let path = args.next().context("a file path is required")?;

    match command.as_str() {
        "upload" => Ok(Command::Upload {
            path,
            markdown: args.any(|a| a == "--markdown"),
        }),
        "quiz" => Ok(Command::Quiz { path }),
        "ingest" => Ok(Command::Ingest { path }),
        other => Err(anyhow::anyhow!("unknown command '{}'", other)),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let command = match parse_command(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", USAGE);
            return Err(e);
        }
    };

    let config = Config::from_env().context("failed to load configuration")?;

    match command {
        Command::Upload { path, markdown } => {
            let upload = upload_file(&path, &config)?;
            if markdown {
                print!("{}", serialize_upload(&upload).context("failed to render markdown")?);
            } else {
                println!("{}", serde_json::to_string_pretty(&upload)?);
            }
        }
        Command::Quiz { path } => {
            let text =
                fs::read_to_string(&path).context(format!("failed to read text from {}", path))?;
            let agent = quiz_agent(&config)?;
            let quiz = generate_quiz_from_text(&agent, &text)
                .map_err(|e| anyhow::anyhow!(e.public_message()))?;
            println!("{}", serde_json::to_string_pretty(&quiz)?);
        }
        Command::Ingest { path } => {
            let upload = upload_file(&path, &config)?;
            let agent = config.openai.clone().map(OpenAiQuizAgent::new);

            let output = ingest_upload(upload, agent.as_ref().map(|a| a as &dyn LessonAgent));
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn upload_file(path: &str, config: &Config) -> anyhow::Result<ProcessedUpload> {
    let bytes = fs::read(path).context(format!("failed to read {}", path))?;
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let file = UploadedFile {
        name,
        content_type: None,
        bytes,
    };
    let ocr = DocumentAiOcr::new(config.document_ai.clone());

    process_pdf_upload(&file, &EmbeddedTextExtractor, &ocr)
        .map_err(|e| anyhow::anyhow!("{} ({})", e.public_message(), e))
}

fn quiz_agent(config: &Config) -> anyhow::Result<OpenAiQuizAgent> {
    let openai = config
        .openai
        .clone()
        .context("OPENAI_API_KEY must be set to generate quizzes")?;
    Ok(OpenAiQuizAgent::new(openai))
}
