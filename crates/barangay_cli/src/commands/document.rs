//! `barangay document add|list|archive|revise|tags`

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use barangay_core::{Document, DocumentCategory, DocumentId, DocumentListQuery, FileRef};
use clap::{Args, Subcommand};

use super::{choice, or_dash, AppContext};

const CATEGORIES: &str = "resolution, memorandum, ordinance, report, financial, legal, \
                          correspondence, other";

#[derive(Subcommand, Debug)]
pub enum DocumentCommand {
    /// File document metadata.
    Add(AddArgs),

    /// List documents, most recently updated first.
    List {
        #[arg(long, value_parser = choice(DocumentCategory::parse, CATEGORIES))]
        category: Option<DocumentCategory>,

        #[arg(long)]
        tag: Option<String>,

        /// Include archived versions.
        #[arg(long)]
        all: bool,
    },

    /// Archive a document, or restore it with `--restore`.
    Archive {
        id: DocumentId,

        #[arg(long)]
        restore: bool,
    },

    /// File the next version of a document and archive the current one.
    Revise {
        id: DocumentId,

        /// Path of the new file.
        #[arg(long)]
        file: String,
    },

    /// List every tag in use.
    Tags,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub title: String,

    #[arg(long, value_parser = choice(DocumentCategory::parse, CATEGORIES))]
    pub category: DocumentCategory,

    #[arg(long = "number")]
    pub document_number: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Path of the stored file.
    #[arg(long)]
    pub file: Option<String>,

    /// Repeatable.
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
}

pub fn run(app: &AppContext, cmd: DocumentCommand) -> Result<()> {
    match cmd {
        DocumentCommand::Add(args) => add(app, args),
        DocumentCommand::List { category, tag, all } => list(
            app,
            DocumentListQuery {
                category,
                tag,
                include_archived: all,
            },
        ),
        DocumentCommand::Archive { id, restore } => {
            let document = app
                .documents()
                .set_archived(id, !restore)
                .with_context(|| format!("failed to archive document {id}"))?;
            let state = if document.is_archived {
                "archived"
            } else {
                "restored"
            };
            println!("{} {state}", document.title);
            Ok(())
        }
        DocumentCommand::Revise { id, file } => {
            let document = app
                .documents()
                .revise_document(id, file_ref(&file)?, Some(app.actor().to_string()))
                .with_context(|| format!("failed to revise document {id}"))?;
            println!(
                "Filed version {} of {} ({})",
                document.version, document.title, document.id
            );
            Ok(())
        }
        DocumentCommand::Tags => {
            for tag in app.documents().list_tags()? {
                println!("{tag}");
            }
            Ok(())
        }
    }
}

fn add(app: &AppContext, args: AddArgs) -> Result<()> {
    let mut document = Document::new(args.title, args.category);
    document.document_number = args.document_number;
    document.description = args.description;
    document.tags = args.tags;
    document.uploaded_by = Some(app.actor().to_string());
    if let Some(path) = args.file {
        document.file = Some(file_ref(&path)?);
    }

    let document = app
        .documents()
        .file_document(&document)
        .context("failed to file document")?;
    println!("Filed {} ({})", document.title, document.id);
    Ok(())
}

fn list(app: &AppContext, query: DocumentListQuery) -> Result<()> {
    let documents = app.documents().list_documents(&query)?;
    if documents.is_empty() {
        println!("No documents found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<28}  {:<14}  {:>3}  {:<24}  {}",
        "ID", "TITLE", "CATEGORY", "VER", "FILE", "TAGS"
    );
    for document in &documents {
        println!(
            "{:<36}  {:<28}  {:<14}  {:>3}  {:<24}  {}",
            document.id,
            document.title,
            document.category.as_str(),
            document.version,
            or_dash(document.file.as_ref().map(|file| file.file_name.as_str())),
            document.tags.join(","),
        );
    }
    Ok(())
}

/// Describes the file at `path`. Size is read when the file is reachable.
fn file_ref(path: &str) -> Result<FileRef> {
    let file_path = Path::new(path);
    let file_name = file_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("`{path}` does not name a file"))?
        .to_string();
    Ok(FileRef {
        file_name,
        file_path: path.to_string(),
        file_type: file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase()),
        file_size: std::fs::metadata(file_path).ok().map(|meta| meta.len()),
    })
}
