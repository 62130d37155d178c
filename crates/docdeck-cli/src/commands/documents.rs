//! `ls`, `rm`, `upload` and `chunks`: collection commands driven through the view controller.

use std::collections::HashSet;
use std::path::Path;

use anyhow::anyhow;
use docdeck_api_models::DocumentUpload;
use docdeck_ui::core::config::ViewConfig;

use crate::cli::{ChunksArgs, ListArgs, OutputFormat, RemoveArgs, UploadArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::Session;
use crate::output::{render_chunks, render_page};

pub(crate) async fn handle_ls(
    ctx: &AppContext,
    config: ViewConfig,
    args: &ListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    if args.page == 0 {
        return Err(CliError::validation("page must be at least 1"));
    }
    let session = Session::open(ctx, config).await?;
    let view = &session.view;
    let shown = view.set_page(args.page);
    if shown != args.page {
        tracing::warn!(requested = args.page, shown, "page out of range; showing last page");
    }
    render_page(
        &view.page_view(),
        &view.table_body(),
        view.documents().len(),
        format,
    )
}

pub(crate) async fn handle_rm(
    ctx: &AppContext,
    config: ViewConfig,
    args: &RemoveArgs,
) -> CliResult<()> {
    let session = Session::open(ctx, config).await?;
    let view = &session.view;

    let known: HashSet<String> = view.documents().iter().map(|doc| doc.id.clone()).collect();
    let unknown: Vec<&str> = args
        .ids
        .iter()
        .map(String::as_str)
        .filter(|id| !known.contains(*id))
        .collect();
    if !unknown.is_empty() {
        return Err(CliError::validation(format!(
            "unknown document id(s): {}",
            unknown.join(", ")
        )));
    }

    for id in &args.ids {
        view.toggle_selection(id, true);
    }
    let deleted = view.delete_selected().await?;
    session.settle().await?;
    println!(
        "deleted {deleted} document(s); {} remaining",
        view.documents().len()
    );
    Ok(())
}

pub(crate) async fn handle_upload(
    ctx: &AppContext,
    config: ViewConfig,
    args: UploadArgs,
) -> CliResult<()> {
    let (file_name, content) = read_upload(&args.path)?;
    let session = Session::open(ctx, config).await?;
    let view = &session.view;

    let upload = match args.replace {
        Some(document_id) => {
            if !view.documents().iter().any(|doc| doc.id == document_id) {
                return Err(CliError::validation(format!(
                    "unknown document id: {document_id}"
                )));
            }
            DocumentUpload::replacing(document_id, file_name.clone(), content)
        }
        None => DocumentUpload::new(file_name.clone(), content),
    };

    view.upload(upload).await?;
    session.settle().await?;
    println!(
        "uploaded {file_name}; {} document(s) in collection",
        view.documents().len()
    );
    Ok(())
}

pub(crate) async fn handle_chunks(
    ctx: &AppContext,
    config: ViewConfig,
    args: &ChunksArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let session = Session::open(ctx, config).await?;
    let chunks = session.view.document_chunks(&args.id).await?;
    render_chunks(&args.id, &chunks, format)
}

fn read_upload(path: &Path) -> CliResult<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| CliError::validation(format!("'{}' is not a file", path.display())))?;
    let content = std::fs::read(path).map_err(|err| {
        CliError::failure(anyhow!("failed to read '{}': {err}", path.display()))
    })?;
    Ok((file_name, content))
}
