//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use docdeck_api_models::{DocumentChunk, QueryRequest};
use docdeck_ui::core::logic::{DocumentRow, EMPTY_MESSAGE, TableBody};
use docdeck_ui::core::view::PageView;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_page(
    page: &PageView,
    body: &TableBody,
    total_documents: usize,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "page": page.window.clamped_page,
                "total_pages": page.window.total_pages,
                "total_documents": total_documents,
                "results": page.rows,
            });
            println!("{}", to_pretty(&value)?);
        }
        OutputFormat::Table => {
            for line in table_lines(body) {
                println!("{line}");
            }
            if total_documents > 0 {
                println!(
                    "page {} of {} ({total_documents} documents)",
                    page.window.clamped_page, page.window.total_pages
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_chunks(
    document_id: &str,
    chunks: &[DocumentChunk],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({ "document_id": document_id, "results": chunks });
            println!("{}", to_pretty(&value)?);
        }
        OutputFormat::Table => {
            for line in chunk_lines(document_id, chunks) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_query(request: &QueryRequest) -> CliResult<()> {
    println!("{}", to_pretty(request)?);
    Ok(())
}

fn to_pretty(value: &impl serde::Serialize) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn table_lines(body: &TableBody) -> Vec<String> {
    match body {
        TableBody::Loading => vec!["loading...".to_string()],
        TableBody::Failed(message) => vec![message.clone()],
        TableBody::Empty => vec![EMPTY_MESSAGE.to_string()],
        TableBody::Rows { rows, .. } => {
            let mut lines = Vec::with_capacity(rows.len() + 1);
            lines.push(format!(
                "{:<36} {:<11} {:<10} {:<18} {:>9} TITLE",
                "ID", "OWNER", "VERSION", "UPDATED", "SIZE (MB)"
            ));
            lines.extend(rows.iter().map(row_line));
            lines
        }
    }
}

fn chunk_lines(document_id: &str, chunks: &[DocumentChunk]) -> Vec<String> {
    if chunks.is_empty() {
        return vec![format!("no chunks stored for {document_id}")];
    }
    chunks
        .iter()
        .enumerate()
        .flat_map(|(index, chunk)| {
            [
                format!("[{}] {}", index + 1, chunk.fragment_id),
                chunk.text.trim().to_string(),
                String::new(),
            ]
        })
        .collect()
}

fn row_line(row: &DocumentRow) -> String {
    let title = if row.has_metadata {
        format!("{} *", row.title)
    } else {
        row.title.clone()
    };
    format!(
        "{:<36} {:<11} {:<10} {:<18} {:>9} {}",
        row.id, row.owner, row.version, row.updated, row.size_mb, title
    )
}
