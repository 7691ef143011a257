// The batch run: extract -> scan -> per document, per sheet -> run logs

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracksla_io::{archive, read_document, ReportWriter};
use tracksla_recon::{process_sheet, AuditLog, ProvenanceLog, SheetStats, TrackConfig};

use crate::CliError;

/// What happened to one sheet.
#[derive(Debug, Serialize)]
pub struct SheetReport {
    pub file: String,
    pub sheet: String,
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SheetStats>,
    pub highlighted: usize,
}

#[derive(Debug, Serialize)]
pub struct SkippedDocument {
    pub file: String,
    pub reason: String,
}

/// Run-level accounting, printed with `--json`.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub input_dir: PathBuf,
    pub output_root: PathBuf,
    pub documents_seen: usize,
    pub documents_opened: usize,
    pub documents_skipped: Vec<SkippedDocument>,
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub records_written: usize,
    pub values_filled: usize,
    pub sheets: Vec<SheetReport>,
    pub audit_log: PathBuf,
    pub update_log: PathBuf,
}

impl RunSummary {
    fn skip_sheet(&mut self, file: &str, sheet: &str, reason: String) {
        log::warn!("skipped sheet '{}' in {}: {}", sheet, file, reason);
        self.sheets_skipped += 1;
        self.sheets.push(SheetReport {
            file: file.to_string(),
            sheet: sheet.to_string(),
            processed: false,
            reason: Some(reason),
            folder: None,
            stats: None,
            highlighted: 0,
        });
    }
}

/// Process every report in the configured bundle.
///
/// Configuration problems (missing or unreadable archive, bad input pattern)
/// abort before anything is written. After that, a document or sheet that
/// cannot be handled is recorded in the summary and the run continues.
pub fn run(config: &TrackConfig) -> Result<RunSummary, CliError> {
    let paths = &config.paths;
    let highlight = config
        .output
        .highlight_rgb()
        .map_err(|e| CliError::config(e.to_string()))?;

    log::info!("extracting {}", paths.archive.display());
    let input_dir = archive::extract(&paths.archive, &paths.extract_to).map_err(|e| {
        CliError::config(e).with_hint("pass --archive <FILE> or set paths.archive in tracksla.toml")
    })?;

    let inputs = scan_inputs(&input_dir, &paths.input_pattern)?;
    log::info!(
        "found {} report(s) matching '{}' in {}",
        inputs.len(),
        paths.input_pattern,
        input_dir.display()
    );

    let writer = ReportWriter::new(&paths.output_root, highlight);
    let mut audit = AuditLog::new();
    let mut provenance = ProvenanceLog::new();
    let mut summary = RunSummary {
        input_dir,
        output_root: paths.output_root.clone(),
        ..Default::default()
    };

    for path in &inputs {
        summary.documents_seen += 1;
        let doc = match read_document(path) {
            Ok(doc) => doc,
            Err(e) => {
                let file = file_label(path);
                log::warn!("skipped document {}: {}", file, e);
                summary.documents_skipped.push(SkippedDocument { file, reason: e });
                continue;
            }
        };
        summary.documents_opened += 1;
        log::info!("reading {} ({} sheet(s))", doc.file_name, doc.sheets.len());

        for sheet in doc.sheets {
            let raw = match sheet {
                Ok(raw) => raw,
                Err(failure) => {
                    summary.skip_sheet(&doc.file_name, &failure.sheet, failure.reason);
                    continue;
                }
            };
            let name = raw.name.clone();

            // Sheet ledgers join the run logs only once the sheet's outputs exist.
            let mut sheet_audit = AuditLog::new();
            let mut sheet_provenance = ProvenanceLog::new();
            let processed = match raw.into_tracking(&doc.file_name).and_then(|sheet| {
                process_sheet(sheet, &config.sla, &mut sheet_audit, &mut sheet_provenance)
            }) {
                Ok(p) => p,
                Err(e) => {
                    summary.skip_sheet(&doc.file_name, &name, e.to_string());
                    continue;
                }
            };

            match writer.write_sheet(&processed, &sheet_provenance) {
                Ok(out) => {
                    audit.merge(sheet_audit);
                    provenance.merge(sheet_provenance);
                    summary.sheets_processed += 1;
                    summary.records_written += processed.stats.rows_written;
                    summary.values_filled += processed.stats.values_filled;
                    summary.sheets.push(SheetReport {
                        file: doc.file_name.clone(),
                        sheet: name,
                        processed: true,
                        reason: None,
                        folder: Some(out.folder),
                        stats: Some(processed.stats),
                        highlighted: out.highlighted,
                    });
                }
                Err(e) => {
                    log::error!("{}", e);
                    summary.skip_sheet(&doc.file_name, &name, e);
                }
            }
        }
    }

    let (audit_log, update_log) = writer
        .write_logs(&audit, &provenance)
        .map_err(CliError::io)?;
    summary.audit_log = audit_log;
    summary.update_log = update_log;

    log::info!(
        "{} sheet(s) processed, {} skipped, {} record(s) written, {} value(s) filled",
        summary.sheets_processed,
        summary.sheets_skipped,
        summary.records_written,
        summary.values_filled
    );
    Ok(summary)
}

/// Files in `dir` matching `pattern`, in sorted path order.
fn scan_inputs(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let entries = glob::glob(&full).map_err(|e| {
        CliError::config(format!("Invalid input pattern '{}': {}", pattern, e))
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("cannot read {}: {}", e.path().display(), e.error());
                None
            }
        })
        .filter(|p| p.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
