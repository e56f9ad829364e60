//! CSV export download
//!
//! The export is written to a temporary file, then streamed back in fixed
//! size chunks. The stream owns the `CsvExport`, so the file is deleted when
//! the stream finishes, fails, or is dropped because the client went away.

use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use bytes::Bytes;
use futures_util::stream::{self, Stream};
use std::fs::File;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::services::ReportingService;
use crate::utils::CsvExport;

use super::helpers::error_from_telemetry;
use super::types::PasswordQuery;

/// Bytes read from the export file per chunk.
const EXPORT_CHUNK_SIZE: usize = 64 * 1024;

struct ExportStreamState {
    export: CsvExport,
    reader: File,
    sent: usize,
}

/// Stream the export file; the temporary file lives exactly as long as the
/// stream state.
fn export_file_stream(
    export: CsvExport,
    reader: File,
) -> impl Stream<Item = Result<Bytes, actix_web::Error>> {
    stream::unfold(
        Some(ExportStreamState {
            export,
            reader,
            sent: 0,
        }),
        |state| async move {
            let Some(ExportStreamState {
                export,
                reader,
                sent,
            }) = state
            else {
                return None;
            };

            // 文件读取移到 blocking 线程池
            let read_result = tokio::task::spawn_blocking(move || {
                let mut reader = reader;
                let mut buf = vec![0u8; EXPORT_CHUNK_SIZE];
                let read = reader.read(&mut buf).map(|n| {
                    buf.truncate(n);
                    buf
                });
                (reader, read)
            })
            .await;

            match read_result {
                Ok((_, Ok(chunk))) if chunk.is_empty() => {
                    info!(
                        "Export stream completed: {} ({} bytes)",
                        export.filename(),
                        sent
                    );
                    None
                }
                Ok((reader, Ok(chunk))) => {
                    let sent = sent + chunk.len();
                    debug!("Export stream: sent {} bytes of {}", sent, export.filename());
                    Some((
                        Ok(Bytes::from(chunk)),
                        Some(ExportStreamState {
                            export,
                            reader,
                            sent,
                        }),
                    ))
                }
                Ok((_, Err(e))) => {
                    error!("Failed to read export file {}: {}", export.filename(), e);
                    Some((
                        Err(actix_web::error::ErrorInternalServerError(
                            "CSV export read error",
                        )),
                        None,
                    ))
                }
                Err(e) => {
                    error!("Export read task failed: {}", e);
                    Some((
                        Err(actix_web::error::ErrorInternalServerError(
                            "CSV export task failed",
                        )),
                        None,
                    ))
                }
            }
        },
    )
}

/// GET /export/csv
pub async fn export_csv(
    query: web::Query<PasswordQuery>,
    reporting: web::Data<Arc<ReportingService>>,
) -> ActixResult<impl Responder> {
    let export = match reporting.export_csv(query.password.as_deref()).await {
        Ok(export) => export,
        Err(e) => return Ok(error_from_telemetry(&e)),
    };

    // 打开失败时 export 在此 drop，临时文件随之删除
    let reader = match export.open_reader() {
        Ok(reader) => reader,
        Err(e) => return Ok(error_from_telemetry(&e)),
    };

    let filename = export.filename().to_string();
    info!(
        "API: streaming export {} ({} rows)",
        filename,
        export.rows()
    );

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .streaming(export_file_stream(export, reader)))
}
