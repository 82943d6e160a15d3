//! Upload → analyze → render orchestration.
//!
//! The functions here own sequencing and error policy. Transport and the page
//! are supplied by the caller through [`AnalysisApi`] and [`ResultsView`].

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::api::{decode_graph_data, decode_upload, Reply};
use crate::gate::TaskGate;
use crate::report::{FileReport, RenderBlock};
use crate::session::FileHandle;
use crate::{ClientConfig, TsError};

pub const UPLOAD_REJECTED: &str = "An error occurred during upload.";
pub const UPLOAD_UNEXPECTED: &str = "An unexpected error occurred during upload.";
pub const ANALYSIS_FAILED: &str = "Failed to load analysis.";
pub const RESET_FAILED: &str = "Reset failed.";

/// HTTP transport to the analysis server. Implementations only move bytes;
/// status and body interpretation happens in this crate.
#[allow(async_fn_in_trait)]
pub trait AnalysisApi {
    type File: FileHandle;

    /// Multipart POST of `file` under the form field `file`.
    async fn upload(&self, url: &str, file: &Self::File) -> Result<Reply, TsError>;

    async fn get(&self, url: &str) -> Result<Reply, TsError>;
}

/// Short-lived, auto-dismissing user notification.
pub trait Notifier {
    fn notify(&self, message: &str);
}

pub trait ResultsView: Notifier {
    /// Add a block to the results area. Blocks are never replaced.
    fn append(&self, block: RenderBlock);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was selected; no request was made.
    Skipped,
    /// Upload failed or was refused; the user has been notified.
    Rejected,
    /// Upload accepted but the server named no files to render.
    NoFiles,
    Rendered { files: usize, failed: usize },
}

/// Upload `file` and render every file the server reports back.
///
/// The gate is held for the whole call; each render additionally holds it
/// for its own fetch. Renders run concurrently and append in completion order.
pub async fn submit<A, V>(
    api: &A,
    view: &V,
    gate: &TaskGate,
    config: &ClientConfig,
    file: Option<&A::File>,
) -> SubmitOutcome
where
    A: AnalysisApi,
    V: ResultsView,
{
    let Some(file) = file else {
        return SubmitOutcome::Skipped;
    };
    let _busy = gate.scoped();

    let name = file.name();
    info!(file = %name, "uploading");
    let files = match api
        .upload(&config.upload_path, file)
        .await
        .and_then(|reply| decode_upload(&reply))
    {
        Ok(files) => files,
        Err(err) => {
            warn!(file = %name, error = %err, "upload failed");
            let fallback = match err {
                TsError::Rejected(_) | TsError::Status(_) => UPLOAD_REJECTED,
                _ => UPLOAD_UNEXPECTED,
            };
            view.notify(&err.user_message(fallback));
            return SubmitOutcome::Rejected;
        }
    };

    if files.is_empty() {
        info!(file = %name, "upload accepted without per-file results");
        return SubmitOutcome::NoFiles;
    }

    let settled = join_all(
        files
            .iter()
            .map(|filename| render(api, view, gate, config, filename)),
    )
    .await;
    let failed = settled.iter().filter(|ok| !**ok).count();
    info!(files = files.len(), failed, "analysis rendered");
    SubmitOutcome::Rendered {
        files: files.len(),
        failed,
    }
}

/// Fetch one file's analysis and append its block. Returns `false` when an
/// error block was appended instead.
pub async fn render<A, V>(
    api: &A,
    view: &V,
    gate: &TaskGate,
    config: &ClientConfig,
    filename: &str,
) -> bool
where
    A: AnalysisApi,
    V: ResultsView,
{
    let _busy = gate.scoped();
    let url = config.graph_data_url(filename);
    debug!(%url, "fetching analysis");

    let block = match api.get(&url).await.and_then(|reply| decode_graph_data(&reply)) {
        Ok(data) => RenderBlock::Report(FileReport::from_analysis(filename, &data, config)),
        Err(err) => {
            warn!(%filename, error = %err, "analysis unavailable");
            RenderBlock::Failed {
                filename: filename.to_string(),
                message: err.user_message(ANALYSIS_FAILED),
            }
        }
    };
    let ok = !block.is_failure();
    view.append(block);
    ok
}

/// Ask the server to drop this session's uploads. The caller decides where
/// to navigate afterwards; on failure the user has already been notified.
pub async fn reset<A, N>(
    api: &A,
    notifier: &N,
    gate: &TaskGate,
    config: &ClientConfig,
) -> Result<(), TsError>
where
    A: AnalysisApi,
    N: Notifier,
{
    let _busy = gate.scoped();
    let outcome = api.get(&config.reset_path).await.and_then(|reply| {
        if reply.is_success() {
            Ok(())
        } else {
            Err(TsError::Status(reply.status))
        }
    });
    match &outcome {
        Ok(()) => info!("session reset"),
        Err(err) => {
            warn!(error = %err, "reset failed");
            notifier.notify(RESET_FAILED);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct Upload(&'static str);

    impl FileHandle for Upload {
        fn name(&self) -> String {
            self.0.to_string()
        }
    }

    #[derive(Default)]
    struct FakeApi {
        upload: Option<Result<Reply, TsError>>,
        routes: HashMap<String, Result<Reply, TsError>>,
        requested: RefCell<Vec<String>>,
    }

    impl AnalysisApi for FakeApi {
        type File = Upload;

        async fn upload(&self, url: &str, _file: &Upload) -> Result<Reply, TsError> {
            self.requested.borrow_mut().push(url.to_string());
            self.upload
                .clone()
                .unwrap_or_else(|| Err(TsError::Transport("no upload route".into())))
        }

        async fn get(&self, url: &str) -> Result<Reply, TsError> {
            self.requested.borrow_mut().push(url.to_string());
            self.routes
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(Reply::new(404, "")))
        }
    }

    #[derive(Default)]
    struct Page {
        blocks: RefCell<Vec<RenderBlock>>,
        toasts: RefCell<Vec<String>>,
    }

    impl ResultsView for Page {
        fn append(&self, block: RenderBlock) {
            self.blocks.borrow_mut().push(block);
        }
    }

    impl Notifier for Page {
        fn notify(&self, message: &str) {
            self.toasts.borrow_mut().push(message.to_string());
        }
    }

    fn ok(body: &str) -> Option<Result<Reply, TsError>> {
        Some(Ok(Reply::new(200, body)))
    }

    #[test]
    fn nothing_selected_is_a_no_op() {
        let api = FakeApi::default();
        let page = Page::default();
        let gate = TaskGate::default();
        let outcome = block_on(submit(&api, &page, &gate, &ClientConfig::default(), None));
        assert_eq!(outcome, SubmitOutcome::Skipped);
        assert!(api.requested.borrow().is_empty());
        assert!(page.toasts.borrow().is_empty());
    }

    #[test]
    fn rejection_shows_server_message_and_releases_gate() {
        let api = FakeApi {
            upload: Some(Ok(Reply::new(
                500,
                r#"{"success": false, "message": "Error processing file: bad header"}"#,
            ))),
            ..Default::default()
        };
        let page = Page::default();
        let gate = TaskGate::default();
        let file = Upload("a.csv");
        let outcome = block_on(submit(&api, &page, &gate, &ClientConfig::default(), Some(&file)));
        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(*page.toasts.borrow(), ["Error processing file: bad header"]);
        assert!(!gate.is_engaged());
    }

    #[test]
    fn rejection_without_message_uses_fallback() {
        let api = FakeApi {
            upload: ok(r#"{"success": false}"#),
            ..Default::default()
        };
        let page = Page::default();
        let gate = TaskGate::default();
        let file = Upload("a.csv");
        block_on(submit(&api, &page, &gate, &ClientConfig::default(), Some(&file)));
        assert_eq!(*page.toasts.borrow(), [UPLOAD_REJECTED]);
    }

    #[test]
    fn transport_failure_hides_raw_error() {
        let api = FakeApi {
            upload: Some(Err(TsError::Transport("TypeError: Failed to fetch".into()))),
            ..Default::default()
        };
        let page = Page::default();
        let gate = TaskGate::default();
        let file = Upload("a.csv");
        block_on(submit(&api, &page, &gate, &ClientConfig::default(), Some(&file)));
        assert_eq!(*page.toasts.borrow(), [UPLOAD_UNEXPECTED]);
        assert!(!gate.is_engaged());
    }

    #[test]
    fn accepted_upload_without_files() {
        let api = FakeApi {
            upload: ok(r#"{"success": true, "message": "File processed successfully."}"#),
            ..Default::default()
        };
        let page = Page::default();
        let gate = TaskGate::default();
        let file = Upload("a.csv");
        let outcome = block_on(submit(&api, &page, &gate, &ClientConfig::default(), Some(&file)));
        assert_eq!(outcome, SubmitOutcome::NoFiles);
        assert!(page.blocks.borrow().is_empty());
        assert!(!gate.is_engaged());
    }

    #[test]
    fn rejected_render_appends_error_block_only() {
        let config = ClientConfig::default();
        let mut api = FakeApi::default();
        api.routes.insert(
            config.graph_data_url("x.csv"),
            Ok(Reply::new(200, r#"{"success": false, "message": "bad file"}"#)),
        );
        let page = Page::default();
        let gate = TaskGate::default();
        assert!(!block_on(render(&api, &page, &gate, &config, "x.csv")));

        let blocks = page.blocks.borrow();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_failure());
        assert!(blocks[0].text().contains("bad file"));
        assert!(!matches!(blocks[0], RenderBlock::Report(_)));
    }

    #[test]
    fn render_transport_failure_uses_generic_text() {
        let config = ClientConfig::default();
        let mut api = FakeApi::default();
        api.routes.insert(
            config.graph_data_url("x.csv"),
            Err(TsError::Transport("connection reset".into())),
        );
        let page = Page::default();
        let gate = TaskGate::default();
        block_on(render(&api, &page, &gate, &config, "x.csv"));
        let blocks = page.blocks.borrow();
        assert_eq!(
            blocks[0],
            RenderBlock::Failed {
                filename: "x.csv".into(),
                message: ANALYSIS_FAILED.into()
            }
        );
    }

    #[test]
    fn reset_failure_notifies() {
        let config = ClientConfig::default();
        let mut api = FakeApi::default();
        api.routes
            .insert(config.reset_path.clone(), Err(TsError::Transport("offline".into())));
        let page = Page::default();
        let gate = TaskGate::default();
        assert!(block_on(reset(&api, &page, &gate, &config)).is_err());
        assert_eq!(*page.toasts.borrow(), [RESET_FAILED]);
        assert!(!gate.is_engaged());
    }

    #[test]
    fn reset_error_status_notifies() {
        let config = ClientConfig::default();
        let mut api = FakeApi::default();
        api.routes
            .insert(config.reset_path.clone(), Ok(Reply::new(500, "Internal Server Error")));
        let page = Page::default();
        let gate = TaskGate::default();
        assert_eq!(
            block_on(reset(&api, &page, &gate, &config)),
            Err(TsError::Status(500))
        );
        assert_eq!(*page.toasts.borrow(), [RESET_FAILED]);
        assert!(!gate.is_engaged());
    }

    #[test]
    fn reset_success_is_silent() {
        let config = ClientConfig::default();
        let mut api = FakeApi::default();
        api.routes
            .insert(config.reset_path.clone(), Ok(Reply::new(200, "<html></html>")));
        let page = Page::default();
        assert!(block_on(reset(&api, &page, &TaskGate::default(), &config)).is_ok());
        assert!(page.toasts.borrow().is_empty());
    }
}
