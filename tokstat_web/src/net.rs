//! HTTP transport for the analysis server over the browser's fetch API.

use gloo::net::http::{Request, Response};
use tokstat::{AnalysisApi, FileHandle, Reply, TsError};
use wasm_bindgen::JsValue;
use web_sys::{File, FormData};

/// A file chosen through the input element or dropped on the page.
#[derive(Clone, Debug)]
pub struct PickedFile(File);

impl From<File> for PickedFile {
    fn from(file: File) -> Self {
        Self(file)
    }
}

impl FileHandle for PickedFile {
    fn name(&self) -> String {
        self.0.name()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GlooApi;

fn transport(err: gloo::net::Error) -> TsError {
    TsError::Transport(err.to_string())
}

fn js_transport(err: JsValue) -> TsError {
    TsError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

async fn into_reply(response: Response) -> Result<Reply, TsError> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    Ok(Reply::new(status, body))
}

impl AnalysisApi for GlooApi {
    type File = PickedFile;

    async fn upload(&self, url: &str, file: &PickedFile) -> Result<Reply, TsError> {
        let form = FormData::new().map_err(js_transport)?;
        form.append_with_blob_and_filename("file", &file.0, &file.0.name())
            .map_err(js_transport)?;
        let response = Request::post(url)
            .body(form)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        into_reply(response).await
    }

    async fn get(&self, url: &str) -> Result<Reply, TsError> {
        let response = Request::get(url).send().await.map_err(transport)?;
        into_reply(response).await
    }
}
