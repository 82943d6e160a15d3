use std::rc::Rc;

use gloo::timers::callback::Timeout;
use leptos::*;
use tokstat::{
    reset, submit, ClientConfig, DarkMode, KeyFocus, Notifier, RenderBlock, ResultsView,
    SubmitOutcome, Table, TaskGate, ToastState, UploadSession,
};
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{Element, FileList, HtmlInputElement, KeyboardEvent};

mod config;
mod dom;
mod graphs;
mod net;
mod storage;

use dom::{apply_dark_mode, navigate, navigate_later, reload};
use net::{GlooApi, PickedFile};
use storage::LocalStore;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_COMMIT: &str = env!("GIT_COMMIT_HASH");

/// Results area and toast, as seen by the upload flow.
#[derive(Clone, Copy)]
struct PageView {
    blocks: RwSignal<Vec<(usize, RenderBlock)>>,
    next_key: StoredValue<usize>,
    toast: RwSignal<ToastState>,
    toast_ms: u32,
}

impl Notifier for PageView {
    fn notify(&self, message: &str) {
        let Some(generation) = self.toast.try_update(|toast| toast.show(message)) else {
            return;
        };
        let toast = self.toast;
        Timeout::new(self.toast_ms, move || {
            toast.update(|toast| {
                toast.expire(generation);
            });
        })
        .forget();
    }
}

impl ResultsView for PageView {
    fn append(&self, block: RenderBlock) {
        let key = self.next_key.get_value();
        self.next_key.set_value(key + 1);
        debug!(file = block.filename(), failed = block.is_failure(), "appending result block");
        self.blocks.update(|blocks| blocks.push((key, block)));
    }
}

/// Id of the button or link a key event was aimed at, if any.
fn focused_control(event: &KeyboardEvent) -> Option<String> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    matches!(element.tag_name().to_ascii_uppercase().as_str(), "BUTTON" | "A").then(|| element.id())
}

#[component]
fn StatTable(table: Table) -> impl IntoView {
    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            let value = row.display_value();
            view! { <tr><td>{row.key}</td><td class="num">{value}</td></tr> }
        })
        .collect_view();
    view! {
        <table class="stat-table">
            <caption>{table.title}</caption>
            <thead><tr><th>{table.key_header}</th><th>{table.value_header}</th></tr></thead>
            <tbody>{rows}</tbody>
        </table>
    }
}

#[component]
fn ResultBlock(block: RenderBlock) -> impl IntoView {
    match block {
        RenderBlock::Failed { filename, message } => view! {
            <article class="result-block">
                <h3>{filename}</h3>
                <p class="error">{message}</p>
            </article>
        }
        .into_view(),
        RenderBlock::Report(report) => {
            let tables = report
                .tables()
                .into_iter()
                .cloned()
                .map(|table| view! { <StatTable table=table/> })
                .collect_view();
            view! {
                <article class="result-block">
                    <h3>{report.filename.clone()}</h3>
                    <div class="tables">{tables}</div>
                    <a class="btn export" href=report.export_href.clone() download>"Download processed data"</a>
                </article>
            }
            .into_view()
        }
    }
}

#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    let view_sink = PageView {
        blocks: create_rw_signal(Vec::new()),
        next_key: store_value(0),
        toast: create_rw_signal(ToastState::default()),
        toast_ms: config.toast_ms,
    };
    let dark_pref = store_value(DarkMode::load(LocalStore, config.storage_key.clone()));
    let config = store_value(config);

    let (busy, set_busy) = create_signal(false);
    let gate = store_value(Rc::new(TaskGate::new(move |engaged| set_busy.set(engaged))));
    let session = create_rw_signal(UploadSession::<PickedFile>::new());
    let (drag_active, set_drag_active) = create_signal(false);
    let (dark, set_dark) = create_signal(dark_pref.with_value(|pref| pref.enabled()));
    let file_input = create_node_ref::<html::Input>();

    // Themed elements outside this component (or not yet mounted) are looked up by id.
    create_effect(move |_| {
        let enabled = dark.get();
        request_animation_frame(move || apply_dark_mode(enabled));
    });

    let select_files = move |files: Option<FileList>| {
        let Some(list) = files else {
            return;
        };
        let picked: Vec<PickedFile> = (0..list.length())
            .filter_map(|i| list.item(i))
            .map(PickedFile::from)
            .collect();
        if picked.is_empty() {
            return;
        }
        session.update(|session| {
            session.select_first(picked);
        });
    };

    let run_submit = move || {
        if busy.get_untracked() {
            return;
        }
        let Some(file) = session.with_untracked(|session| session.selected().cloned()) else {
            return;
        };
        let gate = gate.get_value();
        let config = config.get_value();
        spawn_local(async move {
            let outcome = submit(&GlooApi, &view_sink, &gate, &config, Some(&file)).await;
            if outcome == SubmitOutcome::NoFiles {
                navigate(&config.graphs_path);
            }
        });
    };

    let keydown = window_event_listener(ev::keydown, move |event| {
        let control = focused_control(&event);
        let focus = control.as_deref().map_or(KeyFocus::Page, KeyFocus::Control);
        let accepted = session.with_untracked(|session| {
            session.accepts_enter(&event.key(), busy.get_untracked(), focus)
        });
        if accepted {
            event.prevent_default();
            run_submit();
        }
    });
    on_cleanup(move || keydown.remove());

    let on_reset = move |_ev: ev::MouseEvent| {
        let gate = gate.get_value();
        let config = config.get_value();
        spawn_local(async move {
            match reset(&GlooApi, &view_sink, &gate, &config).await {
                Ok(()) => reload(),
                Err(_) => navigate_later(config.home_path.clone(), config.toast_ms),
            }
        });
    };

    let on_toggle_dark = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        let mut enabled = false;
        dark_pref.update_value(|pref| enabled = pref.toggle());
        set_dark.set(enabled);
    };

    let on_home = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        navigate(&config.with_value(|config| config.home_path.clone()));
    };

    view! {
        <div id="loadingOverlay" class="loading-overlay" class:hidden=move || !busy.get()>
            <div class="spinner"></div>
        </div>
        <main id="mainContainer" class="container" class:blur=move || busy.get()>
            <header class="toolbar">
                <h1>"Token Statistics"</h1>
                <button id="toggleDarkModeBtn" class="btn" on:click=on_toggle_dark>"Toggle Dark Mode"</button>
                <button id="homeBtn" class="btn" on:click=on_home>"Back to Home"</button>
            </header>
            <div
                id="dropZone"
                class="drop-zone"
                class:dragover=move || drag_active.get()
                on:dragover=move |ev: ev::DragEvent| {
                    ev.prevent_default();
                    set_drag_active.set(true);
                }
                on:dragleave=move |_| set_drag_active.set(false)
                on:drop=move |ev: ev::DragEvent| {
                    ev.prevent_default();
                    set_drag_active.set(false);
                    select_files(ev.data_transfer().and_then(|dt| dt.files()));
                }
                on:click=move |_| {
                    if let Some(input) = file_input.get() {
                        input.click();
                    }
                }
            >
                <p>"Drag & drop an order log here, or click to choose one"</p>
            </div>
            <input
                id="fileInput"
                type="file"
                hidden
                node_ref=file_input
                on:change=move |ev| {
                    let input: HtmlInputElement = event_target(&ev);
                    select_files(input.files());
                }
            />
            <p id="fileNameDisplay" class="note">
                {move || session.with(|session| session.label().unwrap_or_default())}
            </p>
            <div class="actions">
                <button
                    id="analyzeBtn"
                    class="btn"
                    disabled=move || busy.get() || !session.with(|session| session.analyze_enabled())
                    on:click=move |_| run_submit()
                >
                    "Analyze"
                </button>
                <button id="resetBtn" class="btn" disabled=move || busy.get() on:click=on_reset>
                    "Reset"
                </button>
            </div>
            <section id="results" class="graphs-container">
                <For
                    each=move || view_sink.blocks.get()
                    key=|(key, _)| *key
                    children=|(_, block)| view! { <ResultBlock block=block/> }
                />
            </section>
            <footer class="note">{"Web version "}{APP_VERSION}{" ("}{APP_COMMIT}{")"}</footer>
        </main>
        <div id="toast" class="toast" class:hidden=move || view_sink.toast.with(|toast| toast.message().is_none())>
            {move || view_sink.toast.with(|toast| toast.message().unwrap_or_default().to_string())}
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let config = config::load();
    if graphs::is_graphs_page() {
        graphs::bind(config);
    } else {
        mount_to_body(move || view! { <App config=config/> });
    }
}
