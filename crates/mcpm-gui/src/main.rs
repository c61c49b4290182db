//! mcpm GUI
//!
//! Iced-based editor for the MCP servers registered with Claude Desktop,
//! with live reachability checks.

mod view;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use iced::Task;
use iced::widget::text_editor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpm_core::config::{ImportPreview, stringify_config};
use mcpm_core::context::AppContext;
use mcpm_core::mcp::{McpConfig, ServerDraft};
use mcpm_core::probe::ProbeResult;
use mcpm_core::status::{StatusBoard, ping_all};

/// Checks stay visibly "Checking..." for at least this long.
const MIN_CHECK_DISPLAY: Duration = Duration::from_millis(800);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcpm_gui=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = AppContext::with_defaults(None)?;

    iced::application(McpManager::title, McpManager::update, McpManager::view)
        .window_size((1040.0, 720.0))
        .run_with(move || McpManager::new(ctx))?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Visual,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
    Info(String),
    Error(String),
}

enum Dialog {
    Form {
        /// `None` when adding
        original_id: Option<String>,
        draft: ServerDraft,
    },
    Import {
        content: text_editor::Content,
        preview: ImportPreview,
    },
    ConfirmDelete(String),
}

#[derive(Debug, Clone)]
enum Message {
    CheckServer(String),
    CheckAll,
    Checked(String, ProbeResult),
    CheckedAll(BTreeMap<String, ProbeResult>),

    OpenAdd,
    OpenEdit(String),
    DraftName(String),
    DraftCommand(String),
    DraftNewArg(String),
    DraftAddArg,
    DraftRemoveArg(usize),
    DraftEnvKey(String),
    DraftEnvValue(String),
    DraftAddEnv,
    DraftRemoveEnv(String),
    SubmitForm,

    RequestDelete(String),
    ConfirmDelete,

    OpenImport,
    ImportEdited(text_editor::Action),
    SubmitImport,

    CloseDialog,

    ShowVisual,
    ShowJson,
    JsonEdited(text_editor::Action),
    SaveJson,
    CancelJson,
    CopyJson,

    DismissNotice,
}

struct McpManager {
    ctx: AppContext,
    config: McpConfig,
    board: StatusBoard,
    mode: Mode,
    json_editor: text_editor::Content,
    json_error: Option<String>,
    dialog: Option<Dialog>,
    notice: Option<Notice>,
}

impl McpManager {
    fn new(ctx: AppContext) -> (Self, Task<Message>) {
        let (config, notice) = match ctx.config_store().load() {
            Ok(config) => (config, None),
            Err(err) => {
                tracing::error!("Failed to load registry: {:#}", err);
                (
                    McpConfig::default(),
                    Some(Notice::Error(format!("Failed to load configuration: {:#}", err))),
                )
            }
        };

        let mut manager = Self {
            ctx,
            config: McpConfig::default(),
            board: StatusBoard::new(),
            mode: Mode::Visual,
            json_editor: text_editor::Content::new(),
            json_error: None,
            dialog: None,
            notice,
        };
        manager.apply_config(config);

        // Initial health check once the registry is known.
        let task = if manager.config.is_empty() {
            Task::none()
        } else {
            Task::done(Message::CheckAll)
        };
        (manager, task)
    }

    fn title(&self) -> String {
        format!("MCP Server Manager - {}", self.ctx.config_path().display())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CheckServer(id) => return self.check_server(id),
            Message::CheckAll => return self.check_all(),
            Message::Checked(id, result) => self.board.finish(&id, result),
            Message::CheckedAll(results) => self.board.finish_all(results),

            Message::OpenAdd => {
                self.dialog = Some(Dialog::Form {
                    original_id: None,
                    draft: ServerDraft::new(),
                });
            }
            Message::OpenEdit(id) => {
                if let Some(server) = self.config.find_server(&id) {
                    self.dialog = Some(Dialog::Form {
                        draft: ServerDraft::from_server(&id, server),
                        original_id: Some(id),
                    });
                }
            }
            Message::DraftName(value) => self.edit_draft(|draft| draft.name = value),
            Message::DraftCommand(value) => self.edit_draft(|draft| draft.command = value),
            Message::DraftNewArg(value) => self.edit_draft(|draft| draft.new_arg = value),
            Message::DraftAddArg => self.edit_draft(|draft| {
                draft.add_arg();
            }),
            Message::DraftRemoveArg(index) => self.edit_draft(|draft| {
                draft.remove_arg(index);
            }),
            Message::DraftEnvKey(value) => self.edit_draft(|draft| draft.new_env_key = value),
            Message::DraftEnvValue(value) => self.edit_draft(|draft| draft.new_env_value = value),
            Message::DraftAddEnv => self.edit_draft(|draft| {
                draft.add_env();
            }),
            Message::DraftRemoveEnv(key) => self.edit_draft(|draft| {
                draft.remove_env(&key);
            }),
            Message::SubmitForm => self.submit_form(),

            Message::RequestDelete(id) => self.dialog = Some(Dialog::ConfirmDelete(id)),
            Message::ConfirmDelete => {
                if let Some(Dialog::ConfirmDelete(id)) = self.dialog.take() {
                    match self.ctx.server_command().delete(&id) {
                        Ok(report) => {
                            self.apply_config(report.config);
                            self.notice = Some(Notice::Info(format!("Deleted server '{}'", id)));
                        }
                        Err(err) => self.fail("Failed to delete server", err),
                    }
                }
            }

            Message::OpenImport => {
                self.dialog = Some(Dialog::Import {
                    content: text_editor::Content::new(),
                    preview: ImportPreview::Empty,
                });
            }
            Message::ImportEdited(action) => {
                if let Some(Dialog::Import { content, preview }) = &mut self.dialog {
                    content.perform(action);
                    *preview = ImportPreview::from_text(&content.text());
                }
            }
            Message::SubmitImport => return self.submit_import(),

            Message::CloseDialog => self.dialog = None,

            Message::ShowVisual => self.mode = Mode::Visual,
            Message::ShowJson => {
                self.reset_json_editor();
                self.mode = Mode::Json;
            }
            Message::JsonEdited(action) => self.json_editor.perform(action),
            Message::SaveJson => {
                let content = self.json_editor.text();
                match self.ctx.config_store().save_raw(&content) {
                    Ok(config) => {
                        self.apply_config(config);
                        self.notice = Some(Notice::Info("Configuration saved".to_string()));
                    }
                    Err(err) => {
                        tracing::warn!("Rejected JSON edit: {:#}", err);
                        self.json_error = Some(format!("{:#}", err));
                    }
                }
            }
            Message::CancelJson => self.reset_json_editor(),
            Message::CopyJson => {
                self.notice = Some(Notice::Info(
                    "Configuration copied to clipboard".to_string(),
                ));
                return iced::clipboard::write(self.json_editor.text());
            }

            Message::DismissNotice => self.notice = None,
        }
        Task::none()
    }

    fn check_server(&mut self, id: String) -> Task<Message> {
        let Some(server) = self.config.find_server(&id).cloned() else {
            return Task::none();
        };
        if !self.board.begin_check(&id) {
            return Task::none();
        }

        let prober = self.ctx.prober();
        Task::perform(
            async move {
                let (result, _) =
                    tokio::join!(prober.probe(&server), tokio::time::sleep(MIN_CHECK_DISPLAY));
                result
            },
            move |result| Message::Checked(id.clone(), result),
        )
    }

    fn check_all(&mut self) -> Task<Message> {
        if self.board.begin_check_all().is_empty() {
            return Task::none();
        }

        let prober = Arc::new(self.ctx.prober());
        let config = self.config.clone();
        Task::perform(
            async move {
                let (results, _) =
                    tokio::join!(ping_all(prober, &config), tokio::time::sleep(MIN_CHECK_DISPLAY));
                results
            },
            Message::CheckedAll,
        )
    }

    fn edit_draft(&mut self, edit: impl FnOnce(&mut ServerDraft)) {
        if let Some(Dialog::Form { draft, .. }) = &mut self.dialog {
            edit(draft);
        }
    }

    fn submit_form(&mut self) {
        let Some(Dialog::Form { original_id, draft }) = &self.dialog else {
            return;
        };
        if !draft.can_submit() {
            self.notice = Some(Notice::Error("A command is required".to_string()));
            return;
        }

        let command = self.ctx.server_command();
        let new_id = draft.resolved_id();
        let result = match original_id {
            Some(original_id) => command.update_with_id(original_id, &new_id, draft.to_server()),
            None => command.add(&new_id, draft.to_server()),
        };

        match result {
            Ok(report) => {
                let verb = if original_id.is_some() { "Updated" } else { "Added" };
                self.notice = Some(Notice::Info(format!("{} server '{}'", verb, report.id)));
                self.dialog = None;
                self.apply_config(report.config);
            }
            Err(err) => self.fail("Failed to save server", err),
        }
    }

    fn submit_import(&mut self) -> Task<Message> {
        let Some(Dialog::Import { preview, .. }) = &self.dialog else {
            return Task::none();
        };
        let Some(imported) = preview.config().cloned() else {
            return Task::none();
        };

        match self.ctx.server_command().import(&imported) {
            Ok(report) => {
                self.dialog = None;
                self.notice = Some(Notice::Info(format!(
                    "Imported {} new server(s)",
                    report.added_count()
                )));
                self.apply_config(report.config);
                let checks: Vec<_> = report
                    .added
                    .into_iter()
                    .map(|id| self.check_server(id))
                    .collect();
                Task::batch(checks)
            }
            Err(err) => {
                self.fail("Failed to import servers", err);
                Task::none()
            }
        }
    }

    /// Adopt a freshly loaded or saved registry.
    fn apply_config(&mut self, config: McpConfig) {
        self.board.sync_ids(config.ids());
        self.config = config;
        self.reset_json_editor();
    }

    fn reset_json_editor(&mut self) {
        let text = match stringify_config(&self.config) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!("Failed to render registry as JSON: {:#}", err);
                String::new()
            }
        };
        self.json_editor = text_editor::Content::with_text(&text);
        self.json_error = None;
    }

    fn fail(&mut self, context: &str, err: anyhow::Error) {
        tracing::error!("{}: {:#}", context, err);
        self.notice = Some(Notice::Error(format!("{}: {:#}", context, err)));
    }
}
