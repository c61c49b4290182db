//! Rendering for the manager window.

use iced::widget::{
    Column, button, column, container, horizontal_space, row, scrollable, text, text_editor,
    text_input,
};
use iced::{Alignment, Color, Element, Font, Length};

use mcpm_core::config::ImportPreview;
use mcpm_core::mcp::{McpServer, ServerDraft};
use mcpm_core::status::ServerStatus;

use crate::{Dialog, McpManager, Message, Mode, Notice};

const GREEN: Color = Color::from_rgb(0.13, 0.55, 0.27);
const RED: Color = Color::from_rgb(0.78, 0.16, 0.16);
const AMBER: Color = Color::from_rgb(0.80, 0.55, 0.05);
const GREY: Color = Color::from_rgb(0.5, 0.5, 0.5);

impl McpManager {
    pub(super) fn view(&self) -> Element<'_, Message> {
        let body: Element<'_, Message> = match &self.dialog {
            Some(Dialog::Form { original_id, draft }) => form_view(original_id.is_some(), draft),
            Some(Dialog::Import { content, preview }) => import_view(content, preview),
            Some(Dialog::ConfirmDelete(id)) => delete_view(id),
            None => match self.mode {
                Mode::Visual => self.server_list(),
                Mode::Json => self.json_view(),
            },
        };

        let mut page = Column::new().spacing(16).padding(20).push(self.header());
        if let Some(notice) = &self.notice {
            page = page.push(notice_view(notice));
        }
        page.push(body).into()
    }

    fn header(&self) -> Element<'_, Message> {
        let idle = self.dialog.is_none();
        let can_check = idle && !self.config.is_empty() && !self.board.is_checking_any();
        let check_label = if self.board.is_checking_any() {
            "Checking..."
        } else {
            "Check All Statuses"
        };
        let mode_toggle = match self.mode {
            Mode::Visual => button("View JSON").on_press_maybe(idle.then_some(Message::ShowJson)),
            Mode::Json => {
                button("Visual Editor").on_press_maybe(idle.then_some(Message::ShowVisual))
            }
        };

        row![
            column![
                text("MCP Server Manager").size(24),
                text(self.ctx.config_path().display().to_string())
                    .size(12)
                    .color(GREY),
            ]
            .spacing(4),
            horizontal_space(),
            button(check_label)
                .style(button::secondary)
                .on_press_maybe(can_check.then_some(Message::CheckAll)),
            button("Paste from JSON")
                .style(button::secondary)
                .on_press_maybe(idle.then_some(Message::OpenImport)),
            button("Add Server").on_press_maybe(idle.then_some(Message::OpenAdd)),
            mode_toggle,
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
    }

    fn server_list(&self) -> Element<'_, Message> {
        if self.config.is_empty() {
            return container(
                column![
                    text("No MCP servers configured").size(18),
                    text("Add a server or paste an existing configuration to get started.")
                        .color(GREY),
                ]
                .spacing(8)
                .align_x(Alignment::Center),
            )
            .width(Length::Fill)
            .center_x(Length::Fill)
            .padding(40)
            .into();
        }

        let header = row![
            text("Name").width(Length::FillPortion(2)),
            text("Command").width(Length::FillPortion(4)),
            text("Status").width(Length::FillPortion(2)),
            text("Actions").width(Length::FillPortion(3)),
        ]
        .spacing(12);

        let rows = Column::with_children(
            self.config
                .mcp_servers
                .iter()
                .map(|(id, server)| self.server_row(id, server)),
        )
        .spacing(8);

        column![header, scrollable(rows).height(Length::Fill)]
            .spacing(10)
            .into()
    }

    fn server_row<'a>(&'a self, id: &'a str, server: &'a McpServer) -> Element<'a, Message> {
        let status = self.board.status(id);
        let entry = self.board.entry(id);

        let mut status_cell = column![status_badge(status)].spacing(2);
        if let Some(checked) = entry.and_then(|entry| entry.last_checked) {
            status_cell = status_cell.push(
                text(format!("checked {}", checked.format("%H:%M:%S UTC")))
                    .size(11)
                    .color(GREY),
            );
        }
        if let Some(port) = entry
            .and_then(|entry| entry.last_result.as_ref())
            .and_then(|result| result.port)
            && status == ServerStatus::Online
        {
            status_cell = status_cell.push(text(format!("port {}", port)).size(11).color(GREY));
        }

        let checking = status == ServerStatus::Checking;
        let actions = row![
            button("Check")
                .style(button::secondary)
                .on_press_maybe((!checking).then(|| Message::CheckServer(id.to_string()))),
            button("Edit")
                .style(button::secondary)
                .on_press(Message::OpenEdit(id.to_string())),
            button("Delete")
                .style(button::danger)
                .on_press(Message::RequestDelete(id.to_string())),
        ]
        .spacing(6);

        row![
            text(id).width(Length::FillPortion(2)),
            text(server.command_line())
                .font(Font::MONOSPACE)
                .width(Length::FillPortion(4)),
            status_cell.width(Length::FillPortion(2)),
            container(actions).width(Length::FillPortion(3)),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
    }

    fn json_view(&self) -> Element<'_, Message> {
        let mut layout = column![
            text_editor(&self.json_editor)
                .on_action(Message::JsonEdited)
                .font(Font::MONOSPACE)
                .height(Length::Fill),
        ]
        .spacing(10);

        if let Some(error) = &self.json_error {
            layout = layout.push(text(error.as_str()).color(RED));
        }

        layout
            .push(
                row![
                    button("Save").on_press(Message::SaveJson),
                    button("Cancel")
                        .style(button::secondary)
                        .on_press(Message::CancelJson),
                    horizontal_space(),
                    button("Copy to Clipboard")
                        .style(button::secondary)
                        .on_press(Message::CopyJson),
                ]
                .spacing(8),
            )
            .into()
    }
}

fn status_badge(status: ServerStatus) -> Element<'static, Message> {
    let color = match status {
        ServerStatus::Online => GREEN,
        ServerStatus::Offline => RED,
        ServerStatus::Checking => AMBER,
        ServerStatus::Unknown => GREY,
    };
    text(status.label()).color(color).into()
}

fn notice_view(notice: &Notice) -> Element<'_, Message> {
    let (message, color) = match notice {
        Notice::Info(message) => (message, GREEN),
        Notice::Error(message) => (message, RED),
    };
    container(
        row![
            text(message.as_str()).color(color),
            horizontal_space(),
            button("Dismiss")
                .style(button::text)
                .on_press(Message::DismissNotice),
        ]
        .align_y(Alignment::Center),
    )
    .padding(8)
    .style(container::rounded_box)
    .into()
}

fn form_view(editing: bool, draft: &ServerDraft) -> Element<'_, Message> {
    let title = if editing { "Edit Server" } else { "Add Server" };

    let args = Column::with_children(draft.args.iter().enumerate().map(|(index, arg)| {
        row![
            text(arg.as_str()).font(Font::MONOSPACE).width(Length::Fill),
            button("Remove")
                .style(button::text)
                .on_press(Message::DraftRemoveArg(index)),
        ]
        .align_y(Alignment::Center)
        .into()
    }))
    .spacing(4);

    let env = Column::with_children(draft.env.iter().map(|(key, value)| {
        row![
            text(format!("{}={}", key, value))
                .font(Font::MONOSPACE)
                .width(Length::Fill),
            button("Remove")
                .style(button::text)
                .on_press(Message::DraftRemoveEnv(key.clone())),
        ]
        .align_y(Alignment::Center)
        .into()
    }))
    .spacing(4);

    let form = column![
        text(title).size(20),
        text("Name"),
        text_input("Leave empty to generate an ID", &draft.name).on_input(Message::DraftName),
        text("Command"),
        text_input("e.g. npx", &draft.command).on_input(Message::DraftCommand),
        text("Arguments"),
        args,
        row![
            text_input("Add argument", &draft.new_arg)
                .on_input(Message::DraftNewArg)
                .on_submit(Message::DraftAddArg),
            button("Add").on_press(Message::DraftAddArg),
        ]
        .spacing(8),
        text("Environment Variables"),
        env,
        row![
            text_input("KEY", &draft.new_env_key).on_input(Message::DraftEnvKey),
            text_input("value", &draft.new_env_value)
                .on_input(Message::DraftEnvValue)
                .on_submit(Message::DraftAddEnv),
            button("Add").on_press(Message::DraftAddEnv),
        ]
        .spacing(8),
        row![
            button("Cancel")
                .style(button::secondary)
                .on_press(Message::CloseDialog),
            button(if editing { "Save Changes" } else { "Add Server" })
                .on_press_maybe(draft.can_submit().then_some(Message::SubmitForm)),
        ]
        .spacing(8),
    ]
    .spacing(10)
    .max_width(640);

    scrollable(container(form).center_x(Length::Fill)).into()
}

fn import_view<'a>(
    content: &'a text_editor::Content,
    preview: &'a ImportPreview,
) -> Element<'a, Message> {
    let mut layout = column![
        text("Paste from JSON").size(20),
        text("Paste a configuration with an \"mcpServers\" object. Servers that already exist are kept.")
            .color(GREY),
        text_editor(content)
            .placeholder("{\n  \"mcpServers\": { ... }\n}")
            .on_action(Message::ImportEdited)
            .font(Font::MONOSPACE)
            .height(Length::Fixed(320.0)),
    ]
    .spacing(10);

    if let Some(message) = preview.message() {
        let color = if preview.can_import() { GREEN } else { RED };
        layout = layout.push(text(message).color(color));
    }

    layout
        .push(
            row![
                button("Cancel")
                    .style(button::secondary)
                    .on_press(Message::CloseDialog),
                button("Import")
                    .on_press_maybe(preview.can_import().then_some(Message::SubmitImport)),
            ]
            .spacing(8),
        )
        .into()
}

fn delete_view(id: &str) -> Element<'_, Message> {
    container(
        column![
            text("Delete Server").size(20),
            text(format!(
                "Are you sure you want to delete '{}'? This action cannot be undone.",
                id
            )),
            row![
                button("Cancel")
                    .style(button::secondary)
                    .on_press(Message::CloseDialog),
                button("Delete")
                    .style(button::danger)
                    .on_press(Message::ConfirmDelete),
            ]
            .spacing(8),
        ]
        .spacing(12)
        .max_width(520),
    )
    .center_x(Length::Fill)
    .padding(20)
    .into()
}
