use iced::widget::{
    Column, Row, button, center, column, container, image, row, scrollable, stack, text,
};
use iced::{Color, ContentFit, Element, Length, Theme, alignment};
use iced_video_player::VideoPlayer;

use crate::catalog::Clip;
use crate::controller::{MediaEvent, PlayerState, Signal};
use crate::loader;
use crate::message::Message;
use crate::state::App;

fn overlay_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
        text_color: Some(Color::WHITE),
        ..Default::default()
    }
}

fn panel_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Color::from_rgb8(15, 23, 42).into()),
        ..Default::default()
    }
}

/// One question button; the active one also shows its answer text.
fn question_button<'a>(index: usize, clip: &'a Clip, active: bool) -> Element<'a, Message> {
    let mut content =
        column![text(format!("{}. {}", index + 1, clip.question)).size(16)].spacing(6);
    if active {
        content = content.push(text(&clip.answer).size(13));
    }

    let style: fn(&Theme, button::Status) -> button::Style = if active {
        button::primary
    } else {
        button::secondary
    };

    button(content)
        .on_press(Message::SelectClip(clip.id))
        .style(style)
        .padding(14)
        .width(Length::Fill)
        .into()
}

fn render_question_list(app: &App) -> Element<'_, Message> {
    let active = app.store.active_source();
    let buttons = app
        .catalog
        .iter()
        .enumerate()
        .map(|(index, clip)| question_button(index, clip, clip.video_url == active));

    scrollable(Column::with_children(buttons).spacing(10).padding(20))
        .width(Length::FillPortion(1))
        .height(Length::Fill)
        .into()
}

/// Blurred thumbnail with a loading notice on top.
fn render_loading_overlay(app: &App) -> Element<'_, Message> {
    let notice = center(text("Loading video...").size(16))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(overlay_style);

    match app.thumbnail_for(app.store.active_source()) {
        Some(handle) => stack![
            image(handle.clone())
                .content_fit(ContentFit::Cover)
                .width(Length::Fill)
                .height(Length::Fill),
            notice
        ]
        .into(),
        None => notice.into(),
    }
}

fn render_error_overlay(app: &App) -> Element<'_, Message> {
    let detail = app
        .controller
        .failure()
        .map(|e| e.to_string())
        .unwrap_or_default();

    center(
        column![
            text("Video unavailable").size(24),
            text(detail).size(12),
            text("Pick a question to try again").size(12),
        ]
        .spacing(8)
        .align_x(alignment::Horizontal::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .style(overlay_style)
    .into()
}

/// Stop is offered whenever an answer is on screen; pause/play follow the player.
fn render_controls_bar(app: &App) -> Element<'_, Message> {
    let mut controls = Row::new().spacing(10).align_y(alignment::Vertical::Center);

    if !app.store.is_idle_clip() {
        controls = controls.push(button(text("Stop").size(14)).on_press(Message::Stop));
        match app.controller.state() {
            PlayerState::Playing => {
                controls = controls.push(button(text("Pause").size(14)).on_press(Message::Pause));
            }
            PlayerState::Paused => {
                controls = controls.push(button(text("Play").size(14)).on_press(Message::Resume));
            }
            _ => {}
        }
    }

    let status = match app.catalog.position_of(app.store.active_source()) {
        Some(index) => format!("Question {} of {}", index + 1, app.catalog.len()),
        None => "Pick a question".to_string(),
    };
    controls = controls.push(container("").width(Length::Fill));
    controls = controls.push(text(status).size(12));

    container(controls).padding(10).width(Length::Fill).into()
}

fn render_video_panel(app: &App) -> Element<'_, Message> {
    let video: Element<'_, Message> = match app.engine.current() {
        Some(clip) => {
            let key = clip.key;
            VideoPlayer::new(&clip.video)
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Cover)
                .on_end_of_stream(Message::Media(Signal::new(key, MediaEvent::Ended)))
                .on_new_frame(Message::NewFrame(key))
                .on_error(move |err| {
                    Message::Media(Signal::new(key, MediaEvent::Error(loader::classify(err))))
                })
                .into()
        }
        None => container("").width(Length::Fill).height(Length::Fill).into(),
    };

    let mut panel = stack![video];
    match app.controller.state() {
        PlayerState::Loading => panel = panel.push(render_loading_overlay(app)),
        PlayerState::Error => panel = panel.push(render_error_overlay(app)),
        _ => {}
    }

    column![
        container(panel)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(panel_style),
        render_controls_bar(app),
    ]
    .width(Length::FillPortion(1))
    .height(Length::Fill)
    .into()
}

/// Render the main view: questions on the left, the video panel on the right.
pub fn render_main_view(app: &App) -> Element<'_, Message> {
    row![render_question_list(app), render_video_panel(app)]
        .spacing(20)
        .padding(10)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
