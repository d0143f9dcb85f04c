use iced::event;
use iced::keyboard::{self, key};
use iced::{Element, Subscription, Task};

use crate::bus_monitor;
use crate::cache;
use crate::catalog;
use crate::config::KioskConfig;
use crate::controller::{MediaEngine, MediaEvent, PlayerState, Signal};
use crate::error::PlaybackError;
use crate::loader;
use crate::message::Message;
use crate::state::App;
use crate::ui;

impl App {
    /// Initial state plus the startup work: engine acquisition and thumbnail prefetch.
    pub fn boot(config: KioskConfig) -> (Self, Task<Message>) {
        let mut app = App::new(config);
        log::info!(
            "Kiosk starting: {} questions, idle clip {}",
            app.catalog.len(),
            app.store.active_source()
        );

        let mut tasks = vec![Task::perform(
            loader::acquire_gstreamer(),
            Message::EngineAcquired,
        )];

        let sources: Vec<String> = std::iter::once(app.config.idle_clip.clone())
            .chain(app.catalog.iter().map(|clip| clip.video_url.clone()))
            .collect();
        for source in sources {
            tasks.push(app.request_thumbnail(&source));
        }

        (app, Task::batch(tasks))
    }

    pub fn title(&self) -> String {
        self.config.title.clone()
    }

    /// Handle UI messages and state updates.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectClip(id) => {
                let Some(clip) = self.catalog.get(id) else {
                    log::warn!("Unknown question id {}", id);
                    return Task::none();
                };
                log::info!("Question selected: {}", id);
                let source = clip.video_url.clone();
                if self.store.select_clip(&source) {
                    self.controller.sync(&mut self.store, &mut self.engine);
                }
                return self.request_thumbnail(&source);
            }
            Message::Stop => {
                if !self.store.is_idle_clip() {
                    self.store.reset_to_idle();
                    self.controller.sync(&mut self.store, &mut self.engine);
                }
            }
            Message::Pause => {
                // The engine reports the pause back through the bus monitor.
                self.engine.pause();
            }
            Message::Resume => {
                self.controller.resume(&mut self.store, &mut self.engine);
            }
            Message::Media(signal) => {
                self.controller
                    .handle(signal, &mut self.store, &mut self.engine);
            }
            Message::NewFrame(key) => {
                if self.engine.note_frame(key) {
                    self.controller.handle(
                        Signal::new(key, MediaEvent::Ready),
                        &mut self.store,
                        &mut self.engine,
                    );
                }
            }
            Message::EngineAcquired(Ok(())) => {
                if let Some(signal) = self.engine.acquire() {
                    self.controller
                        .handle(signal, &mut self.store, &mut self.engine);
                }
            }
            Message::EngineAcquired(Err(e)) => {
                log::error!("Media engine unavailable: {}", e);
                let signal = Signal::new(
                    self.store.instance_key(),
                    MediaEvent::Error(PlaybackError::Engine(e)),
                );
                self.controller
                    .handle(signal, &mut self.store, &mut self.engine);
            }
            Message::ThumbnailFetched(url, result) => {
                self.thumbnails.complete(&url, result);
            }
            Message::EventOccurred(event) => {
                if let Some(message) = self.shortcut(event) {
                    return self.update(message);
                }
            }
        }

        Task::none()
    }

    /// Subscribe to events.
    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            event::listen().map(Message::EventOccurred),
            bus_monitor::bus_monitor_subscription(self.engine.pipeline()),
        ])
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        ui::render_main_view(self)
    }

    /// Blurred still for `video_url`, fetched once per URL.
    pub fn thumbnail_for(&self, video_url: &str) -> Option<&iced::widget::image::Handle> {
        let url = catalog::thumbnail_url(&self.config.thumbnail_base, video_url)?;
        self.thumbnails.get(&url)
    }

    fn request_thumbnail(&mut self, video_url: &str) -> Task<Message> {
        let Some(url) = catalog::thumbnail_url(&self.config.thumbnail_base, video_url) else {
            return Task::none();
        };
        if !self.thumbnails.request(&url) {
            return Task::none();
        }
        Task::perform(cache::fetch_thumbnail(url.clone()), move |result| {
            Message::ThumbnailFetched(url, result)
        })
    }

    fn shortcut(&self, event: iced::Event) -> Option<Message> {
        match event {
            iced::Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => {
                self.shortcut_for_key(key)
            }
            _ => None,
        }
    }

    /// Keyboard: 1-9 pick a question, Escape stops, Space pauses or resumes.
    fn shortcut_for_key(&self, key: keyboard::Key) -> Option<Message> {
        match key {
            keyboard::Key::Named(key::Named::Escape) => Some(Message::Stop),
            keyboard::Key::Named(key::Named::Space) => match self.controller.state() {
                PlayerState::Paused => Some(Message::Resume),
                PlayerState::Playing if !self.store.is_idle_clip() => Some(Message::Pause),
                _ => None,
            },
            keyboard::Key::Character(c) => {
                let digit = c.as_str().parse::<usize>().ok()?;
                let clip = self.catalog.nth(digit.checked_sub(1)?)?;
                Some(Message::SelectClip(clip.id))
            }
            _ => None,
        }
    }
}
