use iced::Event;
use iced::widget::image::Handle;

use crate::controller::{InstanceKey, Signal};

#[derive(Clone, Debug)]
pub enum Message {
    /// A question was picked, by catalog id.
    SelectClip(u32),
    Stop,
    Pause,
    Resume,
    /// Lifecycle signal from the video widget or the bus monitor.
    Media(Signal),
    NewFrame(InstanceKey),
    EngineAcquired(Result<(), String>),
    ThumbnailFetched(String, Result<Handle, String>),
    EventOccurred(Event),
}
