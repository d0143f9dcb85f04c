//! GStreamer bus monitor for buffering and pause notifications.
//!
//! The video widget reports end-of-stream, errors and frames itself; this
//! subscription fills in buffering and pause, which only show up on the bus.
//! Everything it emits is tagged with the instance key it was started for, so
//! a monitor outliving its instance can only produce stale signals.
//!
//! The widget pops end-of-stream and errors off the same bus, and popping
//! discards whatever else is queued. The monitor therefore never pops: it
//! copies messages through the bus's sync-message signal as they are posted.

use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use gstreamer::MessageView;
use gstreamer::glib;
use gstreamer::prelude::*;
use iced::Subscription;
use iced::stream;

use crate::controller::{InstanceKey, MediaEvent, Signal};
use crate::message::Message;

#[derive(Debug, Clone)]
struct BusWatch {
    key: InstanceKey,
    pipeline: gstreamer::Pipeline,
}

impl std::hash::Hash for BusWatch {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Monitor the bus of the mounted instance.
pub fn bus_monitor_subscription(
    mounted: Option<(InstanceKey, gstreamer::Pipeline)>,
) -> Subscription<Message> {
    let Some((key, pipeline)) = mounted else {
        return Subscription::none();
    };

    Subscription::run_with(BusWatch { key, pipeline }, |watch| {
        bus_stream(watch.key, watch.pipeline.clone())
    })
}

/// Copies buffering and state-change messages off a bus as they are posted,
/// leaving the bus queue untouched. Detaches on drop.
struct BusTap {
    bus: gstreamer::Bus,
    handler: Option<glib::SignalHandlerId>,
}

impl BusTap {
    fn attach(bus: gstreamer::Bus) -> (Self, mpsc::UnboundedReceiver<gstreamer::Message>) {
        let (tx, rx) = mpsc::unbounded();
        bus.enable_sync_message_emission();
        let handler = bus.connect_sync_message(None, move |_, msg| {
            if matches!(
                msg.view(),
                MessageView::Buffering(_) | MessageView::StateChanged(_)
            ) {
                let _ = tx.unbounded_send(msg.clone());
            }
        });

        let tap = BusTap {
            bus,
            handler: Some(handler),
        };
        (tap, rx)
    }
}

impl Drop for BusTap {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            self.bus.disconnect(handler);
        }
        self.bus.disable_sync_message_emission();
    }
}

/// Translate one bus message. `buffering` tracks the last reported state so
/// repeated percentages don't flood the controller.
fn translate(
    msg: &gstreamer::Message,
    pipeline: &gstreamer::Pipeline,
    buffering: &mut bool,
) -> Option<MediaEvent> {
    match msg.view() {
        MessageView::Buffering(b) => {
            let now_buffering = b.percent() < 100;
            if now_buffering == *buffering {
                return None;
            }
            *buffering = now_buffering;
            Some(if now_buffering {
                MediaEvent::BufferStart
            } else {
                MediaEvent::BufferEnd
            })
        }
        MessageView::StateChanged(change) => {
            let from_pipeline = msg.src() == Some(pipeline.upcast_ref::<gstreamer::Object>());
            // A flushing seek briefly drops a playing pipeline to paused with
            // playing still pending; only a settled pause counts.
            if from_pipeline
                && change.old() == gstreamer::State::Playing
                && change.current() == gstreamer::State::Paused
                && change.pending() == gstreamer::State::VoidPending
            {
                Some(MediaEvent::Paused)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn bus_stream(
    key: InstanceKey,
    pipeline: gstreamer::Pipeline,
) -> impl futures::Stream<Item = Message> {
    stream::channel(32, move |mut output| async move {
        log::debug!("Bus monitor started for instance {}", key);

        let Some(bus) = pipeline.bus() else {
            log::warn!("Instance {} has no bus, not monitoring", key);
            return;
        };
        let (_tap, mut messages) = BusTap::attach(bus);
        let mut buffering = false;

        while let Some(msg) = messages.next().await {
            let Some(event) = translate(&msg, &pipeline, &mut buffering) else {
                continue;
            };
            log::debug!("Bus monitor: {:?} for instance {}", event, key);
            if output
                .send(Message::Media(Signal::new(key, event)))
                .await
                .is_err()
            {
                log::debug!("Bus monitor for instance {} disconnected", key);
                return;
            }
        }
    })
}
