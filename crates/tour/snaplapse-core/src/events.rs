//! Typed event bus with per-listener fault isolation.
//!
//! Listeners never see the engine itself. Anything they want the engine to do in response
//! (start or stop playback) goes through [`Requests`] and is applied once the operation that
//! raised the event has finished.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use crate::data::Keyframe;
use crate::error::TourError;
use crate::ids::KeyframeId;
use crate::interval::KeyframeInterval;

/// Lifecycle signals delivered to listeners.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TourEvent {
    KeyframeAdded { keyframe: Keyframe, index: usize },
    KeyframeModified { keyframe: Keyframe },
    Play,
    Stop { jumped_to_last: bool },
    /// The scheduler entered the interval at `index` of the current chain, starting from
    /// `keyframe`. When the chain runs out, `index` is the chain length, `keyframe` is the
    /// final keyframe and `interval` is `None`.
    KeyframeIntervalChange {
        index: usize,
        keyframe: Keyframe,
        interval: Option<KeyframeInterval>,
    },
}

impl TourEvent {
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::KeyframeAdded { .. } => EventKind::KeyframeAdded,
            Self::KeyframeModified { .. } => EventKind::KeyframeModified,
            Self::Play => EventKind::Play,
            Self::Stop { .. } => EventKind::Stop,
            Self::KeyframeIntervalChange { .. } => EventKind::KeyframeIntervalChange,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    KeyframeAdded,
    KeyframeModified,
    Play,
    Stop,
    KeyframeIntervalChange,
}

impl EventKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::KeyframeAdded => "keyframe-added",
            Self::KeyframeModified => "keyframe-modified",
            Self::Play => "play",
            Self::Stop => "stop",
            Self::KeyframeIntervalChange => "keyframe-interval-change",
        }
    }

    /// Look up a kind by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "keyframe-added" => Some(Self::KeyframeAdded),
            "keyframe-modified" => Some(Self::KeyframeModified),
            "play" => Some(Self::Play),
            "stop" => Some(Self::Stop),
            "keyframe-interval-change" => Some(Self::KeyframeIntervalChange),
            _ => None,
        }
    }
}

/// Engine operations a listener asks for while an event is being dispatched.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Play { start_at: Option<KeyframeId> },
    Stop { jump_to_last: bool },
}

/// Queue handed to listeners.
#[derive(Debug, Default)]
pub struct Requests {
    queue: Vec<Request>,
}

impl Requests {
    pub fn play(&mut self, start_at: Option<KeyframeId>) {
        self.queue.push(Request::Play { start_at });
    }

    pub fn stop(&mut self, jump_to_last: bool) {
        self.queue.push(Request::Stop { jump_to_last });
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn drain(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.queue)
    }
}

pub type Listener = Box<dyn FnMut(&TourEvent, &mut Requests) -> anyhow::Result<()>>;

/// Handle returned by [`EventBus::add_listener`]; the only way to remove that listener again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&'static str, usize> = self
            .listeners
            .iter()
            .map(|(kind, list)| (kind.name(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.entry(kind).or_default().push((id, listener));
        id
    }

    /// Returns whether a listener was removed; unknown ids are ignored.
    pub fn remove_listener(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        list.len() != before
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver `event` to every listener of its kind in registration order.
    /// Returns the number of listeners that failed.
    pub fn dispatch(&mut self, event: &TourEvent, requests: &mut Requests) -> usize {
        let kind = event.kind();
        let Some(list) = self.listeners.get_mut(&kind) else {
            return 0;
        };
        let mut failures = 0;
        for (id, listener) in list.iter_mut() {
            let reason = match catch_unwind(AssertUnwindSafe(|| listener(event, requests))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{err:#}"),
                Err(payload) => payload
                    .downcast_ref::<&str>()
                    .map(|s| format!("panicked: {s}"))
                    .or_else(|| {
                        payload
                            .downcast_ref::<String>()
                            .map(|s| format!("panicked: {s}"))
                    })
                    .unwrap_or_else(|| "panicked".to_string()),
            };
            failures += 1;
            let err = TourError::Listener {
                event: kind.name().to_string(),
                reason,
            };
            log::error!("[{}] listener {:?}: {err}", err.category(), id);
        }
        failures
    }
}
