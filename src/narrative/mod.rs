//! Player-facing text: message log lines, world events and translation

pub mod events;
pub mod message;
pub mod translator;

pub use events::{should_display_event, BilingualText, EventKind, ImmersiveEvent};
pub use message::{MessageKind, MessageMeta, NarrativeMessage};
pub use translator::{Catalog, Locale, Translator};
