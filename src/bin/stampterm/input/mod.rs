mod event;
mod source;

pub(crate) use event::InputEvent;
pub(crate) use source::{EventSource, TerminalEvents};
