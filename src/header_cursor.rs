//! Tracks the message currently displayed out of a message list, and whether it has neighbours
//!
//! A message reader uses it to know whether it can move to the previous or the next message.
//! Observers get every change of the current message through a [`watch`] channel.

use tokio::sync::watch;

/// A message header, as listed in a folder
pub trait MailHeader: Clone {
    type Id: PartialEq;
    fn id(&self) -> &Self::Id;
}

/// Which way to move in the list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Whether the current message has neighbours
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Siblings {
    pub has_previous: bool,
    pub has_next: bool,
}

/// The selected message
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentMessage<H> {
    pub header: H,
    pub siblings: Siblings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
    NoSelection,
    Selected { index: usize, has_previous: bool, has_next: bool },
}

/// Tracks the current message in a list of messages (a "slice" of a folder)
pub struct HeaderCursor<H: MailHeader> {
    messages: Option<Vec<H>>,
    current: Option<CurrentMessage<H>>,
    sender: watch::Sender<Option<CurrentMessage<H>>>,
}

impl<H: MailHeader> HeaderCursor<H> {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { messages: None, current: None, sender }
    }

    /// Every change of the current message will be sent to the returned receiver
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentMessage<H>>> {
        self.sender.subscribe()
    }

    pub fn current_message(&self) -> Option<&CurrentMessage<H>> {
        self.current.as_ref()
    }

    pub fn messages(&self) -> &[H] {
        self.messages.as_deref().unwrap_or(&[])
    }

    pub fn state(&self) -> CursorState {
        match &self.current {
            None => CursorState::NoSelection,
            Some(current) => match self.index_of(current.header.id()) {
                None => CursorState::NoSelection,
                Some(index) => CursorState::Selected {
                    index,
                    has_previous: current.siblings.has_previous,
                    has_next: current.siblings.has_next,
                },
            },
        }
    }

    /// Switch to the messages of another folder. The current selection is dropped.
    pub fn set_slice(&mut self, messages: Vec<H>) {
        self.die();
        self.messages = Some(messages);
    }

    /// Move to the previous or next message. Does nothing at the ends of the list, or when nothing is selected.
    pub fn advance(&mut self, direction: Direction) {
        let index = match self.state() {
            CursorState::NoSelection => return,
            CursorState::Selected { index, .. } => index,
        };

        let target = match direction {
            Direction::Previous => index.checked_sub(1),
            Direction::Next => Some(index + 1),
        };
        let header = match target.and_then(|i| self.messages().get(i)) {
            None => {
                log::debug!("Cannot advance further ({:?})", direction);
                return;
            },
            Some(header) => header.clone(),
        };
        self.set_current_message(header);
    }

    /// Select a message. Headers that are not part of the current list are ignored.
    pub fn set_current_message(&mut self, header: H) {
        let messages = self.messages();
        let index = match messages.iter().position(|m| m.id() == header.id()) {
            None => {
                log::warn!("Cannot select a message that is not in the current list");
                return;
            },
            Some(index) => index,
        };

        let current = CurrentMessage {
            header,
            siblings: Siblings {
                has_previous: index != 0,
                has_next: index != messages.len() - 1,
            },
        };
        self.announce(Some(current));
    }

    /// Remove the message at `index` from the list.
    ///
    /// When the current message is removed, the message that takes its place (or the new last one) is selected.
    /// Otherwise, the current message is announced again, since its neighbours may have changed.
    pub fn remove_message(&mut self, index: usize) -> Option<H> {
        let messages = self.messages.as_mut()?;
        if index >= messages.len() {
            return None;
        }
        let removed = messages.remove(index);

        let current = match &self.current {
            None => return Some(removed),
            Some(current) => current.header.clone(),
        };

        if current.id() != removed.id() {
            self.set_current_message(current);
            return Some(removed);
        }

        let messages = self.messages();
        if messages.is_empty() {
            self.announce(None);
            return Some(removed);
        }
        let replacement = messages[index.min(messages.len() - 1)].clone();
        self.set_current_message(replacement);
        Some(removed)
    }

    /// Insert a message in the list, e.g. when a new message arrives
    pub fn insert_message(&mut self, index: usize, header: H) {
        let messages = self.messages.get_or_insert_with(Vec::new);
        let index = index.min(messages.len());
        messages.insert(index, header);

        let current = self.current.as_ref().map(|c| c.header.clone());
        if let Some(current) = current {
            self.set_current_message(current);
        }
    }

    /// Drop the list and the selection
    pub fn die(&mut self) {
        self.messages = None;
        if self.current.is_some() {
            self.announce(None);
        }
    }

    fn index_of(&self, id: &H::Id) -> Option<usize> {
        self.messages().iter().position(|m| m.id() == id)
    }

    fn announce(&mut self, current: Option<CurrentMessage<H>>) {
        self.current = current.clone();
        // Nobody listening is fine
        self.sender.send_replace(current);
    }
}

impl<H: MailHeader> Default for HeaderCursor<H> {
    fn default() -> Self {
        Self::new()
    }
}
