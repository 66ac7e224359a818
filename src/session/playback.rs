use super::host::PlaybackTicket;

/// What is currently occupying the playback slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    File,
    Speech,
}

/// The single audio resource of a session. At most one ticket holds it.
#[derive(Debug, Default)]
pub(crate) struct PlaybackSlot {
    holder: Option<(PlaybackTicket, Source)>,
    issued: u64,
}

impl PlaybackSlot {
    /// Take the slot for `source`. The caller must have released (and
    /// cancelled) any previous holder.
    pub(crate) fn acquire(&mut self, source: Source) -> PlaybackTicket {
        debug_assert!(self.holder.is_none(), "playback slot acquired twice");
        self.issued += 1;
        let ticket = PlaybackTicket(self.issued);
        self.holder = Some((ticket, source));
        ticket
    }

    /// Release the slot if `ticket` holds it, returning what it was playing.
    pub(crate) fn release(&mut self, ticket: PlaybackTicket) -> Option<Source> {
        match self.holder {
            Some((held, source)) if held == ticket => {
                self.holder = None;
                Some(source)
            }
            _ => None,
        }
    }

    /// Release the slot regardless of holder. Returns whether it was held.
    pub(crate) fn clear(&mut self) -> bool {
        self.holder.take().is_some()
    }

    pub(crate) fn is_held(&self) -> bool {
        self.holder.is_some()
    }

    pub(crate) fn holder(&self) -> Option<PlaybackTicket> {
        self.holder.map(|(ticket, _)| ticket)
    }
}
