/// A request to move the transcript view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    ToLatest,
}

/// Watches the log length and the busy flag and asks for a scroll to the
/// latest message after every append and whenever the loading indicator
/// appears.
///
/// Observing the same state twice yields nothing the second time.
#[derive(Debug, Clone, Default)]
pub struct ViewportSync {
    seen_len: usize,
    seen_busy: bool,
}

impl ViewportSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, log_len: usize, busy: bool) -> Option<ScrollRequest> {
        let grew = log_len != self.seen_len;
        let loading_appeared = busy && !self.seen_busy;
        self.seen_len = log_len;
        self.seen_busy = busy;
        (grew || loading_appeared).then_some(ScrollRequest::ToLatest)
    }

    pub fn observe_snapshot(&mut self, snap: &crate::SessionSnapshot) -> Option<ScrollRequest> {
        self.observe(snap.log.len(), snap.busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_empty_session_requests_nothing() {
        let mut v = ViewportSync::new();
        assert_eq!(v.observe(0, false), None);
    }

    #[test]
    fn append_and_loading_request_scroll() {
        let mut v = ViewportSync::new();
        // submit: user turn appended and busy at once
        assert_eq!(v.observe(1, true), Some(ScrollRequest::ToLatest));
        assert_eq!(v.observe(1, true), None);
        // settle
        assert_eq!(v.observe(2, false), Some(ScrollRequest::ToLatest));
        assert_eq!(v.observe(2, false), None);
    }

    #[test]
    fn busy_clearing_alone_does_not_scroll() {
        let mut v = ViewportSync::new();
        v.observe(3, true);
        assert_eq!(v.observe(3, false), None);
    }

    #[test]
    fn loading_indicator_alone_scrolls() {
        let mut v = ViewportSync::new();
        v.observe(2, false);
        assert_eq!(v.observe(2, true), Some(ScrollRequest::ToLatest));
    }
}
