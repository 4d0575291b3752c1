use std::sync::Arc;

use crate::api::{RecommendedPaper, best_effort_token};

use super::{DetailController, FetchContext, FetchState, RequestSlot};

pub const DEFAULT_FOR_YOU_COUNT: usize = 50;

/// Ranked recommendation list. Detail lookups go through the shared
/// `DetailController`.
pub struct ForYouController {
    context: FetchContext,
    count: usize,
    mounted: bool,
    slot: RequestSlot<Vec<RecommendedPaper>>,
}

impl ForYouController {
    pub fn new(context: FetchContext, count: usize) -> Self {
        Self {
            context,
            count: count.max(1),
            mounted: false,
            slot: RequestSlot::new(),
        }
    }

    pub fn state(&self) -> &FetchState<Vec<RecommendedPaper>> {
        self.slot.state()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Issues the list request once per mount.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.refresh();
    }

    pub fn refresh(&mut self) {
        let api = Arc::clone(&self.context.api);
        let tokens = Arc::clone(&self.context.tokens);
        let count = self.count;
        tracing::debug!(count, "fetching recommendations");

        self.slot.start(self.context.runner.as_ref(), move || {
            let token = best_effort_token(tokens.as_ref());
            api.for_you(count, token.as_deref())
                .map(|response| response.papers)
        });
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.slot.cancel();
    }

    pub fn poll(&mut self) -> bool {
        self.slot.poll()
    }

    pub fn select(&self, id: &str, detail: &mut DetailController) {
        detail.select(id);
    }
}

impl Drop for ForYouController {
    fn drop(&mut self) {
        self.slot.cancel();
    }
}
