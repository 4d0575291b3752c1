use std::sync::Arc;

use crate::api::{PaperDetail, best_effort_token};
use crate::util::normalize_abstract;

use super::{FetchContext, FetchState, RequestSlot};

/// Drives the paper-detail overlay: one current selection, one current
/// request. Completions of superseded selections are dropped in `poll`.
pub struct DetailController {
    context: FetchContext,
    selected: Option<String>,
    slot: RequestSlot<PaperDetail>,
}

impl DetailController {
    pub fn new(context: FetchContext) -> Self {
        Self {
            context,
            selected: None,
            slot: RequestSlot::new(),
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn state(&self) -> &FetchState<PaperDetail> {
        self.slot.state()
    }

    pub fn select(&mut self, id: impl Into<String>) {
        let id = id.into();
        tracing::debug!(paper = %id, "fetching paper detail");

        let api = Arc::clone(&self.context.api);
        let request_id = id.clone();
        self.slot.start(self.context.runner.as_ref(), move || {
            let mut detail = api.paper_info(&request_id)?;
            detail.abstract_text = detail
                .abstract_text
                .as_deref()
                .map(normalize_abstract)
                .filter(|text| !text.is_empty());
            Ok(detail)
        });
        self.selected = Some(id);
    }

    pub fn retry(&mut self) {
        if let Some(id) = self.selected.clone() {
            self.select(id);
        }
    }

    pub fn close(&mut self) {
        if self.selected.take().is_some() {
            tracing::debug!("closing paper detail");
        }
        self.slot.cancel();
    }

    pub fn poll(&mut self) -> bool {
        self.slot.poll()
    }

    /// Fire-and-forget interaction record; errors are logged and dropped.
    pub fn register_interaction(&self, id: &str) {
        let api = Arc::clone(&self.context.api);
        let tokens = Arc::clone(&self.context.tokens);
        let id = id.to_owned();
        self.context.runner.spawn(Box::new(move || {
            let token = best_effort_token(tokens.as_ref());
            if let Err(error) = api.register_click(&id, token.as_deref()) {
                tracing::debug!(paper = %id, error = %error, "ignoring failed click registration");
            }
        }));
    }

    /// External link of the loaded paper. Following it registers the
    /// interaction.
    pub fn follow_link(&self) -> Option<String> {
        let detail = self.state().success()?;
        let link = detail.link.clone()?;
        self.register_interaction(&detail.id);
        Some(link)
    }
}

impl Drop for DetailController {
    fn drop(&mut self) {
        self.slot.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::api::{ApiError, StaticToken};
    use crate::fetch::testing::{BrokenTokens, FakeApi, ManualRunner, context};

    fn controller(api: FakeApi) -> (DetailController, Arc<FakeApi>, Rc<ManualRunner>) {
        let (context, api, runner) = context(api, Arc::new(StaticToken(Some("tok".into()))));
        (DetailController::new(context), api, runner)
    }

    fn title(state: &FetchState<PaperDetail>) -> Option<&str> {
        state.success().and_then(|detail| detail.title.as_deref())
    }

    #[test]
    fn select_loads_then_succeeds() {
        let (mut detail, _api, runner) = controller(FakeApi::default().with_detail("A", "Alpha", None));

        assert_eq!(detail.state(), &FetchState::Idle);
        detail.select("A");
        assert!(detail.state().is_loading());
        assert_eq!(detail.selected(), Some("A"));

        runner.run_all();
        assert!(detail.poll());
        assert_eq!(title(detail.state()), Some("Alpha"));
    }

    #[test]
    fn later_selection_wins_when_it_resolves_first() {
        let api = FakeApi::default()
            .with_detail("A", "Alpha", None)
            .with_detail("B", "Beta", None);
        let (mut detail, _api, runner) = controller(api);

        detail.select("A");
        detail.select("B");
        runner.run_last();
        detail.poll();
        runner.run_first();
        detail.poll();

        assert_eq!(detail.selected(), Some("B"));
        assert_eq!(title(detail.state()), Some("Beta"));
    }

    #[test]
    fn later_selection_wins_when_it_resolves_last() {
        let api = FakeApi::default()
            .with_detail("A", "Alpha", None)
            .with_detail("B", "Beta", None);
        let (mut detail, _api, runner) = controller(api);

        detail.select("A");
        detail.select("B");
        runner.run_first();
        assert!(!detail.poll());
        assert!(detail.state().is_loading());
        runner.run_first();
        assert!(detail.poll());

        assert_eq!(title(detail.state()), Some("Beta"));
    }

    #[test]
    fn close_discards_in_flight_result() {
        let (mut detail, _api, runner) = controller(FakeApi::default().with_detail("A", "Alpha", None));

        detail.select("A");
        detail.close();
        runner.run_all();

        assert!(!detail.poll());
        assert_eq!(detail.state(), &FetchState::Idle);
        assert_eq!(detail.selected(), None);
    }

    #[test]
    fn dropping_the_controller_cancels() {
        let (mut detail, api, runner) = controller(FakeApi::default().with_detail("A", "Alpha", None));
        detail.select("A");
        drop(detail);

        // Only the queued request still holds the client.
        assert_eq!(runner.pending(), 1);
        assert_eq!(Arc::strong_count(&api), 2);

        runner.run_all();

        assert_eq!(*api.info_calls.lock().unwrap(), vec!["A".to_owned()]);
        assert_eq!(runner.pending(), 0);
        assert_eq!(Arc::strong_count(&api), 1);
    }

    #[test]
    fn not_found_and_network_errors_are_distinct() {
        let mut api = FakeApi::default();
        api.details
            .insert("down".into(), Err(ApiError::Network("connection reset".into())));
        let (mut detail, _api, runner) = controller(api);

        detail.select("missing");
        runner.run_all();
        detail.poll();
        assert_eq!(detail.state(), &FetchState::Failure(ApiError::NotFound));

        detail.select("down");
        runner.run_all();
        detail.poll();
        let FetchState::Failure(error) = detail.state() else {
            panic!("expected failure");
        };
        assert!(error.is_retryable());
    }

    #[test]
    fn retry_reissues_current_selection() {
        let mut api = FakeApi::default();
        api.details.insert("A".into(), Err(ApiError::Status(503)));
        let (mut detail, _api, runner) = controller(api);

        detail.select("A");
        runner.run_all();
        detail.poll();
        detail.retry();

        assert!(detail.state().is_loading());
        assert_eq!(runner.pending(), 1);
    }

    #[test]
    fn escaped_newlines_in_abstract_are_normalized() {
        let mut api = FakeApi::default();
        api.details.insert(
            "p1".into(),
            Ok(PaperDetail {
                id: "p1".into(),
                title: Some("T".into()),
                link: None,
                abstract_text: Some("a\\nb".into()),
            }),
        );
        let (mut detail, _api, runner) = controller(api);

        detail.select("p1");
        runner.run_all();
        detail.poll();

        let loaded = detail.state().success().unwrap();
        assert_eq!(loaded.abstract_text.as_deref(), Some("a b"));
        assert_eq!(loaded.link, None);
    }

    #[test]
    fn following_link_registers_interaction() {
        let (mut detail, api, runner) = controller(
            FakeApi::default().with_detail("A", "Alpha", Some("https://doi.org/10.1/xyz")),
        );

        assert_eq!(detail.follow_link(), None);
        detail.select("A");
        runner.run_all();
        detail.poll();

        assert_eq!(detail.follow_link().as_deref(), Some("https://doi.org/10.1/xyz"));
        runner.run_all();
        assert_eq!(
            api.clicks.lock().unwrap().as_slice(),
            &[("A".to_owned(), Some("tok".to_owned()))]
        );
    }

    #[test]
    fn failed_click_registration_leaves_detail_untouched() {
        let mut api = FakeApi::default().with_detail("A", "Alpha", Some("https://doi.org/x"));
        api.click_result = Some(ApiError::Status(500));
        let (context, api, runner) = context(api, Arc::new(BrokenTokens));
        let mut detail = DetailController::new(context);

        detail.select("A");
        runner.run_all();
        detail.poll();
        detail.follow_link();
        runner.run_all();

        assert!(!detail.poll());
        assert_eq!(title(detail.state()), Some("Alpha"));
        assert_eq!(api.clicks.lock().unwrap().as_slice(), &[("A".to_owned(), None)]);
    }
}
