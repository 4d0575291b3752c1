use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use eframe::egui;

use crate::api::{ApiError, PaperApi, TokenSource};

mod detail;
mod for_you;

pub use detail::DetailController;
pub use for_you::{DEFAULT_FOR_YOU_COUNT, ForYouController};

#[derive(Clone, Debug, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Failure(ApiError),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs blocking request jobs off the UI thread.
pub trait TaskRunner {
    fn spawn(&self, job: Job);
}

/// Spawns one worker thread per job and wakes the UI when it finishes, so a
/// completion is polled without waiting for user input.
pub struct ThreadRunner {
    ctx: egui::Context,
}

impl ThreadRunner {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl TaskRunner for ThreadRunner {
    fn spawn(&self, job: Job) {
        let ctx = self.ctx.clone();
        thread::spawn(move || {
            job();
            ctx.request_repaint();
        });
    }
}

/// Everything a controller needs to issue requests.
#[derive(Clone)]
pub struct FetchContext {
    pub api: Arc<dyn PaperApi>,
    pub tokens: Arc<dyn TokenSource>,
    pub runner: Rc<dyn TaskRunner>,
}

struct Completion<T> {
    generation: u64,
    result: Result<T, ApiError>,
}

/// One fetch lifecycle. Each request is tagged with a generation and its
/// completion is only committed while that generation is still current.
pub(crate) struct RequestSlot<T> {
    generation: u64,
    state: FetchState<T>,
    tx: Sender<Completion<T>>,
    rx: Receiver<Completion<T>>,
}

impl<T: Send + 'static> RequestSlot<T> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            generation: 0,
            state: FetchState::Idle,
            tx,
            rx,
        }
    }

    pub(crate) fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub(crate) fn start<F>(&mut self, runner: &dyn TaskRunner, request: F)
    where
        F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    {
        self.generation = self.generation.wrapping_add(1);
        self.state = FetchState::Loading;

        let generation = self.generation;
        let tx = self.tx.clone();
        runner.spawn(Box::new(move || {
            let result = request();
            let _ = tx.send(Completion { generation, result });
        }));
    }

    pub(crate) fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.state = FetchState::Idle;
    }

    /// Applies the completion of the current request, if it has arrived.
    /// Returns whether the visible state changed.
    pub(crate) fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(completion) => {
                    if completion.generation != self.generation || !self.state.is_loading() {
                        tracing::debug!(
                            generation = completion.generation,
                            current = self.generation,
                            "discarding stale response"
                        );
                        continue;
                    }

                    self.state = match completion.result {
                        Ok(value) => FetchState::Success(value),
                        Err(error) => FetchState::Failure(error),
                    };
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;
    use crate::api::{AuthError, ForYouResponse, PaperDetail};

    /// Queues jobs so a test decides when, and in which order, they finish.
    #[derive(Default)]
    pub(crate) struct ManualRunner {
        jobs: RefCell<VecDeque<Job>>,
    }

    impl ManualRunner {
        pub(crate) fn pending(&self) -> usize {
            self.jobs.borrow().len()
        }

        pub(crate) fn run_first(&self) {
            let job = self.jobs.borrow_mut().pop_front().expect("no pending job");
            job();
        }

        pub(crate) fn run_last(&self) {
            let job = self.jobs.borrow_mut().pop_back().expect("no pending job");
            job();
        }

        pub(crate) fn run_all(&self) {
            while self.pending() > 0 {
                self.run_first();
            }
        }
    }

    impl TaskRunner for ManualRunner {
        fn spawn(&self, job: Job) {
            self.jobs.borrow_mut().push_back(job);
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub(crate) details: HashMap<String, Result<PaperDetail, ApiError>>,
        pub(crate) for_you: Option<Result<ForYouResponse, ApiError>>,
        pub(crate) click_result: Option<ApiError>,
        pub(crate) info_calls: Mutex<Vec<String>>,
        pub(crate) clicks: Mutex<Vec<(String, Option<String>)>>,
        pub(crate) for_you_calls: Mutex<Vec<(usize, Option<String>)>>,
    }

    impl FakeApi {
        pub(crate) fn with_detail(mut self, id: &str, title: &str, link: Option<&str>) -> Self {
            self.details.insert(
                id.to_owned(),
                Ok(PaperDetail {
                    id: id.to_owned(),
                    title: Some(title.to_owned()),
                    link: link.map(str::to_owned),
                    abstract_text: None,
                }),
            );
            self
        }
    }

    impl PaperApi for FakeApi {
        fn paper_info(&self, id: &str) -> Result<PaperDetail, ApiError> {
            self.info_calls.lock().unwrap().push(id.to_owned());
            self.details.get(id).cloned().unwrap_or(Err(ApiError::NotFound))
        }

        fn for_you(&self, count: usize, token: Option<&str>) -> Result<ForYouResponse, ApiError> {
            self.for_you_calls
                .lock()
                .unwrap()
                .push((count, token.map(str::to_owned)));
            self.for_you.clone().unwrap_or(Err(ApiError::Status(500)))
        }

        fn register_click(&self, id: &str, token: Option<&str>) -> Result<(), ApiError> {
            self.clicks
                .lock()
                .unwrap()
                .push((id.to_owned(), token.map(str::to_owned)));
            match &self.click_result {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    pub(crate) struct BrokenTokens;

    impl TokenSource for BrokenTokens {
        fn access_token(&self) -> Result<Option<String>, AuthError> {
            Err(AuthError::EmptyTokenFile("/tmp/token".into()))
        }
    }

    pub(crate) fn context(
        api: FakeApi,
        tokens: Arc<dyn TokenSource>,
    ) -> (FetchContext, Arc<FakeApi>, Rc<ManualRunner>) {
        let api = Arc::new(api);
        let runner = Rc::new(ManualRunner::default());
        let context = FetchContext {
            api: api.clone(),
            tokens,
            runner: runner.clone(),
        };
        (context, api, runner)
    }
}
