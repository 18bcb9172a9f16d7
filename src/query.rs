//! Async query and mutation abstractions for data fetching from the UI loop.
//!
//! Inspired by TanStack Query. A `Query<T>` re-runs a fetcher and tracks
//! loading/success/error; a `Mutation<I, T, E>` sends one input at a time and
//! hands the result back once. Both spawn onto tokio and are polled on tick,
//! so the event loop never blocks on the network.
//!
//! # Example
//!
//! ```ignore
//! let api = client.clone();
//! let mut query = Query::new(move || {
//!     let api = api.clone();
//!     async move { Ok(load_board(&api).await) }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::task::JoinError;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async query for data fetching with state management.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is called each time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  /// Take the data out, leaving the query idle.
  pub fn take_data(&mut self) -> Option<T> {
    match std::mem::replace(&mut self.state, QueryState::Idle) {
      QueryState::Success(data) => Some(data),
      other => {
        self.state = other;
        None
      }
    }
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Message of the last failed fetch
  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, even if already loading or data exists.
  pub fn refetch(&mut self) {
    // Cancel any pending fetch by dropping the receiver
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

type MutateFn<I, T, E> =
  Box<dyn Fn(I) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send>> + Send + Sync>;

/// One-at-a-time async write.
///
/// `mutate` is refused while a previous call is still in flight, so the same
/// input can never be submitted twice concurrently. There is no cancellation:
/// once started, the result is always delivered by `poll`. A task that panics
/// is reported as `Err(E::from(JoinError))`.
pub struct Mutation<I, T, E> {
  mutate_fn: MutateFn<I, T, E>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, E>>>,
}

impl<I, T, E> Mutation<I, T, E>
where
  I: Send + 'static,
  T: Send + 'static,
  E: From<JoinError> + Send + 'static,
{
  pub fn new<F, Fut>(mutate_fn: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    Self {
      mutate_fn: Box::new(move |input| Box::pin(mutate_fn(input))),
      receiver: None,
    }
  }

  pub fn is_pending(&self) -> bool {
    self.receiver.is_some()
  }

  /// Start the mutation. Returns false (and drops `input`) if one is already
  /// in flight.
  pub fn mutate(&mut self, input: I) -> bool {
    if self.is_pending() {
      return false;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    let task = tokio::spawn((self.mutate_fn)(input));
    tokio::spawn(async move {
      let result = task.await.unwrap_or_else(|e| Err(E::from(e)));
      let _ = tx.send(result);
    });
    true
  }

  /// Collect the result once it is available
  pub fn poll(&mut self) -> Option<Result<T, E>> {
    let receiver = self.receiver.as_mut()?;
    match receiver.try_recv() {
      Ok(result) => {
        self.receiver = None;
        Some(result)
      }
      Err(mpsc::error::TryRecvError::Empty) => None,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Runtime shut down before the watcher could report
        self.receiver = None;
        None
      }
    }
  }
}
