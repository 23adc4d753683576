//! Assembly options and configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which pages an assembly covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssembleMode {
    /// The first `max_pages` pages (or fewer, for short documents)
    Preview { max_pages: usize },
    /// Every page
    #[default]
    Full,
}

impl AssembleMode {
    /// Number of pages processed for a document of `total` pages.
    pub fn page_limit(&self, total: usize) -> usize {
        match *self {
            AssembleMode::Preview { max_pages } => total.min(max_pages),
            AssembleMode::Full => total,
        }
    }
}

/// What to do when a single page cannot be transplanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePolicy {
    /// Fail the whole document
    #[default]
    Abort,
    /// Leave the page out and report it in the result
    Skip,
}

/// Cooperative cancellation flag, checked once before each page.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Callback run after each page with `(pages_done, pages_in_range)`.
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(usize, usize) + Send + Sync>);

impl ProgressCallback {
    /// Wrap a closure.
    pub fn new(f: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    fn call(&self, done: usize, total: usize) {
        (self.0)(done, total)
    }
}

impl std::fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProgressCallback")
    }
}

/// Options for assembling an output document.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Page failure policy
    pub policy: PagePolicy,

    /// Compress streams in the output
    pub compress: bool,

    /// Cancellation flag
    pub cancel: Option<CancelToken>,

    /// Per-page progress reporting
    pub progress: Option<ProgressCallback>,
}

impl AssembleOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page failure policy.
    pub fn with_policy(mut self, policy: PagePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Skip pages that cannot be transplanted.
    pub fn skip_bad_pages(mut self) -> Self {
        self.policy = PagePolicy::Skip;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Report progress after each page.
    pub fn with_progress(mut self, f: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(ProgressCallback::new(f));
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    pub(crate) fn report_progress(&self, done: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress.call(done, total);
        }
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            policy: PagePolicy::Abort,
            compress: true,
            cancel: None,
            progress: None,
        }
    }
}
