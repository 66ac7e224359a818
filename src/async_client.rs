//! Async wrapper around [`KidsQuiz`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], since the HTTP client and the storage
//! backends are blocking.
//!
//! # Example
//!
//! ```no_run
//! use kids_quiz::AsyncKidsQuiz;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let quiz = AsyncKidsQuiz::builder().build().await.unwrap();
//!
//!     let packs = quiz.summaries().await.unwrap();
//!     let animals = quiz.content_pack("животные").await.unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{QuizError, Result};
use crate::models::{ContentPack, PackSummary};
use crate::{config, KidsQuiz};

// ---------------------------------------------------------------------------
// AsyncKidsQuizBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncKidsQuiz`] instance.
pub struct AsyncKidsQuizBuilder {
    base_url: Option<String>,
    storage_dir: Option<PathBuf>,
    fallback_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
}

impl Default for AsyncKidsQuizBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            storage_dir: None,
            fallback_dir: None,
            offline: false,
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl AsyncKidsQuizBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn storage_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn fallback_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.fallback_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the async engine on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncKidsQuiz> {
        tokio::task::spawn_blocking(move || {
            let mut builder = KidsQuiz::builder();
            if let Some(url) = self.base_url {
                builder = builder.base_url(url);
            }
            if let Some(dir) = self.storage_dir {
                builder = builder.storage_dir(dir);
            }
            if let Some(dir) = self.fallback_dir {
                builder = builder.fallback_dir(dir);
            }
            builder = builder.offline(self.offline).timeout(self.timeout);
            let quiz = builder.build()?;
            Ok(AsyncKidsQuiz::from_sync(quiz))
        })
        .await
        .map_err(|e| QuizError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncKidsQuiz
// ---------------------------------------------------------------------------

/// Async wrapper around [`KidsQuiz`].
///
/// The underlying engine is protected by a [`Mutex`] since it uses
/// `RefCell` internally.
pub struct AsyncKidsQuiz {
    inner: Arc<Mutex<KidsQuiz>>,
}

impl AsyncKidsQuiz {
    pub fn builder() -> AsyncKidsQuizBuilder {
        AsyncKidsQuizBuilder::default()
    }

    /// Wrap an already configured engine.
    pub fn from_sync(quiz: KidsQuiz) -> Self {
        Self {
            inner: Arc::new(Mutex::new(quiz)),
        }
    }

    /// Run a sync operation on the blocking thread pool.
    ///
    /// ```no_run
    /// # use kids_quiz::AsyncKidsQuiz;
    /// # async fn example() -> kids_quiz::Result<()> {
    /// # let quiz = AsyncKidsQuiz::builder().build().await?;
    /// let owned = quiz.run(|q| Ok(q.purchases().owned())).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&KidsQuiz) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let quiz = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = quiz
                .lock()
                .map_err(|_| QuizError::InvalidArgument("engine lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| QuizError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn summaries(&self) -> Result<Vec<PackSummary>> {
        self.run(|q| Ok(q.summaries())).await
    }

    pub async fn content_pack(&self, slug: &str) -> Result<Option<ContentPack>> {
        let slug = slug.to_string();
        self.run(move |q| Ok(q.content_pack(&slug))).await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.run(|q| {
            q.refresh();
            Ok(())
        })
        .await
    }
}
