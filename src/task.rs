use futures_util::FutureExt;
use futures_util::future::{self, AbortHandle, BoxFuture};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A set of concurrent actions that may produce messages.
#[must_use = "a task does nothing unless it is run"]
pub struct Task<T> {
    futures: Vec<BoxFuture<'static, Option<T>>>,
}

impl<T> Task<T>
where
    T: Send + 'static,
{
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    pub fn done(value: T) -> Self {
        Self::future(future::ready(value))
    }

    pub fn future(future: impl Future<Output = T> + Send + 'static) -> Self {
        Self {
            futures: vec![future.map(Some).boxed()],
        }
    }

    pub fn perform<A>(
        future: impl Future<Output = A> + Send + 'static,
        f: impl FnOnce(A) -> T + Send + 'static,
    ) -> Self {
        Self::future(future.map(f))
    }

    pub fn batch(tasks: impl IntoIterator<Item = Self>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|task| task.futures).collect(),
        }
    }

    pub fn map<O>(self, f: impl Fn(T) -> O + Send + Sync + 'static) -> Task<O>
    where
        O: Send + 'static,
    {
        let f = Arc::new(f);

        Task {
            futures: self
                .futures
                .into_iter()
                .map(|future| {
                    let f = f.clone();

                    future.map(move |output| output.map(|value| f(value))).boxed()
                })
                .collect(),
        }
    }

    /// Runs the task, but drops everything it produces.
    pub fn discard<O>(self) -> Task<O>
    where
        O: Send + 'static,
    {
        Task {
            futures: self
                .futures
                .into_iter()
                .map(|future| future.map(|_| None).boxed())
                .collect(),
        }
    }

    /// Makes the task abortable through the returned [`Handle`].
    ///
    /// An aborted task produces nothing.
    pub fn abortable(self) -> (Self, Handle) {
        let mut handles = Vec::with_capacity(self.futures.len());

        let futures = self
            .futures
            .into_iter()
            .map(|future| {
                let (handle, registration) = AbortHandle::new_pair();
                handles.push(handle);

                future::Abortable::new(future, registration)
                    .map(|output| output.ok().flatten())
                    .boxed()
            })
            .collect();

        (
            Self { futures },
            Handle {
                raw: handles,
                abort_on_drop: false,
            },
        )
    }

    /// Spawns every action on the current runtime, sending whatever they
    /// produce to the given channel.
    pub fn spawn(self, output: &mpsc::UnboundedSender<T>) {
        for future in self.futures {
            let output = output.clone();

            drop(tokio::spawn(async move {
                if let Some(message) = future.await {
                    let _ = output.send(message);
                }
            }));
        }
    }

    /// Runs every action to completion and collects what they produce.
    pub async fn collect(self) -> Vec<T> {
        future::join_all(self.futures)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

/// A handle to an abortable [`Task`].
#[derive(Debug)]
pub struct Handle {
    raw: Vec<AbortHandle>,
    abort_on_drop: bool,
}

impl Handle {
    pub fn abort(&self) {
        for handle in &self.raw {
            handle.abort();
        }
    }

    /// Aborts the task once the handle is dropped.
    pub fn abort_on_drop(mut self) -> Self {
        self.abort_on_drop = true;
        self
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.abort_on_drop {
            self.abort();
        }
    }
}
