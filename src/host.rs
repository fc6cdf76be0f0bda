//! Running request cycles on worker threads.

use crate::error::Result;
use crate::paint::Transcript;
use crate::request::Request;
use crate::session::Session;
use crate::tree::ComponentTree;
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// A request waiting for a worker.
struct Job {
    session: Session,
    request: Request,
    reply: Sender<Result<Transcript>>,
}

/// Runs request cycles for many sessions on a pool of worker threads.
///
/// All workers share one locked component tree. Requests for the same session are serialized
/// by the session itself; requests for different sessions run in parallel.
pub struct Host {
    tree: Arc<ComponentTree>,
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl Host {
    /// Creates a new Host with as many workers as the tree's configuration asks for.
    pub fn new(tree: ComponentTree) -> Host {
        let tree = Arc::new(tree);
        let (job_sender, job_recv) = channel::unbounded();
        let count = tree.config().workers.max(1);

        let workers = (0..count)
            .map(|index| {
                let tree = Arc::clone(&tree);
                let job_recv = job_recv.clone();
                thread::spawn(move || run_worker(index, &tree, job_recv))
            })
            .collect();
        debug!(workers = count, "started host");

        Host {
            tree,
            jobs: Some(job_sender),
            workers,
        }
    }

    pub fn tree(&self) -> &Arc<ComponentTree> {
        &self.tree
    }

    /// Creates a session for the hosted tree.
    pub fn new_session(&self) -> Session {
        self.tree.new_session()
    }

    /// Queues a request. The painted output arrives on the returned receiver.
    pub fn submit(&self, session: Session, request: Request) -> Receiver<Result<Transcript>> {
        let (reply, reply_recv) = channel::bounded(1);
        if let Some(jobs) = &self.jobs {
            let job = Job {
                session,
                request,
                reply,
            };
            if jobs.send(job).is_err() {
                warn!("all workers have stopped; dropping request");
            }
        }
        reply_recv
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        // disconnecting the job queue stops the workers once it is drained
        self.jobs.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("worker panicked");
            }
        }
        debug!("stopped host");
    }
}

fn run_worker(index: usize, tree: &ComponentTree, jobs: Receiver<Job>) {
    for job in jobs.iter() {
        let Job {
            session,
            mut request,
            reply,
        } = job;
        trace!(worker = index, session = %session.id(), "processing request");

        let mut transcript = Transcript::new();
        let result = tree
            .process(&session, &mut request, &mut transcript)
            .map(|()| transcript);
        if reply.send(result).is_err() {
            trace!(worker = index, "requester went away");
        }
    }
}
