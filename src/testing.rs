//! Test doubles shared by component tests.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use futures::FutureExt;

use crate::commands::http::HttpRequest;
use crate::commands::{FetchClient, FetchError, HttpResponse};
use crate::task::{SharedSpawner, Spawner};

type Reply = Result<HttpResponse, FetchError>;

impl Spawner for LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawn_local(task).expect("local pool is alive");
    }
}

/// Records requests and keeps them pending until the test answers them
#[derive(Default)]
pub struct ScriptedClient {
    calls: RefCell<Vec<(HttpRequest, Option<oneshot::Sender<Reply>>)>>,
}

impl ScriptedClient {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls.borrow().iter().map(|(req, _)| req.clone()).collect()
    }

    pub fn in_flight(&self) -> usize {
        self.calls.borrow().iter().filter(|(_, tx)| tx.is_some()).count()
    }

    pub fn respond(&self, index: usize, reply: Reply) {
        let tx = self.calls.borrow_mut()[index].1.take().expect("request already answered");
        let _ = tx.send(reply);
    }

    pub fn respond_ok(&self, index: usize, body: &str) {
        self.respond(index, Ok(HttpResponse { status: 200, body: body.to_string() }));
    }

    pub fn respond_status(&self, index: usize, status: u16, body: &str) {
        self.respond(index, Ok(HttpResponse { status, body: body.to_string() }));
    }

    pub fn fail(&self, index: usize) {
        self.respond(index, Err(FetchError::Network("connection reset".into())));
    }
}

impl FetchClient for ScriptedClient {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Reply> {
        let (tx, rx) = oneshot::channel();
        self.calls.borrow_mut().push((request, Some(tx)));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(FetchError::Network("request dropped".into())))
        }
        .boxed_local()
    }
}

/// Single-threaded executor the test steps by hand
pub struct Runtime {
    pool: LocalPool,
}

impl Runtime {
    pub fn new() -> Self {
        Self { pool: LocalPool::new() }
    }

    pub fn spawner(&self) -> SharedSpawner {
        Rc::new(self.pool.spawner())
    }

    /// Run every task until all are waiting on the network
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }
}
