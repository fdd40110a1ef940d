//! Local Task Spawning
//!
//! Components hand their request futures to a [`Spawner`] instead of calling
//! the browser executor directly.

use futures::future::LocalBoxFuture;
use std::rc::Rc;

pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

pub type SharedSpawner = Rc<dyn Spawner>;

/// Runs tasks on the Leptos executor (browser microtask queue)
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSpawner;

impl Spawner for BrowserSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        leptos::task::spawn_local(task);
    }
}
