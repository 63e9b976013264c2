// SPDX-License-Identifier: AGPL-3.0-or-later
// VAST - Distributed Network Forensics and Security Analytics
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Actor runtime
//!
//! Single-owner actors on OS threads with bounded crossbeam mailboxes.
//! Each actor processes messages sequentially, so no intra-actor locking
//! exists anywhere in the pipeline; components share nothing and batches
//! transfer by move. Request/reply is a message variant carrying a
//! one-shot reply channel. Pools fan a mailbox out across several actors
//! with round-robin routing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error};

use vast_core::VastError;

/// How long an actor waits for a message before re-checking its running
/// flag.
const IDLE_TICK: Duration = Duration::from_millis(100);

/// Default time to wait for a reply in [`ask`].
pub const ASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Behavior of an actor: sequential, single-owner message handling.
pub trait Handler: Send + 'static {
    type Message: Send + 'static;

    /// Processes one message. Returning an error terminates the actor
    /// with that reason.
    fn handle(&mut self, message: Self::Message) -> vast_core::Result<()>;

    /// Runs once when the actor terminates, for orderly state flushes.
    fn on_exit(&mut self) {}
}

/// Handle for sending messages to an actor.
pub struct ActorRef<M> {
    name: &'static str,
    mailbox: Sender<M>,
    running: Arc<AtomicBool>,
}

impl<M> Clone for ActorRef<M> {
    fn clone(&self) -> Self {
        ActorRef {
            name: self.name,
            mailbox: self.mailbox.clone(),
            running: Arc::clone(&self.running),
        }
    }
}

impl<M: Send + 'static> ActorRef<M> {
    /// Enqueues a message, blocking while the mailbox is full. Fails if
    /// the actor terminated.
    pub fn tell(&self, message: M) -> vast_core::Result<()> {
        if !self.is_running() {
            return Err(self.down());
        }
        self.mailbox
            .send(message)
            .map_err(|_| self.down())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Asks the actor to stop. Messages still queued are dropped.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn down(&self) -> VastError {
        VastError::unspecified(format!("actor {} is down", self.name))
    }
}

/// Sends a request built around a one-shot reply channel and awaits the
/// answer. The caller suspends until the reply arrives or the timeout
/// elapses.
pub fn ask<M, R, F>(actor: &ActorRef<M>, make: F) -> vast_core::Result<R>
where
    M: Send + 'static,
    R: Send + 'static,
    F: FnOnce(Sender<R>) -> M,
{
    let (reply_tx, reply_rx) = bounded(1);
    actor.tell(make(reply_tx))?;
    reply_rx.recv_timeout(ASK_TIMEOUT).map_err(|_| {
        VastError::unspecified(format!("no reply from actor {}", actor.name()))
    })
}

/// Spawns an actor with the given mailbox capacity.
pub fn spawn<H: Handler>(
    name: &'static str,
    mut handler: H,
    mailbox: usize,
) -> (ActorRef<H::Message>, JoinHandle<()>) {
    let (tx, rx): (Sender<H::Message>, Receiver<H::Message>) = bounded(mailbox);
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let thread = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            debug!(actor = name, "spawned");
            while flag.load(Ordering::Acquire) {
                match rx.recv_timeout(IDLE_TICK) {
                    Ok(message) => {
                        if let Err(reason) = handler.handle(message) {
                            error!(actor = name, %reason, "actor terminating");
                            break;
                        }
                    }
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
                    Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                }
            }
            flag.store(false, Ordering::Release);
            handler.on_exit();
            debug!(actor = name, "stopped");
        })
        .expect("failed to spawn actor thread");
    let actor_ref = ActorRef {
        name,
        mailbox: tx,
        running,
    };
    (actor_ref, thread)
}

/// A pool of identical actors with round-robin routing.
pub struct Pool<M: Send + 'static> {
    actors: Vec<ActorRef<M>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    next: AtomicUsize,
}

impl<M: Send + 'static> Pool<M> {
    pub fn new<H, F>(name: &'static str, size: usize, mailbox: usize, factory: F) -> Self
    where
        H: Handler<Message = M>,
        F: Fn(usize) -> H,
    {
        assert!(size > 0);
        let mut actors = Vec::with_capacity(size);
        let mut threads = Vec::with_capacity(size);
        for i in 0..size {
            let (actor, thread) = spawn(name, factory(i), mailbox);
            actors.push(actor);
            threads.push(thread);
        }
        Pool {
            actors,
            threads: Mutex::new(threads),
            next: AtomicUsize::new(0),
        }
    }

    /// Builds a pool from pre-constructed handlers, for members whose
    /// construction can fail (e.g. directory-backed archives).
    pub fn from_handlers<H>(name: &'static str, mailbox: usize, handlers: Vec<H>) -> Self
    where
        H: Handler<Message = M>,
    {
        assert!(!handlers.is_empty());
        let mut actors = Vec::with_capacity(handlers.len());
        let mut threads = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let (actor, thread) = spawn(name, handler, mailbox);
            actors.push(actor);
            threads.push(thread);
        }
        Pool {
            actors,
            threads: Mutex::new(threads),
            next: AtomicUsize::new(0),
        }
    }

    pub fn size(&self) -> usize {
        self.actors.len()
    }

    pub fn members(&self) -> &[ActorRef<M>] {
        &self.actors
    }

    /// Routes one message to the next member.
    pub fn tell(&self, message: M) -> vast_core::Result<()> {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.actors.len();
        self.actors[i].tell(message)
    }

    /// Stops all members and joins their threads.
    pub fn shutdown(&self) {
        for actor in &self.actors {
            actor.stop();
        }
        let mut threads = self.threads.lock();
        for thread in threads.drain(..) {
            let _ = thread.join();
        }
    }
}

impl<M: Send + 'static> Drop for Pool<M> {
    fn drop(&mut self) {
        for actor in &self.actors {
            actor.stop();
        }
        let mut threads = self.threads.lock();
        for thread in threads.drain(..) {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Handler for Echo {
        type Message = (String, Sender<String>);

        fn handle(&mut self, (text, reply): Self::Message) -> vast_core::Result<()> {
            let _ = reply.send(format!("echo: {}", text));
            Ok(())
        }
    }

    struct Counter {
        count: u64,
    }

    impl Handler for Counter {
        type Message = Sender<u64>;

        fn handle(&mut self, reply: Self::Message) -> vast_core::Result<()> {
            self.count += 1;
            let _ = reply.send(self.count);
            Ok(())
        }
    }

    #[test]
    fn test_ask() {
        let (actor, thread) = spawn("echo", Echo, 8);
        let answer = ask(&actor, |reply| ("hi".to_string(), reply)).unwrap();
        assert_eq!(answer, "echo: hi");
        actor.stop();
        thread.join().unwrap();
    }

    #[test]
    fn test_sequential_state() {
        let (actor, thread) = spawn("counter", Counter { count: 0 }, 8);
        for expected in 1..=5 {
            assert_eq!(ask(&actor, |reply| reply).unwrap(), expected);
        }
        actor.stop();
        thread.join().unwrap();
    }

    #[test]
    fn test_tell_after_stop_fails() {
        let (actor, thread) = spawn("echo", Echo, 8);
        actor.stop();
        thread.join().unwrap();
        let (tx, _rx) = bounded(1);
        assert!(actor.tell(("late".to_string(), tx)).is_err());
    }

    #[test]
    fn test_pool_round_robin() {
        let pool: Pool<Sender<u64>> = Pool::new("counters", 4, 8, |_| Counter { count: 0 });
        // Sixteen asks over four actors leave each counter at four.
        for _ in 0..16 {
            let (tx, rx) = bounded(1);
            pool.tell(tx).unwrap();
            rx.recv_timeout(ASK_TIMEOUT).unwrap();
        }
        let mut finals = Vec::new();
        for member in pool.members() {
            let (tx, rx) = bounded(1);
            member.tell(tx).unwrap();
            finals.push(rx.recv_timeout(ASK_TIMEOUT).unwrap());
        }
        assert_eq!(finals, vec![5, 5, 5, 5]);
        pool.shutdown();
    }

    #[test]
    fn test_actor_terminates_on_error() {
        struct Failing;
        impl Handler for Failing {
            type Message = ();
            fn handle(&mut self, _: ()) -> vast_core::Result<()> {
                Err(VastError::unspecified("boom"))
            }
        }
        let (actor, thread) = spawn("failing", Failing, 8);
        actor.tell(()).unwrap();
        thread.join().unwrap();
        assert!(!actor.is_running());
        assert!(actor.tell(()).is_err());
    }
}
