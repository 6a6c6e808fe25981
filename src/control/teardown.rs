//! Deferred destruction of graph nodes.
//!
//! A computation graph reaches its children in two ways: through a
//! predecessor link and through values captured by producer and continuation
//! closures. Dropping either kind of child can free another node, so a naive
//! `Drop` recurses once per level of nesting, whichever way the graph was
//! nested.
//!
//! [`release`] turns that recursion into a loop. The first node dropped on a
//! thread becomes the drainer; any node freed while it drains hands its
//! children to a thread-local queue instead of dropping them, and the drainer
//! empties the queue until nothing is left.

use std::cell::RefCell;
use std::thread::LocalKey;

/// Children waiting to be dropped by the active drainer, or `None` when no
/// drop is in progress on this thread.
pub(crate) type Orphans<T> = RefCell<Option<Vec<T>>>;

/// Drops `orphans` without nesting the drops of their descendants.
///
/// If another call on this thread is already draining `queue`, the orphans are
/// queued for it and this call returns immediately. During thread teardown,
/// when `queue` is no longer accessible, the orphans are dropped in place.
pub(crate) fn release<T, I>(queue: &'static LocalKey<Orphans<T>>, orphans: I)
where
    T: 'static,
    I: IntoIterator<Item = T>,
{
    let adopted = queue.try_with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_mut() {
            Some(pending) => {
                pending.extend(orphans);
                None
            }
            None => {
                *slot = Some(Vec::new());
                Some(orphans)
            }
        }
    });
    let Ok(Some(orphans)) = adopted else {
        return;
    };

    let _drainer = Drainer(queue);
    drop(orphans);
    loop {
        let batch = queue
            .try_with(|slot| slot.borrow_mut().as_mut().map(std::mem::take))
            .ok()
            .flatten()
            .unwrap_or_default();
        if batch.is_empty() {
            break;
        }
        drop(batch);
    }
}

/// Clears the queue when draining ends, including by unwinding.
struct Drainer<T: 'static>(&'static LocalKey<Orphans<T>>);

impl<T: 'static> Drop for Drainer<T> {
    fn drop(&mut self) {
        // Anything left over is dropped after the slot is reset, so a later
        // drop on this thread starts a fresh drain.
        let leftover = self.0.try_with(|slot| slot.borrow_mut().take());
        drop(leftover);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// A singly linked chain whose drop recurses without `release`.
    struct Link {
        next: Option<Box<Link>>,
    }

    thread_local! {
        static LINKS: Orphans<Box<Link>> = const { RefCell::new(None) };
    }

    impl Drop for Link {
        fn drop(&mut self) {
            release(&LINKS, self.next.take());
        }
    }

    fn chain(length: usize) -> Link {
        (0..length).fold(Link { next: None }, |next, _| Link {
            next: Some(Box::new(next)),
        })
    }

    #[rstest]
    fn long_chain_drops_iteratively() {
        drop(chain(1_000_000));
    }

    #[rstest]
    fn queue_is_reset_after_draining() {
        drop(chain(10));
        assert!(LINKS.with(|slot| slot.borrow().is_none()));
    }

    #[rstest]
    fn empty_release_leaves_no_drain_in_progress() {
        release(&LINKS, None::<Box<Link>>);
        assert!(LINKS.with(|slot| slot.borrow().is_none()));
    }
}
