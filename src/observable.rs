use std::sync::Mutex;

type Subscriber<T> = Box<dyn FnMut(&T) + Send>;

struct Inner<T> {
    value: T,
    subscriber: Option<Subscriber<T>>,
}

/// A single-subscriber reactive cell.
///
/// Holds a current value and at most one subscriber callback. Setting the
/// value invokes the subscriber synchronously with the new value before the
/// stored value is replaced; reading returns the last stored value.
///
/// The cell performs no scheduling of its own: the subscriber runs on
/// whatever thread or task called [`set()`](Self::set). A UI shell that
/// needs its own execution context must marshal inside its subscriber.
/// The subscriber must not call back into the same cell.
///
/// # Example
/// ```
/// use neural_gallery::Observable;
///
/// let cell = Observable::new(0u32);
/// cell.subscribe(|v| println!("now {}", v));
/// cell.set(1);
/// assert_eq!(cell.get(), 1);
/// ```
pub struct Observable<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Observable<T> {
    /// Create a cell holding `value` with no subscriber.
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(Inner {
                value,
                subscriber: None,
            }),
        }
    }

    /// Return the last stored value.
    pub fn get(&self) -> T {
        match self.inner.lock() {
            Ok(inner) => inner.value.clone(),
            Err(poisoned) => poisoned.into_inner().value.clone(),
        }
    }

    /// Replace the value, invoking the subscriber (if any) with the new
    /// value before it is stored.
    pub fn set(&self, value: T) {
        match self.inner.lock() {
            Ok(mut inner) => {
                if let Some(cb) = inner.subscriber.as_mut() {
                    cb(&value);
                }
                inner.value = value;
            }
            Err(e) => {
                eprintln!("[neural-gallery] WARNING: observable mutex poisoned: {}", e);
            }
        }
    }

    /// Attach a subscriber, silently replacing any previous one.
    ///
    /// There is intentionally at most one subscriber at a time; this is a
    /// value cell, not a multi-observer bus.
    pub fn subscribe(&self, callback: impl FnMut(&T) + Send + 'static) {
        match self.inner.lock() {
            Ok(mut inner) => inner.subscriber = Some(Box::new(callback)),
            Err(e) => {
                eprintln!("[neural-gallery] WARNING: observable mutex poisoned: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_get_returns_initial_value() {
        let cell = Observable::new(42u32);
        assert_eq!(cell.get(), 42);
    }

    #[test]
    fn test_set_updates_value() {
        let cell = Observable::new(0u32);
        cell.set(7);
        assert_eq!(cell.get(), 7);
    }

    #[test]
    fn test_subscriber_invoked_with_new_value() {
        let seen = Arc::new(AtomicU32::new(0));
        let cell = Observable::new(0u32);
        let seen2 = Arc::clone(&seen);
        cell.subscribe(move |v| seen2.store(*v, Ordering::SeqCst));

        cell.set(5);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_set_without_subscriber_is_silent() {
        let cell = Observable::new(String::from("a"));
        cell.set("b".to_string());
        assert_eq!(cell.get(), "b");
    }

    #[test]
    fn test_subscribe_replaces_previous_subscriber() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let cell = Observable::new(0u32);

        let f = Arc::clone(&first);
        cell.subscribe(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        });
        cell.set(1);

        let s = Arc::clone(&second);
        cell.subscribe(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });
        cell.set(2);
        cell.set(3);

        // The first subscriber saw only the set before it was replaced.
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscriber_sees_every_set() {
        let values = Arc::new(Mutex::new(Vec::new()));
        let cell = Observable::new(0u32);
        let v2 = Arc::clone(&values);
        cell.subscribe(move |v| v2.lock().unwrap().push(*v));

        for i in 1..=4 {
            cell.set(i);
        }
        assert_eq!(*values.lock().unwrap(), vec![1, 2, 3, 4]);
    }
}
