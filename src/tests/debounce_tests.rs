#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::time::sleep;

    use crate::debounce::Debouncer;

    // With a paused clock, sleeping in the test auto-advances time and runs every timer
    // that falls due in between, in order.

    #[tokio::test(start_paused = true)]
    async fn test_only_the_last_call_fires() {
        let debouncer = Debouncer::new(Duration::from_millis(3000));
        let fired = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let fired = fired.clone();
            debouncer.call(async move { fired.lock().unwrap().push(i) });
            sleep(Duration::from_millis(500)).await;
        }
        assert!(fired.lock().unwrap().is_empty());

        sleep(Duration::from_millis(3000)).await;

        assert_eq!(*fired.lock().unwrap(), vec![4]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_outside_the_window_both_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let count = count.clone();
            debouncer.call(async move {
                count.fetch_add(1, Ordering::SeqCst);
            });
            sleep(Duration::from_millis(150)).await;
        }

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_the_pending_call() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        debouncer.call(async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());

        debouncer.cancel();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_a_running_task_is_not_cancelled_by_a_new_call() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let finished = Arc::new(AtomicUsize::new(0));

        let f = finished.clone();
        debouncer.call(async move {
            sleep(Duration::from_millis(1000)).await;
            f.fetch_add(1, Ordering::SeqCst);
        });
        sleep(Duration::from_millis(150)).await;

        // the first task is in flight now; a new call only replaces the timer
        let f = finished.clone();
        debouncer.call(async move {
            f.fetch_add(10, Ordering::SeqCst);
        });
        sleep(Duration::from_millis(1100)).await;

        assert_eq!(finished.load(Ordering::SeqCst), 11);
    }
}
