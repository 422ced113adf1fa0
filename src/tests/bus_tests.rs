#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::bus::{BusEvent, EventBus, EventKind};
    use crate::toast::{show_toast, OneShotWarning, Toast};

    fn recorder(bus: &EventBus, log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> crate::bus::Subscription {
        let log = log.clone();
        bus.subscribe(EventKind::RefetchFiles, move |_| {
            log.lock().unwrap().push(name);
            Ok(())
        })
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _a = recorder(&bus, &log, "a");
        let _b = recorder(&bus, &log, "b");
        let _c = recorder(&bus, &log, "c");

        assert_eq!(bus.publish(BusEvent::RefetchFiles), 3);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failing_handler_does_not_stop_the_others() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _a = recorder(&bus, &log, "a");
        let _err = bus.subscribe(EventKind::RefetchFiles, |_| Err(anyhow::anyhow!("handler error")));
        let _panic = bus.subscribe(EventKind::RefetchFiles, |_| panic!("handler panic"));
        let _c = recorder(&bus, &log, "c");

        let delivered = bus.publish(BusEvent::RefetchFiles);

        assert_eq!(delivered, 2);
        assert_eq!(*log.lock().unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn test_unsubscribe_removes_exactly_one_handler() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recorder(&bus, &log, "a");
        let _b = recorder(&bus, &log, "b");

        a.unsubscribe();
        bus.publish(BusEvent::RefetchFiles);

        assert_eq!(*log.lock().unwrap(), vec!["b"]);
        assert_eq!(bus.handler_count(EventKind::RefetchFiles), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bus = EventBus::new();
        let sub = bus.subscribe(EventKind::Toast, |_| Ok(()));
        let (kind, id) = (sub.kind(), sub.id());

        assert!(bus.unsubscribe(kind, id));
        assert!(!bus.unsubscribe(kind, id));
        // Dropping the guard after a manual removal is a no-op as well.
        drop(sub);
        assert_eq!(bus.handler_count(EventKind::Toast), 0);
    }

    #[test]
    fn test_dropping_subscription_releases_handler() {
        let bus = EventBus::new();
        {
            let _sub = bus.subscribe(EventKind::Toast, |_| Ok(()));
            assert_eq!(bus.handler_count(EventKind::Toast), 1);
        }
        assert_eq!(bus.handler_count(EventKind::Toast), 0);
        assert_eq!(bus.publish(BusEvent::Toast(Toast::new("nobody listens"))), 0);
    }

    #[test]
    fn test_events_only_reach_their_own_kind() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _r = recorder(&bus, &log, "refetch");

        show_toast(&bus, "hello");

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handler_may_subscribe_while_being_called() {
        let bus = EventBus::new();
        let inner_bus = bus.clone();
        let added = Arc::new(Mutex::new(Vec::new()));
        let keep = added.clone();
        let _outer = bus.subscribe(EventKind::RefetchFiles, move |_| {
            keep.lock().unwrap().push(inner_bus.subscribe(EventKind::RefetchFiles, |_| Ok(())));
            Ok(())
        });

        // The snapshot taken before delivery does not include the new handler.
        assert_eq!(bus.publish(BusEvent::RefetchFiles), 1);
        assert_eq!(bus.handler_count(EventKind::RefetchFiles), 2);
    }

    #[test]
    fn test_clear_drops_all_registrations() {
        let bus = EventBus::new();
        let _a = bus.subscribe(EventKind::Toast, |_| Ok(()));
        let _b = bus.subscribe(EventKind::RefetchFiles, |_| Ok(()));

        bus.clear();

        assert_eq!(bus.handler_count(EventKind::Toast), 0);
        assert_eq!(bus.handler_count(EventKind::RefetchFiles), 0);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::Toast.as_str(), "show-toast");
        assert_eq!(EventKind::PushMessage.as_str(), "sse-message");
        assert_eq!(EventKind::RefetchFiles.as_str(), "refetch-files");
        assert_eq!(BusEvent::RefetchFiles.kind(), EventKind::RefetchFiles);
    }

    #[test]
    fn test_one_shot_warning_fires_once() {
        let bus = EventBus::new();
        let (seen, _sub) = crate::tests::support::collect_toasts(&bus);
        let warning = OneShotWarning::new();

        assert!(warning.warn(&bus, "autoplay blocked"));
        assert!(!warning.warn(&bus, "autoplay blocked"));
        assert!(warning.already_shown());
        assert_eq!(*seen.lock().unwrap(), vec!["autoplay blocked".to_string()]);
    }
}
