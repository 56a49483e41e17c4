//! # Capability Injection
//!
//! Components find each other through the capabilities they declare:
//!
//! 1. **Mutual wiring**: two components that each need the other's
//!    capability are both bound before either starts.
//! 2. **Exactly one provider**: zero or several providers fail resolution
//!    with a descriptive error.
//! 3. **Slots hold references**: the manager keeps providers alive, the
//!    slot does not.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use component_manager::{
        components, Component, ComponentManager, Descriptor, Inject, LifecycleContext,
        LifecycleError, SlotError, Start, Stop,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    trait Interface1: Send + Sync {
        fn method1(&self) -> &'static str;
    }

    trait Interface2: Send + Sync {
        fn method2(&self) -> &'static str;
    }

    /// Provides Interface1, needs Interface2.
    #[derive(Default)]
    struct Component1 {
        interface2: Inject<dyn Interface2>,
        started: AtomicBool,
        stopped: AtomicBool,
    }

    impl Interface1 for Component1 {
        fn method1(&self) -> &'static str {
            "component1"
        }
    }

    impl Component for Component1 {
        fn describe(self: Arc<Self>, d: &mut Descriptor) {
            d.require(&self.interface2)
                .provide::<dyn Interface1>(self.clone())
                .on_start(self.clone())
                .on_stop(self);
        }
    }

    #[async_trait]
    impl Start for Component1 {
        async fn start(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
            assert_eq!(self.interface2.get()?.method2(), "component2");
            self.started.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl Stop for Component1 {
        async fn stop(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Provides Interface2, needs Interface1.
    #[derive(Default)]
    struct Component2 {
        interface1: Inject<dyn Interface1>,
        started: AtomicBool,
        stopped: AtomicBool,
    }

    impl Interface2 for Component2 {
        fn method2(&self) -> &'static str {
            "component2"
        }
    }

    impl Component for Component2 {
        fn describe(self: Arc<Self>, d: &mut Descriptor) {
            d.require(&self.interface1)
                .provide::<dyn Interface2>(self.clone())
                .on_start(self.clone())
                .on_stop(self);
        }
    }

    #[async_trait]
    impl Start for Component2 {
        async fn start(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
            assert_eq!(self.interface1.get()?.method1(), "component1");
            self.started.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl Stop for Component2 {
        async fn stop(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// A second Interface2 provider, used to create ambiguity.
    struct Impostor;

    impl Interface2 for Impostor {
        fn method2(&self) -> &'static str {
            "impostor"
        }
    }

    impl Component for Impostor {
        fn describe(self: Arc<Self>, d: &mut Descriptor) {
            d.provide::<dyn Interface2>(self);
        }
    }

    // =========================================================================
    // INTEGRATION TESTS: WIRING
    // =========================================================================

    /// Two components depending on each other are wired and started.
    #[tokio::test]
    async fn test_mutual_injection_start_stop() {
        let mut manager = ComponentManager::new(None);
        let c1 = Arc::new(Component1::default());
        let c2 = Arc::new(Component2::default());

        manager
            .inject(components![c1.clone(), c2.clone()])
            .expect("both components should resolve");

        assert!(c1.interface2.is_bound_to(&c2));
        assert!(c2.interface1.is_bound_to(&c1));

        let ctx = LifecycleContext::background();
        manager.start(&ctx).await.expect("start should succeed");
        assert!(c1.started.load(Ordering::SeqCst));
        assert!(c2.started.load(Ordering::SeqCst));

        manager.stop(&ctx).await.expect("stop should succeed");
        assert!(c1.stopped.load(Ordering::SeqCst));
        assert!(c2.stopped.load(Ordering::SeqCst));
    }

    /// Registration order does not matter for resolution.
    #[tokio::test]
    async fn test_registration_order_irrelevant_for_binding() {
        let mut manager = ComponentManager::default();
        let c1 = Arc::new(Component1::default());
        let c2 = Arc::new(Component2::default());

        manager.register(c2.clone()).unwrap();
        manager.register(c1.clone()).unwrap();
        manager.start(&LifecycleContext::background()).await.unwrap();

        assert!(c1.interface2.is_bound_to(&c2));
        assert!(c2.interface1.is_bound_to(&c1));
    }

    /// Two providers of one capability make the consumer's slot ambiguous.
    #[test]
    fn test_two_providers_are_ambiguous() {
        let mut manager = ComponentManager::default();
        let result = manager.inject(components![
            Arc::new(Component1::default()),
            Arc::new(Component2::default()),
            Arc::new(Impostor),
        ]);

        match result {
            Err(LifecycleError::AmbiguousDependency {
                consumer,
                capability,
                providers,
            }) => {
                assert_eq!(consumer.name(), "Component1");
                assert!(capability.contains("Interface2"));
                let names: Vec<_> = providers.iter().map(|p| p.name()).collect();
                assert_eq!(names, vec!["Component2", "Impostor"]);
            }
            other => panic!("expected AmbiguousDependency, got {other:?}"),
        }
    }

    /// A missing provider is reported with the consumer and capability.
    #[tokio::test]
    async fn test_missing_provider_fails_start() {
        let mut manager = ComponentManager::default();
        let c1 = Arc::new(Component1::default());
        manager.register(c1.clone()).unwrap();

        let err = manager
            .start(&LifecycleContext::background())
            .await
            .expect_err("Interface2 has no provider");

        assert!(matches!(
            err,
            LifecycleError::UnsatisfiedDependency { ref consumer, capability }
                if consumer.name() == "Component1" && capability.contains("Interface2")
        ));
        assert!(!c1.started.load(Ordering::SeqCst));
        assert!(err.to_string().contains("Unsatisfied dependency"));
    }

    // =========================================================================
    // INTEGRATION TESTS: SLOT SEMANTICS
    // =========================================================================

    #[test]
    fn test_slot_unbound_before_resolution() {
        let mut manager = ComponentManager::default();
        let c1 = Arc::new(Component1::default());
        manager
            .register_all(components![c1.clone(), Arc::new(Component2::default())])
            .unwrap();

        assert!(matches!(c1.interface2.get(), Err(SlotError::Unbound { .. })));
    }

    /// Slots do not keep their provider alive once the manager is gone.
    #[test]
    fn test_slot_reports_dropped_provider() {
        let c1 = Arc::new(Component1::default());
        {
            let mut manager = ComponentManager::default();
            manager
                .inject(components![c1.clone(), Arc::new(Component2::default())])
                .unwrap();
            assert!(c1.interface2.get().is_ok());
        }

        assert!(matches!(
            c1.interface2.get(),
            Err(SlotError::ProviderDropped { .. })
        ));
    }
}
