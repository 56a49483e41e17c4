//! # Manager Hierarchy
//!
//! A child manager resolves capabilities nobody registered locally against
//! its parent chain, nearest first. Parent components are borrowed, never
//! driven: the child only starts and stops its own.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use component_manager::{
        Component, ComponentManager, Descriptor, Inject, LifecycleContext, LifecycleError,
        ManagerConfig,
    };

    use crate::integration::fixtures::{calls, journal, Hook, Probe};

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    impl Component for FixedClock {
        fn describe(self: Arc<Self>, d: &mut Descriptor) {
            d.provide::<dyn Clock>(self);
        }
    }

    #[derive(Default)]
    struct Scheduler {
        clock: Inject<dyn Clock>,
    }

    impl Component for Scheduler {
        fn describe(self: Arc<Self>, d: &mut Descriptor) {
            d.require(&self.clock);
        }
    }

    fn named(name: &str) -> Option<ManagerConfig> {
        Some(ManagerConfig::named(name))
    }

    #[tokio::test]
    async fn test_child_borrows_parent_capability() {
        let mut root = ComponentManager::new(named("root"));
        root.register(Arc::new(FixedClock(42))).unwrap();
        let root = Arc::new(root);

        let mut child = ComponentManager::new(named("child")).with_parent(root.clone());
        let scheduler = Arc::new(Scheduler::default());
        child.register(scheduler.clone()).unwrap();

        child.start(&LifecycleContext::background()).await.unwrap();

        assert_eq!(scheduler.clock.get().unwrap().now(), 42);
        assert!(!root.is_started());
    }

    #[test]
    fn test_grandparent_is_searched_after_parent() {
        let mut grandparent = ComponentManager::new(named("grandparent"));
        let far = Arc::new(FixedClock(1));
        grandparent.register(far.clone()).unwrap();

        let mut parent = ComponentManager::new(named("parent")).with_parent(Arc::new(grandparent));
        let near = Arc::new(FixedClock(2));
        parent.register(near.clone()).unwrap();

        let mut child = ComponentManager::new(named("child")).with_parent(Arc::new(parent));
        let scheduler = Arc::new(Scheduler::default());
        child.register(scheduler.clone()).unwrap();
        child.resolve().unwrap();

        assert!(scheduler.clock.is_bound_to(&near));

        // Without a provider in the parent, the grandparent answers.
        let mut grandparent = ComponentManager::new(named("grandparent"));
        grandparent.register(far.clone()).unwrap();
        let parent = ComponentManager::new(named("parent")).with_parent(Arc::new(grandparent));
        let mut child = ComponentManager::new(named("child")).with_parent(Arc::new(parent));
        let scheduler = Arc::new(Scheduler::default());
        child.register(scheduler.clone()).unwrap();
        child.resolve().unwrap();

        assert!(scheduler.clock.is_bound_to(&far));
    }

    #[test]
    fn test_ambiguity_in_parent_is_reported() {
        let mut root = ComponentManager::new(named("root"));
        root.register(Arc::new(FixedClock(1))).unwrap();
        root.register(Arc::new(FixedClock(2))).unwrap();

        let mut child = ComponentManager::new(named("child")).with_parent(Arc::new(root));
        child.register(Arc::new(Scheduler::default())).unwrap();

        let err = child.resolve().unwrap_err();
        assert!(matches!(err, LifecycleError::AmbiguousDependency { ref providers, .. } if providers.len() == 2));
    }

    #[tokio::test]
    async fn test_child_lifecycle_leaves_parent_untouched() {
        let journal = journal();
        let mut root = ComponentManager::new(named("root"));
        root.register(Arc::new(Probe::new("parent-probe", &journal)))
            .unwrap();
        let root = Arc::new(root);

        let mut child = ComponentManager::new(named("child")).with_parent(root.clone());
        child
            .register(Arc::new(Probe::new("child-probe", &journal)))
            .unwrap();

        let ctx = LifecycleContext::background();
        child.start(&ctx).await.unwrap();
        child.stop(&ctx).await.unwrap();

        assert_eq!(calls(&journal, Hook::Start), vec!["child-probe"]);
        assert_eq!(calls(&journal, Hook::Stop), vec!["child-probe"]);
        assert!(child.parent().is_some());
    }
}
