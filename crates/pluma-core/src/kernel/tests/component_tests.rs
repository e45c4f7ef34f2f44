use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::component::{ComponentRegistry, KernelComponent};
use crate::kernel::error::Result;

#[derive(Debug)]
struct CountingComponent {
    name: &'static str,
    starts: AtomicUsize,
}

impl CountingComponent {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            starts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KernelComponent for CountingComponent {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct OtherComponent;

#[async_trait]
impl KernelComponent for OtherComponent {
    fn name(&self) -> &'static str {
        "other"
    }

    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn registry_preserves_registration_order() {
    let mut registry = ComponentRegistry::new();
    registry.register_instance(Arc::new(CountingComponent::new("first")));
    registry.register_instance(Arc::new(OtherComponent));

    let names: Vec<_> = registry.in_order().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["first", "other"]);
    assert_eq!(registry.count(), 2);
}

#[test]
fn get_concrete_downcasts_to_the_registered_type() {
    let mut registry = ComponentRegistry::new();
    registry.register_instance(Arc::new(CountingComponent::new("counting")));

    let component = registry.get_concrete::<CountingComponent>().unwrap();
    assert_eq!(component.name(), "counting");
    assert!(registry.get_concrete::<OtherComponent>().is_none());
}

#[tokio::test]
async fn components_run_through_their_lifecycle() {
    let mut registry = ComponentRegistry::new();
    let component = Arc::new(CountingComponent::new("lifecycle"));
    registry.register_instance(Arc::clone(&component));

    for c in registry.in_order() {
        c.initialize().await.unwrap();
        c.start().await.unwrap();
    }
    assert_eq!(component.starts.load(Ordering::SeqCst), 1);
}
