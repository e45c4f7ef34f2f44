use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::error::Result;

/// Core lifecycle trait for all kernel components.
///
/// Components are registered with the [`ComponentRegistry`] during bootstrap
/// and driven through `initialize` -> `start` -> `stop` in registration order
/// (reverse order for `stop`).
#[async_trait]
pub trait KernelComponent: Any + Send + Sync + Debug {
    fn name(&self) -> &'static str;
    async fn initialize(&self) -> Result<()>;
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
}

/// Registry storing components as `Arc<dyn KernelComponent>`, keyed by the
/// concrete type's `TypeId` and remembering registration order.
#[derive(Default, Debug)]
pub struct ComponentRegistry {
    instances: HashMap<TypeId, Arc<dyn KernelComponent>>,
    order: Vec<TypeId>,
}

impl ComponentRegistry {
    /// Create a new empty component registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component instance, keyed by the concrete type of `V`.
    pub fn register_instance<V>(&mut self, instance: Arc<V>)
    where
        V: KernelComponent + 'static,
    {
        let type_id = TypeId::of::<V>();
        if self.instances.insert(type_id, instance).is_none() {
            self.order.push(type_id);
        }
    }

    /// Get a component instance by concrete type `T`.
    pub fn get_concrete<T: KernelComponent + 'static>(&self) -> Option<Arc<T>> {
        self.instances.get(&TypeId::of::<T>()).and_then(|arc_kc| {
            let arc_any: Arc<dyn Any + Send + Sync> = arc_kc.clone();
            Arc::downcast::<T>(arc_any).ok()
        })
    }

    /// All components in registration order.
    pub fn in_order(&self) -> Vec<Arc<dyn KernelComponent>> {
        self.order
            .iter()
            .filter_map(|id| self.instances.get(id).cloned())
            .collect()
    }

    /// Number of registered components.
    pub fn count(&self) -> usize {
        self.instances.len()
    }
}
