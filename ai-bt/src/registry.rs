use std::collections::BTreeMap;
use std::sync::Arc;

use ai_core::WorldMut;

use crate::{Attributes, Behavior, BtError, NodeKind};

/// Builds a node kind from the attributes of a document record.
pub type NodeConstructor<W> =
    Box<dyn Fn(&Attributes) -> Result<NodeKind<W>, BtError> + Send + Sync + 'static>;

/// Node-type table consulted by [`crate::BehaviorTree::import`].
///
/// Built explicitly and passed by reference; there is no process-wide registry. `new()` knows the
/// built-in composites and `Wait`. Game code adds its leaves with [`NodeRegistry::register`] or
/// [`NodeRegistry::register_behavior`].
pub struct NodeRegistry<W>
where
    W: WorldMut + 'static,
{
    constructors: BTreeMap<String, NodeConstructor<W>>,
}

impl<W> NodeRegistry<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("Sequence", |_| Ok(NodeKind::Sequence));
        registry.register("Selector", |_| Ok(NodeKind::Selector));
        registry.register("RandomSequence", |_| Ok(NodeKind::RandomSequence));
        registry.register("RandomSelector", |_| Ok(NodeKind::RandomSelector));
        registry.register("Wait", |attrs| {
            let duration: f64 = required_attribute("Wait", attrs, "Duration")?;
            if !duration.is_finite() || duration < 0.0 {
                return Err(BtError::InvalidAttribute {
                    type_name: "Wait".to_string(),
                    attribute: "Duration".to_string(),
                    value: attrs["Duration"].clone(),
                });
            }
            Ok(NodeKind::wait(duration))
        });
        registry
    }

    /// A registry without the built-ins.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register (or replace) the constructor for `type_name`.
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn(&Attributes) -> Result<NodeKind<W>, BtError> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self
            .constructors
            .insert(type_name.clone(), Box::new(constructor))
            .is_some()
        {
            tracing::debug!(%type_name, "node type re-registered");
        }
    }

    /// Register a leaf type whose behavior is built from the record's attributes.
    ///
    /// The attributes are kept on the node so exported documents stay identical.
    pub fn register_behavior<B, F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        B: Behavior<W>,
        F: Fn(&Attributes) -> Result<B, BtError> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let name = type_name.clone();
        self.register(type_name, move |attrs| {
            let behavior = factory(attrs)?;
            Ok(NodeKind::Generic {
                type_name: name.clone(),
                attributes: attrs.clone(),
                behavior: Some(Arc::new(behavior)),
            })
        });
    }

    /// Build a node of `type_name`. Unknown names become inert placeholders.
    pub fn create(&self, type_name: &str, attributes: &Attributes) -> Result<NodeKind<W>, BtError> {
        match self.constructors.get(type_name) {
            Some(constructor) => constructor(attributes),
            None => {
                tracing::debug!(type_name, "unregistered node type; using placeholder");
                Ok(NodeKind::placeholder(type_name, attributes.clone()))
            }
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl<W> Default for NodeRegistry<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a mandatory attribute, reporting which node type asked for it.
pub fn required_attribute<T>(type_name: &str, attrs: &Attributes, attribute: &str) -> Result<T, BtError>
where
    T: std::str::FromStr,
{
    let raw = attrs.get(attribute).ok_or_else(|| BtError::MissingAttribute {
        type_name: type_name.to_string(),
        attribute: attribute.to_string(),
    })?;
    raw.trim().parse().map_err(|_| BtError::InvalidAttribute {
        type_name: type_name.to_string(),
        attribute: attribute.to_string(),
        value: raw.clone(),
    })
}

/// Parse an attribute that may be absent, falling back to `default`.
pub fn optional_attribute<T>(
    type_name: &str,
    attrs: &Attributes,
    attribute: &str,
    default: T,
) -> Result<T, BtError>
where
    T: std::str::FromStr,
{
    if attrs.contains_key(attribute) {
        required_attribute(type_name, attrs, attribute)
    } else {
        Ok(default)
    }
}
