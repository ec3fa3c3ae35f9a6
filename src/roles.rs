//! The auxiliary value type table.
//!
//! Auxiliary values (references, types, events, slots, ...) are never dispatched by `kind`.
//! Instead each field that holds one names a semantic [`Role`], and the [`ValueTypeTable`] maps
//! that role to the constructor used to build the field's value. Several roles share one
//! underlying type (`superclass`, `mixin`, `declaration`, `inheritedFrom` and `reference` all
//! build a [`Reference`]) but are registered and looked up independently, so overriding one
//! leaves the others untouched.
//!
//! Override a role with [`ValueTypeTable::register`]. The replacement must still produce the
//! role's stock type (an `event` override returns an [`Event`]); it is free to build that value
//! however it likes:
//!
//! ```rust
//! use cem_parser::{
//!     engine::Engine,
//!     roles::{Role, ValueType},
//!     values::Event,
//! };
//!
//! let mut engine = Engine::default();
//! engine
//!     .values_mut()
//!     .register(Role::Event, |raw, engine| {
//!         let mut event = Event::from_raw(raw, engine)?;
//!         event.name = format!("my-{}", event.name);
//!         Ok(event)
//!     })
//!     .unwrap();
//! ```

use crate::{
    engine::Engine,
    error::ManifestError,
    values::{
        Attribute, CssCustomProperty, CssPart, Demo, Event, FunctionReturnType, Parameter,
        Reference, ResolveInitializer, Slot, SourceReference, Type, TypeReference,
    },
};
use serde_json::Value;
use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt::{Debug, Display, Formatter},
    str::FromStr,
    sync::Arc,
};

/// The named slot a field uses to find its value constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Type,
    TypeReference,
    Reference,
    Superclass,
    Mixin,
    InheritedFrom,
    Declaration,
    Source,
    Attribute,
    Event,
    Slot,
    CssPart,
    CssCustomProperty,
    Demo,
    Parameter,
    FunctionReturnType,
    ResolveInitializer,
}

impl Role {
    pub const ALL: [Role; 17] = [
        Role::Type,
        Role::TypeReference,
        Role::Reference,
        Role::Superclass,
        Role::Mixin,
        Role::InheritedFrom,
        Role::Declaration,
        Role::Source,
        Role::Attribute,
        Role::Event,
        Role::Slot,
        Role::CssPart,
        Role::CssCustomProperty,
        Role::Demo,
        Role::Parameter,
        Role::FunctionReturnType,
        Role::ResolveInitializer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Type => "type",
            Role::TypeReference => "type_reference",
            Role::Reference => "reference",
            Role::Superclass => "superclass",
            Role::Mixin => "mixin",
            Role::InheritedFrom => "inheritedFrom",
            Role::Declaration => "declaration",
            Role::Source => "source",
            Role::Attribute => "attribute",
            Role::Event => "event",
            Role::Slot => "slot",
            Role::CssPart => "css_part",
            Role::CssCustomProperty => "css_custom_property",
            Role::Demo => "demo",
            Role::Parameter => "parameter",
            Role::FunctionReturnType => "function_return_type",
            Role::ResolveInitializer => "resolve_initializer",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .find(|role| role.as_str() == s)
            .copied()
            .ok_or_else(|| ManifestError::Config(format!("Unknown value role '{s}'")))
    }
}

/// An immutable value object built directly from its field's raw value.
pub trait ValueType: Sized + Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Entity name used in schema violations.
    const ENTITY: &'static str;

    /// The stock constructor.
    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError>;
}

pub type ValueFactory<T> =
    Arc<dyn Fn(&Value, &Engine) -> Result<T, ManifestError> + Send + Sync + 'static>;

/// The type a role's stock constructor produces. Overrides must produce the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Output {
    id: TypeId,
    name: &'static str,
}

impl Output {
    fn of<T: ValueType>() -> Self {
        Output {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

/// Role to constructor mapping, owned by one [`Engine`].
#[derive(Clone)]
pub struct ValueTypeTable {
    factories: HashMap<Role, Arc<dyn Any + Send + Sync>>,
    outputs: HashMap<Role, Output>,
}

impl Debug for ValueTypeTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut roles = self.factories.keys().map(Role::as_str).collect::<Vec<_>>();
        roles.sort_unstable();
        f.debug_tuple("ValueTypeTable").field(&roles).finish()
    }
}

impl Default for ValueTypeTable {
    fn default() -> Self {
        ValueTypeTable::create()
    }
}

impl ValueTypeTable {
    /// Create a table with the stock constructor for every role.
    pub fn create() -> Self {
        let mut table = ValueTypeTable {
            factories: HashMap::new(),
            outputs: HashMap::new(),
        };
        table.insert_default::<Type>(Role::Type);
        table.insert_default::<TypeReference>(Role::TypeReference);
        for role in [
            Role::Reference,
            Role::Superclass,
            Role::Mixin,
            Role::InheritedFrom,
            Role::Declaration,
        ] {
            table.insert_default::<Reference>(role);
        }
        table.insert_default::<SourceReference>(Role::Source);
        table.insert_default::<Attribute>(Role::Attribute);
        table.insert_default::<Event>(Role::Event);
        table.insert_default::<Slot>(Role::Slot);
        table.insert_default::<CssPart>(Role::CssPart);
        table.insert_default::<CssCustomProperty>(Role::CssCustomProperty);
        table.insert_default::<Demo>(Role::Demo);
        table.insert_default::<Parameter>(Role::Parameter);
        table.insert_default::<FunctionReturnType>(Role::FunctionReturnType);
        table.insert_default::<ResolveInitializer>(Role::ResolveInitializer);
        table
    }

    fn insert_default<T: ValueType>(&mut self, role: Role) {
        let factory: ValueFactory<T> = Arc::new(T::from_raw);
        self.factories.insert(role, Arc::new(factory));
        self.outputs.insert(role, Output::of::<T>());
    }

    /// Replace the constructor for one role.
    ///
    /// The replacement must produce the role's stock type: registering a [`Slot`] constructor
    /// under [`Role::Event`], or a project-specific event struct, fails here rather than at
    /// parse time.
    pub fn register<T, F>(&mut self, role: Role, factory: F) -> Result<(), ManifestError>
    where
        T: ValueType,
        F: Fn(&Value, &Engine) -> Result<T, ManifestError> + Send + Sync + 'static,
    {
        let output = Output::of::<T>();
        if let Some(stock) = self.outputs.get(&role) {
            if stock.id != output.id {
                return Err(ManifestError::mismatched(
                    format!("{} for role '{}'", stock.name, role),
                    output.name,
                ));
            }
        }
        if self.factories.contains_key(&role) {
            tracing::info!(
                "[ValueTypeTable::register] Overwriting constructor for role: {}",
                role
            );
        }
        let factory: ValueFactory<T> = Arc::new(factory);
        self.factories.insert(role, Arc::new(factory));
        self.outputs.entry(role).or_insert(output);
        Ok(())
    }

    /// The constructor registered for `role`, typed as `T`.
    pub fn get<T: ValueType>(&self, role: Role) -> Result<ValueFactory<T>, ManifestError> {
        self.factories
            .get(&role)
            .and_then(|entry| entry.downcast_ref::<ValueFactory<T>>())
            .cloned()
            .ok_or_else(|| ManifestError::mismatched(role.as_str(), T::ENTITY))
    }

    pub fn roles(&self) -> Vec<Role> {
        let mut roles = self.factories.keys().copied().collect::<Vec<_>>();
        roles.sort();
        roles
    }

    /// Build one value through `role`'s constructor.
    pub fn construct<T: ValueType>(
        &self,
        role: Role,
        raw: &Value,
        engine: &Engine,
    ) -> Result<T, ManifestError> {
        tracing::trace!("[ValueTypeTable::construct] role {}", role);
        let factory = self.get::<T>(role)?;
        factory(raw, engine)
    }

    /// Build an optional field. An absent raw value stays absent.
    pub fn construct_optional<T: ValueType>(
        &self,
        role: Role,
        raw: Option<&Value>,
        engine: &Engine,
    ) -> Result<Option<T>, ManifestError> {
        raw.map(|raw| self.construct(role, raw, engine)).transpose()
    }

    /// Build every element of a list field, preserving order.
    pub fn construct_list<T: ValueType>(
        &self,
        role: Role,
        raw: Option<&Vec<Value>>,
        engine: &Engine,
    ) -> Result<Option<Vec<T>>, ManifestError> {
        let Some(items) = raw else {
            return Ok(None);
        };
        let factory = self.get::<T>(role)?;
        items
            .iter()
            .map(|item| factory(item, engine))
            .collect::<Result<Vec<T>, ManifestError>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_every_role_has_a_default() {
        let table = ValueTypeTable::create();
        assert_eq!(table.roles(), Role::ALL.to_vec());
    }

    #[test]
    fn test_role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("nope".parse::<Role>().is_err());
    }

    #[test]
    fn test_register_rejects_wrong_output_type() {
        let mut table = ValueTypeTable::create();
        let err = table
            .register(Role::Slot, |raw, engine| Event::from_raw(raw, engine))
            .unwrap_err();
        assert!(err.is_mismatched_kind());
    }

    /// A project event that claims the `event` role but is not an [`Event`].
    #[derive(Debug, Clone, PartialEq)]
    struct ProjectEvent {
        event: Event,
    }

    impl ValueType for ProjectEvent {
        const ENTITY: &'static str = "project_event";

        fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
            Ok(ProjectEvent {
                event: Event::from_raw(raw, engine)?,
            })
        }
    }

    #[test]
    fn test_register_rejects_foreign_type_for_stock_role() {
        let mut table = ValueTypeTable::create();
        let err = table
            .register(Role::Event, ProjectEvent::from_raw)
            .unwrap_err();
        assert_eq!(
            err,
            ManifestError::mismatched(
                format!("{} for role 'event'", type_name::<Event>()),
                type_name::<ProjectEvent>()
            )
        );

        // The stock constructor is still in place.
        let engine = Engine::default();
        let raw = json!({ "name": "change", "type": { "text": "Event" } });
        let event: Event = table.construct(Role::Event, &raw, &engine).unwrap();
        assert_eq!(event.name, "change");
    }

    #[test]
    fn test_overriding_one_reference_role_leaves_siblings() {
        let engine = Engine::default();
        let mut table = ValueTypeTable::create();
        table
            .register(Role::Mixin, |raw, engine| {
                let mut reference = Reference::from_raw(raw, engine)?;
                reference.package = Some("mixins".to_string());
                Ok(reference)
            })
            .unwrap();

        let raw = json!({ "name": "A" });
        let mixin: Reference = table.construct(Role::Mixin, &raw, &engine).unwrap();
        let superclass: Reference = table.construct(Role::Superclass, &raw, &engine).unwrap();
        assert_eq!(mixin.package.as_deref(), Some("mixins"));
        assert_eq!(superclass.package, None);
    }

    #[test]
    fn test_wrong_type_lookup_is_an_error() {
        let table = ValueTypeTable::create();
        assert!(table.get::<Slot>(Role::Event).is_err());
        assert!(table.get::<Event>(Role::Event).is_ok());
    }

    #[test]
    fn test_optional_and_list_construction() {
        let engine = Engine::default();
        let table = ValueTypeTable::create();
        let none: Option<Reference> = table
            .construct_optional(Role::Reference, None, &engine)
            .unwrap();
        assert!(none.is_none());

        let raw = vec![json!({ "name": "b" }), json!({ "name": "a" })];
        let slots: Vec<Slot> = table
            .construct_list(Role::Slot, Some(&raw), &engine)
            .unwrap()
            .unwrap();
        assert_eq!(
            slots.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["b", "a"]
        );
    }
}
