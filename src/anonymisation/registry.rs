//! Handler registry
//!
//! Maps each record type to at most one handler. Handlers are registered as
//! factories so that every lookup returns a fresh instance. The capability a
//! handler is registered with (anonymiser, redacter, both or neither) decides
//! which typed views can be requested for it.
//!
//! All reads and writes go through one lock, so registration from several
//! threads is safe and a duplicate registration is always detected.

use super::anonymiser::FieldAnonymiser;
use super::handler::{Handler, HandlerInfo};
use super::redacter::{FieldRedacter, RedactOptions, RedactionStrategy};
use crate::adapters::storage::{RecordStore, Selection};
use crate::domain::{AnonymiserError, FieldUpdate, FieldUpdates, RecordType, RedactionValues, Result};
use crate::schema::{FieldDescriptor, Model, RecordSchema};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, warn};

/// Type-erased object-level anonymiser for records of type `R`
pub trait DynAnonymiser<R: Model>: Send + Sync {
    fn name(&self) -> String;
    fn anonymisable_fields(&self) -> Vec<FieldDescriptor>;
    fn anonymise_field(&self, obj: &mut R, field: &str) -> Result<FieldUpdate>;
    fn anonymise_object(&self, obj: &mut R) -> Result<FieldUpdates>;
    fn anonymise_selection(&self, store: &mut dyn RecordStore<R>, selection: &Selection) -> Result<usize>;
}

/// Type-erased set-level redacter for records of type `R`
pub trait DynRedacter<R: Model>: Send + Sync {
    fn name(&self) -> String;
    fn field_redaction_values(&self) -> RedactionValues;
    fn redact_selection(
        &self,
        store: &mut dyn RecordStore<R>,
        selection: &Selection,
        options: RedactOptions,
    ) -> Result<usize>;
}

type AnonymisedCheck<H> = fn(&H, &str) -> bool;
type StrategyCheck<H> = fn(&H, &FieldDescriptor) -> RedactionStrategy;

struct Capabilities<H> {
    anonymised: Option<AnonymisedCheck<H>>,
    strategy: Option<StrategyCheck<H>>,
}

impl<H> Clone for Capabilities<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Capabilities<H> {}

/// A handler instance together with the capabilities it was registered with
struct Instance<H> {
    handler: H,
    caps: Capabilities<H>,
}

impl<H: Handler> HandlerInfo for Instance<H> {
    fn name(&self) -> String {
        self.handler.name()
    }

    fn schema(&self) -> RecordSchema {
        self.handler.schema()
    }

    fn is_anonymiser(&self) -> bool {
        self.caps.anonymised.is_some()
    }

    fn is_redacter(&self) -> bool {
        self.caps.strategy.is_some()
    }

    fn is_field_anonymised(&self, field: &str) -> bool {
        self.caps
            .anonymised
            .is_some_and(|check| check(&self.handler, field))
    }

    fn field_redaction_strategy(&self, field: &FieldDescriptor) -> RedactionStrategy {
        self.caps
            .strategy
            .map_or(RedactionStrategy::None, |check| check(&self.handler, field))
    }
}

impl<H: FieldAnonymiser> DynAnonymiser<H::Record> for Instance<H> {
    fn name(&self) -> String {
        self.handler.name()
    }

    fn anonymisable_fields(&self) -> Vec<FieldDescriptor> {
        self.handler.anonymisable_fields()
    }

    fn anonymise_field(&self, obj: &mut H::Record, field: &str) -> Result<FieldUpdate> {
        self.handler.anonymise_field(obj, field)
    }

    fn anonymise_object(&self, obj: &mut H::Record) -> Result<FieldUpdates> {
        self.handler.anonymise_object(obj)
    }

    fn anonymise_selection(
        &self,
        store: &mut dyn RecordStore<H::Record>,
        selection: &Selection,
    ) -> Result<usize> {
        self.handler.anonymise_selection(store, selection)
    }
}

impl<H: FieldRedacter> DynRedacter<H::Record> for Instance<H> {
    fn name(&self) -> String {
        self.handler.name()
    }

    fn field_redaction_values(&self) -> RedactionValues {
        self.handler.field_redaction_values()
    }

    fn redact_selection(
        &self,
        store: &mut dyn RecordStore<H::Record>,
        selection: &Selection,
        options: RedactOptions,
    ) -> Result<usize> {
        self.handler.redact_selection(store, selection, options)
    }
}

type InfoFactory = Arc<dyn Fn() -> Box<dyn HandlerInfo> + Send + Sync>;
type AnonymiserFactory<R> = Arc<dyn Fn() -> Box<dyn DynAnonymiser<R>> + Send + Sync>;
type RedacterFactory<R> = Arc<dyn Fn() -> Box<dyn DynRedacter<R>> + Send + Sync>;
type ErasedFactory = Arc<dyn Any + Send + Sync>;

struct Registration {
    handler_name: String,
    info: InfoFactory,
    anonymiser: Option<ErasedFactory>,
    redacter: Option<ErasedFactory>,
}

struct Slot {
    schema: RecordSchema,
    registration: Option<Registration>,
}

/// Registry of handlers keyed by record type
///
/// # Examples
///
/// ```
/// use anonymiser::anonymisation::{FieldRedacter, Handler, Registry};
/// use anonymiser::adapters::dynamic::DynamicRecord;
/// use anonymiser::domain::RecordType;
/// use anonymiser::schema::{FieldDescriptor, RecordSchema};
///
/// struct NoteRedacter;
///
/// impl Handler for NoteRedacter {
///     type Record = DynamicRecord;
///     fn schema(&self) -> RecordSchema {
///         RecordSchema::new(RecordType::new("notes", "Note"))
///             .field(FieldDescriptor::auto("id"))
///             .field(FieldDescriptor::text("body"))
///     }
/// }
///
/// impl FieldRedacter for NoteRedacter {}
///
/// let registry = Registry::new();
/// registry.register_redacter(|| NoteRedacter).unwrap();
/// assert!(registry.register_redacter(|| NoteRedacter).is_err());
///
/// let info = registry.lookup(&RecordType::new("notes", "Note")).unwrap();
/// assert_eq!(info.name(), "NoteRedacter");
/// assert!(info.is_redacter());
/// ```
#[derive(Default)]
pub struct Registry {
    slots: Mutex<BTreeMap<RecordType, Slot>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, BTreeMap<RecordType, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler with no capability beyond identification
    pub fn register_handler<H, F>(&self, factory: F) -> Result<()>
    where
        H: Handler,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let caps = Capabilities {
            anonymised: None,
            strategy: None,
        };
        self.insert(Arc::new(factory), caps, None, None)
    }

    /// Register an object-level anonymiser
    pub fn register_anonymiser<H, F>(&self, factory: F) -> Result<()>
    where
        H: FieldAnonymiser,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        let caps = Capabilities {
            anonymised: Some(|h: &H, field: &str| h.is_field_anonymised(field)),
            strategy: None,
        };
        let anonymiser = anonymiser_factory(Arc::clone(&factory), caps);
        self.insert(factory, caps, Some(anonymiser), None)
    }

    /// Register a set-level redacter
    pub fn register_redacter<H, F>(&self, factory: F) -> Result<()>
    where
        H: FieldRedacter,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        let caps = Capabilities {
            anonymised: None,
            strategy: Some(|h: &H, field: &FieldDescriptor| h.field_redaction_strategy(field)),
        };
        let redacter = redacter_factory(Arc::clone(&factory), caps);
        self.insert(factory, caps, None, Some(redacter))
    }

    /// Register a handler with both capabilities
    pub fn register_model_anonymiser<H, F>(&self, factory: F) -> Result<()>
    where
        H: FieldAnonymiser + FieldRedacter,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        let caps = Capabilities {
            anonymised: Some(|h: &H, field: &str| h.is_field_anonymised(field)),
            strategy: Some(|h: &H, field: &FieldDescriptor| h.field_redaction_strategy(field)),
        };
        let anonymiser = anonymiser_factory(Arc::clone(&factory), caps);
        let redacter = redacter_factory(Arc::clone(&factory), caps);
        self.insert(factory, caps, Some(anonymiser), Some(redacter))
    }

    fn insert<H, F>(
        &self,
        factory: Arc<F>,
        caps: Capabilities<H>,
        anonymiser: Option<ErasedFactory>,
        redacter: Option<ErasedFactory>,
    ) -> Result<()>
    where
        H: Handler,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let prototype = factory();
        let handler_name = prototype.name();
        let schema = prototype.schema();
        if schema.record_type().is_unset() {
            return Err(AnonymiserError::Configuration(format!(
                "Handler {handler_name} has no record type set"
            )));
        }
        schema.validate()?;

        let info: InfoFactory = Arc::new(move || {
            Box::new(Instance {
                handler: factory(),
                caps,
            }) as Box<dyn HandlerInfo>
        });

        let record_type = schema.record_type().clone();
        let mut slots = self.slots();
        if let Some(existing) = slots
            .get(&record_type)
            .and_then(|slot| slot.registration.as_ref())
        {
            warn!(
                record_type = %record_type,
                handler = %handler_name,
                existing = %existing.handler_name,
                "Duplicate handler registration"
            );
            return Err(AnonymiserError::DuplicateRegistration {
                record_type: record_type.label(),
                existing: existing.handler_name.clone(),
            });
        }

        debug!(
            record_type = %record_type,
            handler = %handler_name,
            anonymiser = anonymiser.is_some(),
            redacter = redacter.is_some(),
            "Handler registered"
        );
        slots.insert(
            record_type,
            Slot {
                schema,
                registration: Some(Registration {
                    handler_name,
                    info,
                    anonymiser,
                    redacter,
                }),
            },
        );
        Ok(())
    }

    /// Record a schema without registering a handler for it
    ///
    /// Declared schemas show up in [`unknown_types`](Self::unknown_types)
    /// and in reports. Declaring a schema that already has a handler is a
    /// no-op.
    pub fn declare_schema(&self, schema: RecordSchema) -> Result<()> {
        schema.validate()?;
        self.slots()
            .entry(schema.record_type().clone())
            .or_insert(Slot {
                schema,
                registration: None,
            });
        Ok(())
    }

    /// Fresh handler instance for `record_type`
    pub fn lookup(&self, record_type: &RecordType) -> Option<Box<dyn HandlerInfo>> {
        let factory = {
            let slots = self.slots();
            let registration = slots.get(record_type)?.registration.as_ref()?;
            Arc::clone(&registration.info)
        };
        Some(factory())
    }

    /// Fresh anonymiser for `record_type`, if one is registered for records of type `R`
    pub fn anonymiser_for<R: Model>(&self, record_type: &RecordType) -> Option<Box<dyn DynAnonymiser<R>>> {
        let factory = {
            let slots = self.slots();
            let registration = slots.get(record_type)?.registration.as_ref()?;
            registration
                .anonymiser
                .as_ref()?
                .downcast_ref::<AnonymiserFactory<R>>()?
                .clone()
        };
        Some(factory())
    }

    /// Fresh redacter for `record_type`, if one is registered for records of type `R`
    pub fn redacter_for<R: Model>(&self, record_type: &RecordType) -> Option<Box<dyn DynRedacter<R>>> {
        let factory = {
            let slots = self.slots();
            let registration = slots.get(record_type)?.registration.as_ref()?;
            registration
                .redacter
                .as_ref()?
                .downcast_ref::<RedacterFactory<R>>()?
                .clone()
        };
        Some(factory())
    }

    pub fn handler_name(&self, record_type: &RecordType) -> Option<String> {
        self.slots()
            .get(record_type)?
            .registration
            .as_ref()
            .map(|r| r.handler_name.clone())
    }

    /// True if a handler is registered for `record_type`
    pub fn is_anonymisable(&self, record_type: &RecordType) -> bool {
        self.slots()
            .get(record_type)
            .is_some_and(|slot| slot.registration.is_some())
    }

    /// Record types with a handler, sorted
    pub fn known_types(&self) -> Vec<RecordType> {
        self.slots()
            .iter()
            .filter(|(_, slot)| slot.registration.is_some())
            .map(|(record_type, _)| record_type.clone())
            .collect()
    }

    /// Declared record types without a handler, sorted
    pub fn unknown_types(&self) -> Vec<RecordType> {
        self.slots()
            .iter()
            .filter(|(_, slot)| slot.registration.is_none())
            .map(|(record_type, _)| record_type.clone())
            .collect()
    }

    /// Every schema the registry knows about, sorted by record type
    pub fn schemas(&self) -> Vec<RecordSchema> {
        self.slots().values().map(|slot| slot.schema.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| slot.registration.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every registration and declared schema
    pub fn clear(&self) {
        self.slots().clear();
    }
}

fn anonymiser_factory<H, F>(factory: Arc<F>, caps: Capabilities<H>) -> ErasedFactory
where
    H: FieldAnonymiser,
    F: Fn() -> H + Send + Sync + 'static,
{
    let typed: AnonymiserFactory<H::Record> = Arc::new(move || {
        Box::new(Instance {
            handler: factory(),
            caps,
        }) as Box<dyn DynAnonymiser<H::Record>>
    });
    Arc::new(typed)
}

fn redacter_factory<H, F>(factory: Arc<F>, caps: Capabilities<H>) -> ErasedFactory
where
    H: FieldRedacter,
    F: Fn() -> H + Send + Sync + 'static,
{
    let typed: RedacterFactory<H::Record> = Arc::new(move || {
        Box::new(Instance {
            handler: factory(),
            caps,
        }) as Box<dyn DynRedacter<H::Record>>
    });
    Arc::new(typed)
}

/// Process-wide registry
pub fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(Registry::new)
}

/// Register an anonymiser in the global registry
pub fn register_anonymiser<H, F>(factory: F) -> Result<()>
where
    H: FieldAnonymiser,
    F: Fn() -> H + Send + Sync + 'static,
{
    global().register_anonymiser(factory)
}

/// Register a redacter in the global registry
pub fn register_redacter<H, F>(factory: F) -> Result<()>
where
    H: FieldRedacter,
    F: Fn() -> H + Send + Sync + 'static,
{
    global().register_redacter(factory)
}

/// Register a handler with both capabilities in the global registry
pub fn register_model_anonymiser<H, F>(factory: F) -> Result<()>
where
    H: FieldAnonymiser + FieldRedacter,
    F: Fn() -> H + Send + Sync + 'static,
{
    global().register_model_anonymiser(factory)
}

/// Fresh handler for `record_type` from the global registry
pub fn get_model_anonymiser(record_type: &RecordType) -> Option<Box<dyn HandlerInfo>> {
    global().lookup(record_type)
}
